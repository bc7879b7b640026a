// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fingrid_app::{
    CellEditor, Choice, ChoiceMap, EditMode, EditSession, Record, RecordId, Schema, SortEngine,
    cell_text,
};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Schema column index; `None` for the delete checkbox column.
    pub column: Option<usize>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedCell {
    Text(String),
    Input(String),
    Select { options: Vec<Choice>, selected: Value },
    DeleteCheckbox(bool),
}

impl RenderedCell {
    fn plain(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Input(text) => format!("[{text}]"),
            Self::Select { options, selected } => {
                let label = options
                    .iter()
                    .find(|choice| choice.value == *selected)
                    .map(|choice| choice.label.clone())
                    .unwrap_or_else(|| cell_text(selected));
                format!("<{label}>")
            }
            Self::DeleteCheckbox(true) => "[x]".to_owned(),
            Self::DeleteCheckbox(false) => "[ ]".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRow {
    pub identity: Option<RecordId>,
    pub cells: Vec<RenderedCell>,
}

/// One full render of the grid. Every render is built from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    pub visible: bool,
    pub editable: bool,
    pub mode: EditMode,
    pub header: Vec<HeaderCell>,
    pub rows: Vec<RenderedRow>,
    pub status: Option<String>,
}

impl RenderedTable {
    pub(crate) fn build(
        schema: &Schema,
        records: &[Record],
        choices: &ChoiceMap,
        sort: &SortEngine,
        edit: &EditSession,
    ) -> Self {
        let mode = edit.mode();
        let editing = mode != EditMode::View && !edit.buffers().is_empty();
        let columns: Vec<usize> = if editing {
            (0..schema.len()).collect()
        } else {
            schema.visible_columns().map(|(index, _)| index).collect()
        };

        let mut header: Vec<HeaderCell> = columns
            .iter()
            .map(|&index| HeaderCell {
                column: Some(index),
                label: sort.header_label(schema, index).unwrap_or_default(),
            })
            .collect();

        let rows = if editing {
            header.push(HeaderCell {
                column: None,
                label: "Delete".to_owned(),
            });
            edit.buffers()
                .iter()
                .map(|buffer| {
                    let mut cells: Vec<RenderedCell> = columns
                        .iter()
                        .map(|&index| match &buffer.cells[index] {
                            CellEditor::ReadOnly(value) => RenderedCell::Text(cell_text(value)),
                            CellEditor::Input(text) => RenderedCell::Input(text.clone()),
                            CellEditor::Select { options, selected } => RenderedCell::Select {
                                options: options.clone(),
                                selected: selected.clone(),
                            },
                        })
                        .collect();
                    cells.push(RenderedCell::DeleteCheckbox(buffer.delete));
                    RenderedRow {
                        identity: Some(buffer.identity.clone()),
                        cells,
                    }
                })
                .collect()
        } else {
            records
                .iter()
                .map(|record| RenderedRow {
                    identity: schema.identity_of(record),
                    cells: columns
                        .iter()
                        .map(|&index| RenderedCell::Text(display_text(schema, choices, record, index)))
                        .collect(),
                })
                .collect()
        };

        Self {
            visible: true,
            editable: true,
            mode,
            header,
            rows,
            status: edit.status_line().map(str::to_owned),
        }
    }

    pub(crate) fn hidden(status: Option<&str>) -> Self {
        Self {
            visible: false,
            editable: false,
            mode: EditMode::View,
            header: Vec::new(),
            rows: Vec::new(),
            status: status.map(str::to_owned),
        }
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column-aligned plain text, for terminals and logs.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if !self.visible || self.rows.is_empty() {
            out.push_str("(no rows)\n");
        } else {
            let header: Vec<String> = self.header.iter().map(|cell| cell.label.clone()).collect();
            let body: Vec<Vec<String>> = self
                .rows
                .iter()
                .map(|row| row.cells.iter().map(RenderedCell::plain).collect())
                .collect();

            let mut widths: Vec<usize> = header.iter().map(|label| label.chars().count()).collect();
            for row in &body {
                for (index, cell) in row.iter().enumerate() {
                    if let Some(width) = widths.get_mut(index) {
                        *width = (*width).max(cell.chars().count());
                    }
                }
            }

            push_line(&mut out, &header, &widths);
            let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
            out.push_str(&rule.join("-+-"));
            out.push('\n');
            for row in &body {
                push_line(&mut out, row, &widths);
            }
        }

        if let Some(status) = &self.status {
            out.push_str(status);
            out.push('\n');
        }
        out
    }
}

fn display_text(schema: &Schema, choices: &ChoiceMap, record: &Record, index: usize) -> String {
    let Some(column) = schema.column(index) else {
        return String::new();
    };
    let value = record.get(&column.key).unwrap_or(&Value::Null);
    column
        .choice_source
        .as_deref()
        .and_then(|source| choices.label_for_value(source, value))
        .map(str::to_owned)
        .unwrap_or_else(|| cell_text(value))
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::{HeaderCell, RenderedCell, RenderedRow, RenderedTable};
    use fingrid_app::{EditMode, RecordId};

    fn table(status: Option<&str>) -> RenderedTable {
        RenderedTable {
            visible: true,
            editable: true,
            mode: EditMode::View,
            header: vec![
                HeaderCell {
                    column: Some(1),
                    label: "Name".to_owned(),
                },
                HeaderCell {
                    column: Some(2),
                    label: "Amount ↓".to_owned(),
                },
            ],
            rows: vec![
                RenderedRow {
                    identity: Some(RecordId::new("1")),
                    cells: vec![
                        RenderedCell::Text("Rent".to_owned()),
                        RenderedCell::Text("1200".to_owned()),
                    ],
                },
                RenderedRow {
                    identity: Some(RecordId::new("2")),
                    cells: vec![
                        RenderedCell::Text("Groceries".to_owned()),
                        RenderedCell::Text("300".to_owned()),
                    ],
                },
            ],
            status: status.map(str::to_owned),
        }
    }

    #[test]
    fn to_text_aligns_columns() {
        let text = table(None).to_text();
        assert_eq!(
            text,
            "Name      | Amount ↓\n\
             ----------+---------\n\
             Rent      | 1200\n\
             Groceries | 300\n"
        );
    }

    #[test]
    fn to_text_reports_hidden_grid_and_status() {
        let hidden = RenderedTable::hidden(Some("save failed: boom"));
        assert_eq!(hidden.to_text(), "(no rows)\nsave failed: boom\n");
        assert!(table(Some("saved")).to_text().ends_with("saved\n"));
    }

    #[test]
    fn edit_cells_render_as_controls() {
        assert_eq!(RenderedCell::Input("Rent".to_owned()).plain(), "[Rent]");
        assert_eq!(RenderedCell::DeleteCheckbox(true).plain(), "[x]");
        let select = RenderedCell::Select {
            options: vec![fingrid_app::Choice::new(1, "Food")],
            selected: serde_json::json!(1),
        };
        assert_eq!(select.plain(), "<Food>");
    }
}
