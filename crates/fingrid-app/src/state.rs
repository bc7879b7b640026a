// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;

use crate::{Choice, ChoiceMap, GridError, GridResult, Record, RecordId, Schema, cell_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    View,
    Edit,
    Saving,
}

/// What a cell turns into while editing.
#[derive(Debug, Clone, PartialEq)]
pub enum CellEditor {
    /// The identity column: revealed, never editable.
    ReadOnly(Value),
    Input(String),
    Select { options: Vec<Choice>, selected: Value },
}

impl CellEditor {
    fn seeded(value: &Value, options: Option<&[Choice]>) -> Self {
        let text = cell_text(value);
        match options {
            Some(options) => Self::Select {
                selected: seed_selection(options, &text),
                options: options.to_vec(),
            },
            None => Self::Input(text),
        }
    }

    pub fn value(&self) -> Value {
        match self {
            Self::ReadOnly(value) => value.clone(),
            Self::Input(text) => Value::String(text.clone()),
            Self::Select { selected, .. } => selected.clone(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::ReadOnly(value) => cell_text(value),
            Self::Input(text) => text.clone(),
            Self::Select { options, selected } => options
                .iter()
                .find(|choice| choice.value == *selected)
                .map(|choice| choice.label.clone())
                .unwrap_or_else(|| cell_text(selected)),
        }
    }
}

/// Label match first, then a value that renders like the text, then the raw
/// text itself.
fn seed_selection(options: &[Choice], text: &str) -> Value {
    options
        .iter()
        .find(|choice| choice.label == text)
        .or_else(|| options.iter().find(|choice| cell_text(&choice.value) == text))
        .map(|choice| choice.value.clone())
        .unwrap_or_else(|| Value::String(text.to_owned()))
}

/// Pending values for one row; indexed like the schema's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEditBuffer {
    pub identity: RecordId,
    pub cells: Vec<CellEditor>,
    pub delete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    SetText {
        row: usize,
        column: usize,
        text: String,
    },
    Select {
        row: usize,
        column: usize,
        value: Value,
    },
    MarkDelete {
        row: usize,
        delete: bool,
    },
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEvent {
    ModeChanged(EditMode),
    CellChanged { row: usize, column: usize },
    DeleteMarked { row: usize, delete: bool },
    BuffersDiscarded,
    StatusUpdated(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditSession {
    mode: EditMode,
    buffers: Vec<RowEditBuffer>,
    status_line: Option<String>,
}

impl EditSession {
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn buffers(&self) -> &[RowEditBuffer] {
        &self.buffers
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    /// VIEW -> EDIT: one buffer per record, seeded from the displayed text.
    pub fn enter(
        &mut self,
        schema: &Schema,
        records: &[Record],
        choices: &ChoiceMap,
    ) -> GridResult<Vec<EditEvent>> {
        match self.mode {
            EditMode::Saving => return Err(GridError::SaveInFlight),
            EditMode::Edit => return Ok(Vec::new()),
            EditMode::View => {}
        }

        let mut buffers = Vec::with_capacity(records.len());
        for record in records {
            let identity = schema
                .identity_of(record)
                .ok_or_else(|| GridError::MissingIdentity(schema.identity_key().to_owned()))?;
            let cells = schema
                .columns()
                .iter()
                .enumerate()
                .map(|(index, column)| {
                    let value = record.get(&column.key).unwrap_or(&Value::Null);
                    if index == schema.identity_index() {
                        return CellEditor::ReadOnly(value.clone());
                    }
                    let options = column
                        .choice_source
                        .as_deref()
                        .and_then(|source| choices.choices(source));
                    CellEditor::seeded(value, options)
                })
                .collect();
            buffers.push(RowEditBuffer {
                identity,
                cells,
                delete: false,
            });
        }

        self.buffers = buffers;
        self.mode = EditMode::Edit;
        self.status_line = None;
        Ok(vec![EditEvent::ModeChanged(self.mode)])
    }

    pub fn dispatch(&mut self, command: EditCommand) -> GridResult<Vec<EditEvent>> {
        match command {
            EditCommand::Cancel => Ok(self.cancel()),
            EditCommand::SetText { row, column, text } => {
                match self.editor_mut(row, column)? {
                    CellEditor::Input(current) => *current = text,
                    CellEditor::Select { selected, .. } => *selected = Value::String(text),
                    CellEditor::ReadOnly(_) => return Err(GridError::ReadOnlyColumn(column)),
                }
                Ok(vec![EditEvent::CellChanged { row, column }])
            }
            EditCommand::Select { row, column, value } => {
                match self.editor_mut(row, column)? {
                    CellEditor::Select { selected, .. } => *selected = value,
                    CellEditor::Input(current) => *current = cell_text(&value),
                    CellEditor::ReadOnly(_) => return Err(GridError::ReadOnlyColumn(column)),
                }
                Ok(vec![EditEvent::CellChanged { row, column }])
            }
            EditCommand::MarkDelete { row, delete } => {
                self.require_edit()?;
                let buffer = self
                    .buffers
                    .get_mut(row)
                    .ok_or_else(|| GridError::UnknownRow(row.to_string()))?;
                buffer.delete = delete;
                Ok(vec![EditEvent::DeleteMarked { row, delete }])
            }
        }
    }

    /// EDIT -> SAVING: harvests every row, keyed by each column's field.
    pub fn begin_save(
        &mut self,
        schema: &Schema,
        filter: Option<&str>,
    ) -> GridResult<Vec<Record>> {
        self.require_edit()?;

        let rows = self
            .buffers
            .iter()
            .map(|buffer| {
                let mut row = Record::new();
                for (column, editor) in schema.columns().iter().zip(&buffer.cells) {
                    row.insert(column.field.clone(), editor.value());
                }
                row.insert("delete".to_owned(), Value::Bool(buffer.delete));
                if let Some(filter) = filter {
                    row.insert("filter".to_owned(), Value::String(filter.to_owned()));
                }
                row
            })
            .collect();

        self.mode = EditMode::Saving;
        Ok(rows)
    }

    /// Success ends the session; failure returns to EDIT with the buffers
    /// intact so the user can retry or cancel.
    pub fn finish_save(&mut self, outcome: Result<(), String>) -> Vec<EditEvent> {
        match outcome {
            Ok(()) => {
                self.buffers.clear();
                self.mode = EditMode::View;
                vec![EditEvent::ModeChanged(self.mode), self.set_status("saved")]
            }
            Err(message) => {
                self.mode = if self.buffers.is_empty() {
                    EditMode::View
                } else {
                    EditMode::Edit
                };
                vec![
                    EditEvent::ModeChanged(self.mode),
                    self.set_status(&format!("save failed: {message}")),
                ]
            }
        }
    }

    /// The save went through but the rows could not be refetched.
    pub fn reload_failed(&mut self, message: &str) -> EditEvent {
        self.set_status(&format!("saved; reload failed: {message}"))
    }

    /// Rollback: drop pending edits without saving.
    pub fn cancel(&mut self) -> Vec<EditEvent> {
        if self.mode != EditMode::Edit {
            return Vec::new();
        }
        self.buffers.clear();
        self.mode = EditMode::View;
        vec![EditEvent::BuffersDiscarded, EditEvent::ModeChanged(self.mode)]
    }

    /// A reload replaced the rows under any open buffers.
    pub fn invalidate(&mut self) -> Vec<EditEvent> {
        if self.buffers.is_empty() {
            return Vec::new();
        }
        self.buffers.clear();
        let mut events = vec![EditEvent::BuffersDiscarded];
        if self.mode == EditMode::Edit {
            self.mode = EditMode::View;
            events.push(EditEvent::ModeChanged(self.mode));
        }
        events
    }

    fn require_edit(&self) -> GridResult<()> {
        match self.mode {
            EditMode::Edit => Ok(()),
            EditMode::Saving => Err(GridError::SaveInFlight),
            EditMode::View => Err(GridError::NotEditing),
        }
    }

    fn editor_mut(&mut self, row: usize, column: usize) -> GridResult<&mut CellEditor> {
        self.require_edit()?;
        self.buffers
            .get_mut(row)
            .ok_or_else(|| GridError::UnknownRow(row.to_string()))?
            .cells
            .get_mut(column)
            .ok_or(GridError::UnknownColumn(column))
    }

    fn set_status(&mut self, message: &str) -> EditEvent {
        self.status_line = Some(message.to_owned());
        EditEvent::StatusUpdated(message.to_owned())
    }
}
