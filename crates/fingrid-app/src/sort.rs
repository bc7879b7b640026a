// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::{Record, Schema, SortDirection, cell_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    Sorted {
        column: usize,
        direction: SortDirection,
    },
    Unavailable,
}

/// Header-click sorting over the records a grid currently holds.
///
/// Each column remembers its last direction (ascending until first used) and
/// a click flips it. Only the most recently sorted column shows an arrow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortEngine {
    active: Option<usize>,
}

impl SortEngine {
    pub fn click_header(
        &mut self,
        schema: &mut Schema,
        records: &mut [Record],
        column: usize,
    ) -> SortOutcome {
        let Some(descriptor) = schema.column_mut(column) else {
            return SortOutcome::Unavailable;
        };
        if descriptor.hidden {
            return SortOutcome::Unavailable;
        }

        let direction = descriptor.sort.unwrap_or(SortDirection::Asc).flipped();
        descriptor.sort = Some(direction);
        sort_records(records, &descriptor.key, direction);
        self.active = Some(column);
        SortOutcome::Sorted { column, direction }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Drops the arrow; records are back in server order after a reload.
    pub fn clear_indicator(&mut self) {
        self.active = None;
    }

    pub fn header_label(&self, schema: &Schema, column: usize) -> Option<String> {
        let descriptor = schema.column(column)?;
        let arrow = match (self.active, descriptor.sort) {
            (Some(active), Some(direction)) if active == column => direction.arrow(),
            _ => "",
        };
        Some(format!("{}{arrow}", descriptor.title))
    }
}

/// Stable sort by one key; repeating the same call leaves the order alone.
pub fn sort_records(records: &mut [Record], key: &str, direction: SortDirection) {
    records.sort_by(|left, right| {
        let left = left.get(key).map(cell_text).unwrap_or_default();
        let right = right.get(key).map(cell_text).unwrap_or_default();
        let order = compare_cells(&left, &right);
        match direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    });
}

/// Numeric when both sides parse as numbers, otherwise case-sensitive text.
/// Numbers rank before text so mixed columns still have a total order.
pub fn compare_cells(left: &str, right: &str) -> Ordering {
    match (parse_number(left), parse_number(right)) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => left.cmp(right),
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::{SortEngine, SortOutcome, compare_cells, sort_records};
    use crate::{ChoiceMap, Record, Schema, SortDirection, cell_text};
    use serde_json::json;
    use std::cmp::Ordering;

    fn ledger() -> Vec<Record> {
        [
            json!({"id": 1, "name": "Rent", "amount": "1200"}),
            json!({"id": 2, "name": "Food", "amount": "300"}),
        ]
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect()
    }

    fn amounts(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .map(|record| cell_text(&record["amount"]))
            .collect()
    }

    #[test]
    fn first_click_sorts_descending_then_ascending() -> anyhow::Result<()> {
        let mut records = ledger();
        let mut schema = Schema::infer(&records[0], None, &ChoiceMap::default())?;
        let mut engine = SortEngine::default();

        let first = engine.click_header(&mut schema, &mut records, 2);
        assert_eq!(
            first,
            SortOutcome::Sorted {
                column: 2,
                direction: SortDirection::Desc
            }
        );
        assert_eq!(amounts(&records), vec!["1200", "300"]);

        let second = engine.click_header(&mut schema, &mut records, 2);
        assert_eq!(
            second,
            SortOutcome::Sorted {
                column: 2,
                direction: SortDirection::Asc
            }
        );
        assert_eq!(amounts(&records), vec!["300", "1200"]);
        Ok(())
    }

    #[test]
    fn numeric_values_do_not_sort_lexicographically() {
        assert_eq!(compare_cells("300", "1200"), Ordering::Less);
        assert_eq!(compare_cells("-5", "2.5"), Ordering::Less);
        assert_eq!(compare_cells("Food", "Rent"), Ordering::Less);
        assert_eq!(compare_cells("food", "Rent"), Ordering::Greater);
        assert_eq!(compare_cells("10", "n/a"), Ordering::Less);
        assert_eq!(compare_cells("1a", "9"), Ordering::Greater);
    }

    #[test]
    fn mixed_numeric_and_text_columns_sort_without_cycles() {
        let mut seed: u64 = 0x5eed;
        let mut next = move || {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            seed >> 33
        };

        for _ in 0..300 {
            let mut records: Vec<Record> = (0..40)
                .filter_map(|id| {
                    let n = next() % 200;
                    let cell = if next() % 3 == 0 {
                        format!("{n}a")
                    } else {
                        format!("{n}")
                    };
                    json!({"id": id, "code": cell}).as_object().cloned()
                })
                .collect();

            sort_records(&mut records, "code", SortDirection::Asc);
            let cells: Vec<String> = records.iter().map(|r| cell_text(&r["code"])).collect();
            let first_text = cells
                .iter()
                .position(|cell| cell.ends_with('a'))
                .unwrap_or(cells.len());
            assert!(cells[first_text..].iter().all(|cell| cell.ends_with('a')));
            assert!(
                cells
                    .windows(2)
                    .all(|pair| compare_cells(&pair[0], &pair[1]) != Ordering::Greater)
            );
        }
    }

    #[test]
    fn repeated_sort_in_same_direction_is_idempotent() {
        let mut records: Vec<Record> = [
            json!({"id": 1, "category": "Food", "amount": 5}),
            json!({"id": 2, "category": "Housing", "amount": 9}),
            json!({"id": 3, "category": "Food", "amount": 7}),
            json!({"id": 4, "category": "Auto", "amount": 1}),
        ]
        .into_iter()
        .filter_map(|value| value.as_object().cloned())
        .collect();

        sort_records(&mut records, "category", SortDirection::Desc);
        let once = records.clone();
        sort_records(&mut records, "category", SortDirection::Desc);
        assert_eq!(records, once);

        let ids: Vec<_> = records.iter().map(|r| cell_text(&r["id"])).collect();
        assert_eq!(ids, vec!["2", "1", "3", "4"]);
    }

    #[test]
    fn only_the_latest_sorted_column_carries_an_arrow() -> anyhow::Result<()> {
        let mut records = ledger();
        let mut schema = Schema::infer(&records[0], None, &ChoiceMap::default())?;
        let mut engine = SortEngine::default();

        engine.click_header(&mut schema, &mut records, 1);
        engine.click_header(&mut schema, &mut records, 2);

        assert_eq!(engine.header_label(&schema, 1).as_deref(), Some("Name"));
        assert_eq!(engine.header_label(&schema, 2).as_deref(), Some("Amount ↓"));

        engine.clear_indicator();
        assert_eq!(engine.header_label(&schema, 2).as_deref(), Some("Amount"));
        Ok(())
    }

    #[test]
    fn hidden_and_missing_columns_are_unavailable() -> anyhow::Result<()> {
        let mut records = ledger();
        let mut schema = Schema::infer(&records[0], None, &ChoiceMap::default())?;
        let mut engine = SortEngine::default();

        assert_eq!(
            engine.click_header(&mut schema, &mut records, 0),
            SortOutcome::Unavailable
        );
        assert_eq!(
            engine.click_header(&mut schema, &mut records, 9),
            SortOutcome::Unavailable
        );
        assert_eq!(engine.active(), None);
        Ok(())
    }
}
