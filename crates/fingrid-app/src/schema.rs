// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::{ChoiceMap, GridError, GridResult, Record, RecordId, SortDirection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub key: String,
    pub title: String,
    /// Field name used when the column is posted back on save.
    pub field: String,
    pub hidden: bool,
    /// Last direction this column was sorted in, if ever.
    pub sort: Option<SortDirection>,
    pub choice_source: Option<String>,
}

impl ColumnDescriptor {
    fn inferred(key: &str, hidden: bool, choices: &ChoiceMap) -> Self {
        Self {
            key: key.to_owned(),
            title: humanize_key(key),
            field: key.to_owned(),
            hidden,
            sort: None,
            choice_source: choices.contains(key).then(|| key.to_owned()),
        }
    }
}

/// Column layout derived from a sampled record.
///
/// The layout is fixed for one fetched dataset: every record of the dataset
/// must carry exactly the sampled key set, otherwise the dataset is rejected
/// with [`GridError::ShapeMismatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<ColumnDescriptor>,
    identity: usize,
}

impl Schema {
    pub fn infer(
        sample: &Record,
        identity_key: Option<&str>,
        choices: &ChoiceMap,
    ) -> GridResult<Self> {
        let identity = match identity_key {
            Some(key) => sample
                .keys()
                .position(|candidate| candidate == key)
                .ok_or_else(|| GridError::MissingIdentity(key.to_owned()))?,
            None if sample.is_empty() => return Err(GridError::MissingIdentity(String::new())),
            None => 0,
        };

        let columns = sample
            .keys()
            .enumerate()
            .map(|(index, key)| ColumnDescriptor::inferred(key, index == identity, choices))
            .collect();
        Ok(Self { columns, identity })
    }

    pub fn validate(&self, records: &[Record]) -> GridResult<()> {
        let expected: BTreeSet<&str> = self.columns.iter().map(|c| c.key.as_str()).collect();
        for (row, record) in records.iter().enumerate() {
            let found: BTreeSet<&str> = record.keys().map(String::as_str).collect();
            if found != expected {
                return Err(GridError::ShapeMismatch {
                    row,
                    expected: self.keys().map(str::to_owned).collect(),
                    found: record.keys().cloned().collect(),
                });
            }
        }
        Ok(())
    }

    /// Carries remembered sort directions over from a previous layout with
    /// the same keys.
    pub fn inherit_sort_state(&mut self, previous: &Schema) {
        for column in &mut self.columns {
            if let Some(old) = previous.columns.iter().find(|old| old.key == column.key) {
                column.sort = old.sort;
            }
        }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }

    pub fn column_mut(&mut self, index: usize) -> Option<&mut ColumnDescriptor> {
        self.columns.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.key.as_str())
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.key == key)
    }

    pub fn identity_index(&self) -> usize {
        self.identity
    }

    pub fn identity_key(&self) -> &str {
        &self.columns[self.identity].key
    }

    pub fn identity_of(&self, record: &Record) -> Option<RecordId> {
        record.get(self.identity_key()).and_then(RecordId::from_value)
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = (usize, &ColumnDescriptor)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !column.hidden)
    }
}

/// `due_date` -> `Due Date`, `amountCents` -> `Amount Cents`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if ch.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
