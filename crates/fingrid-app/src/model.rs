// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One row of a collection resource. Key order is the server's order.
pub type Record = serde_json::Map<String, Value>;

/// Display text for a record value, as a rendered cell would show it.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => " ↑",
            Self::Desc => " ↓",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub value: Value,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    fn value_matches(&self, value: &Value) -> bool {
        self.value == *value || cell_text(&self.value) == cell_text(value)
    }
}

/// Column key to the ordered `{value, label}` pairs a select offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceMap {
    columns: BTreeMap<String, Vec<Choice>>,
}

impl ChoiceMap {
    pub fn new(columns: BTreeMap<String, Vec<Choice>>) -> Self {
        Self { columns }
    }

    pub fn with_column(mut self, key: &str, choices: Vec<Choice>) -> Self {
        self.columns.insert(key.to_owned(), choices);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    pub fn choices(&self, key: &str) -> Option<&[Choice]> {
        self.columns.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn value_for_label(&self, key: &str, label: &str) -> Option<&Value> {
        self.choices(key)?
            .iter()
            .find(|choice| choice.label == label)
            .map(|choice| &choice.value)
    }

    pub fn label_for_value(&self, key: &str, value: &Value) -> Option<&str> {
        self.choices(key)?
            .iter()
            .find(|choice| choice.value_matches(value))
            .map(|choice| choice.label.as_str())
    }
}

/// The `{year, label, month}` tuple a chart click produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub year: i32,
    pub label: String,
    pub month: String,
}

impl FilterState {
    pub const QUERY_KEYS: [&'static str; 3] = ["year", "label", "month"];

    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("year", self.year.to_string()),
            ("label", self.label.clone()),
            ("month", self.month.clone()),
        ]
    }

    pub fn period_title(&self) -> String {
        format!("{} {}", self.month, self.year)
    }

    pub fn category_title(&self) -> &str {
        &self.label
    }
}

/// Companion chart payload, in the `{labels, datasets: [{label, data}]}`
/// shape chart endpoints return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    #[serde(default)]
    pub data: Vec<Option<f64>>,
}

impl ChartData {
    pub fn series_label(&self, index: usize) -> Option<&str> {
        self.datasets.get(index).map(|series| series.label.as_str())
    }

    pub fn point_label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }
}

pub fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}
