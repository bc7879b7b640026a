// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

macro_rules! index_id {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name($inner);

        impl $name {
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            pub const fn get(self) -> $inner {
                self.0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

index_id!(RequestGeneration, u64);
index_id!(SeriesIndex, usize);
index_id!(PointIndex, usize);

impl RequestGeneration {
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Identity of one record, as it appears in `{endpoint}{id}/` paths.
///
/// Identities arrive as JSON numbers or strings; both are kept in their
/// path form so lookups do not depend on the JSON type the server chose.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.is_empty() => Some(Self(text.clone())),
            Value::Number(number) => Some(Self(number.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordId, RequestGeneration};
    use serde_json::json;

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        assert_eq!(RecordId::from_value(&json!(7)), Some(RecordId::new("7")));
        assert_eq!(
            RecordId::from_value(&json!("tx-9")),
            Some(RecordId::new("tx-9"))
        );
        assert_eq!(RecordId::from_value(&json!("")), None);
        assert_eq!(RecordId::from_value(&json!(null)), None);
    }

    #[test]
    fn generations_are_monotonic() {
        let first = RequestGeneration::new(0);
        assert!(first.next() > first);
        assert_eq!(first.next().get(), 1);
    }
}
