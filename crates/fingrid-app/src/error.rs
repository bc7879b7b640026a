// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

pub type GridResult<T> = std::result::Result<T, GridError>;

/// A rejected request: transport failure or a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {url} failed{}: {message}", status_suffix(.status))]
pub struct NetworkFailure {
    pub method: &'static str,
    pub url: String,
    pub status: Option<u16>,
    pub message: String,
}

impl NetworkFailure {
    pub fn new(method: &'static str, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" ({code})")).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error(transparent)]
    Network(#[from] NetworkFailure),

    #[error("row {row} does not match the inferred columns (expected {expected:?}, found {found:?})")]
    ShapeMismatch {
        row: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("records have no identity column {0:?}")]
    MissingIdentity(String),

    #[error("editing is disabled while the grid has no data")]
    EditDisabled,

    #[error("a save is still in flight; wait for it before editing again")]
    SaveInFlight,

    #[error("grid is not in edit mode")]
    NotEditing,

    #[error("finish or cancel the open edit session first")]
    EditInProgress,

    #[error("no row with identity {0}")]
    UnknownRow(String),

    #[error("no column at index {0}")]
    UnknownColumn(usize),

    #[error("column {0} is read-only")]
    ReadOnlyColumn(usize),

    #[error("chart point (series {series}, point {point}) is out of range")]
    PointOutOfRange { series: usize, point: usize },

    #[error("no CSRF token: set a csrftoken cookie or a form token")]
    MissingCsrfToken,
}

impl GridError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{GridError, NetworkFailure};

    #[test]
    fn network_failure_message_includes_status_when_known() {
        let failure =
            NetworkFailure::new("POST", "http://x/save/", "server returned 500").with_status(500);
        assert_eq!(
            failure.to_string(),
            "POST http://x/save/ failed (500): server returned 500"
        );

        let transport = NetworkFailure::new("GET", "http://x/", "connection refused");
        assert_eq!(transport.to_string(), "GET http://x/ failed: connection refused");
    }

    #[test]
    fn network_errors_are_transparent() {
        let error = GridError::from(NetworkFailure::new("GET", "http://x/", "boom"));
        assert!(error.is_network());
        assert_eq!(error.to_string(), "GET http://x/ failed: boom");
    }
}
