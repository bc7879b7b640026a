// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fingrid_app::{
    ChartData, ChoiceMap, GridError, GridResult, NetworkFailure, Record, RecordId,
};
use fingrid_grid::GridBackend;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    FetchRecords,
    FetchChoices,
    Save,
    Create,
    Update,
    Delete,
    FetchChart,
}

/// In-memory stand-in for a REST collection server. Records are keyed by
/// the exact URL they are served from and identified by their `id` field.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: BTreeMap<String, Vec<Record>>,
    choices: Option<ChoiceMap>,
    charts: BTreeMap<String, ChartData>,
    failures: BTreeMap<Operation, GridError>,
    requests: Vec<String>,
    saves: Vec<(String, Vec<Record>)>,
    created: Vec<(String, Record)>,
    updated: Vec<(String, RecordId, Record)>,
    deleted: Vec<(String, RecordId)>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, url: &str, records: Vec<Record>) -> Self {
        self.set_collection(url, records);
        self
    }

    pub fn with_choices(mut self, choices: ChoiceMap) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn with_chart(mut self, url: &str, chart: ChartData) -> Self {
        self.charts.insert(url.to_owned(), chart);
        self
    }

    pub fn set_collection(&mut self, url: &str, records: Vec<Record>) {
        self.collections.insert(url.to_owned(), records);
    }

    pub fn set_chart(&mut self, url: &str, chart: ChartData) {
        self.charts.insert(url.to_owned(), chart);
    }

    pub fn collection(&self, url: &str) -> Option<&[Record]> {
        self.collections.get(url).map(Vec::as_slice)
    }

    /// The next call of `operation` fails with `status`.
    pub fn fail_next(&mut self, operation: Operation, status: u16, message: &str) {
        let failure = NetworkFailure::new(method_of(operation), "memory://", message)
            .with_status(status);
        self.failures.insert(operation, failure.into());
    }

    /// `METHOD url` for every call, in order.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests
            .iter()
            .filter(|request| request.split_once(' ').is_some_and(|(m, _)| m == method))
            .count()
    }

    pub fn saves(&self) -> &[(String, Vec<Record>)] {
        &self.saves
    }

    pub fn created(&self) -> &[(String, Record)] {
        &self.created
    }

    pub fn updated(&self) -> &[(String, RecordId, Record)] {
        &self.updated
    }

    pub fn deleted(&self) -> &[(String, RecordId)] {
        &self.deleted
    }

    fn begin(&mut self, operation: Operation, url: &str) -> GridResult<()> {
        self.requests.push(format!("{} {url}", method_of(operation)));
        match self.failures.remove(&operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl GridBackend for MemoryBackend {
    fn fetch_records(&mut self, url: &str) -> GridResult<Vec<Record>> {
        self.begin(Operation::FetchRecords, url)?;
        self.collections
            .get(url)
            .cloned()
            .ok_or_else(|| not_found("GET", url))
    }

    fn fetch_field_choices(&mut self, endpoint: &str) -> GridResult<ChoiceMap> {
        let url = format!("{endpoint}field-choices/");
        self.begin(Operation::FetchChoices, &url)?;
        self.choices.clone().ok_or_else(|| not_found("GET", &url))
    }

    fn save_rows(&mut self, endpoint: &str, rows: &[Record]) -> GridResult<()> {
        self.begin(Operation::Save, endpoint)?;
        self.saves.push((endpoint.to_owned(), rows.to_vec()));
        Ok(())
    }

    fn create_record(&mut self, endpoint: &str, record: &Record) -> GridResult<Record> {
        self.begin(Operation::Create, endpoint)?;
        let rows = self.collections.entry(endpoint.to_owned()).or_default();
        let next_id = rows
            .iter()
            .filter_map(|row| row.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1;

        let mut created = Record::new();
        created.insert("id".to_owned(), Value::from(next_id));
        for (key, value) in record {
            if key != "id" {
                created.insert(key.clone(), value.clone());
            }
        }
        rows.push(created.clone());
        self.created.push((endpoint.to_owned(), created.clone()));
        Ok(created)
    }

    fn update_record(
        &mut self,
        endpoint: &str,
        id: &RecordId,
        patch: &Record,
    ) -> GridResult<Record> {
        let url = format!("{endpoint}{id}/");
        self.begin(Operation::Update, &url)?;
        let row = self
            .collections
            .get_mut(endpoint)
            .and_then(|rows| rows.iter_mut().find(|row| has_id(row, id)))
            .ok_or_else(|| not_found("PATCH", &url))?;
        for (key, value) in patch {
            row.insert(key.clone(), value.clone());
        }
        let updated = row.clone();
        self.updated
            .push((endpoint.to_owned(), id.clone(), patch.clone()));
        Ok(updated)
    }

    fn delete_record(&mut self, endpoint: &str, id: &RecordId) -> GridResult<()> {
        let url = format!("{endpoint}{id}/");
        self.begin(Operation::Delete, &url)?;
        let mut removed = false;
        for (key, rows) in &mut self.collections {
            if key.starts_with(endpoint) {
                let before = rows.len();
                rows.retain(|row| !has_id(row, id));
                removed |= rows.len() != before;
            }
        }
        if !removed {
            return Err(not_found("DELETE", &url));
        }
        self.deleted.push((endpoint.to_owned(), id.clone()));
        Ok(())
    }

    fn fetch_chart(&mut self, url: &str) -> GridResult<ChartData> {
        self.begin(Operation::FetchChart, url)?;
        self.charts
            .get(url)
            .cloned()
            .ok_or_else(|| not_found("GET", url))
    }
}

fn has_id(row: &Record, id: &RecordId) -> bool {
    row.get("id").and_then(RecordId::from_value).as_ref() == Some(id)
}

fn not_found(method: &'static str, url: &str) -> GridError {
    NetworkFailure::new(method, url, "not found")
        .with_status(404)
        .into()
}

fn method_of(operation: Operation) -> &'static str {
    match operation {
        Operation::FetchRecords | Operation::FetchChoices | Operation::FetchChart => "GET",
        Operation::Save | Operation::Create => "POST",
        Operation::Update => "PATCH",
        Operation::Delete => "DELETE",
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryBackend, Operation};
    use crate::{ledger, record};
    use fingrid_app::{GridError, RecordId};
    use fingrid_grid::GridBackend;
    use serde_json::json;

    #[test]
    fn serves_collections_by_exact_url() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new().with_collection("tx/", ledger());
        assert_eq!(backend.fetch_records("tx/")?.len(), 3);
        assert!(backend.fetch_records("tx/?year=2024").is_err());
        assert_eq!(backend.requests(), ["GET tx/", "GET tx/?year=2024"]);
        Ok(())
    }

    #[test]
    fn injected_failures_fire_once() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new().with_collection("tx/", ledger());
        backend.fail_next(Operation::Delete, 500, "boom");

        let error = backend
            .delete_record("tx/", &RecordId::new("1"))
            .expect_err("injected failure");
        assert!(matches!(error, GridError::Network(ref failure) if failure.status == Some(500)));

        backend.delete_record("tx/", &RecordId::new("1"))?;
        assert_eq!(backend.collection("tx/").map(<[_]>::len), Some(2));
        Ok(())
    }

    #[test]
    fn create_assigns_next_id_and_update_merges() -> anyhow::Result<()> {
        let mut backend = MemoryBackend::new().with_collection("tx/", ledger());
        let created = backend.create_record("tx/", &record(json!({"payee": "Cafe"})))?;
        assert_eq!(created["id"], json!(4));

        let updated = backend.update_record(
            "tx/",
            &RecordId::new("4"),
            &record(json!({"amount": 12})),
        )?;
        assert_eq!(updated["payee"], json!("Cafe"));
        assert_eq!(updated["amount"], json!(12));
        assert_eq!(backend.count("POST"), 1);
        assert_eq!(backend.count("PATCH"), 1);
        Ok(())
    }
}
