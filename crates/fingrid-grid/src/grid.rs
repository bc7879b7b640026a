// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use fingrid_app::{
    ChoiceMap, EditCommand, EditEvent, EditMode, EditSession, GridError, GridResult, Record,
    RecordId, RequestGeneration, Schema, SortEngine, SortOutcome,
};

use crate::render::RenderedTable;
use crate::{Confirm, GridBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    /// Collection base URL; also the prefix of `field-choices/`.
    pub endpoint: String,
    pub save_endpoint: String,
    /// Identity column; the first key of the first record when unset.
    pub identity_key: Option<String>,
}

impl GridConfig {
    pub fn new(endpoint: &str, save_endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            save_endpoint: save_endpoint.to_owned(),
            identity_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridDisplay {
    Unloaded,
    /// The collection came back empty: grid hidden, editing disabled.
    Empty,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Rendered { rows: usize },
    Empty,
    /// A newer request was issued before this response arrived.
    Stale { generation: RequestGeneration },
}

/// A save whose POST succeeded. The follow-up reload may still fail, in
/// which case the rows on screen predate the save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Reloaded(LoadOutcome),
    ReloadFailed(GridError),
}

impl SaveOutcome {
    pub fn reload_error(&self) -> Option<&GridError> {
        match self {
            Self::Reloaded(_) => None,
            Self::ReloadFailed(error) => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(RecordId),
    Declined,
}

/// A table bound to one REST collection whose columns are inferred from
/// the data it fetches.
#[derive(Debug, Clone)]
pub struct SchemaInferredGrid {
    config: GridConfig,
    url: String,
    choices: Arc<ChoiceMap>,
    display: GridDisplay,
    schema: Option<Schema>,
    records: Vec<Record>,
    sort: SortEngine,
    edit: EditSession,
    issued: RequestGeneration,
}

impl SchemaInferredGrid {
    /// Builds the grid and resolves field choices once. A failed choice
    /// fetch leaves every column as free text.
    pub fn new(backend: &mut dyn GridBackend, config: GridConfig) -> Self {
        let choices = match backend.fetch_field_choices(&config.endpoint) {
            Ok(choices) => choices,
            Err(error) => {
                tracing::warn!(
                    endpoint = %config.endpoint,
                    %error,
                    "field choices unavailable; columns stay free text"
                );
                ChoiceMap::default()
            }
        };
        Self::with_choices(config, Arc::new(choices))
    }

    pub fn with_choices(config: GridConfig, choices: Arc<ChoiceMap>) -> Self {
        Self {
            url: config.endpoint.clone(),
            config,
            choices,
            display: GridDisplay::Unloaded,
            schema: None,
            records: Vec::new(),
            sort: SortEngine::default(),
            edit: EditSession::default(),
            issued: RequestGeneration::new(0),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn choices(&self) -> &Arc<ChoiceMap> {
        &self.choices
    }

    pub fn display(&self) -> GridDisplay {
        self.display
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit.mode()
    }

    pub fn sort_engine(&self) -> &SortEngine {
        &self.sort
    }

    pub fn load(&mut self, backend: &mut dyn GridBackend, url: &str) -> GridResult<LoadOutcome> {
        self.url = url.to_owned();
        self.reload(backend)
    }

    /// Fetches the current URL and rebuilds everything from the response.
    pub fn reload(&mut self, backend: &mut dyn GridBackend) -> GridResult<LoadOutcome> {
        let generation = self.begin_request();
        let response = backend.fetch_records(&self.url);
        self.apply_response(generation, response)
    }

    /// Issues a generation for a fetch the caller performs itself.
    pub fn begin_request(&mut self) -> RequestGeneration {
        self.issued = self.issued.next();
        self.issued
    }

    /// Applies a fetched response unless a newer request has been issued
    /// since. Failures leave the previous render in place.
    pub fn apply_response(
        &mut self,
        generation: RequestGeneration,
        response: GridResult<Vec<Record>>,
    ) -> GridResult<LoadOutcome> {
        if generation < self.issued {
            tracing::debug!(
                stale = generation.get(),
                latest = self.issued.get(),
                "discarding stale grid response"
            );
            return Ok(LoadOutcome::Stale { generation });
        }

        let records = response.inspect_err(|error| {
            tracing::warn!(url = %self.url, %error, "grid fetch failed");
        })?;

        if records.is_empty() {
            self.edit.invalidate();
            self.sort.clear_indicator();
            self.schema = None;
            self.records.clear();
            self.display = GridDisplay::Empty;
            tracing::info!(url = %self.url, "collection is empty");
            return Ok(LoadOutcome::Empty);
        }

        let mut schema = Schema::infer(
            &records[0],
            self.config.identity_key.as_deref(),
            &self.choices,
        )?;
        if let Err(error) = schema.validate(&records) {
            tracing::warn!(url = %self.url, %error, "collection shape changed between records");
            return Err(error);
        }
        if let Some(previous) = &self.schema {
            schema.inherit_sort_state(previous);
        }

        self.edit.invalidate();
        self.sort.clear_indicator();
        self.schema = Some(schema);
        self.records = records;
        self.display = GridDisplay::Table;
        tracing::debug!(url = %self.url, rows = self.records.len(), "grid rendered");
        Ok(LoadOutcome::Rendered {
            rows: self.records.len(),
        })
    }

    pub fn click_header(&mut self, column: usize) -> SortOutcome {
        if self.edit.mode() != EditMode::View {
            return SortOutcome::Unavailable;
        }
        match self.schema.as_mut() {
            Some(schema) => self.sort.click_header(schema, &mut self.records, column),
            None => SortOutcome::Unavailable,
        }
    }

    pub fn enter_edit(&mut self) -> GridResult<Vec<EditEvent>> {
        let Some(schema) = self.schema.as_ref().filter(|_| self.display == GridDisplay::Table)
        else {
            return Err(GridError::EditDisabled);
        };
        self.edit.enter(schema, &self.records, &self.choices)
    }

    pub fn edit(&mut self, command: EditCommand) -> GridResult<Vec<EditEvent>> {
        self.edit.dispatch(command)
    }

    pub fn cancel_edit(&mut self) -> Vec<EditEvent> {
        self.edit.cancel()
    }

    /// Posts every row to the save endpoint, then reloads. A failed POST
    /// keeps the session in EDIT with its buffers and returns the error; a
    /// failed reload after a successful POST is reported in the outcome.
    pub fn save(
        &mut self,
        backend: &mut dyn GridBackend,
        filter: Option<&str>,
    ) -> GridResult<SaveOutcome> {
        let schema = self.schema.as_ref().ok_or(GridError::NotEditing)?;
        let rows = self.edit.begin_save(schema, filter)?;

        if let Err(error) = backend.save_rows(&self.config.save_endpoint, &rows) {
            tracing::warn!(endpoint = %self.config.save_endpoint, %error, "save failed");
            self.edit.finish_save(Err(error.to_string()));
            return Err(error);
        }

        self.edit.finish_save(Ok(()));
        match self.reload(backend) {
            Ok(outcome) => Ok(SaveOutcome::Reloaded(outcome)),
            Err(error) => {
                self.edit.reload_failed(&error.to_string());
                Ok(SaveOutcome::ReloadFailed(error))
            }
        }
    }

    pub fn create_record(
        &mut self,
        backend: &mut dyn GridBackend,
        record: &Record,
    ) -> GridResult<LoadOutcome> {
        backend.create_record(&self.config.endpoint, record)?;
        self.reload(backend)
    }

    pub fn update_record(
        &mut self,
        backend: &mut dyn GridBackend,
        id: &RecordId,
        patch: &Record,
    ) -> GridResult<LoadOutcome> {
        backend.update_record(&self.config.endpoint, id, patch)?;
        self.reload(backend)
    }

    /// Deletes one row after confirmation. Success removes the row locally
    /// without a reload; failure leaves it displayed.
    pub fn delete_row(
        &mut self,
        backend: &mut dyn GridBackend,
        id: &RecordId,
        confirm: &mut dyn Confirm,
    ) -> GridResult<DeleteOutcome> {
        match self.edit.mode() {
            EditMode::View => {}
            EditMode::Edit => return Err(GridError::EditInProgress),
            EditMode::Saving => return Err(GridError::SaveInFlight),
        }
        if self.row_index(id).is_none() {
            return Err(GridError::UnknownRow(id.to_string()));
        }
        if !confirm.confirm(&format!("Delete row {id}?")) {
            return Ok(DeleteOutcome::Declined);
        }

        if let Err(error) = backend.delete_record(&self.config.endpoint, id) {
            tracing::warn!(%id, %error, "delete failed; row kept");
            return Err(error);
        }

        if let Some(index) = self.row_index(id) {
            self.records.remove(index);
        }
        if self.records.is_empty() {
            self.schema = None;
            self.display = GridDisplay::Empty;
        }
        Ok(DeleteOutcome::Deleted(id.clone()))
    }

    pub fn row_index(&self, id: &RecordId) -> Option<usize> {
        let schema = self.schema.as_ref()?;
        self.records
            .iter()
            .position(|record| schema.identity_of(record).as_ref() == Some(id))
    }

    pub fn render(&self) -> RenderedTable {
        match (&self.schema, self.display) {
            (Some(schema), GridDisplay::Table) => {
                RenderedTable::build(schema, &self.records, &self.choices, &self.sort, &self.edit)
            }
            _ => RenderedTable::hidden(self.edit.status_line()),
        }
    }
}
