// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod chart;
mod drilldown;
mod grid;
mod page;
mod render;

pub use chart::{ChartFactory, ChartHandle, ChartSlot, LegendIsolationController};
pub use drilldown::{ChartClick, ChartDrilldownLink, drilldown_url};
pub use grid::{
    DeleteOutcome, GridConfig, GridDisplay, LoadOutcome, SaveOutcome, SchemaInferredGrid,
};
pub use page::{Page, PageLabels};
pub use render::{HeaderCell, RenderedCell, RenderedRow, RenderedTable};

use fingrid_app::{ChartData, ChoiceMap, GridResult, Record, RecordId};

/// Everything the grid needs from the outside world. The HTTP runtime and
/// the in-memory test backend both implement it.
pub trait GridBackend {
    fn fetch_records(&mut self, url: &str) -> GridResult<Vec<Record>>;

    fn fetch_field_choices(&mut self, endpoint: &str) -> GridResult<ChoiceMap>;

    fn save_rows(&mut self, endpoint: &str, rows: &[Record]) -> GridResult<()>;

    fn create_record(&mut self, endpoint: &str, record: &Record) -> GridResult<Record>;

    fn update_record(&mut self, endpoint: &str, id: &RecordId, patch: &Record)
    -> GridResult<Record>;

    fn delete_record(&mut self, endpoint: &str, id: &RecordId) -> GridResult<()>;

    fn fetch_chart(&mut self, url: &str) -> GridResult<ChartData>;
}

/// Asked before any destructive request is issued.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}
