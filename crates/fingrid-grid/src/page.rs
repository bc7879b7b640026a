// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fingrid_app::{
    EditEvent, EditMode, GridError, GridResult, LegendState, Record, RecordId, SeriesIndex,
};

use crate::{
    ChartClick, ChartDrilldownLink, ChartFactory, ChartHandle, ChartSlot, Confirm,
    DeleteOutcome, GridBackend, LegendIsolationController, LoadOutcome, RenderedTable,
    SaveOutcome, SchemaInferredGrid,
};

/// Page-level text shown around the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLabels {
    /// Sent with every save as the rows' `filter` field.
    pub filter_label: Option<String>,
    pub period_title: Option<String>,
    pub category_title: Option<String>,
    pub selected_month: Option<String>,
}

/// One screen: a grid, an optional companion chart, and the state that
/// links them. Components only reach each other through the page.
pub struct Page<F: ChartFactory> {
    grid: SchemaInferredGrid,
    chart: Option<ChartSlot<F>>,
    drilldown: ChartDrilldownLink,
    legend: LegendIsolationController,
    labels: PageLabels,
}

impl<F: ChartFactory> Page<F> {
    pub fn new(grid: SchemaInferredGrid, chart: Option<ChartSlot<F>>, year: i32) -> Self {
        Self {
            grid,
            chart,
            drilldown: ChartDrilldownLink::new(year),
            legend: LegendIsolationController::default(),
            labels: PageLabels::default(),
        }
    }

    pub fn with_filter_label(mut self, label: &str) -> Self {
        self.labels.filter_label = Some(label.to_owned());
        self
    }

    pub fn grid(&self) -> &SchemaInferredGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut SchemaInferredGrid {
        &mut self.grid
    }

    pub fn chart(&self) -> Option<&ChartSlot<F>> {
        self.chart.as_ref()
    }

    pub fn drilldown(&self) -> &ChartDrilldownLink {
        &self.drilldown
    }

    pub fn legend(&self) -> &LegendIsolationController {
        &self.legend
    }

    pub fn labels(&self) -> &PageLabels {
        &self.labels
    }

    /// Loads the grid, then plots the chart. A chart failure is logged and
    /// does not fail the page.
    pub fn open(&mut self, backend: &mut dyn GridBackend) -> GridResult<LoadOutcome> {
        let outcome = self.grid.reload(backend)?;
        self.replot_chart(backend);
        Ok(outcome)
    }

    pub fn select_month(&mut self, month: Option<&str>) {
        self.labels.selected_month = month.filter(|m| !m.is_empty()).map(str::to_owned);
    }

    pub fn on_chart_click(
        &mut self,
        backend: &mut dyn GridBackend,
        click: ChartClick,
    ) -> GridResult<LoadOutcome> {
        let data = self
            .chart
            .as_ref()
            .and_then(ChartSlot::handle)
            .map(|handle| handle.data().clone())
            .ok_or(GridError::PointOutOfRange {
                series: click.series.get(),
                point: click.point.get(),
            })?;

        let outcome = self.drilldown.on_point_click(
            &mut self.grid,
            backend,
            &data,
            click,
            self.labels.selected_month.as_deref(),
        )?;

        if let Some(filter) = self.drilldown.filter() {
            self.labels.period_title = Some(filter.period_title());
            self.labels.category_title = Some(filter.category_title().to_owned());
            self.labels.filter_label = Some(filter.label.clone());
        }
        Ok(outcome)
    }

    pub fn on_legend_click(&mut self, series: SeriesIndex) -> Option<LegendState> {
        let handle = self.chart.as_mut()?.handle_mut()?;
        self.legend.on_legend_click(handle, series)
    }

    /// The edit toggle: VIEW enters EDIT, EDIT cancels back to VIEW.
    pub fn toggle_edit(&mut self) -> GridResult<Vec<EditEvent>> {
        match self.grid.edit_mode() {
            EditMode::View => self.grid.enter_edit(),
            EditMode::Edit => Ok(self.grid.cancel_edit()),
            EditMode::Saving => Err(GridError::SaveInFlight),
        }
    }

    /// Saves the grid and replots the chart once the POST went through,
    /// even when the grid reload afterwards failed.
    pub fn save(&mut self, backend: &mut dyn GridBackend) -> GridResult<SaveOutcome> {
        let outcome = self
            .grid
            .save(backend, self.labels.filter_label.as_deref())?;
        self.replot_chart(backend);
        Ok(outcome)
    }

    pub fn create_record(
        &mut self,
        backend: &mut dyn GridBackend,
        record: &Record,
    ) -> GridResult<LoadOutcome> {
        self.grid.create_record(backend, record)
    }

    pub fn update_record(
        &mut self,
        backend: &mut dyn GridBackend,
        id: &RecordId,
        patch: &Record,
    ) -> GridResult<LoadOutcome> {
        self.grid.update_record(backend, id, patch)
    }

    pub fn delete_row(
        &mut self,
        backend: &mut dyn GridBackend,
        id: &RecordId,
        confirm: &mut dyn Confirm,
    ) -> GridResult<DeleteOutcome> {
        self.grid.delete_row(backend, id, confirm)
    }

    pub fn render(&self) -> RenderedTable {
        self.grid.render()
    }

    fn replot_chart(&mut self, backend: &mut dyn GridBackend) {
        if let Some(chart) = self.chart.as_mut() {
            // ChartSlot::replot already logs the failure.
            let _ = chart.replot(backend);
        }
    }
}
