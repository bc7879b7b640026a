// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fingrid_app::{ChartData, GridResult, LegendState, SeriesIndex, toggle_isolation};

use crate::GridBackend;

/// A live chart instance. Disposal releases whatever the renderer holds.
pub trait ChartHandle {
    fn data(&self) -> &ChartData;

    fn visibility(&self) -> &[bool];

    fn set_visibility(&mut self, visibility: &[bool]);

    fn dispose(&mut self);
}

pub trait ChartFactory {
    type Handle: ChartHandle;

    fn create(&mut self, data: ChartData) -> Self::Handle;
}

/// Holds at most one live chart. A replot disposes the old instance before
/// the new one is created, and dropping the slot disposes whatever is live.
pub struct ChartSlot<F: ChartFactory> {
    factory: F,
    url: String,
    handle: Option<F::Handle>,
}

impl<F: ChartFactory> ChartSlot<F> {
    pub fn new(factory: F, url: &str) -> Self {
        Self {
            factory,
            url: url.to_owned(),
            handle: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_owned();
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Fetches fresh chart data and replots. A failed fetch keeps the
    /// current chart on screen.
    pub fn replot(&mut self, backend: &mut dyn GridBackend) -> GridResult<&mut F::Handle> {
        let data = backend.fetch_chart(&self.url).inspect_err(|error| {
            tracing::warn!(url = %self.url, %error, "chart fetch failed; keeping current chart");
        })?;
        Ok(self.replot_with(data))
    }

    pub fn replot_with(&mut self, data: ChartData) -> &mut F::Handle {
        self.teardown();
        tracing::debug!(series = data.datasets.len(), points = data.labels.len(), "plotting chart");
        self.handle.insert(self.factory.create(data))
    }

    pub fn handle(&self) -> Option<&F::Handle> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut F::Handle> {
        self.handle.as_mut()
    }

    pub fn teardown(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.dispose();
        }
    }
}

impl<F: ChartFactory> Drop for ChartSlot<F> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegendIsolationController {
    last: Option<LegendState>,
}

impl LegendIsolationController {
    pub fn last(&self) -> Option<LegendState> {
        self.last
    }

    pub fn on_legend_click(
        &mut self,
        chart: &mut impl ChartHandle,
        series: SeriesIndex,
    ) -> Option<LegendState> {
        let mut visibility = chart.visibility().to_vec();
        let state = toggle_isolation(&mut visibility, series.get())?;
        chart.set_visibility(&visibility);
        self.last = Some(state);
        Some(state)
    }
}
