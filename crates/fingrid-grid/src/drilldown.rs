// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fingrid_app::{ChartData, FilterState, GridError, GridResult, PointIndex, SeriesIndex};
use url::form_urlencoded;

use crate::{GridBackend, LoadOutcome, SchemaInferredGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartClick {
    pub series: SeriesIndex,
    pub point: PointIndex,
}

impl ChartClick {
    pub const fn new(series: usize, point: usize) -> Self {
        Self {
            series: SeriesIndex::new(series),
            point: PointIndex::new(point),
        }
    }
}

/// Turns chart point clicks into grid filters. Each click replaces the
/// previous filter; there is no way back to the unfiltered state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartDrilldownLink {
    year: i32,
    filter: Option<FilterState>,
}

impl ChartDrilldownLink {
    pub fn new(year: i32) -> Self {
        Self { year, filter: None }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn filter(&self) -> Option<&FilterState> {
        self.filter.as_ref()
    }

    pub fn resolve(
        &self,
        chart: &ChartData,
        click: ChartClick,
        month_override: Option<&str>,
    ) -> GridResult<FilterState> {
        let out_of_range = || GridError::PointOutOfRange {
            series: click.series.get(),
            point: click.point.get(),
        };
        let label = chart.series_label(click.series.get()).ok_or_else(out_of_range)?;
        let point = chart.point_label(click.point.get()).ok_or_else(out_of_range)?;
        let month = month_override.filter(|month| !month.is_empty()).unwrap_or(point);

        Ok(FilterState {
            year: self.year,
            label: label.to_owned(),
            month: month.to_owned(),
        })
    }

    /// Resolves the click, points the grid at the filtered collection and
    /// reloads it.
    pub fn on_point_click(
        &mut self,
        grid: &mut SchemaInferredGrid,
        backend: &mut dyn GridBackend,
        chart: &ChartData,
        click: ChartClick,
        month_override: Option<&str>,
    ) -> GridResult<LoadOutcome> {
        let filter = self.resolve(chart, click, month_override)?;
        let url = drilldown_url(&grid.config().endpoint, &filter);
        tracing::info!(%url, label = %filter.label, month = %filter.month, "drilldown");
        self.filter = Some(filter);
        grid.load(backend, &url)
    }
}

/// `base` with any previous `year`/`label`/`month` parameters replaced by
/// the filter's. Other query parameters are kept.
pub fn drilldown_url(base: &str, filter: &FilterState) -> String {
    let (path, query) = base.split_once('?').unwrap_or((base, ""));
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if !FilterState::QUERY_KEYS.contains(&key.as_ref()) {
            serializer.append_pair(&key, &value);
        }
    }
    for (key, value) in filter.query_pairs() {
        serializer.append_pair(key, &value);
    }
    format!("{path}?{}", serializer.finish())
}

#[cfg(test)]
mod tests {
    use super::{ChartClick, ChartDrilldownLink, drilldown_url};
    use fingrid_app::{ChartData, ChartSeries, FilterState, GridError};

    fn chart() -> ChartData {
        ChartData {
            labels: vec!["Jan".to_owned(), "Feb".to_owned(), "Mar".to_owned()],
            datasets: vec![
                ChartSeries {
                    label: "Food".to_owned(),
                    data: vec![Some(310.0), Some(290.0), Some(305.0)],
                },
                ChartSeries {
                    label: "Housing".to_owned(),
                    data: vec![Some(1200.0), Some(1200.0), Some(1250.0)],
                },
            ],
        }
    }

    fn filter(label: &str, month: &str) -> FilterState {
        FilterState {
            year: 2024,
            label: label.to_owned(),
            month: month.to_owned(),
        }
    }

    #[test]
    fn click_resolves_series_and_point_labels() -> anyhow::Result<()> {
        let link = ChartDrilldownLink::new(2024);
        let resolved = link.resolve(&chart(), ChartClick::new(1, 2), None)?;
        assert_eq!(resolved, filter("Housing", "Mar"));
        Ok(())
    }

    #[test]
    fn selected_month_overrides_the_point() -> anyhow::Result<()> {
        let link = ChartDrilldownLink::new(2024);
        let resolved = link.resolve(&chart(), ChartClick::new(0, 0), Some("Jun"))?;
        assert_eq!(resolved, filter("Food", "Jun"));

        let blank = link.resolve(&chart(), ChartClick::new(0, 0), Some(""))?;
        assert_eq!(blank.month, "Jan");
        Ok(())
    }

    #[test]
    fn out_of_range_clicks_are_rejected() {
        let link = ChartDrilldownLink::new(2024);
        assert_eq!(
            link.resolve(&chart(), ChartClick::new(5, 0), None),
            Err(GridError::PointOutOfRange {
                series: 5,
                point: 0
            })
        );
        assert!(link.resolve(&chart(), ChartClick::new(0, 3), None).is_err());
    }

    #[test]
    fn url_appends_filter_parameters() {
        assert_eq!(
            drilldown_url("transactions/", &filter("Housing", "Mar")),
            "transactions/?year=2024&label=Housing&month=Mar"
        );
    }

    #[test]
    fn url_replaces_previous_drilldown_and_keeps_other_parameters() {
        let base = "transactions/?account=chk&year=2023&label=Food&month=Jan";
        assert_eq!(
            drilldown_url(base, &filter("Dining Out", "Feb")),
            "transactions/?account=chk&year=2024&label=Dining+Out&month=Feb"
        );
    }
}
