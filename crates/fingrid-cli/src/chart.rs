// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fingrid_app::ChartData;
use fingrid_grid::{ChartFactory, ChartHandle};

const BAR_WIDTH: usize = 24;

#[derive(Debug, Default)]
pub struct TextChartFactory;

impl ChartFactory for TextChartFactory {
    type Handle = TextChart;

    fn create(&mut self, data: ChartData) -> TextChart {
        TextChart {
            visibility: vec![true; data.datasets.len()],
            data,
        }
    }
}

/// Per-series totals drawn as horizontal bars.
#[derive(Debug)]
pub struct TextChart {
    data: ChartData,
    visibility: Vec<bool>,
}

impl TextChart {
    pub fn to_text(&self) -> String {
        let totals: Vec<(usize, &str, f64)> = self
            .data
            .datasets
            .iter()
            .enumerate()
            .filter(|(index, _)| self.visibility.get(*index).copied().unwrap_or(true))
            .map(|(index, series)| {
                let total: f64 = series.data.iter().flatten().sum();
                (index, series.label.as_str(), total)
            })
            .collect();

        let peak = totals
            .iter()
            .map(|(_, _, total)| *total)
            .fold(0.0_f64, f64::max);
        let label_width = totals
            .iter()
            .map(|(_, label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for (index, label, total) in totals {
            let filled = if peak > 0.0 {
                ((total / peak) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            out.push_str(&format!(
                "{index}: {label:<label_width$} {} {total:.2}\n",
                "#".repeat(filled)
            ));
        }
        if !self.data.labels.is_empty() {
            out.push_str(&format!("points: {}\n", self.data.labels.join(", ")));
        }
        out
    }
}

impl ChartHandle for TextChart {
    fn data(&self) -> &ChartData {
        &self.data
    }

    fn visibility(&self) -> &[bool] {
        &self.visibility
    }

    fn set_visibility(&mut self, visibility: &[bool]) {
        self.visibility = visibility.to_vec();
    }

    fn dispose(&mut self) {
        tracing::trace!(series = self.data.datasets.len(), "chart disposed");
    }
}
