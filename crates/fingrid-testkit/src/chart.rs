// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fingrid_app::ChartData;
use fingrid_grid::{ChartFactory, ChartHandle};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartEvent {
    Created(usize),
    Disposed(usize),
}

/// Shared lifecycle log; it outlives the slot that owns the charts.
#[derive(Debug, Clone, Default)]
pub struct ChartLog {
    events: Rc<RefCell<Vec<ChartEvent>>>,
}

impl ChartLog {
    pub fn events(&self) -> Vec<ChartEvent> {
        self.events.borrow().clone()
    }

    pub fn live(&self) -> usize {
        self.events.borrow().iter().fold(0, |live, event| match event {
            ChartEvent::Created(_) => live + 1,
            ChartEvent::Disposed(_) => live - 1,
        })
    }

    fn push(&self, event: ChartEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[derive(Debug, Default)]
pub struct RecordingChartFactory {
    log: ChartLog,
    next_id: usize,
}

impl RecordingChartFactory {
    pub fn new(log: ChartLog) -> Self {
        Self { log, next_id: 0 }
    }

    pub fn log(&self) -> &ChartLog {
        &self.log
    }
}

impl ChartFactory for RecordingChartFactory {
    type Handle = RecordingChart;

    fn create(&mut self, data: ChartData) -> RecordingChart {
        self.next_id += 1;
        self.log.push(ChartEvent::Created(self.next_id));
        RecordingChart {
            id: self.next_id,
            visibility: vec![true; data.datasets.len()],
            data,
            log: self.log.clone(),
            disposed: false,
        }
    }
}

#[derive(Debug)]
pub struct RecordingChart {
    id: usize,
    data: ChartData,
    visibility: Vec<bool>,
    log: ChartLog,
    disposed: bool,
}

impl RecordingChart {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl ChartHandle for RecordingChart {
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
        if !self.disposed {
            self.disposed = true;
            self.log.push(ChartEvent::Disposed(self.id));
        }
    }
}
