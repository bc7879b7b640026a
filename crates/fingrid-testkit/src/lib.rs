// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod chart;
mod memory;

pub use chart::{ChartEvent, ChartLog, RecordingChart, RecordingChartFactory};
pub use memory::{MemoryBackend, Operation};

use anyhow::{Context, Result};
use fingrid_app::{ChartData, ChartSeries, Choice, ChoiceMap, Record};
use serde_json::{Value, json};
use std::path::PathBuf;

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const CATEGORIES: [(i64, &str); 5] = [
    (1, "Food"),
    (2, "Housing"),
    (3, "Transport"),
    (4, "Utilities"),
    (5, "Entertainment"),
];

const ACCOUNTS: [(&str, &str); 3] = [
    ("chk", "Checking"),
    ("sav", "Savings"),
    ("cc", "Credit Card"),
];

const PAYEES: [&str; 14] = [
    "Corner Grocer",
    "Harbor Property Mgmt",
    "City Transit",
    "Northside Power",
    "Riverbend Water",
    "Lantern Cinema",
    "Sunrise Bakery",
    "Metro Fuel",
    "Greenleaf Market",
    "Summit Internet",
    "Oak Street Diner",
    "Parkway Garage",
    "Bright Pharmacy",
    "Maple Books",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for household ledger rows and chart payloads.
#[derive(Debug, Clone)]
pub struct FinanceFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl FinanceFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// One row shaped `{id, date, payee, category, amount, account}`.
    pub fn transaction(&mut self, id: i64, year: i32) -> Record {
        let month = self.rng.int_n(12) + 1;
        let day = self.rng.int_n(28) + 1;
        let (category, _) = CATEGORIES[self.rng.int_n(CATEGORIES.len())];
        let (account, _) = ACCOUNTS[self.rng.int_n(ACCOUNTS.len())];
        let cents = self.rng.int_n(250_000) + 100;

        record(json!({
            "id": id,
            "date": format!("{year}-{month:02}-{day:02}"),
            "payee": PAYEES[self.rng.int_n(PAYEES.len())],
            "category": category,
            "amount": format!("{}.{:02}", cents / 100, cents % 100),
            "account": account,
        }))
    }

    pub fn transactions(&mut self, count: usize, year: i32) -> Vec<Record> {
        (1..=count as i64)
            .map(|id| self.transaction(id, year))
            .collect()
    }

    /// Monthly totals per category, with the occasional missing month.
    pub fn monthly_chart(&mut self) -> ChartData {
        let datasets = CATEGORIES
            .iter()
            .map(|(_, label)| ChartSeries {
                label: (*label).to_owned(),
                data: (0..MONTHS.len())
                    .map(|_| match self.rng.int_n(10) {
                        0 => None,
                        _ => Some((self.rng.int_n(150_000) + 500) as f64 / 100.0),
                    })
                    .collect(),
            })
            .collect();
        ChartData {
            labels: MONTHS.iter().map(|month| (*month).to_owned()).collect(),
            datasets,
        }
    }
}

/// The choices a ledger's `field-choices/` endpoint would return.
pub fn field_choices() -> ChoiceMap {
    ChoiceMap::default()
        .with_column(
            "category",
            CATEGORIES
                .iter()
                .map(|(value, label)| Choice::new(*value, *label))
                .collect(),
        )
        .with_column(
            "account",
            ACCOUNTS
                .iter()
                .map(|(value, label)| Choice::new(*value, *label))
                .collect(),
        )
}

/// A small fixed ledger: Rent 1200, Groceries 300, Bus pass 75.
pub fn ledger() -> Vec<Record> {
    vec![
        record(json!({"id": 1, "payee": "Rent", "category": 2, "amount": 1200, "account": "chk"})),
        record(json!({"id": 2, "payee": "Groceries", "category": 1, "amount": 300, "account": "cc"})),
        record(json!({"id": 3, "payee": "Bus pass", "category": 3, "amount": 75, "account": "chk"})),
    ]
}

/// Chart over the first quarter for Food and Housing.
pub fn quarter_chart() -> ChartData {
    ChartData {
        labels: MONTHS[..3].iter().map(|month| (*month).to_owned()).collect(),
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

/// Test helper: the object behind a `json!` literal.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("record fixture must be a JSON object, got {other}"),
    }
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let config_path = dir.path().join("config.toml");
    Ok((dir, config_path))
}
