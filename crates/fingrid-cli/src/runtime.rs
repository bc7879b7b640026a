// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use fingrid_app::{ChartData, ChoiceMap, GridResult, Record, RecordId};
use fingrid_grid::{Confirm, GridBackend};
use std::io::{self, BufRead, Write};

/// Grid backend over the blocking REST client.
pub struct HttpRuntime {
    client: fingrid_http::Client,
}

impl HttpRuntime {
    pub fn new(client: fingrid_http::Client) -> Self {
        Self { client }
    }
}

impl GridBackend for HttpRuntime {
    fn fetch_records(&mut self, url: &str) -> GridResult<Vec<Record>> {
        Ok(self.client.fetch_records(url)?)
    }

    fn fetch_field_choices(&mut self, endpoint: &str) -> GridResult<ChoiceMap> {
        Ok(self.client.fetch_field_choices(endpoint)?)
    }

    fn save_rows(&mut self, endpoint: &str, rows: &[Record]) -> GridResult<()> {
        Ok(self.client.save_table(endpoint, rows)?)
    }

    fn create_record(&mut self, endpoint: &str, record: &Record) -> GridResult<Record> {
        Ok(self.client.create(endpoint, record)?)
    }

    fn update_record(
        &mut self,
        endpoint: &str,
        id: &RecordId,
        patch: &Record,
    ) -> GridResult<Record> {
        Ok(self.client.update(endpoint, id, patch)?)
    }

    fn delete_record(&mut self, endpoint: &str, id: &RecordId) -> GridResult<()> {
        Ok(self.client.delete(endpoint, id)?)
    }

    fn fetch_chart(&mut self, url: &str) -> GridResult<ChartData> {
        Ok(self.client.fetch_chart(url)?)
    }
}

/// y/N prompt on stderr, answered from stdin. `--yes` skips the prompt.
pub struct StdinConfirm {
    assume_yes: bool,
}

impl StdinConfirm {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let mut stderr = io::stderr();
        if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(error) => {
                tracing::warn!(%error, "cannot read confirmation; treating as no");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
