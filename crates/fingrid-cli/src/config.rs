// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use fingrid_grid::GridConfig;
use fingrid_http::CsrfSource;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "fingrid";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
const DEFAULT_COLLECTION: &str = "transactions/";
const DEFAULT_SAVE_ENDPOINT: &str = "transactions/save-table/";
const DEFAULT_TIMEOUT: &str = "5s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub csrf: Csrf,
    #[serde(default)]
    pub grid: Grid,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: Server::default(),
            csrf: Csrf::default(),
            grid: Grid::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub base_url: Option<String>,
    pub collection: Option<String>,
    pub save_endpoint: Option<String>,
    pub chart_endpoint: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            collection: Some(DEFAULT_COLLECTION.to_owned()),
            save_endpoint: Some(DEFAULT_SAVE_ENDPOINT.to_owned()),
            chart_endpoint: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Csrf {
    /// Raw `Cookie:` header; the token is read from its `csrftoken` pair.
    pub cookie: Option<String>,
    pub form_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Grid {
    pub identity_key: Option<String>,
    pub filter_label: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("FINGRID_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set FINGRID_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [server], [csrf], and [grid]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let base_url = self.base_url();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            bail!(
                "server.base_url in {} must be an http(s) URL, got {:?}",
                path.display(),
                base_url
            );
        }

        for (key, value) in [
            ("server.collection", self.collection()),
            ("server.save_endpoint", self.save_endpoint()),
        ] {
            if value.trim().is_empty() {
                bail!("{key} in {} must not be empty", path.display());
            }
        }

        if let Some(timeout) = &self.server.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "server.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.server.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn collection(&self) -> &str {
        self.server
            .collection
            .as_deref()
            .unwrap_or(DEFAULT_COLLECTION)
    }

    pub fn save_endpoint(&self) -> &str {
        self.server
            .save_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_SAVE_ENDPOINT)
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.server.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// `{chart_endpoint}?year={year}` when a chart endpoint is configured.
    pub fn chart_url(&self, year: i32) -> Option<String> {
        let endpoint = self.server.chart_endpoint.as_deref()?.trim();
        if endpoint.is_empty() {
            return None;
        }
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        Some(format!("{endpoint}{separator}year={year}"))
    }

    pub fn csrf_source(&self) -> CsrfSource {
        let source = CsrfSource::from_cookie_header(self.csrf.cookie.as_deref().unwrap_or(""));
        match self.csrf.form_token.as_deref() {
            Some(token) => source.with_form_token(token),
            None => source,
        }
    }

    pub fn grid_config(&self) -> GridConfig {
        let mut config = GridConfig::new(self.collection(), self.save_endpoint());
        config.identity_key = self
            .grid
            .identity_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned);
        config
    }

    pub fn filter_label(&self) -> Option<&str> {
        self.grid
            .filter_label
            .as_deref()
            .filter(|label| !label.is_empty())
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# fingrid config\n# Place this file at: {}\n\nversion = 1\n\n[server]\nbase_url = \"{}\"\ncollection = \"{}\"\nsave_endpoint = \"{}\"\n# Optional. Chart data in the {{labels, datasets}} shape, queried with ?year=\n# chart_endpoint = \"transactions/chart/\"\ntimeout = \"{}\"\n\n[csrf]\n# Cookie header sent with every request; the token comes from its csrftoken pair.\n# cookie = \"sessionid=...; csrftoken=...\"\n# Fallback when the cookie carries no token.\n# form_token = \"...\"\n\n[grid]\n# Optional. Defaults to the first key of the first record.\n# identity_key = \"id\"\n# Sent with every saved row as `filter`.\n# filter_label = \"Housing\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_COLLECTION,
            DEFAULT_SAVE_ENDPOINT,
            DEFAULT_TIMEOUT,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use fingrid_testkit::temp_config_path;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let (temp, path) = temp_config_path()?;
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.base_url(), "http://localhost:8000/api/");
        assert_eq!(config.collection(), "transactions/");
        assert_eq!(config.timeout()?, Duration::from_secs(5));
        assert_eq!(config.chart_url(2024), None);
        assert_eq!(config.csrf_source().token(), None);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[server]\nbase_url=\"http://x/\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[server], [csrf], and [grid]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[server]\nbase_url = \"https://books.example/api/\"\ncollection = \"budgets/\"\nsave_endpoint = \"budgets/save/\"\nchart_endpoint = \"budgets/chart/\"\ntimeout = \"500ms\"\n[csrf]\ncookie = \"sessionid=s; csrftoken=abc\"\nform_token = \"fallback\"\n[grid]\nidentity_key = \"pk\"\nfilter_label = \"Housing\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "https://books.example/api/");
        assert_eq!(config.timeout()?, Duration::from_millis(500));
        assert_eq!(
            config.chart_url(2024).as_deref(),
            Some("budgets/chart/?year=2024")
        );
        assert_eq!(config.csrf_source().token(), Some("abc"));
        assert_eq!(config.filter_label(), Some("Housing"));

        let grid = config.grid_config();
        assert_eq!(grid.endpoint, "budgets/");
        assert_eq!(grid.save_endpoint, "budgets/save/");
        assert_eq!(grid.identity_key.as_deref(), Some("pk"));
        Ok(())
    }

    #[test]
    fn form_token_is_used_without_a_cookie_token() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[csrf]\nform_token = \"from-form\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.csrf_source().token(), Some("from-form"));
        Ok(())
    }

    #[test]
    fn chart_url_appends_year_to_existing_query() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[server]\nchart_endpoint = \"chart/?kind=bar\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(
            config.chart_url(2023).as_deref(),
            Some("chart/?kind=bar&year=2023")
        );
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn non_http_base_url_is_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[server]\nbase_url = \"ftp://files.example/\"\n")?;
        let error = Config::load(&path).expect_err("ftp base url should fail");
        assert!(error.to_string().contains("must be an http(s) URL"));
        Ok(())
    }

    #[test]
    fn empty_endpoints_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[server]\nsave_endpoint = \" \"\n")?;
        let error = Config::load(&path).expect_err("empty save endpoint should fail");
        assert!(error.to_string().contains("server.save_endpoint"));
        Ok(())
    }

    #[test]
    fn non_positive_timeout_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[server]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn timeout_parses_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn timeout_rejects_invalid_duration() {
        let error = parse_duration("oops").expect_err("invalid duration should fail");
        let message = error.to_string();
        assert!(
            message.contains("invalid duration") || message.contains("invalid timeout duration"),
            "unexpected message: {message}"
        );
    }

    #[test]
    fn blank_identity_key_falls_back_to_first_key() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[grid]\nidentity_key = \"\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.grid_config().identity_key, None);
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("FINGRID_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("FINGRID_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn default_path_uses_config_toml_suffix_when_no_env_override() -> Result<()> {
        let _guard = env_lock();
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("FINGRID_CONFIG_PATH");
        }
        let path = Config::default_path()?;
        assert!(path.ends_with("fingrid/config.toml"));
        Ok(())
    }

    #[test]
    fn example_config_includes_required_sections() -> Result<()> {
        let (_temp, path) = temp_config_path()?;
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[server]"));
        assert!(example.contains("[csrf]"));
        assert!(example.contains("[grid]"));

        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.collection(), "transactions/");
        Ok(())
    }
}
