// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod csrf;

pub use csrf::{CSRF_COOKIE, CSRF_HEADER, CsrfSource, cookie_value};

use fingrid_app::{ChartData, ChoiceMap, GridError, NetworkFailure, Record, RecordId};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use reqwest::header::COOKIE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        method: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("cannot reach {url} -- is the server running? ({source})")]
    Connect {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url}: server error ({status}): {message}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    #[error("decode {what} from {method} {url}: {source}")]
    Decode {
        method: &'static str,
        what: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no CSRF token: set a {CSRF_COOKIE} cookie or a form token")]
    MissingCsrfToken,
}

impl From<Error> for GridError {
    fn from(error: Error) -> Self {
        match error {
            Error::MissingCsrfToken => GridError::MissingCsrfToken,
            Error::Build(source) => NetworkFailure::new("BUILD", "", source.to_string()).into(),
            Error::InvalidUrl {
                method,
                url,
                source,
            } => NetworkFailure::new(method, url, source.to_string()).into(),
            Error::Connect {
                method,
                url,
                source,
            } => NetworkFailure::new(method, url, source.to_string()).into(),
            Error::Status {
                method,
                url,
                status,
                message,
            } => NetworkFailure::new(method, url, message)
                .with_status(status)
                .into(),
            Error::Decode {
                method,
                what,
                url,
                source,
            } => NetworkFailure::new(method, url, format!("decode {what}: {source}")).into(),
        }
    }
}

/// REST collection gateway. Every mutating request carries `X-CSRFToken`.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    csrf: CsrfSource,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        let normalized = if trimmed.ends_with('/') {
            trimmed.to_owned()
        } else {
            format!("{trimmed}/")
        };
        let base_url = Url::parse(&normalized).map_err(|source| Error::InvalidUrl {
            method: "BUILD",
            url: base_url.to_owned(),
            source,
        })?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Build)?;

        Ok(Self {
            base_url,
            timeout,
            csrf: CsrfSource::default(),
            http,
        })
    }

    pub fn with_csrf(mut self, csrf: CsrfSource) -> Self {
        self.csrf = csrf;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }


    /// `GET {url}`; accepts a bare array or a `{ "rows": [...] }` envelope.
    pub fn fetch_records(&self, url: &str) -> Result<Vec<Record>> {
        let body: CollectionBody = self.get_json(url, "collection")?;
        let rows = match body {
            CollectionBody::Rows(rows) => rows,
            CollectionBody::Envelope { rows } => rows,
        };
        tracing::debug!(url, rows = rows.len(), "fetched collection");
        Ok(rows)
    }

    /// `GET {endpoint}field-choices/`.
    pub fn fetch_field_choices(&self, endpoint: &str) -> Result<ChoiceMap> {
        let url = format!("{}field-choices/", with_trailing_slash(endpoint));
        self.get_json(&url, "field choices")
    }

    pub fn fetch_chart(&self, url: &str) -> Result<ChartData> {
        self.get_json(url, "chart data")
    }

    pub fn save_table(&self, endpoint: &str, rows: &[Record]) -> Result<()> {
        let url = self.resolve("POST", endpoint)?;
        let request = self.mutating(self.http.post(url.clone()))?.json(rows);
        send("POST", &url, request)?;
        Ok(())
    }

    pub fn create(&self, endpoint: &str, record: &Record) -> Result<Record> {
        let url = self.resolve("POST", endpoint)?;
        let request = self.mutating(self.http.post(url.clone()))?.json(record);
        let response = send("POST", &url, request)?;
        decode(response, "POST", &url, "created record")
    }

    pub fn update(&self, endpoint: &str, id: &RecordId, patch: &Record) -> Result<Record> {
        let url = self.record_url("PATCH", endpoint, id)?;
        let request = self.mutating(self.http.patch(url.clone()))?.json(patch);
        let response = send("PATCH", &url, request)?;
        decode(response, "PATCH", &url, "updated record")
    }

    pub fn delete(&self, endpoint: &str, id: &RecordId) -> Result<()> {
        let url = self.record_url("DELETE", endpoint, id)?;
        let request = self.mutating(self.http.delete(url.clone()))?;
        send("DELETE", &url, request)?;
        Ok(())
    }

    /// Joins `endpoint` onto the base URL; absolute URLs pass through.
    fn resolve(&self, method: &'static str, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint)
            .map_err(|source| Error::InvalidUrl {
                method,
                url: endpoint.to_owned(),
                source,
            })
    }

    /// `{endpoint}{id}/` with the id encoded as one path segment.
    fn record_url(&self, method: &'static str, endpoint: &str, id: &RecordId) -> Result<Url> {
        let mut url = self.resolve(method, &with_trailing_slash(endpoint))?;
        let id = id.to_string();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl {
                method,
                url: endpoint.to_owned(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .pop_if_empty()
            .push(&id)
            .push("");
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, what: &'static str) -> Result<T> {
        let url = self.resolve("GET", endpoint)?;
        let request = self.with_cookie(self.http.get(url.clone()));
        let response = send("GET", &url, request)?;
        decode(response, "GET", &url, what)
    }

    fn mutating(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.csrf.token().ok_or(Error::MissingCsrfToken)?;
        Ok(self.with_cookie(request).header(CSRF_HEADER, token))
    }

    fn with_cookie(&self, request: RequestBuilder) -> RequestBuilder {
        match self.csrf.cookie_header() {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CollectionBody {
    Rows(Vec<Record>),
    Envelope { rows: Vec<Record> },
}

#[derive(Deserialize)]
struct DetailEnvelope {
    detail: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

fn send(method: &'static str, url: &Url, request: RequestBuilder) -> Result<Response> {
    let response = request.send().map_err(|source| Error::Connect {
        method,
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(Error::Status {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            message: clean_error_response(status, &body),
        });
    }
    Ok(response)
}

fn decode<T: DeserializeOwned>(
    response: Response,
    method: &'static str,
    url: &Url,
    what: &'static str,
) -> Result<T> {
    response.json().map_err(|source| Error::Decode {
        method,
        what,
        url: url.to_string(),
        source,
    })
}

fn with_trailing_slash(endpoint: &str) -> String {
    if endpoint.ends_with('/') {
        endpoint.to_owned()
    } else {
        format!("{endpoint}/")
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<DetailEnvelope>(body)
        && let Some(detail) = parsed.detail
        && !detail.is_empty()
    {
        return detail;
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return error;
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') && !trimmed.contains('<')
    {
        return trimmed.to_owned();
    }

    format!("server returned {}", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::{Client, Error, clean_error_response, with_trailing_slash};
    use fingrid_app::{GridError, RecordId};
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn clean_error_prefers_detail_then_error_then_short_body() {
        let status = StatusCode::FORBIDDEN;
        assert_eq!(
            clean_error_response(status, r#"{"detail":"CSRF Failed: token missing."}"#),
            "CSRF Failed: token missing."
        );
        assert_eq!(
            clean_error_response(status, r#"{"error":"row 3 is locked"}"#),
            "row 3 is locked"
        );
        assert_eq!(clean_error_response(status, "Forbidden"), "Forbidden");
        assert_eq!(
            clean_error_response(status, "<html><body>nope</body></html>"),
            "server returned 403"
        );
        assert_eq!(clean_error_response(status, ""), "server returned 403");
    }

    #[test]
    fn resolve_joins_relative_endpoints_under_the_base() -> anyhow::Result<()> {
        let client = Client::new("http://localhost:8000/api", Duration::from_secs(1))?;
        assert_eq!(client.base_url(), "http://localhost:8000/api/");
        assert_eq!(
            client.resolve("GET", "transactions/")?.as_str(),
            "http://localhost:8000/api/transactions/"
        );
        assert_eq!(
            client.resolve("GET", "http://other:9000/x/")?.as_str(),
            "http://other:9000/x/"
        );
        Ok(())
    }

    #[test]
    fn record_ids_are_encoded_as_one_path_segment() -> anyhow::Result<()> {
        let client = Client::new("http://localhost:8000/api/", Duration::from_secs(1))?;
        assert_eq!(
            client.record_url("PATCH", "budgets", &RecordId::new("7"))?.as_str(),
            "http://localhost:8000/api/budgets/7/"
        );
        assert_eq!(
            client
                .record_url("DELETE", "budgets/", &RecordId::new("a/b?c#d"))?
                .as_str(),
            "http://localhost:8000/api/budgets/a%2Fb%3Fc%23d/"
        );
        Ok(())
    }

    #[test]
    fn invalid_urls_keep_the_request_method() -> anyhow::Result<()> {
        let client = Client::new("http://localhost:8000/api/", Duration::from_secs(1))?;
        let error = client
            .resolve("POST", "http://[::1")
            .expect_err("unterminated IPv6 host");
        assert!(matches!(error, Error::InvalidUrl { method: "POST", .. }));
        match GridError::from(error) {
            GridError::Network(failure) => assert_eq!(failure.method, "POST"),
            other => panic!("unexpected grid error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn new_rejects_unparseable_base_url() {
        let error = Client::new("not a url", Duration::from_secs(1)).expect_err("should fail");
        assert!(error.to_string().contains("invalid URL"));
    }

    #[test]
    fn trailing_slash_is_added_once() {
        assert_eq!(with_trailing_slash("budgets"), "budgets/");
        assert_eq!(with_trailing_slash("budgets/"), "budgets/");
    }
}
