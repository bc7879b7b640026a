// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_COOKIE: &str = "csrftoken";

/// Where the CSRF token comes from: the `csrftoken` cookie, or the hidden
/// form field value when no cookie carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsrfSource {
    cookie_header: Option<String>,
    form_token: Option<String>,
}

impl CsrfSource {
    pub fn from_cookie_header(header: &str) -> Self {
        Self {
            cookie_header: non_empty(header),
            form_token: None,
        }
    }

    pub fn with_form_token(mut self, token: &str) -> Self {
        self.form_token = non_empty(token);
        self
    }

    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie_header.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.cookie_header
            .as_deref()
            .and_then(|header| cookie_value(header, CSRF_COOKIE))
            .or(self.form_token.as_deref())
    }
}

/// Value of `name` in a `Cookie:` header (`a=1; csrftoken=xyz`).
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name)
            .then(|| value.trim())
            .filter(|value| !value.is_empty())
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::{CsrfSource, cookie_value};

    #[test]
    fn cookie_value_finds_named_pair() {
        let header = "sessionid=abc; csrftoken=tok123 ; theme=dark";
        assert_eq!(cookie_value(header, "csrftoken"), Some("tok123"));
        assert_eq!(cookie_value(header, "theme"), Some("dark"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("csrftoken=", "csrftoken"), None);
    }

    #[test]
    fn cookie_takes_precedence_over_form_token() {
        let source =
            CsrfSource::from_cookie_header("csrftoken=from-cookie").with_form_token("from-form");
        assert_eq!(source.token(), Some("from-cookie"));
    }

    #[test]
    fn form_token_is_the_fallback() {
        let source =
            CsrfSource::from_cookie_header("sessionid=abc").with_form_token(" from-form ");
        assert_eq!(source.token(), Some("from-form"));
        assert_eq!(CsrfSource::default().token(), None);
    }
}
