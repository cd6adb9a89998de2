//! Dataset API HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).

use std::time::Duration;

use gridfeed_core::DatasetIdentifier;
use url::Url;

use crate::dataset::Dataset;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("gridfeed/", env!("CARGO_PKG_VERSION"));

/// Query parameter carrying the access token.
const TOKEN_PARAM: &str = "auth_token";

/// Error type for dataset fetches.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("access denied ({status}): {message}")]
    Auth { status: u16, message: String },
    #[error("dataset {0} not found")]
    NotFound(String),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Dataset API client (blocking).
#[derive(Clone)]
pub struct DatasetClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl DatasetClient {
    /// Client for `https://<domain>`.
    pub fn new(domain: &str, token: Option<String>) -> Result<Self, FetchError> {
        Self::with_base_url(format!("https://{}", domain), token)
    }

    /// Client for an explicit base URL (scheme included).
    pub fn with_base_url(base_url: String, token: Option<String>) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Build the request URL for `id`.
    ///
    /// The token goes first, followed by `params` in the order given.
    pub fn dataset_url(
        &self,
        id: &DatasetIdentifier,
        params: &[(String, String)],
    ) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        let table = format!("{}.json", id.table_code());
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1", "datasets", id.source_code(), table.as_str()]);

        if self.token.is_some() || !params.is_empty() {
            let mut query = url.query_pairs_mut();
            if let Some(ref token) = self.token {
                query.append_pair(TOKEN_PARAM, token);
            }
            for (k, v) in params {
                query.append_pair(k, v);
            }
        }

        Ok(url)
    }

    /// Fetch one dataset. Single request, no retries.
    pub fn fetch(
        &self,
        id: &DatasetIdentifier,
        params: &[(String, String)],
    ) -> Result<Dataset, FetchError> {
        let url = self.dataset_url(id, params)?;
        log::debug!("GET {} ({} params, token: {})", url.path(), params.len(), self.has_token());

        let response = self.http.get(url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|e| FetchError::Network(e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = extract_error(&text, status);
            return Err(match status {
                401 | 403 => FetchError::Auth { status, message },
                404 => FetchError::NotFound(id.normalized().to_string()),
                _ => FetchError::Http { status, message },
            });
        }

        let body: serde_json::Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))
            .map_err(|e| {
                FetchError::Parse(format!(
                    "invalid JSON: {} (body: {})",
                    e,
                    &text[..floor_char_boundary(&text, 200)],
                ))
            })?;

        let dataset = Dataset::from_json(&body)?;
        log::debug!(
            "received {} rows x {} columns for {}",
            dataset.rows.len(),
            dataset.column_names.len(),
            id,
        );
        Ok(dataset)
    }
}

/// Pull a human-readable message out of an error body.
fn extract_error(text: &str, status: u16) -> String {
    let fallback = || format!("HTTP {}", status);
    let Ok(body) = serde_json::from_str::<serde_json::Value>(text) else {
        let trimmed = text.trim();
        return if trimmed.is_empty() || trimmed.starts_with('<') {
            fallback()
        } else {
            trimmed[..floor_char_boundary(trimmed, 200)].to_string()
        };
    };

    body["error"]
        .as_str()
        .or_else(|| body["message"].as_str())
        .or_else(|| body["quandl_error"]["message"].as_str())
        .map(String::from)
        .unwrap_or_else(fallback)
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut i = max;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn id(code: &str) -> DatasetIdentifier {
        DatasetIdentifier::parse(code).unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_dataset_url_without_query() {
        let client = DatasetClient::new("www.quandl.com", None).unwrap();
        let url = client.dataset_url(&id("TAMMER1/SHIBOR"), &[]).unwrap();
        assert_eq!(url.as_str(), "https://www.quandl.com/api/v1/datasets/TAMMER1/SHIBOR.json");
    }

    #[test]
    fn test_dataset_url_uses_normalized_code() {
        let client = DatasetClient::new("www.quandl.com", None).unwrap();
        let url = client.dataset_url(&id(" WIKI // AAPL "), &[]).unwrap();
        assert_eq!(url.path(), "/api/v1/datasets/WIKI/AAPL.json");
    }

    #[test]
    fn test_dataset_url_token_then_params() {
        let client = DatasetClient::new("data.example.com", Some("tok".into())).unwrap();
        let url = client
            .dataset_url(&id("WIKI/AAPL"), &params(&[("rows", "5"), ("sort_order", "asc")]))
            .unwrap();
        assert_eq!(url.query(), Some("auth_token=tok&rows=5&sort_order=asc"));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let client = DatasetClient::new("www.quandl.com", Some("  ".into())).unwrap();
        assert!(!client.has_token());
        assert_eq!(client.dataset_url(&id("A/B"), &[]).unwrap().query(), None);
    }

    #[test]
    fn test_fetch_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/datasets/TAMMER1/SHIBOR.json")
                .query_param("auth_token", "tok")
                .query_param("rows", "2");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({
                    "source_code": "TAMMER1",
                    "code": "SHIBOR",
                    "column_names": ["Date", "O/N"],
                    "data": [["2014-03-21", 2.1], ["2014-03-20", 2.25]]
                }));
        });

        let client = DatasetClient::with_base_url(server.base_url(), Some("tok".into())).unwrap();
        let ds = client.fetch(&id("TAMMER1/SHIBOR"), &params(&[("rows", "2")])).unwrap();

        mock.assert();
        assert_eq!(ds.column_names, vec!["Date", "O/N"]);
        assert_eq!(ds.rows.len(), 2);
    }

    #[test]
    fn test_fetch_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_includes("/datasets/");
            then.status(404)
                .json_body(serde_json::json!({ "error": "Requested entity does not exist." }));
        });

        let client = DatasetClient::with_base_url(server.base_url(), None).unwrap();
        let err = client.fetch(&id("NOPE/NOPE"), &[]).unwrap_err();
        assert!(matches!(err, FetchError::NotFound(ref code) if code == "NOPE/NOPE"), "{:?}", err);
    }

    #[test]
    fn test_fetch_auth_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_includes("/datasets/");
            then.status(401)
                .json_body(serde_json::json!({
                    "quandl_error": { "code": "QEAx01", "message": "Incorrect authentication token." }
                }));
        });

        let client = DatasetClient::with_base_url(server.base_url(), Some("bad".into())).unwrap();
        let err = client.fetch(&id("WIKI/AAPL"), &[]).unwrap_err();
        match err {
            FetchError::Auth { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect authentication token.");
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_fetch_server_error_no_retry() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path_includes("/datasets/");
            then.status(503).body("<html>down</html>");
        });

        let client = DatasetClient::with_base_url(server.base_url(), None).unwrap();
        let err = client.fetch(&id("WIKI/AAPL"), &[]).unwrap_err();

        mock.assert_calls(1);
        assert_eq!(err.to_string(), "HTTP 503: HTTP 503");
    }

    #[test]
    fn test_fetch_invalid_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path_includes("/datasets/");
            then.status(200).body("Date,Value\n2015-01-02,1\n");
        });

        let client = DatasetClient::with_base_url(server.base_url(), None).unwrap();
        let err = client.fetch(&id("WIKI/AAPL"), &[]).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)), "{:?}", err);
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_extract_error_plain_text() {
        assert_eq!(extract_error("rate limit exceeded", 429), "rate limit exceeded");
        assert_eq!(extract_error("", 500), "HTTP 500");
        assert_eq!(extract_error(r#"{"message":"slow down"}"#, 429), "slow down");
    }
}
