// API client module: a small blocking HTTP client for the lookup endpoint.
// It sends one GET per query, never retries, and turns whatever comes back
// into either a `QueryResult` or a classified `QueryError`.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::model::{Account, QueryResult, PLACEHOLDER};

/// Why a lookup produced no result.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Connection failure, timeout or an HTTP error status.
    #[error("request failed: {0}")]
    Transport(String),

    /// The server answered but the body is not JSON.
    #[error("invalid response from the API")]
    InvalidResponse,

    /// Well-formed answer without any account.
    #[error("no results found")]
    NoResults,
}

/// Outcome of the reachability check in the tools menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    Online { elapsed: Duration },
    Restricted { status: u16, elapsed: Duration },
    Offline { error: String },
}

/// Blocking client bound to one endpoint and one static key.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    key: String,
    probe_timeout: Duration,
}

impl ApiClient {
    /// Build a client from the endpoint, key and timeouts in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().timeout(config.api_timeout);
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: config.api_url.clone(),
            key: config.api_key.clone(),
            probe_timeout: config.probe_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up leaked accounts for `url`. The URL is sent as given; callers
    /// normalise it first.
    pub fn query(&self, url: &str) -> Result<QueryResult, QueryError> {
        debug!(endpoint = %self.base_url, %url, "sending lookup request");
        let res = self
            .client
            .get(&self.base_url)
            .query(&[("url", url), ("key", self.key.as_str())])
            .send()
            .map_err(|e| {
                warn!(error = %e, "lookup request failed");
                QueryError::Transport(describe_transport_error(&e))
            })?;

        let status = res.status();
        if !status.is_success() {
            warn!(%status, "lookup endpoint returned an error status");
            return Err(QueryError::Transport(format!(
                "server returned HTTP {}",
                status.as_u16()
            )));
        }

        let body = res
            .text()
            .map_err(|e| QueryError::Transport(describe_transport_error(&e)))?;
        let result = parse_payload(url, &body)?;
        info!(
            %url,
            received = result.accounts.len(),
            reported = result.total_accounts,
            "lookup succeeded"
        );
        Ok(result)
    }

    /// Plain GET against the base endpoint with the short probe timeout.
    pub fn probe(&self) -> Probe {
        let started = Instant::now();
        match self
            .client
            .get(&self.base_url)
            .timeout(self.probe_timeout)
            .send()
        {
            Ok(res) => {
                let elapsed = started.elapsed();
                let status = res.status().as_u16();
                if status == 200 {
                    Probe::Online { elapsed }
                } else {
                    Probe::Restricted { status, elapsed }
                }
            }
            Err(e) => Probe::Offline {
                error: describe_transport_error(&e),
            },
        }
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".into()
    } else if e.is_connect() {
        format!("could not connect: {}", e)
    } else {
        e.to_string()
    }
}

/// Turn a response body into a `QueryResult` for `url`.
///
/// Non-JSON bodies are `InvalidResponse`; anything that is not an object with
/// a non-empty `users_accounts` array is `NoResults`.
pub fn parse_payload(url: &str, body: &str) -> Result<QueryResult, QueryError> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "response body is not JSON");
        QueryError::InvalidResponse
    })?;

    let obj = value.as_object().ok_or(QueryError::NoResults)?;
    let accounts = match obj.get("users_accounts") {
        Some(Value::Array(items)) if !items.is_empty() => {
            items.iter().map(coerce_account).collect::<Vec<_>>()
        }
        _ => return Err(QueryError::NoResults),
    };

    Ok(QueryResult {
        url: url.to_string(),
        accounts,
        total_accounts: read_count(obj),
        response_time: obj
            .get("time")
            .map(text_or_placeholder)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
    })
}

fn coerce_account(item: &Value) -> Account {
    let field = |name: &str| {
        item.get(name)
            .map(text_or_placeholder)
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };
    Account {
        username: field("username"),
        password: field("password"),
    }
}

fn text_or_placeholder(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => PLACEHOLDER.to_string(),
        other => other.to_string(),
    }
}

fn read_count(obj: &Map<String, Value>) -> u64 {
    match obj.get("total_accounts") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_payload() {
        let body = r#"{"users_accounts":[{"username":"u1","password":"p1"}],"total_accounts":1,"time":"120ms"}"#;
        let result = parse_payload("http://example.com", body).unwrap();
        assert_eq!(result.url, "http://example.com");
        assert_eq!(result.accounts, vec![Account::new("u1", "p1")]);
        assert_eq!(result.total_accounts, 1);
        assert_eq!(result.response_time, "120ms");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let body = r#"{"users_accounts":[{"username":"only-user"},{"password":null},42]}"#;
        let result = parse_payload("http://x", body).unwrap();
        assert_eq!(result.accounts[0], Account::new("only-user", "N/A"));
        assert_eq!(result.accounts[1], Account::new("N/A", "N/A"));
        assert_eq!(result.accounts[2], Account::new("N/A", "N/A"));
        assert_eq!(result.total_accounts, 0);
        assert_eq!(result.response_time, "N/A");
    }

    #[test]
    fn reported_total_is_trusted_as_given() {
        let body = r#"{"users_accounts":[{"username":"a","password":"b"}],"total_accounts":9}"#;
        let result = parse_payload("http://x", body).unwrap();
        assert_eq!(result.total_accounts, 9);
        assert_eq!(result.accounts.len(), 1);
    }

    #[test]
    fn duplicates_are_preserved_in_order() {
        let body = r#"{"users_accounts":[{"username":"b","password":"2"},{"username":"a","password":"1"},{"username":"b","password":"2"}]}"#;
        let result = parse_payload("http://x", body).unwrap();
        let names: Vec<_> = result.accounts.iter().map(|a| a.username.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "b"]);
    }

    #[test]
    fn non_json_body_is_invalid_response() {
        let err = parse_payload("http://x", "<html>oops</html>").unwrap_err();
        assert!(matches!(err, QueryError::InvalidResponse));
    }

    #[test]
    fn empty_or_missing_accounts_are_no_results() {
        for body in [
            r#"{"users_accounts":[]}"#,
            r#"{"total_accounts":3}"#,
            r#"{"users_accounts":"nope"}"#,
            r#"[{"username":"a"}]"#,
            r#""text""#,
        ] {
            let err = parse_payload("http://x", body).unwrap_err();
            assert!(matches!(err, QueryError::NoResults), "body {body} gave {err:?}");
        }
    }
}
