// Data shapes shared by the client, the history and the renderers.

use chrono::NaiveDateTime;

/// Placeholder used for any field the remote payload leaves out.
pub const PLACEHOLDER: &str = "N/A";

/// One credential record as returned by the lookup endpoint. Duplicates are
/// kept as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Account {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// The answer to one lookup. `total_accounts` is whatever the source claims
/// and is never reconciled with `accounts.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub url: String,
    pub accounts: Vec<Account>,
    pub total_accounts: u64,
    pub response_time: String,
}

impl QueryResult {
    /// Number of account rows actually received.
    pub fn received(&self) -> usize {
        self.accounts.len()
    }

    /// True when the reported total disagrees with the received rows.
    pub fn count_mismatch(&self) -> bool {
        self.total_accounts != self.accounts.len() as u64
    }
}

/// A successful lookup as remembered by the session history.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub url: String,
    pub timestamp: NaiveDateTime,
    pub result_count: usize,
    pub data: QueryResult,
}

impl HistoryEntry {
    pub fn new(data: QueryResult, timestamp: NaiveDateTime) -> Self {
        HistoryEntry {
            url: data.url.clone(),
            timestamp,
            result_count: data.accounts.len(),
            data,
        }
    }
}

/// Prepend `http://` when the user typed a bare host.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
