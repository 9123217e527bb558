// JSON export: a `metadata` block plus one object per account.
//
// `status` is decorative, chosen at random from `JSON_STATUSES`, and does not
// come from any check of the account.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::decoration::{choose, Decoration, JSON_STATUSES};
use crate::model::QueryResult;

pub const VERSION_LABEL: &str = concat!("leaklens ", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: Metadata<'a>,
    accounts: Vec<JsonAccount<'a>>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    url_searched: &'a str,
    search_date: String,
    total_accounts: u64,
    received_accounts: usize,
    response_time: &'a str,
    version: &'static str,
}

#[derive(Serialize)]
struct JsonAccount<'a> {
    username: &'a str,
    password: &'a str,
    status: &'static str,
    last_checked: String,
}

pub fn render(
    result: &QueryResult,
    generated: NaiveDateTime,
    deco: &mut dyn Decoration,
) -> Result<String, serde_json::Error> {
    let last_checked = generated.format("%Y-%m-%d").to_string();
    let report = JsonReport {
        metadata: Metadata {
            url_searched: &result.url,
            search_date: generated.format("%Y-%m-%d %H:%M:%S").to_string(),
            total_accounts: result.total_accounts,
            received_accounts: result.received(),
            response_time: &result.response_time,
            version: VERSION_LABEL,
        },
        accounts: result
            .accounts
            .iter()
            .map(|a| JsonAccount {
                username: &a.username,
                password: &a.password,
                status: *choose(deco, JSON_STATUSES),
                last_checked: last_checked.clone(),
            })
            .collect(),
    };

    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    report.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
