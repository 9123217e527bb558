// Plain-text report: a framed header, a fixed-width table and a footer.
//
// Cell text is transliterated to ASCII before it is measured, so every line
// of the table has the same width whatever the input contained.

use chrono::NaiveDateTime;
use unicode_normalization::UnicodeNormalization;

use super::decoration::{choose, Decoration, TEXT_STATUSES};
use crate::model::QueryResult;

const USER_WIDTH: usize = 24;
const PASS_WIDTH: usize = 24;
const STATUS_WIDTH: usize = 36;
/// Inner width of the frame, equal to the table width minus the outer frame.
const FRAME_WIDTH: usize = USER_WIDTH + PASS_WIDTH + STATUS_WIDTH + 2;
const ELLIPSIS: &str = "...";

pub fn render(result: &QueryResult, generated: NaiveDateTime, deco: &mut dyn Decoration) -> String {
    let mut out = String::new();
    header(&mut out, result, generated);
    table(&mut out, result, deco);
    footer(&mut out, result);
    out
}

fn header(out: &mut String, result: &QueryResult, generated: NaiveDateTime) {
    let title = fit(&format!("RESULTS FOR: {}", result.url), FRAME_WIDTH);
    let date = generated.format("%d/%m/%Y %H:%M:%S").to_string();
    out.push_str(&format!("╔{}╗\n", "═".repeat(FRAME_WIDTH)));
    out.push_str(&format!("║{:^w$}║\n", title, w = FRAME_WIDTH));
    out.push_str(&format!("║{:^w$}║\n", date, w = FRAME_WIDTH));
    out.push_str(&format!("╠{}╣\n", "═".repeat(FRAME_WIDTH)));
}

fn table(out: &mut String, result: &QueryResult, deco: &mut dyn Decoration) {
    let rule = |l: &str, m: &str, r: &str| {
        format!(
            "{}{}{}{}{}{}{}\n",
            l,
            "─".repeat(USER_WIDTH),
            m,
            "─".repeat(PASS_WIDTH),
            m,
            "─".repeat(STATUS_WIDTH),
            r
        )
    };

    out.push_str(&rule("┌", "┬", "┐"));
    out.push_str(&format!(
        "│{:^uw$}│{:^pw$}│{:^sw$}│\n",
        "USERNAME",
        "PASSWORD",
        "STATUS",
        uw = USER_WIDTH,
        pw = PASS_WIDTH,
        sw = STATUS_WIDTH
    ));
    out.push_str(&rule("├", "┼", "┤"));
    for account in &result.accounts {
        let status = *choose(deco, TEXT_STATUSES);
        out.push_str(&format!(
            "│ {}│ {}│{:^sw$}│\n",
            fit_cell(&account.username, USER_WIDTH - 1),
            fit_cell(&account.password, PASS_WIDTH - 1),
            status,
            sw = STATUS_WIDTH
        ));
    }
    out.push_str(&rule("└", "┴", "┘"));
}

fn footer(out: &mut String, result: &QueryResult) {
    let total = if result.count_mismatch() {
        format!(
            " Total accounts: {} (received: {})",
            result.total_accounts,
            result.received()
        )
    } else {
        format!(" Total accounts: {}", result.total_accounts)
    };
    let time = format!(" Response time: {}", result.response_time);
    out.push_str(&format!("╠{}╣\n", "═".repeat(FRAME_WIDTH)));
    out.push_str(&format!("║{:<w$}║\n", fit(&total, FRAME_WIDTH), w = FRAME_WIDTH));
    out.push_str(&format!("║{:<w$}║\n", fit(&time, FRAME_WIDTH), w = FRAME_WIDTH));
    out.push_str(&format!("╚{}╝\n", "═".repeat(FRAME_WIDTH)));
}

/// Decompose, drop everything outside 7-bit ASCII, and collapse whitespace
/// (control characters included) to single spaces.
pub fn transliterate(text: &str) -> String {
    let ascii: String = text
        .nfkd()
        .filter(|c| c.is_ascii())
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// ASCII text of exactly `width` characters: shortened with `...` when too
/// long, padded with spaces when too short.
pub fn fit_cell(text: &str, width: usize) -> String {
    format!("{:<w$}", fit(text, width), w = width)
}

fn fit(text: &str, width: usize) -> String {
    let clean = transliterate(text);
    if clean.len() <= width {
        return clean;
    }
    if width <= ELLIPSIS.len() {
        return ELLIPSIS[..width].to_string();
    }
    let keep = width - ELLIPSIS.len();
    format!("{}{}", clean[..keep].trim_end(), ELLIPSIS)
}
