// Self-contained HTML export.
//
// The status badge on each row is decorative (see `decoration`): it is
// picked at random when the page is rendered and says nothing about the
// account.

use chrono::NaiveDateTime;

use super::decoration::{choose, Decoration, HTML_STATUSES};
use crate::model::QueryResult;

const STYLES: &str = r#"
    :root {
        --bg: #0f172a;
        --card: #1e293b;
        --text: #e2e8f0;
        --muted: #94a3b8;
        --accent: #38bdf8;
        --ok: #22c55e;
        --warn: #eab308;
        --bad: #ef4444;
    }
    * { box-sizing: border-box; margin: 0; padding: 0; }
    body {
        font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
        background: var(--bg);
        color: var(--text);
        padding: 2rem;
    }
    .container { max-width: 1100px; margin: 0 auto; }
    header { margin-bottom: 1.5rem; }
    h1 { color: var(--accent); font-size: 1.8rem; }
    .info-card {
        display: grid;
        grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
        gap: 1rem;
        background: var(--card);
        border-radius: 12px;
        padding: 1.25rem;
        margin-bottom: 1.5rem;
    }
    .info-label { color: var(--muted); font-size: 0.8rem; text-transform: uppercase; }
    .info-value { font-weight: 600; word-break: break-all; }
    .table-container { background: var(--card); border-radius: 12px; overflow-x: auto; }
    table { width: 100%; border-collapse: collapse; }
    th, td { padding: 0.75rem 1rem; text-align: left; }
    th { color: var(--muted); border-bottom: 1px solid #334155; }
    tr:nth-child(even) td { background: rgba(255, 255, 255, 0.03); }
    td { font-family: ui-monospace, monospace; word-break: break-all; }
    .status { padding: 0.2rem 0.6rem; border-radius: 999px; font-size: 0.8rem; }
    .status-active { background: rgba(34, 197, 94, 0.15); color: var(--ok); }
    .status-expired { background: rgba(234, 179, 8, 0.15); color: var(--warn); }
    .status-invalid { background: rgba(239, 68, 68, 0.15); color: var(--bad); }
    footer { margin-top: 1.5rem; color: var(--muted); font-size: 0.85rem; text-align: center; }
    @media (max-width: 600px) {
        body { padding: 1rem; }
        th, td { padding: 0.5rem; }
    }
"#;

pub fn render(result: &QueryResult, generated: NaiveDateTime, deco: &mut dyn Decoration) -> String {
    let date = generated.format("%d/%m/%Y %H:%M:%S").to_string();
    let count = if result.count_mismatch() {
        format!("{} (received {})", result.total_accounts, result.received())
    } else {
        result.total_accounts.to_string()
    };

    let mut rows = String::new();
    for (idx, account) in result.accounts.iter().enumerate() {
        let (label, class) = *choose(deco, HTML_STATUSES);
        rows.push_str(&format!(
            "                    <tr><td>{}</td><td>{}</td><td>{}</td><td><span class=\"status {}\">{}</span></td></tr>\n",
            idx + 1,
            html_escape(&account.username),
            html_escape(&account.password),
            class,
            label
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lookup report - {url}</title>
    <style>{styles}</style>
</head>
<body>
    <div class="container">
        <header>
            <h1>Lookup report</h1>
        </header>
        <section class="info-card">
            <div class="info-item"><div class="info-label">URL</div><div class="info-value">{url}</div></div>
            <div class="info-item"><div class="info-label">Date</div><div class="info-value">{date}</div></div>
            <div class="info-item"><div class="info-label">Accounts</div><div class="info-value">{count}</div></div>
            <div class="info-item"><div class="info-label">Response time</div><div class="info-value">{time}</div></div>
        </section>
        <div class="table-container">
            <table>
                <thead>
                    <tr><th>#</th><th>Username</th><th>Password</th><th>Status</th></tr>
                </thead>
                <tbody>
{rows}                </tbody>
            </table>
        </div>
        <footer>
            <p class="footer-text">Generated {date}. Status labels are decorative.</p>
        </footer>
    </div>
</body>
</html>
"#,
        url = html_escape(&result.url),
        styles = STYLES,
        date = date,
        count = count,
        time = html_escape(&result.response_time),
        rows = rows,
    )
}

/// Escape text for use in element content and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
