// Library root
// -----------
// The binary (`main.rs`) parses flags, sets up logging and hands a `Config`
// to the interactive menu in `ui`. Everything else lives here so it can be
// tested without a terminal.
//
// Module responsibilities:
// - `config`: endpoint, key, timeouts, storage locations, history size.
// - `model`: accounts, query results and history entries.
// - `api`: the blocking HTTP client for the lookup endpoint.
// - `history`: the capped in-memory list of past queries.
// - `store`: result, export and backup directories on disk.
// - `report`: plain-text, HTML and JSON renderings of a result.
// - `ui`: the numbered menus and the flows behind them.
pub mod api;
pub mod config;
pub mod history;
pub mod model;
pub mod report;
pub mod store;
pub mod ui;
