// Runtime configuration: where the lookup endpoint lives, which key to send,
// how long to wait, and where result files are written. Everything that the
// rest of the crate would otherwise hardcode is carried by one `Config` value
// so tests can point it at a temporary directory and a local server.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fallback endpoint used when neither a flag nor `LEAKLENS_API_URL` is set.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/lookup";
pub const DEFAULT_API_KEY: &str = "local-dev-key";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    /// Total timeout for one lookup request.
    pub api_timeout: Duration,
    /// Timeout for the reachability check in the tools menu.
    pub probe_timeout: Duration,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
    pub data_root: PathBuf,
    pub results_dir: String,
    pub exports_dir: String,
    pub backups_dir: String,
    pub history_capacity: usize,
    /// Age after which the storage cleanup tool offers to delete a file.
    pub stale_after: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.into(),
            api_key: DEFAULT_API_KEY.into(),
            api_timeout: Duration::from_secs(50),
            probe_timeout: Duration::from_secs(10),
            system_proxy: true,
            data_root: PathBuf::from("."),
            results_dir: "Results".into(),
            exports_dir: "HTML_Exports".into(),
            backups_dir: "Backups".into(),
            history_capacity: 50,
            stale_after: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }
}

impl Config {
    /// Default configuration with all storage directories placed under `root`.
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        Config {
            data_root: root.as_ref().to_path_buf(),
            ..Config::default()
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_root.join(&self.results_dir)
    }

    pub fn exports_path(&self) -> PathBuf {
        self.data_root.join(&self.exports_dir)
    }

    pub fn backups_path(&self) -> PathBuf {
        self.data_root.join(&self.backups_dir)
    }
}
