// Entrypoint for the CLI application.
// - Keeps `main` small: build the config and API client, hand them to the
//   menu loop, and turn the way the loop ended into an exit code.

use clap::{ArgAction, Parser};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use leaklens_cli::api::ApiClient;
use leaklens_cli::config::{Config, DEFAULT_API_KEY, DEFAULT_API_URL};
use leaklens_cli::ui::terminal::Console;
use leaklens_cli::ui::App;

/// Look up leaked credentials for a URL and keep local reports of the results.
#[derive(Parser, Debug)]
#[command(name = "leaklens", version)]
struct Cli {
    /// Lookup endpoint queried with `?url=<target>&key=<key>`
    #[arg(long, env = "LEAKLENS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Static key sent with every lookup
    #[arg(long, env = "LEAKLENS_API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    api_key: String,

    /// Directory holding Results/, HTML_Exports/ and Backups/
    #[arg(long, env = "LEAKLENS_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Lookup timeout in seconds
    #[arg(long, env = "LEAKLENS_TIMEOUT_SECS", default_value_t = 50)]
    timeout: u64,

    /// Ignore HTTP(S)_PROXY settings from the environment
    #[arg(long)]
    no_proxy: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            api_url: self.api_url,
            api_key: self.api_key,
            api_timeout: Duration::from_secs(self.timeout),
            system_proxy: !self.no_proxy,
            ..Config::for_root(self.data_dir)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Ctrl-C at a prompt arrives as an `Interrupted` read; a closed stdin as
/// `UnexpectedEof`. Both end the session normally.
fn is_user_exit(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|e| matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof))
}

fn run(config: Config) -> anyhow::Result<()> {
    let api = ApiClient::new(&config)?;
    let mut app = App::new(config, api, Console::new());
    app.run()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Outside a prompt (e.g. while a lookup is in flight) Ctrl-C is a signal.
    if let Err(e) = ctrlc::set_handler(|| {
        println!("\n\nProgram interrupted by user");
        std::process::exit(0);
    }) {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }

    match run(cli.into_config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if is_user_exit(&e) => {
            println!("\n\nProgram interrupted by user");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Critical error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn io_failure(kind: io::ErrorKind) -> anyhow::Result<()> {
        Err(io::Error::new(kind, "prompt failed").into())
    }

    #[test]
    fn interrupt_is_a_normal_exit_even_with_context() {
        let err = io_failure(io::ErrorKind::Interrupted)
            .context("reading menu choice")
            .unwrap_err();
        assert!(is_user_exit(&err));
    }

    #[test]
    fn closed_stdin_is_a_normal_exit() {
        let err = anyhow::Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(is_user_exit(&err));
    }

    #[test]
    fn other_errors_are_critical() {
        assert!(!is_user_exit(&anyhow::anyhow!("boom")));
        let denied = anyhow::Error::from(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert!(!is_user_exit(&denied));
    }
}
