//! Entry point for the `hos` command-line interface.
#![forbid(unsafe_code)]

use hos_cli::CliError;
use tracing_subscriber::EnvFilter;

#[expect(
    clippy::print_stderr,
    reason = "fatal errors are reported on stderr before exiting"
)]
fn main() {
    init_logging();
    if let Err(err) = hos_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("hos: {err}");
        std::process::exit(1);
    }
}

/// Route `log` records from the library crates to stderr, filtered by
/// `RUST_LOG` (default `info`).
#[expect(
    clippy::print_stderr,
    reason = "a broken subscriber cannot report through itself"
)]
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("hos: logging disabled: {err}");
    }
}
