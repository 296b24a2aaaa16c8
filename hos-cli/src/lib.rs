//! Command-line interface for the HOS trip planner.
//!
//! The `hos` binary exposes three subcommands:
//!
//! - `plan` reads a JSON plan request, plans the trip against OSRM and
//!   Overpass, and prints the itinerary (optionally recording it);
//! - `cycle` prints the driving budgets a driver has for a planned start;
//! - `register-driver` adds a driver to the trip store.
//!
//! Every option can come from CLI flags, configuration files, or `HOS_*`
//! environment variables.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod cycle;
mod driver;
mod error;
mod plan;

pub use error::CliError;

use cycle::{CycleArgs, run_cycle};
use driver::{RegisterDriverArgs, run_register_driver};
use plan::{PlanArgs, run_plan};

const ARG_DATABASE: &str = "database";
const ARG_PLAN_REQUEST: &str = "request";
const ARG_OSRM_URL: &str = "osrm-url";
const ARG_OVERPASS_URL: &str = "overpass-url";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_RECORD: &str = "record";
const ARG_DRIVER_ID: &str = "driver-id";
const ARG_PLANNED_START: &str = "planned-start";
const ARG_NAME: &str = "name";
const ARG_EMAIL: &str = "email";
const ENV_PLAN_REQUEST: &str = "HOS_CMDS_PLAN_REQUEST_PATH";
const ENV_CYCLE_DRIVER_ID: &str = "HOS_CMDS_CYCLE_DRIVER_ID";
const ENV_CYCLE_PLANNED_START: &str = "HOS_CMDS_CYCLE_PLANNED_START";
const ENV_REGISTER_NAME: &str = "HOS_CMDS_REGISTER_DRIVER_NAME";
const ENV_REGISTER_EMAIL: &str = "HOS_CMDS_REGISTER_DRIVER_EMAIL";

/// Trip store used when no `--database` is configured.
const DEFAULT_DATABASE: &str = "hos.db";

/// Run the HOS CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] when arguments or configuration are invalid, or
/// when the selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Cycle(args) => run_cycle(args),
        Command::RegisterDriver(args) => run_register_driver(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "hos",
    about = "Plan Hours-of-Service compliant truck trips",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a trip from a JSON request.
    Plan(PlanArgs),
    /// Show the driving budgets a driver has for a planned start.
    Cycle(CycleArgs),
    /// Register a driver in the trip store.
    RegisterDriver(RegisterDriverArgs),
}

/// Pretty-print `value` as JSON followed by a newline.
fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
