//! `cycle` command: report a driver's remaining budgets.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};
use clap::Parser;
use hos_core::{CycleState, DriverId, HosRules, resolve_cycle_state};
use hos_data::SqliteTripStore;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_DRIVER_ID, ARG_PLANNED_START, CliError, DEFAULT_DATABASE,
    ENV_CYCLE_DRIVER_ID, ENV_CYCLE_PLANNED_START, write_json,
};

/// CLI arguments for the `cycle` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Resolve how much driving a driver has left before a short \
                 break and before a sleeper stop, given the trips already \
                 recorded for them and the time they intend to start.",
    about = "Show a driver's remaining driving budgets"
)]
#[ortho_config(prefix = "HOS")]
pub(crate) struct CycleArgs {
    /// Identifier of a registered driver.
    #[arg(long = ARG_DRIVER_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) driver_id: Option<u64>,
    /// Intended start of the next trip (RFC 3339).
    #[arg(long = ARG_PLANNED_START, value_name = "timestamp")]
    #[serde(default)]
    pub(crate) planned_start: Option<DateTime<Utc>>,
    /// Path to the SQLite trip store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl CycleArgs {
    fn into_config(self) -> Result<CycleConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CycleConfig::try_from(merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CycleConfig {
    pub(crate) driver: DriverId,
    pub(crate) planned_start: DateTime<Utc>,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<CycleArgs> for CycleConfig {
    type Error = CliError;

    fn try_from(args: CycleArgs) -> Result<Self, Self::Error> {
        let driver_id = args.driver_id.ok_or(CliError::MissingArgument {
            field: ARG_DRIVER_ID,
            env: ENV_CYCLE_DRIVER_ID,
        })?;
        let planned_start = args.planned_start.ok_or(CliError::MissingArgument {
            field: ARG_PLANNED_START,
            env: ENV_CYCLE_PLANNED_START,
        })?;
        Ok(Self {
            driver: DriverId(driver_id),
            planned_start,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CycleOutput {
    pub(crate) driver_id: DriverId,
    pub(crate) planned_start: DateTime<Utc>,
    #[serde(flatten)]
    pub(crate) cycle: CycleState,
}

pub(crate) fn run_cycle(args: CycleArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_cycle_with(args, &mut stdout)
}

pub(crate) fn run_cycle_with(args: CycleArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = SqliteTripStore::open(&config.database)?;
    let cycle = resolve_cycle_state(
        &store,
        config.driver,
        config.planned_start,
        &HosRules::default(),
    )
    .map_err(|source| CliError::Plan { source })?;
    write_json(
        writer,
        &CycleOutput {
            driver_id: config.driver,
            planned_start: config.planned_start,
            cycle,
        },
    )
}
