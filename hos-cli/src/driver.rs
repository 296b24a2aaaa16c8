//! `register-driver` command.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use hos_data::SqliteTripStore;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_EMAIL, ARG_NAME, CliError, DEFAULT_DATABASE, ENV_REGISTER_EMAIL,
    ENV_REGISTER_NAME, write_json,
};

/// CLI arguments for the `register-driver` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Register a driver in the trip store")]
#[ortho_config(prefix = "HOS")]
pub(crate) struct RegisterDriverArgs {
    /// Display name, at most 21 characters.
    #[arg(long = ARG_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) name: Option<String>,
    /// Contact email address; must be unique.
    #[arg(long = ARG_EMAIL, value_name = "email")]
    #[serde(default)]
    pub(crate) email: Option<String>,
    /// Path to the SQLite trip store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

pub(crate) fn run_register_driver(args: RegisterDriverArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_register_driver_with(args, &mut stdout)
}

pub(crate) fn run_register_driver_with(
    args: RegisterDriverArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let name = merged.name.ok_or(CliError::MissingArgument {
        field: ARG_NAME,
        env: ENV_REGISTER_NAME,
    })?;
    let email = merged.email.ok_or(CliError::MissingArgument {
        field: ARG_EMAIL,
        env: ENV_REGISTER_EMAIL,
    })?;
    let database = merged
        .database
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));

    let mut store = SqliteTripStore::open(&database)?;
    let driver = store.register_driver(&name, &email)?;
    info!("registered driver {} in {database}", driver.id.0);
    write_json(writer, &driver)
}
