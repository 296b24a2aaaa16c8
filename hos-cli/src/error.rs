//! Error types emitted by the HOS CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use hos_core::PlanError;
use hos_data::{ProviderBuildError, StoreError};
use thiserror::Error;

/// Errors emitted by the HOS CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without the leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// Opening the plan request file failed.
    #[error("failed to open plan request at {path:?}: {source}")]
    OpenPlanRequest {
        /// Path of the request file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The plan request file is not a valid JSON plan request.
    #[error("failed to parse plan request at {path:?}: {source}")]
    ParsePlanRequest {
        /// Path of the request file.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// The OSRM route provider could not be constructed.
    #[error("failed to build route provider for {base_url}: {source}")]
    BuildRouteProvider {
        /// Configured OSRM base URL.
        base_url: String,
        /// Underlying build failure.
        #[source]
        source: ProviderBuildError,
    },
    /// The Overpass POI provider could not be constructed.
    #[error("failed to build POI provider for {endpoint}: {source}")]
    BuildPoiProvider {
        /// Configured Overpass endpoint.
        endpoint: String,
        /// Underlying build failure.
        #[source]
        source: ProviderBuildError,
    },
    /// The trip store failed.
    #[error("trip store failed: {0}")]
    Store(#[from] StoreError),
    /// Planning or the ledger failed.
    #[error("planning failed: {source}")]
    Plan {
        /// Underlying planning failure.
        #[source]
        source: PlanError,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
