//! `plan` command implementation for the HOS CLI.

use std::io::{BufReader, Write};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use clap::Parser;
use hos_core::{PlanRequest, PoiProvider, RouteProvider, TripId, TripPlan, TripPlanner};
use hos_data::poi::{OverpassPoiProvider, OverpassPoiProviderConfig};
use hos_data::routing::{HttpRouteProvider, HttpRouteProviderConfig};
use hos_data::SqliteTripStore;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_OSRM_URL, ARG_OVERPASS_URL, ARG_PLAN_REQUEST, ARG_RECORD, ARG_TIMEOUT_SECS,
    CliError, DEFAULT_DATABASE, ENV_PLAN_REQUEST, write_json,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a trip from the driver's current position through a \
                 pickup to a dropoff. Rest, sleeper, and fuel stops are \
                 inserted against an OSRM router and an Overpass \
                 interpreter. The request is a JSON-encoded plan request.",
    about = "Plan an HOS compliant trip"
)]
#[ortho_config(prefix = "HOS")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing a plan request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Path to the SQLite trip store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_url: Option<String>,
    /// Overpass interpreter endpoint.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// Timeout for each routing and POI request, in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Record the planned trip in the driver's history.
    #[arg(long = ARG_RECORD)]
    #[serde(default)]
    pub(crate) record: bool,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Path to the SQLite trip store.
    pub(crate) database: Utf8PathBuf,
    /// Base URL for the OSRM route service.
    pub(crate) osrm_url: String,
    /// Overpass interpreter endpoint.
    pub(crate) overpass_url: String,
    /// Per-request timeout shared by both providers.
    pub(crate) timeout: Duration,
    /// Whether the plan is written to the trip store.
    pub(crate) record: bool,
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;

        let routing_defaults = HttpRouteProviderConfig::default();
        let timeout = args
            .timeout_secs
            .map_or(routing_defaults.timeout, Duration::from_secs);
        let overpass_url = args
            .overpass_url
            .unwrap_or_else(|| OverpassPoiProviderConfig::default().endpoint);

        Ok(Self {
            request_path,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            osrm_url: args.osrm_url.unwrap_or(routing_defaults.base_url),
            overpass_url,
            timeout,
            record: args.record,
        })
    }
}

/// Planner with its providers chosen at run time.
pub(crate) type BoxedPlanner = TripPlanner<Box<dyn RouteProvider>, Box<dyn PoiProvider>>;

/// Builds a planner for the current plan invocation.
pub(crate) trait PlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<BoxedPlanner, CliError>;
}

pub(crate) struct HttpPlannerBuilder;

impl PlannerBuilder for HttpPlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<BoxedPlanner, CliError> {
        let routing = HttpRouteProviderConfig::new(config.osrm_url.clone())
            .with_timeout(config.timeout);
        let routes: Box<dyn RouteProvider> = Box::new(
            HttpRouteProvider::with_config(routing).map_err(|source| {
                CliError::BuildRouteProvider {
                    base_url: config.osrm_url.clone(),
                    source,
                }
            })?,
        );

        let overpass = OverpassPoiProviderConfig::new(config.overpass_url.clone())
            .with_timeout(config.timeout);
        let pois: Box<dyn PoiProvider> = Box::new(
            OverpassPoiProvider::with_config(overpass).map_err(|source| {
                CliError::BuildPoiProvider {
                    endpoint: config.overpass_url.clone(),
                    source,
                }
            })?,
        );

        Ok(TripPlanner::new(routes, pois))
    }
}

/// What `hos plan` prints: the itinerary, plus the trip id when recorded.
#[derive(Debug, Serialize)]
pub(crate) struct PlanOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) trip_id: Option<TripId>,
    #[serde(flatten)]
    pub(crate) plan: TripPlan,
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &HttpPlannerBuilder, &mut stdout)
}

pub(crate) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let output = execute_plan(args, builder)?;
    write_json(writer, &output)
}

fn execute_plan(args: PlanArgs, builder: &dyn PlannerBuilder) -> Result<PlanOutput, CliError> {
    let config = args.into_config()?;
    let request = load_plan_request(&config.request_path)?;
    let planner = builder.build(&config)?;
    let mut store = SqliteTripStore::open(&config.database)?;

    if config.record {
        let recorded = planner
            .plan_and_record(&mut store, &request)
            .map_err(|source| CliError::Plan { source })?;
        info!(
            "trip {} stored in {}",
            recorded.trip_id.0, config.database
        );
        Ok(PlanOutput {
            trip_id: Some(recorded.trip_id),
            plan: recorded.plan,
        })
    } else {
        let plan = planner
            .plan_for(&store, &request)
            .map_err(|source| CliError::Plan { source })?;
        Ok(PlanOutput {
            trip_id: None,
            plan,
        })
    }
}

/// Loads a JSON-encoded [`PlanRequest`] from disk.
pub(crate) fn load_plan_request(path: &Utf8Path) -> Result<PlanRequest, CliError> {
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenPlanRequest {
            path: path.to_path_buf(),
            source,
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParsePlanRequest {
        path: path.to_path_buf(),
        source,
    })
}
