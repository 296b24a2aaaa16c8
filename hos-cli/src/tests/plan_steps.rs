//! Behaviour-driven step definitions driving the plan CLI scenarios.

use super::helpers::{Workspace, long_haul, write_request, write_utf8};
use super::*;
use crate::plan::{BoxedPlanner, PlanConfig, PlannerBuilder, run_plan_with};
use hos_core::test_support::{LinearRouteProvider, StubPoiProvider};
use hos_core::{
    DriverId, PlanError, PoiProvider, RepositoryError, RouteProvider, StopKind, TripPlan,
    TripPlanner,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Planner builder that swaps the HTTP collaborators for the linear test road.
struct LinearPlannerBuilder;

impl PlannerBuilder for LinearPlannerBuilder {
    fn build(&self, _config: &PlanConfig) -> Result<BoxedPlanner, CliError> {
        let routes: Box<dyn RouteProvider> = Box::new(LinearRouteProvider::default());
        let pois: Box<dyn PoiProvider> = Box::new(StubPoiProvider::default());
        Ok(TripPlanner::new(routes, pois))
    }
}

#[derive(Debug)]
struct PlanWorld {
    workspace: Workspace,
    driver: RefCell<Option<DriverId>>,
    include_request: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl PlanWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            driver: RefCell::new(None),
            include_request: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["hos".to_string(), "plan".to_string()];
        if *self.include_request.borrow() {
            argv.push(self.workspace.request_path().into_string());
        }
        argv.extend([
            format!("--{ARG_DATABASE}"),
            self.workspace.database().into_string(),
        ]);
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }

    fn output(&self) -> serde_json::Value {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        serde_json::from_slice(&self.stdout.borrow()).expect("output should be JSON")
    }
}

#[fixture]
fn world() -> PlanWorld {
    PlanWorld::new()
}

// --- Given steps ---

#[given("a registered driver")]
fn registered_driver(#[from(world)] world: &PlanWorld) {
    let id = world.workspace.register_driver("Dana", "dana@example.com");
    world.driver.replace(Some(id));
}

#[given("a thirteen hour plan request for that driver")]
fn request_for_registered(#[from(world)] world: &PlanWorld) {
    let driver = world.driver.borrow().expect("driver registered");
    write_request(&world.workspace.request_path(), &long_haul(driver));
}

#[given("a thirteen hour plan request for driver {id}")]
fn request_for_numbered(#[from(world)] world: &PlanWorld, id: u64) {
    write_request(&world.workspace.request_path(), &long_haul(DriverId(id)));
}

#[given("I ask for the trip to be recorded")]
fn ask_to_record(#[from(world)] world: &PlanWorld) {
    world
        .cli_args
        .borrow_mut()
        .push(format!("--{ARG_RECORD}"));
}

#[given("the plan request contains invalid JSON")]
fn invalid_json(#[from(world)] world: &PlanWorld) {
    write_utf8(&world.workspace.request_path(), b"{ not valid json");
}

#[given("I omit the plan request path")]
fn omit_request_path(#[from(world)] world: &PlanWorld) {
    world.include_request.replace(false);
}

// --- When steps ---

#[when("I run the plan command")]
fn run_plan_command(#[from(world)] world: &PlanWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Plan(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_plan_with(args, &LinearPlannerBuilder, &mut *buffer)
        }
        other => panic!("expected plan command, found {other:?}"),
    });
    world.result.replace(Some(outcome));
}

// --- Then steps ---

#[then("the command prints stops origin, pickup, short-break, sleeper, dropoff")]
fn prints_stops(#[from(world)] world: &PlanWorld) {
    let plan: TripPlan = serde_json::from_value(world.output()).expect("output is a trip plan");
    let kinds: Vec<StopKind> = plan.waypoints.iter().map(|waypoint| waypoint.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StopKind::Origin,
            StopKind::Pickup,
            StopKind::ShortBreak,
            StopKind::Sleeper,
            StopKind::Dropoff,
        ]
    );
}

#[then("the command prints trip id {id}")]
fn prints_trip_id(#[from(world)] world: &PlanWorld, id: u64) {
    assert_eq!(world.output()["trip_id"], id);
}

#[then("no trip is stored")]
fn nothing_stored(#[from(world)] world: &PlanWorld) {
    assert_eq!(world.workspace.trip_count(), 0);
}

#[then("the store holds {count} trip")]
fn trips_stored(#[from(world)] world: &PlanWorld, count: u64) {
    assert_eq!(world.workspace.trip_count(), count);
}

#[then("the command fails because the request JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &PlanWorld) {
    match &*world.error() {
        CliError::ParsePlanRequest { .. } => {}
        other => panic!("expected ParsePlanRequest, found {other:?}"),
    }
}

#[then("the command fails because the request path is missing")]
fn fails_missing_path(#[from(world)] world: &PlanWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_PLAN_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because driver {id} is unknown")]
fn fails_unknown_driver(#[from(world)] world: &PlanWorld, id: u64) {
    match &*world.error() {
        CliError::Plan {
            source: PlanError::Repository(RepositoryError::UnknownDriver { driver_id }),
        } => assert_eq!(*driver_id, id),
        other => panic!("expected UnknownDriver, found {other:?}"),
    }
}

macro_rules! register_plan_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/plan_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: PlanWorld) {
            let _ = world;
        }
    };
}

register_plan_scenario!(plan_happy_path, "planning a request from JSON");
register_plan_scenario!(plan_and_record, "recording a planned trip");
register_plan_scenario!(plan_invalid_json, "rejecting invalid JSON input");
register_plan_scenario!(plan_missing_request, "rejecting missing request paths");
register_plan_scenario!(plan_unknown_driver, "planning for an unregistered driver");
