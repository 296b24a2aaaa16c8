#![expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
//! Behavioural tests for resolving a driver's cycle state from history.

use std::cell::RefCell;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use hos_core::test_support::MemoryTripRepository;
use hos_core::{
    BreakPeriod, BreakReason, CycleState, DriverId, DrivingDuration, DrivingSegment, HosRules,
    PlanError, TripDecomposition, TripRepository, resolve_cycle_state,
};

const DRIVER: DriverId = DriverId(1);

struct LedgerWorld {
    repository: RefCell<MemoryTripRepository>,
    outcome: RefCell<Option<Result<CycleState, PlanError>>>,
}

#[fixture]
fn world() -> LedgerWorld {
    LedgerWorld {
        repository: RefCell::new(MemoryTripRepository::with_drivers([DRIVER])),
        outcome: RefCell::new(None),
    }
}

fn hour(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0)
        .single()
        .expect("valid reference time")
        + TimeDelta::hours(offset)
}

fn segment(start: i64, hours: u64) -> DrivingSegment {
    DrivingSegment {
        start: hour(start),
        driving: DrivingDuration::new(Duration::from_secs(hours * 3600)).expect("in range"),
    }
}

fn rest(begin: i64, hours: i64) -> BreakPeriod {
    BreakPeriod {
        begin: hour(begin),
        end: hour(begin + hours),
        reason: BreakReason::Rest,
    }
}

fn record(
    world: &LedgerWorld,
    created_at: i64,
    segments: Vec<DrivingSegment>,
    breaks: Vec<BreakPeriod>,
) {
    let total_driving = segments.iter().map(|s| s.driving.get()).sum();
    let trip = TripDecomposition {
        driver: DRIVER,
        created_at: hour(created_at),
        waypoints: Vec::new(),
        total_distance_m: 0.0,
        total_driving,
        driving_segments: segments,
        breaks,
        fuel_event: None,
    };
    world
        .repository
        .borrow_mut()
        .save_trip_decomposition(&trip)
        .expect("save trip");
}

#[given("a driver with no trip history")]
fn no_history(world: &LedgerWorld) {
    let _ = world;
}

#[given("a driver who drove {hours} hours from hour {start}")]
fn drove(world: &LedgerWorld, hours: u64, start: i64) {
    record(world, start, vec![segment(start, hours)], Vec::new());
}

#[given("a driver who drove 9 hours, slept 10 hours, then drove 2 hours")]
fn drove_slept_drove(world: &LedgerWorld) {
    record(world, 0, vec![segment(0, 9), segment(19, 2)], vec![rest(9, 10)]);
}

#[given("an earlier trip that drove 4 hours, rested 5, drove 3 hours, then rested 5")]
fn split_rest_trip(world: &LedgerWorld) {
    record(
        world,
        0,
        vec![segment(0, 4), segment(9, 3)],
        vec![rest(4, 5), rest(12, 5)],
    );
}

#[given("a later trip from hour {start} that drove {hours} hours")]
fn later_trip(world: &LedgerWorld, start: i64, hours: u64) {
    record(world, start, vec![segment(start, hours)], Vec::new());
}

#[when("the cycle state is resolved at hour {at}")]
fn resolve(world: &LedgerWorld, at: i64) {
    let repository = world.repository.borrow();
    let outcome = resolve_cycle_state(&*repository, DRIVER, hour(at), &HosRules::default());
    world.outcome.replace(Some(outcome));
}

fn resolved(world: &LedgerWorld) -> CycleState {
    let outcome = world.outcome.borrow();
    match outcome.as_ref().expect("cycle state resolved") {
        Ok(state) => *state,
        Err(err) => panic!("expected a cycle state, got {err}"),
    }
}

#[then("{seconds} seconds of driving remain")]
fn remaining(world: &LedgerWorld, seconds: u64) {
    assert_eq!(resolved(world).remaining_drive, Duration::from_secs(seconds));
}

#[then("{seconds} seconds of driving remain before the short break")]
fn before_break(world: &LedgerWorld, seconds: u64) {
    assert_eq!(resolved(world).rest_owed, Some(Duration::from_secs(seconds)));
}

#[then("the planned start is rejected")]
fn rejected(world: &LedgerWorld) {
    let outcome = world.outcome.borrow();
    assert!(
        matches!(outcome.as_ref(), Some(Err(PlanError::InvalidPlannedStart { .. }))),
        "expected InvalidPlannedStart, got {outcome:?}"
    );
}

#[scenario(path = "tests/features/ledger.feature", index = 0)]
fn fresh_driver(world: LedgerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ledger.feature", index = 1)]
fn recent_driving_carries_over(world: LedgerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ledger.feature", index = 2)]
fn early_start_rejected(world: LedgerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ledger.feature", index = 3)]
fn long_gap_resets(world: LedgerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ledger.feature", index = 4)]
fn sleeper_opens_new_cycle(world: LedgerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ledger.feature", index = 5)]
fn reset_in_earlier_trip(world: LedgerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/ledger.feature", index = 6)]
fn only_latest_trip_without_reset(world: LedgerWorld) {
    let _ = world;
}
