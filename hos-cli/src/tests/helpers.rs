//! Test helpers for temporary trip stores and request files.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, TimeZone, Utc};
use geo::Coord;
use hos_core::{DriverId, PlanRequest};
use hos_data::SqliteTripStore;
use std::fs;
use tempfile::TempDir;

/// A scratch directory holding a trip store and request files.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("hos.db")
    }

    pub(super) fn request_path(&self) -> Utf8PathBuf {
        self.root.join("request.json")
    }

    /// Register a driver directly in the workspace store.
    pub(super) fn register_driver(&self, name: &str, email: &str) -> DriverId {
        let mut store = SqliteTripStore::open(&self.database()).expect("open store");
        store.register_driver(name, email).expect("register driver").id
    }

    pub(super) fn trip_count(&self) -> u64 {
        SqliteTripStore::open(&self.database())
            .expect("open store")
            .trip_count()
            .expect("count trips")
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write file");
}

pub(super) fn planned_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 5, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Thirteen hours of driving on the linear test road.
pub(super) fn long_haul(driver: DriverId) -> PlanRequest {
    PlanRequest {
        driver_id: driver,
        current: Coord { x: 0.0, y: 0.0 },
        pickup: Coord { x: 3.0, y: 0.0 },
        dropoff: Coord { x: 13.0, y: 0.0 },
        planned_start: planned_start(),
    }
}

pub(super) fn write_request(path: &Utf8Path, request: &PlanRequest) {
    let payload = serde_json::to_string_pretty(request).expect("serialize request");
    write_utf8(path, payload.as_bytes());
}
