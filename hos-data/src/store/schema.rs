//! Table layout for the trip store.
//!
//! Every derived table cascades from `trips`, which cascades from `drivers`,
//! so deleting a driver removes their whole history.

use rusqlite::Connection;

use super::StoreError;

/// Longest display name a driver may register with.
pub const MAX_DRIVER_NAME_CHARS: usize = 21;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS drivers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(name) BETWEEN 1 AND 21),
    email TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS trips (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    driver_id INTEGER NOT NULL REFERENCES drivers (id) ON DELETE CASCADE,
    ways TEXT NOT NULL,
    total_distance_m REAL NOT NULL,
    -- whole seconds, not time of day: multi-sleeper trips drive past 24 hours
    total_driving_seconds INTEGER NOT NULL CHECK (total_driving_seconds >= 0),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS trips_by_driver ON trips (driver_id);
CREATE TABLE IF NOT EXISTS driving_segments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trip_id INTEGER NOT NULL REFERENCES trips (id) ON DELETE CASCADE,
    start_at TEXT NOT NULL,
    driving TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS driving_segments_by_trip ON driving_segments (trip_id);
CREATE TABLE IF NOT EXISTS break_periods (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trip_id INTEGER NOT NULL REFERENCES trips (id) ON DELETE CASCADE,
    begin_at TEXT NOT NULL,
    end_at TEXT NOT NULL,
    reason TEXT NOT NULL CHECK (reason IN ('rest', 'refuel', 'pickup', 'dropoff'))
);
CREATE INDEX IF NOT EXISTS break_periods_by_trip ON break_periods (trip_id);
CREATE TABLE IF NOT EXISTS fuel_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trip_id INTEGER NOT NULL UNIQUE REFERENCES trips (id) ON DELETE CASCADE,
    distance_to_dropoff_m REAL NOT NULL
);
";

/// Enable foreign keys and create any missing tables.
pub fn initialise(connection: &mut Connection) -> Result<(), StoreError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| StoreError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| StoreError::BeginTransaction { source })?;
    transaction
        .execute_batch(SCHEMA)
        .map_err(|source| StoreError::CreateSchema { source })?;
    transaction
        .commit()
        .map_err(|source| StoreError::Commit { source })
}
