//! SQLite-backed trip history and driver registry.
//!
//! [`SqliteTripStore`] implements [`TripRepository`]. A trip and everything
//! derived from it (driving segments, break periods, the optional fuel
//! event) are written in one transaction with foreign keys enforced, so a
//! failed save leaves nothing behind.
//!
//! # Example
//!
//! ```
//! use hos_data::store::SqliteTripStore;
//!
//! let mut store = SqliteTripStore::open_in_memory()?;
//! let driver = store.register_driver("Dana", "dana@example.com")?;
//! assert!(store.trips_for_driver(driver.id)?.is_empty());
//! # Ok::<(), hos_data::store::StoreError>(())
//! ```

mod error;
mod schema;

use std::ffi::c_int;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use chrono::{DateTime, Utc};
use hos_core::{
    BreakPeriod, BreakReason, Driver, DriverId, DrivingDuration, DrivingSegment, FuelEvent,
    RepositoryError, TripDecomposition, TripId, TripRecord, TripRepository, Waypoint,
};
use log::{debug, info};
use rusqlite::{
    Connection, Error as SqliteError, OptionalExtension, Row, Transaction, params,
};

pub use error::StoreError;
pub use schema::MAX_DRIVER_NAME_CHARS;

/// Extended result codes reported by SQLite for constraint failures.
const SQLITE_CONSTRAINT_FOREIGNKEY: c_int = 787;
const SQLITE_CONSTRAINT_UNIQUE: c_int = 2067;

/// Trip repository persisted in a SQLite database.
#[derive(Debug)]
pub struct SqliteTripStore {
    connection: Connection,
}

impl SqliteTripStore {
    /// Open (or create) a store at `path`.
    ///
    /// Parent directories are created automatically and missing tables are
    /// initialised.
    ///
    /// # Errors
    /// Returns [`StoreError::CreateDirectory`], [`StoreError::Open`], or a
    /// schema error when the database cannot be prepared.
    pub fn open(path: &Utf8Path) -> Result<Self, StoreError> {
        ensure_parent_dir(path)?;
        let mut connection =
            Connection::open(path.as_std_path()).map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        schema::initialise(&mut connection)?;
        debug!("opened trip store at {path}");
        Ok(Self { connection })
    }

    /// Open a private in-memory store.
    ///
    /// # Errors
    /// Returns [`StoreError::Open`] or a schema error.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let mut connection = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        schema::initialise(&mut connection)?;
        Ok(Self { connection })
    }

    /// Register a driver and return the stored record.
    ///
    /// Surrounding whitespace is trimmed from both fields.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidDriverName`] for an empty or over-long
    /// name, [`StoreError::InvalidEmail`] for a malformed address, and
    /// [`StoreError::DuplicateEmail`] when the address is taken.
    pub fn register_driver(&mut self, name: &str, email: &str) -> Result<Driver, StoreError> {
        let display_name = name.trim();
        let length = display_name.chars().count();
        if length == 0 || length > MAX_DRIVER_NAME_CHARS {
            return Err(StoreError::InvalidDriverName {
                name: display_name.to_owned(),
                max: MAX_DRIVER_NAME_CHARS,
            });
        }
        let address = email.trim();
        if !is_plausible_email(address) {
            return Err(StoreError::InvalidEmail {
                email: address.to_owned(),
            });
        }

        self.connection
            .execute(
                "INSERT INTO drivers (name, email) VALUES (?1, ?2)",
                params![display_name, address],
            )
            .map_err(|source| {
                if violates(&source, SQLITE_CONSTRAINT_UNIQUE) {
                    StoreError::DuplicateEmail {
                        email: address.to_owned(),
                    }
                } else {
                    StoreError::PersistRow {
                        table: "drivers",
                        source,
                    }
                }
            })?;
        let id = domain_id("drivers", self.connection.last_insert_rowid())?;
        info!("registered driver {id}");
        Ok(Driver {
            id: DriverId(id),
            name: display_name.to_owned(),
            email: address.to_owned(),
        })
    }

    /// Look up a registered driver.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownDriver`] when no driver has `id`.
    pub fn driver(&self, id: DriverId) -> Result<Driver, StoreError> {
        let raw = sql_id(id.0)?;
        let row = self
            .connection
            .query_row(
                "SELECT id, name, email FROM drivers WHERE id = ?1",
                [raw],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|source| StoreError::Query {
                table: "drivers",
                source,
            })?;
        let (stored, name, email) = row.ok_or(StoreError::UnknownDriver { driver_id: id.0 })?;
        Ok(Driver {
            id: DriverId(domain_id("drivers", stored)?),
            name,
            email,
        })
    }

    /// Delete a driver together with every trip and derived record they own.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownDriver`] when no driver has `id`.
    pub fn delete_driver(&mut self, id: DriverId) -> Result<(), StoreError> {
        let raw = sql_id(id.0)?;
        let removed = self
            .connection
            .execute("DELETE FROM drivers WHERE id = ?1", [raw])
            .map_err(|source| StoreError::PersistRow {
                table: "drivers",
                source,
            })?;
        if removed == 0 {
            return Err(StoreError::UnknownDriver { driver_id: id.0 });
        }
        info!("deleted driver {} and their trips", id.0);
        Ok(())
    }

    /// Persist a decomposed trip atomically.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownDriver`] when the owning driver is not
    /// registered. Any failure rolls the whole trip back.
    pub fn save_trip(&mut self, trip: &TripDecomposition) -> Result<TripId, StoreError> {
        let driver_id = sql_id(trip.driver.0)?;
        let ways = serde_json::to_string(&trip.waypoints)
            .map_err(|source| StoreError::SerializeWaypoints { source })?;
        // Segments are stored as time of day; the total can pass 24 hours.
        let total_driving = sql_seconds(trip.total_driving)?;

        let transaction = self
            .connection
            .transaction()
            .map_err(|source| StoreError::BeginTransaction { source })?;
        transaction
            .execute(
                "INSERT INTO trips (driver_id, ways, total_distance_m, total_driving_seconds, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    driver_id,
                    ways,
                    trip.total_distance_m,
                    total_driving,
                    trip.created_at
                ],
            )
            .map_err(|source| {
                if violates(&source, SQLITE_CONSTRAINT_FOREIGNKEY) {
                    StoreError::UnknownDriver {
                        driver_id: trip.driver.0,
                    }
                } else {
                    StoreError::PersistRow {
                        table: "trips",
                        source,
                    }
                }
            })?;
        let trip_id = TripId(domain_id("trips", transaction.last_insert_rowid())?);
        persist_derived(
            &transaction,
            trip_id,
            &trip.driving_segments,
            &trip.breaks,
            trip.fuel_event,
        )?;
        transaction
            .commit()
            .map_err(|source| StoreError::Commit { source })?;
        info!(
            "stored trip {} for driver {} ({} segments, {} breaks)",
            trip_id.0,
            trip.driver.0,
            trip.driving_segments.len(),
            trip.breaks.len()
        );
        Ok(trip_id)
    }

    /// Attach derived records to an existing trip atomically.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownTripReference`] when `trip` does not
    /// exist. Nothing is written in that case.
    pub fn save_derived_records(
        &mut self,
        trip: TripId,
        segments: &[DrivingSegment],
        breaks: &[BreakPeriod],
        fuel_event: Option<FuelEvent>,
    ) -> Result<(), StoreError> {
        let raw = sql_id(trip.0)?;
        let transaction = self
            .connection
            .transaction()
            .map_err(|source| StoreError::BeginTransaction { source })?;
        let exists = transaction
            .query_row("SELECT 1 FROM trips WHERE id = ?1", [raw], |_| Ok(()))
            .optional()
            .map_err(|source| StoreError::Query {
                table: "trips",
                source,
            })?;
        if exists.is_none() {
            return Err(StoreError::UnknownTripReference { trip_id: trip.0 });
        }
        persist_derived(&transaction, trip, segments, breaks, fuel_event)?;
        transaction
            .commit()
            .map_err(|source| StoreError::Commit { source })
    }

    /// Load one trip with its derived records.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownTripReference`] when no trip has `id`.
    pub fn trip(&self, id: TripId) -> Result<TripRecord, StoreError> {
        let raw = sql_id(id.0)?;
        let row = self
            .connection
            .query_row(
                "SELECT id, driver_id, ways, total_distance_m, total_driving_seconds, created_at
                 FROM trips WHERE id = ?1",
                [raw],
                TripRow::from_row,
            )
            .optional()
            .map_err(|source| StoreError::Query {
                table: "trips",
                source,
            })?
            .ok_or(StoreError::UnknownTripReference { trip_id: id.0 })?;
        self.hydrate(row)
    }

    /// Number of trips stored across all drivers.
    ///
    /// # Errors
    /// Returns [`StoreError::Query`] when the count cannot be read.
    pub fn trip_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM trips", [], |row| row.get(0))
            .map_err(|source| StoreError::Query {
                table: "trips",
                source,
            })?;
        u64::try_from(count).map_err(|_| StoreError::CorruptRow {
            table: "trips",
            reason: format!("negative count {count}"),
        })
    }

    /// Every trip recorded for `driver`, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError::UnknownDriver`] when the driver is not
    /// registered.
    pub fn trips_for_driver(&self, driver: DriverId) -> Result<Vec<TripRecord>, StoreError> {
        let registered = self.driver(driver)?;
        let raw = sql_id(registered.id.0)?;
        let rows = {
            let mut statement = self
                .connection
                .prepare(
                    "SELECT id, driver_id, ways, total_distance_m, total_driving_seconds, created_at
                     FROM trips WHERE driver_id = ?1 ORDER BY id",
                )
                .map_err(|source| StoreError::Prepare {
                    table: "trips",
                    source,
                })?;
            let mapped = statement
                .query_map([raw], TripRow::from_row)
                .map_err(|source| StoreError::Query {
                    table: "trips",
                    source,
                })?;
            mapped
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| StoreError::Query {
                    table: "trips",
                    source,
                })?
        };
        debug!("loaded {} trips for driver {}", rows.len(), driver.0);
        rows.into_iter().map(|row| self.hydrate(row)).collect()
    }

    fn hydrate(&self, row: TripRow) -> Result<TripRecord, StoreError> {
        let waypoints: Vec<Waypoint> =
            serde_json::from_str(&row.ways).map_err(|err| StoreError::CorruptRow {
                table: "trips",
                reason: format!("waypoints: {err}"),
            })?;
        let total_seconds =
            u64::try_from(row.total_driving_seconds).map_err(|_| StoreError::CorruptRow {
                table: "trips",
                reason: format!("negative driving total {}", row.total_driving_seconds),
            })?;
        Ok(TripRecord {
            id: TripId(domain_id("trips", row.id)?),
            trip: TripDecomposition {
                driver: DriverId(domain_id("trips", row.driver_id)?),
                created_at: row.created_at,
                waypoints,
                total_distance_m: row.total_distance_m,
                total_driving: Duration::from_secs(total_seconds),
                driving_segments: self.segments_for(row.id)?,
                breaks: self.breaks_for(row.id)?,
                fuel_event: self.fuel_event_for(row.id)?,
            },
        })
    }

    fn segments_for(&self, trip_id: i64) -> Result<Vec<DrivingSegment>, StoreError> {
        let mut statement = self
            .connection
            .prepare(
                "SELECT start_at, driving FROM driving_segments
                 WHERE trip_id = ?1 ORDER BY start_at, id",
            )
            .map_err(|source| StoreError::Prepare {
                table: "driving_segments",
                source,
            })?;
        let rows = statement
            .query_map([trip_id], |row| {
                Ok(DrivingSegment {
                    start: row.get(0)?,
                    driving: DrivingDuration::from_time_of_day(row.get(1)?),
                })
            })
            .map_err(|source| StoreError::Query {
                table: "driving_segments",
                source,
            })?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Query {
                table: "driving_segments",
                source,
            })
    }

    fn breaks_for(&self, trip_id: i64) -> Result<Vec<BreakPeriod>, StoreError> {
        let mut statement = self
            .connection
            .prepare(
                "SELECT begin_at, end_at, reason FROM break_periods
                 WHERE trip_id = ?1 ORDER BY begin_at, id",
            )
            .map_err(|source| StoreError::Prepare {
                table: "break_periods",
                source,
            })?;
        let rows = statement
            .query_map([trip_id], |row| {
                Ok((
                    row.get::<_, DateTime<Utc>>(0)?,
                    row.get::<_, DateTime<Utc>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|source| StoreError::Query {
                table: "break_periods",
                source,
            })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Query {
                table: "break_periods",
                source,
            })?;
        rows.into_iter()
            .map(|(begin, end, reason)| -> Result<BreakPeriod, StoreError> {
                let parsed = BreakReason::parse(&reason).ok_or_else(|| StoreError::CorruptRow {
                    table: "break_periods",
                    reason: format!("unknown reason {reason:?}"),
                })?;
                Ok(BreakPeriod {
                    begin,
                    end,
                    reason: parsed,
                })
            })
            .collect()
    }

    fn fuel_event_for(&self, trip_id: i64) -> Result<Option<FuelEvent>, StoreError> {
        self.connection
            .query_row(
                "SELECT distance_to_dropoff_m FROM fuel_events WHERE trip_id = ?1",
                [trip_id],
                |row| {
                    Ok(FuelEvent {
                        distance_to_dropoff_m: row.get(0)?,
                    })
                },
            )
            .optional()
            .map_err(|source| StoreError::Query {
                table: "fuel_events",
                source,
            })
    }
}

impl TripRepository for SqliteTripStore {
    fn load_trip_history(&self, driver: DriverId) -> Result<Vec<TripRecord>, RepositoryError> {
        self.trips_for_driver(driver)
            .map_err(|err| err.into_repository("load trip history"))
    }

    fn save_trip_decomposition(
        &mut self,
        trip: &TripDecomposition,
    ) -> Result<TripId, RepositoryError> {
        self.save_trip(trip)
            .map_err(|err| err.into_repository("save trip decomposition"))
    }
}

/// Columns of a `trips` row before its derived records are attached.
struct TripRow {
    id: i64,
    driver_id: i64,
    ways: String,
    total_distance_m: f64,
    total_driving_seconds: i64,
    created_at: DateTime<Utc>,
}

impl TripRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            driver_id: row.get(1)?,
            ways: row.get(2)?,
            total_distance_m: row.get(3)?,
            total_driving_seconds: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

fn persist_derived(
    transaction: &Transaction<'_>,
    trip: TripId,
    segments: &[DrivingSegment],
    breaks: &[BreakPeriod],
    fuel_event: Option<FuelEvent>,
) -> Result<(), StoreError> {
    let trip_id = sql_id(trip.0)?;

    if !segments.is_empty() {
        let mut statement = transaction
            .prepare("INSERT INTO driving_segments (trip_id, start_at, driving) VALUES (?1, ?2, ?3)")
            .map_err(|source| StoreError::Prepare {
                table: "driving_segments",
                source,
            })?;
        for segment in segments {
            statement
                .execute(params![
                    trip_id,
                    segment.start,
                    segment.driving.to_time_of_day()
                ])
                .map_err(|source| reference_error(trip, "driving_segments", source))?;
        }
    }

    if !breaks.is_empty() {
        let mut statement = transaction
            .prepare(
                "INSERT INTO break_periods (trip_id, begin_at, end_at, reason)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|source| StoreError::Prepare {
                table: "break_periods",
                source,
            })?;
        for period in breaks {
            statement
                .execute(params![
                    trip_id,
                    period.begin,
                    period.end,
                    period.reason.as_str()
                ])
                .map_err(|source| reference_error(trip, "break_periods", source))?;
        }
    }

    if let Some(event) = fuel_event {
        transaction
            .execute(
                "INSERT INTO fuel_events (trip_id, distance_to_dropoff_m) VALUES (?1, ?2)",
                params![trip_id, event.distance_to_dropoff_m],
            )
            .map_err(|source| reference_error(trip, "fuel_events", source))?;
    }
    Ok(())
}

fn reference_error(trip: TripId, table: &'static str, source: SqliteError) -> StoreError {
    if violates(&source, SQLITE_CONSTRAINT_FOREIGNKEY) {
        StoreError::UnknownTripReference { trip_id: trip.0 }
    } else {
        StoreError::PersistRow { table, source }
    }
}

fn violates(error: &SqliteError, extended_code: c_int) -> bool {
    matches!(
        error,
        SqliteError::SqliteFailure(failure, _) if failure.extended_code == extended_code
    )
}

fn sql_id(id: u64) -> Result<i64, StoreError> {
    i64::try_from(id).map_err(|_| StoreError::IdOutOfRange { id })
}

fn domain_id(table: &'static str, raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::CorruptRow {
        table,
        reason: format!("negative id {raw}"),
    })
}

fn sql_seconds(duration: Duration) -> Result<i64, StoreError> {
    let seconds = duration.as_secs();
    i64::try_from(seconds).map_err(|_| StoreError::DurationOutOfRange { seconds })
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    })
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    base_dir
        .create_dir_all(&relative)
        .map_err(|source| StoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })
}

fn base_dir_and_relative(parent: &Utf8Path) -> Result<(fs_utf8::Dir, Utf8PathBuf), StoreError> {
    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };

    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(|source| {
        StoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        }
    })?;

    Ok((dir, relative.to_path_buf()))
}
