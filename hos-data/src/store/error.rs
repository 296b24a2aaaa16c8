use camino::Utf8PathBuf;
use hos_core::RepositoryError;
use rusqlite::Error as SqliteError;
use thiserror::Error;

/// Errors raised by [`SqliteTripStore`](super::SqliteTripStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path, `:memory:` for in-memory stores.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Enabling SQLite foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the tables failed.
    #[error("failed to create trip store schema")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning a transaction failed.
    #[error("failed to begin trip store transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing a transaction failed.
    #[error("failed to commit trip store transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing a statement failed.
    #[error("failed to prepare statement for {table}")]
    Prepare {
        /// Table the statement targets.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a row failed.
    #[error("failed to persist {table} row")]
    PersistRow {
        /// Table being written.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Reading rows failed.
    #[error("failed to query {table}")]
    Query {
        /// Table being read.
        table: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A stored row could not be turned back into a domain value.
    #[error("corrupt {table} row: {reason}")]
    CorruptRow {
        /// Table the row came from.
        table: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// An identifier could not be represented as an SQLite integer.
    #[error("id {id} exceeds SQLite i64 range")]
    IdOutOfRange {
        /// Identifier that failed the conversion.
        id: u64,
    },
    /// A duration could not be represented as an SQLite integer.
    #[error("duration of {seconds}s exceeds SQLite i64 range")]
    DurationOutOfRange {
        /// Whole seconds that failed the conversion.
        seconds: u64,
    },
    /// Serializing the waypoint list to JSON failed.
    #[error("failed to serialize trip waypoints")]
    SerializeWaypoints {
        /// Source error produced by `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The display name is empty or longer than the column allows.
    #[error("driver name {name:?} must be between 1 and {max} characters")]
    InvalidDriverName {
        /// Rejected name.
        name: String,
        /// Maximum length in characters.
        max: usize,
    },
    /// The contact address is not an email address.
    #[error("invalid driver email {email:?}")]
    InvalidEmail {
        /// Rejected address.
        email: String,
    },
    /// Another driver already uses the address.
    #[error("a driver with email {email:?} is already registered")]
    DuplicateEmail {
        /// Conflicting address.
        email: String,
    },
    /// The driver is not registered.
    #[error("unknown driver {driver_id}")]
    UnknownDriver {
        /// Rejected driver identifier.
        driver_id: u64,
    },
    /// A derived record referenced a trip that does not exist.
    #[error("unknown trip reference {trip_id}")]
    UnknownTripReference {
        /// Referenced trip identifier.
        trip_id: u64,
    },
}

impl StoreError {
    /// Convert into the repository taxonomy, labelling backend failures with
    /// `operation`.
    #[must_use]
    pub fn into_repository(self, operation: &'static str) -> RepositoryError {
        match self {
            Self::UnknownDriver { driver_id } => RepositoryError::UnknownDriver { driver_id },
            Self::UnknownTripReference { trip_id } => {
                RepositoryError::UnknownTripReference { trip_id }
            }
            other => RepositoryError::backend(operation, other),
        }
    }
}
