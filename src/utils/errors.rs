use thiserror::Error;

/// Failure talking to one of the upstream data providers
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Upstream returned HTTP {0}")]
    Status(u16),
    #[error("Failed to parse response: {0}")]
    Decode(String),
    #[error("Response is missing field: {0}")]
    MissingField(&'static str),
    #[error("Upstream returned unusable {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: String, reason: String },
}

/// Outcome of a windowed read that did not produce data
#[derive(Debug, Error)]
pub enum QueryError {
    /// The window matched zero snapshots. Not a fault.
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a scheduled tick did not append a snapshot
#[derive(Debug, Error)]
pub enum TickError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("Append failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("Cannot compute statistics over an empty series")]
    EmptySeries,
}

/// Startup misconfiguration, the only fatal error class
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Extract clean error message from database error strings
///
/// Removes technical prefixes like:
/// "error returned from database: (code: 19) UNIQUE constraint failed: snapshot.id"
///
/// Returns only the meaningful error message:
/// "UNIQUE constraint failed: snapshot.id"
pub fn extract_clean_error(error_msg: &str) -> String {
    if error_msg.contains("error returned from database:") {
        if let Some(last_paren) = error_msg.rfind(") ") {
            return error_msg[last_paren + 2..].trim().to_string();
        }
        if let Some(last_colon) = error_msg.rfind(": ") {
            return error_msg[last_colon + 2..].trim().to_string();
        }
    }
    error_msg.to_string()
}
