use std::time::Duration;

/// Settings that could not be parsed from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Failure of a single backing-store probe.
///
/// The `Display` text may carry driver wording and is only logged. HTTP
/// callers see [`ProbeError::category`] and nothing else.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("authentication failed")]
    Authentication,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid connection string: {0}")]
    InvalidTarget(String),

    #[error("database error: {0}")]
    Database(String),
}

impl ProbeError {
    /// Stable, credential-free name of the failure class.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "Timeout",
            Self::Connection(_) => "ConnectionError",
            Self::Authentication => "AuthenticationError",
            Self::Protocol(_) => "ProtocolError",
            Self::InvalidTarget(_) => "InvalidConnectionString",
            Self::Database(_) => "DatabaseError",
        }
    }
}

// SQLSTATE classes for rejected credentials (postgres).
const AUTH_SQLSTATES: &[&str] = &["28P01", "28000"];
// SQLITE_CANTOPEN primary result code.
const SQLITE_CANTOPEN: &str = "14";

impl From<sqlx::Error> for ProbeError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(io) => Self::Connection(io.kind().to_string()),
            sqlx::Error::Tls(_) => Self::Connection("tls handshake failed".into()),
            sqlx::Error::Protocol(msg) => Self::Protocol(msg),
            sqlx::Error::Configuration(_) => {
                Self::InvalidTarget("rejected by driver".into())
            }
            sqlx::Error::PoolTimedOut => Self::Timeout(Duration::ZERO),
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
                if AUTH_SQLSTATES.contains(&code.as_str()) {
                    Self::Authentication
                } else if code == SQLITE_CANTOPEN {
                    Self::Connection(db.message().to_string())
                } else {
                    Self::Database(db.message().to_string())
                }
            }
            other => Self::Database(other.to_string()),
        }
    }
}
