use super::StoreProbe;
use crate::error::ProbeError;
use async_trait::async_trait;
use sqlx::ConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;
use std::path::PathBuf;
use std::str::FromStr;

/// Opens the database file and runs `SELECT 1`.
///
/// The file is never created, so a missing file or directory is an error.
pub struct SqliteProbe;

#[derive(Debug, PartialEq, Eq)]
enum Location {
    Memory,
    File(PathBuf),
}

/// Accepts `sqlite:///relative`, `sqlite:////absolute`, `sqlite://` and
/// `sqlite:///:memory:`, plus the bare `sqlite:path` form.
fn location(target: &str) -> Result<Location, ProbeError> {
    let (_, rest) = target
        .split_once(':')
        .ok_or_else(|| ProbeError::InvalidTarget("missing scheme".into()))?;
    let rest = rest.split('?').next().unwrap_or(rest);
    let path = rest
        .strip_prefix("///")
        .or_else(|| rest.strip_prefix("//"))
        .unwrap_or(rest);

    if path.is_empty() || path == ":memory:" {
        Ok(Location::Memory)
    } else {
        Ok(Location::File(PathBuf::from(path)))
    }
}

#[async_trait]
impl StoreProbe for SqliteProbe {
    async fn ping(&self, target: &str) -> Result<(), ProbeError> {
        let options = match location(target)? {
            Location::Memory => SqliteConnectOptions::from_str("sqlite::memory:")?,
            Location::File(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(false),
        };
        let mut conn = options.connect().await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        sqlx::Connection::close(conn).await?;
        Ok(())
    }
}
