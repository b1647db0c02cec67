//! Readiness probing of the optional backing store.
//!
//! `probe` resolves a connection string to one of three outcomes:
//! `skipped` (nothing configured, or no driver for the scheme), `ok`, or
//! `error`. Drivers are looked up in a scheme table, so adding a store means
//! registering another [`StoreProbe`].

mod postgres;
mod sqlite;

pub use postgres::PostgresProbe;
pub use sqlite::SqliteProbe;

use crate::error::ProbeError;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Lower bound applied to every probe timeout.
pub const MIN_PROBE_TIMEOUT: Duration = Duration::from_millis(50);

/// A scheme-specific liveness check against a backing store.
#[async_trait]
pub trait StoreProbe: Send + Sync {
    /// Connect to `target` and run a trivial query.
    async fn ping(&self, target: &str) -> Result<(), ProbeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Skipped,
    Ok,
    Error,
}

/// Outcome of one probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessResult {
    pub status: ProbeStatus,
    pub detail: String,
}

impl ReadinessResult {
    fn skipped(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Skipped,
            detail: detail.into(),
        }
    }

    /// `skipped` and `ok` both count as ready.
    pub fn ready(&self) -> bool {
        self.status != ProbeStatus::Error
    }

    /// Response body for the readiness endpoint.
    pub fn body(&self) -> ReadinessBody<'_> {
        ReadinessBody {
            ready: self.ready(),
            db: self.status,
            detail: &self.detail,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadinessBody<'a> {
    pub ready: bool,
    pub db: ProbeStatus,
    pub detail: &'a str,
}

/// Scheme → driver table plus the probe state machine.
#[derive(Clone, Default)]
pub struct ReadinessProber {
    drivers: HashMap<String, Arc<dyn StoreProbe>>,
}

impl ReadinessProber {
    /// An empty table: every configured store is reported as unsupported.
    pub fn new() -> Self {
        Self::default()
    }

    /// Postgres and SQLite drivers.
    pub fn with_default_drivers() -> Self {
        let postgres: Arc<dyn StoreProbe> = Arc::new(PostgresProbe);
        Self::new()
            .register("postgres", postgres.clone())
            .register("postgresql", postgres)
            .register("sqlite", Arc::new(SqliteProbe))
    }

    pub fn register(mut self, scheme: &str, probe: Arc<dyn StoreProbe>) -> Self {
        self.drivers.insert(scheme.to_ascii_lowercase(), probe);
        self
    }

    #[cfg(test)]
    fn supports(&self, scheme: &str) -> bool {
        self.drivers.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Probe `target` within `timeout` (never less than [`MIN_PROBE_TIMEOUT`]).
    pub async fn probe(&self, target: Option<&str>, timeout: Duration) -> ReadinessResult {
        let Some(target) = target.map(str::trim).filter(|t| !t.is_empty()) else {
            return ReadinessResult::skipped("not configured");
        };

        let Some(scheme) = parse_scheme(target) else {
            return ReadinessResult::skipped("unsupported scheme: <none>");
        };

        let Some(driver) = self.drivers.get(&scheme) else {
            tracing::debug!(scheme = %scheme, "No readiness driver for scheme");
            return ReadinessResult::skipped(format!("unsupported scheme: {scheme}"));
        };

        let timeout = timeout.max(MIN_PROBE_TIMEOUT);
        let started = Instant::now();
        let outcome = match tokio::time::timeout(timeout, driver.ping(target)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(timeout)),
        };
        let elapsed_ms = started.elapsed().as_millis();

        match outcome {
            Ok(()) => ReadinessResult {
                status: ProbeStatus::Ok,
                detail: format!("ok ({elapsed_ms}ms)"),
            },
            Err(e) => {
                tracing::warn!(
                    scheme = %scheme,
                    category = e.category(),
                    elapsed_ms = elapsed_ms as u64,
                    error = %e,
                    "Readiness probe failed"
                );
                ReadinessResult {
                    status: ProbeStatus::Error,
                    detail: format!("{} ({elapsed_ms}ms)", e.category()),
                }
            }
        }
    }
}

/// Scheme of a connection string: text before the first `:`, lowercased,
/// with any `+driver` suffix removed (`postgresql+asyncpg` → `postgresql`).
pub fn parse_scheme(target: &str) -> Option<String> {
    let (scheme, _) = target.split_once(':')?;
    let base = scheme.split('+').next().unwrap_or(scheme).trim();
    if base.is_empty() {
        return None;
    }
    Some(base.to_ascii_lowercase())
}

/// `target` with any `+driver` suffix stripped from its scheme.
pub(crate) fn strip_driver_suffix(target: &str) -> String {
    match target.split_once(':') {
        Some((scheme, rest)) if scheme.contains('+') => {
            let base = scheme.split('+').next().unwrap_or(scheme);
            format!("{base}:{rest}")
        }
        _ => target.to_string(),
    }
}
