//! JSON line formatter for `tracing` events.
//!
//! Every event becomes one object:
//! `{"ts","level","logger","msg","request_id","env", ...fields}`.
//! `request_id` comes from the event itself when given, otherwise from the
//! task's correlation slot, otherwise `null`.

use crate::correlation;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Top-level keys owned by the record; colliding event fields move to `field.<key>`.
const RESERVED_KEYS: [&str; 5] = ["ts", "level", "logger", "msg", "env"];

/// A fully-formed structured log event.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub ts: String,
    pub level: String,
    pub logger: String,
    pub msg: String,
    pub request_id: Option<String>,
    pub env: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    /// Build a record, resolving `request_id` from `fields` or the correlation slot.
    pub fn new(
        level: &Level,
        logger: &str,
        msg: impl Into<String>,
        env: &str,
        mut fields: Map<String, Value>,
    ) -> Self {
        let explicit = match fields.remove("request_id") {
            Some(Value::String(id)) => Some(id),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        for key in RESERVED_KEYS {
            if let Some(value) = fields.remove(key) {
                fields.insert(format!("field.{key}"), value);
            }
        }
        Self {
            ts: format_timestamp(Utc::now()),
            level: level.to_string(),
            logger: logger.to_string(),
            msg: msg.into(),
            request_id: explicit.or_else(correlation::current),
            env: env.to_string(),
            fields,
        }
    }

    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({
                "ts": self.ts,
                "level": self.level,
                "logger": self.logger,
                "msg": self.msg,
                "request_id": self.request_id,
                "env": self.env,
                "log_error": e.to_string(),
            })
            .to_string()
        })
    }
}

fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

// ─── Field capture ─────────────────────────────────────────────────────────

/// Collects event fields as JSON values, coercing anything that is not a
/// plain scalar instead of failing.
#[derive(Default)]
struct JsonFieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl JsonFieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for JsonFieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN / infinity have no JSON form
        let value = serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.insert(field, value);
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{value:?}")));
    }
}

// ─── Formatter ─────────────────────────────────────────────────────────────

/// `FormatEvent` that renders each event as a [`LogRecord`] line tagged with `env`.
#[derive(Debug, Clone)]
pub struct JsonLogFormat {
    env: String,
}

impl JsonLogFormat {
    pub fn new(env: impl Into<String>) -> Self {
        Self { env: env.into() }
    }

    pub fn record_for(&self, event: &Event<'_>) -> LogRecord {
        let mut visitor = JsonFieldVisitor::default();
        event.record(&mut visitor);
        let meta = event.metadata();
        LogRecord::new(
            meta.level(),
            meta.target(),
            visitor.message.unwrap_or_default(),
            &self.env,
            visitor.fields,
        )
    }
}

impl<S, N> FormatEvent<S, N> for JsonLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        writeln!(writer, "{}", self.record_for(event).to_json_line())
    }
}
