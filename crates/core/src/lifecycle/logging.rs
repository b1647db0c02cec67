//! Logging initialization with optional file-based daily rotation.

use crate::logging::JsonLogFormat;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Build a subscriber that writes one JSON line per event to `writer`.
pub fn build_subscriber<W>(
    env: &str,
    filter: EnvFilter,
    writer: W,
) -> impl Subscriber + Send + Sync + use<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(JsonLogFormat::new(env))
        .with_writer(writer)
        .finish()
}

/// Initialize the global tracing subscriber.
///
/// - `log_dir=None` → stderr output (default)
/// - `log_dir=Some(dir)` → daily rotating file appender with non-blocking writer
///
/// Returns an `Option<WorkerGuard>` that **must be held** for the lifetime of
/// the application to ensure buffered logs are flushed on shutdown.
pub fn init_logging(level: &str, env: &str, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "quill.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            build_subscriber(env, env_filter, non_blocking).init();
            Some(guard)
        }
        None => {
            build_subscriber(env, env_filter, std::io::stderr).init();
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Opaque {
        handle: Vec<u8>,
    }

    #[test]
    fn test_odd_fields_are_coerced() {
        let sink = Captured::default();
        let subscriber = build_subscriber("test", EnvFilter::new("info"), sink.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(
                blob = ?Opaque { handle: vec![1, 2] },
                ratio = f64::NAN,
                count = 3u64,
                ok = true,
                "odd fields"
            );
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["msg"], "odd fields");
        assert_eq!(line["env"], "test");
        assert_eq!(line["blob"], "Opaque { handle: [1, 2] }");
        assert_eq!(line["ratio"], Value::Null);
        assert_eq!(line["count"], 3);
        assert_eq!(line["ok"], true);
        assert_eq!(line["request_id"], Value::Null);
    }

    #[test]
    fn test_lines_are_plain_json() {
        let sink = Captured::default();
        let subscriber = build_subscriber("test", EnvFilter::new("info"), sink.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(env = "shadow", "plain");
        });

        let raw = String::from_utf8(sink.0.lock().unwrap().clone()).unwrap();
        assert!(!raw.contains('\u{1b}'));
        let lines = sink.lines();
        assert_eq!(lines[0]["env"], "test");
        assert_eq!(lines[0]["field.env"], "shadow");
    }

    #[test]
    fn test_filter_drops_lower_levels() {
        let sink = Captured::default();
        let subscriber = build_subscriber("test", EnvFilter::new("warn"), sink.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hidden");
            tracing::warn!(request_id = "r-1", "shown");
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["level"], "WARN");
        assert_eq!(lines[0]["request_id"], "r-1");
    }
}
