use std::time::Instant;

/// Per-request metadata established by the request-context middleware.
/// Inserted into request extensions so handlers can read it directly.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation identifier, inbound or freshly generated (UUID v4).
    pub request_id: String,
    /// Client address, if known.
    pub client_addr: Option<String>,
    /// When the request was received.
    pub start_time: Instant,
}

impl RequestContext {
    pub fn new(request_id: Option<String>, client_addr: Option<String>) -> Self {
        Self {
            request_id: request_id.unwrap_or_else(new_request_id),
            client_addr,
            start_time: Instant::now(),
        }
    }

    /// Whole milliseconds since the request was received.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start_time.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

pub fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_inbound_id() {
        let ctx = RequestContext::new(Some("abc-123".into()), None);
        assert_eq!(ctx.request_id, "abc-123");
    }

    #[test]
    fn test_generates_uuid_when_missing() {
        let a = RequestContext::new(None, Some("10.0.0.1".into()));
        let b = RequestContext::new(None, None);
        assert!(uuid::Uuid::parse_str(&a.request_id).is_ok());
        assert_ne!(a.request_id, b.request_id);
        assert_eq!(a.client_addr.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_elapsed_ms_counts_from_start() {
        let mut ctx = RequestContext::new(None, None);
        assert!(ctx.elapsed_ms() < 1_000);
        ctx.start_time -= std::time::Duration::from_millis(250);
        assert!(ctx.elapsed_ms() >= 250);
    }
}
