//! Per-request correlation id, access log line, and `X-Request-ID` stamping.

use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use quill_core::context::RequestContext;
use quill_core::correlation;
use std::net::SocketAddr;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub static X_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Target of the per-request access log line.
pub const ACCESS_LOG_TARGET: &str = "quill::access";

/// Establishes the request's correlation id (inbound `X-Request-ID`, then
/// `X-Correlation-ID`, else a new UUID v4), runs the rest of the stack inside
/// a correlation scope, logs one `http_request` line, and stamps
/// `X-Request-ID` on the response unless it is already set.
///
/// If the inner stack panics or the request is dropped mid-flight, the access
/// line is still written (status 0) and no header is stamped.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let ctx = RequestContext::new(
        inbound_request_id(request.headers()),
        client_addr(&request),
    );
    let request_id = ctx.request_id.clone();
    let access = AccessLog::start(&request, &ctx);
    request.extensions_mut().insert(ctx);

    correlation::scope(request_id.clone(), async move {
        let mut response = next.run(request).await;
        access.complete(response.status());
        stamp_request_id(&mut response, &request_id);
        response
    })
    .await
}

/// First non-empty value of `X-Request-ID` or `X-Correlation-ID`.
pub fn inbound_request_id(headers: &HeaderMap) -> Option<String> {
    [&X_REQUEST_ID, &X_CORRELATION_ID]
        .into_iter()
        .find_map(|name| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .map(String::from)
}

fn client_addr(request: &Request) -> Option<String> {
    let headers = request.headers();
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        })
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
}

fn stamp_request_id(response: &mut Response, request_id: &str) {
    if response.headers().contains_key(&X_REQUEST_ID) {
        return;
    }
    match HeaderValue::from_str(request_id) {
        Ok(value) => {
            response.headers_mut().insert(X_REQUEST_ID.clone(), value);
        }
        Err(_) => tracing::debug!("Request id is not a valid header value, not stamped"),
    }
}

/// Writes the access log line exactly once, when dropped.
struct AccessLog {
    ctx: RequestContext,
    method: String,
    path: String,
    query: String,
    user_agent: Option<String>,
    status: Option<StatusCode>,
}

impl AccessLog {
    fn start(request: &Request, ctx: &RequestContext) -> Self {
        Self {
            ctx: ctx.clone(),
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().unwrap_or_default().to_string(),
            user_agent: request
                .headers()
                .get(axum::http::header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            status: None,
        }
    }

    fn complete(mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl Drop for AccessLog {
    fn drop(&mut self) {
        let status = self.status.map_or(0, |s| s.as_u16());
        let duration_ms = self.ctx.elapsed_ms();
        tracing::info!(
            target: ACCESS_LOG_TARGET,
            event = "http_request",
            request_id = %self.ctx.request_id,
            method = %self.method,
            path = %self.path,
            query = %self.query,
            status,
            duration_ms,
            client = self.ctx.client_addr.as_deref(),
            user_agent = self.user_agent.as_deref(),
            "HTTP request"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn test_request_id_preferred_over_correlation_id() {
        let map = headers(&[("x-correlation-id", "corr"), ("x-request-id", "req")]);
        assert_eq!(inbound_request_id(&map).as_deref(), Some("req"));
    }

    #[test]
    fn test_correlation_id_fallback() {
        let map = headers(&[("x-correlation-id", "corr")]);
        assert_eq!(inbound_request_id(&map).as_deref(), Some("corr"));
    }

    #[test]
    fn test_blank_header_is_ignored() {
        let map = headers(&[("x-request-id", "  "), ("x-correlation-id", "corr")]);
        assert_eq!(inbound_request_id(&map).as_deref(), Some("corr"));
        assert_eq!(inbound_request_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_existing_response_header_kept() {
        let mut response = Response::new(axum::body::Body::empty());
        response
            .headers_mut()
            .insert(X_REQUEST_ID.clone(), HeaderValue::from_static("from-handler"));
        stamp_request_id(&mut response, "from-middleware");
        assert_eq!(response.headers()[&X_REQUEST_ID], "from-handler");
    }
}
