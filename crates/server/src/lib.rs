pub mod handler;
pub mod middleware;

use axum::http::{HeaderValue, Method};
use axum::{Router, middleware as axum_mw};
use quill_core::config::{STATIC_BASE, Settings};
use quill_core::readiness::ReadinessProber;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub prober: Arc<ReadinessProber>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            prober: Arc::new(ReadinessProber::with_default_drivers()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.cors_allow_origins);
    let static_files = ServeDir::new(&state.settings.static_dir);

    let api_routes = Router::new()
        .route("/health", axum::routing::get(handler::health::health))
        .route("/health/ready", axum::routing::get(handler::health::ready))
        .route("/config", axum::routing::get(handler::config::public_config));

    // Compose pages + api + static, then global middleware layers (inner → outer)
    Router::new()
        .route("/", axum::routing::get(handler::home::index))
        .nest("/api", api_routes)
        .nest_service(STATIC_BASE, static_files)
        .layer(cors)
        .layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::security_headers::security_headers_middleware,
        ))
        .layer(axum_mw::from_fn(
            middleware::request_context::request_context_middleware,
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// Permissive when no origins are configured, otherwise an explicit allow-list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::OPTIONS])
}
