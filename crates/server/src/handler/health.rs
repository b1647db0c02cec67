use crate::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET /api/health — liveness; always 200.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let settings = &state.settings;
    Json(serde_json::json!({
        "status": "ok",
        "env": settings.app_env,
        "message": format!("{} API alive", settings.app_name),
    }))
}

/// GET /api/health/ready — probes the backing store; 200 when ready, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let settings = &state.settings;
    let target = settings.database_url.as_ref().map(|url| url.expose());
    let result = state
        .prober
        .probe(target, settings.readiness_timeout())
        .await;

    let status = if result.ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(result.body())).into_response()
}
