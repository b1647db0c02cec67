use crate::AppState;
use axum::Json;
use axum::extract::State;
use quill_core::config::PublicConfig;

/// GET /api/config — secret-free projection of runtime settings.
pub async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(state.settings.public_config())
}
