use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "vagr-site"
    }))
}

/// GET /__paths
/// Debug helper: where submissions are being written.
pub async fn paths_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "instance": state.config.data_dir.display().to_string(),
    }))
}
