use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health — degraded status is reported in the body, not the status code.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": if database == "connected" { "ok" } else { "error" },
        "timestamp": Utc::now().to_rfc3339(),
        "database": database,
    }))
}
