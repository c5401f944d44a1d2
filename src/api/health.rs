use axum::response::Json;
use serde_json::{Value, json};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn unknown_endpoint() -> crate::api::ApiError {
    crate::api::ApiError::new(axum::http::StatusCode::NOT_FOUND, "Unknown endpoint")
}
