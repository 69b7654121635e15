use axum::response::Json;
use serde_json::{Value, json};

/// Liveness of the callback listener, so a caller can check the redirect
/// target is reachable before sending the user to Spotify.
pub(crate) async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "callback": "/callback"
    }))
}
