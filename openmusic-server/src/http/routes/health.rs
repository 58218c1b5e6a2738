//! Liveness probe
//!
//! Answers without touching the database, cache or broker.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::http::envelope::Envelope;

#[derive(Serialize)]
pub struct Health {
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /health
async fn health() -> Json<Envelope<Health>> {
    Json(Envelope::success(Health {
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
