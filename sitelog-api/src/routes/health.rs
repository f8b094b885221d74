//! Service banner and health check
//!
//! ```text
//! GET /         -> {"message": "...", "version": "0.1.0", "status": "active"}
//! GET /health   -> {"status": "healthy", "version": "0.1.0", "database": "connected", "timestamp": "..."}
//! ```

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct BannerResponse {
    pub message: String,
    pub version: String,
    pub status: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    pub version: String,
    /// "connected" or "disconnected"
    pub database: String,
    pub timestamp: DateTime<Utc>,
}

pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Sitelog task service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "active".to_string(),
    })
}

/// Reports whether the store answers a ping
///
/// Always 200; a failing store shows up as `degraded`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match state.stores.probe.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Health check failed");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        timestamp: Utc::now(),
    })
}
