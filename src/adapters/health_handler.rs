use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::definition_registry::DefinitionRegistry;
use crate::domain::RecordStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub definitions: String,
    pub endpoints: usize,
    pub store: String,
}

pub struct HealthHandler {
    registry: Arc<DefinitionRegistry>,
    store: Arc<dyn RecordStore>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(registry: Arc<DefinitionRegistry>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            registry,
            store,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let uptime = self.start_time.elapsed().as_secs();
        let endpoints = self.registry.len();
        let store = match self.store.health_check().await {
            Ok(()) => "ok".to_string(),
            Err(e) => format!("error: {}", e),
        };
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            checks: HealthChecks {
                definitions: if endpoints > 0 { "ok" } else { "empty" }.to_string(),
                endpoints,
                store,
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - 503 until at least one endpoint is declared and
    /// the record store answers.
    ///
    /// Routes only exist after seeding, so a router serving this is past startup.
    pub async fn ready(&self) -> impl IntoResponse {
        if self.registry.is_empty() {
            return (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({
                "status": "not_ready",
                "message": "No endpoint definitions loaded"
            })));
        }

        if let Err(e) = self.store.health_check().await {
            tracing::warn!("Record store health check failed: {}", e);
            return (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({
                "status": "not_ready",
                "message": format!("Record store unavailable: {}", e)
            })));
        }

        (StatusCode::OK, Json(serde_json::json!({
            "status": "ready",
            "message": format!("Serving {} endpoints", self.registry.len())
        })))
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "alive",
            "message": "Server is alive"
        })))
    }
}
