//! # restmock - declarative mock REST server
//!
//! Endpoints are declared as data (name, path segment, field schema, allowed
//! verbs, seed count). At startup every declaration becomes a set of CRUD
//! routes under `/api/<endpoint>`, pre-seeded with synthetic records.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use restmock::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let app = restmock::bootstrap(&settings).await?;
//!     let router = restmock::create_app(app);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: definitions, records, the `RecordStore` port and errors
//! - **Adapters**: registry, seeding, stores, routing, dispatch, health, metrics
//! - **Config**: layered settings and validation

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;

use crate::adapters::definition_registry::DefinitionRegistry;
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use crate::adapters::record_store::InMemoryRecordStore;
use crate::adapters::request_dispatcher::RequestDispatcher;
use crate::adapters::route_registrar::RouteRegistrar;
use crate::adapters::seed_generator::SeedGenerator;
use crate::adapters::sql_store::SqlRecordStore;
use crate::config::{Settings, StorageBackend, StorageSettings};
use crate::domain::RecordStore;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

/// Result of the startup phase: a populated registry, a seeded store and the
/// `/api` router bound to them.
pub struct Application {
    pub registry: Arc<DefinitionRegistry>,
    pub store: Arc<dyn RecordStore>,
    pub metrics: Arc<MetricsCollector>,
    pub api_router: Router,
}

/// Opens the configured record store.
pub async fn open_store(storage: &StorageSettings) -> anyhow::Result<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryRecordStore::new()),
        StorageBackend::Sqlite => {
            let url = storage
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("storage.url is required for the sqlite backend"))?;
            Arc::new(SqlRecordStore::connect(url, storage.max_connections).await?)
        }
    };

    if storage.reset_on_startup {
        store.clear().await?;
    }
    Ok(store)
}

/// Runs the startup phase in order: registry, store, seeding, routes.
///
/// Routes are built only after seeding has finished, so no request can see a
/// partially seeded endpoint. Any failure aborts startup.
pub async fn bootstrap(settings: &Settings) -> anyhow::Result<Application> {
    let registry = Arc::new(DefinitionRegistry::from_configs(&settings.endpoints)?);
    for definition in registry.definitions() {
        tracing::info!("Loaded definition: {}", definition);
    }
    if registry.is_empty() {
        tracing::warn!("No endpoint definitions loaded");
    }

    let store = open_store(&settings.storage).await?;
    let metrics = Arc::new(MetricsCollector::new()?);

    let seeded = SeedGenerator::new(store.clone())
        .with_metrics(metrics.clone())
        .seed_all(&registry)
        .await
        .map_err(|e| {
            tracing::error!("Seeding failed for endpoint {}: {}", e.endpoint(), e);
            e
        })?;
    tracing::info!("Seeded {} records across {} endpoints", seeded, registry.len());

    let dispatcher = Arc::new(
        RequestDispatcher::new(registry.clone(), store.clone()).with_metrics(metrics.clone()),
    );
    let api_router = RouteRegistrar::new(registry.clone(), dispatcher)
        .register_all()
        .map_err(|e| {
            tracing::error!("Route registration failed: {}", e);
            e
        })?;

    Ok(Application {
        registry,
        store,
        metrics,
        api_router,
    })
}

/// Assembles the full HTTP surface around the bootstrapped `/api` router.
pub fn create_app(app: Application) -> Router {
    let health_handler = Arc::new(HealthHandler::new(app.registry.clone(), app.store.clone()));
    let metrics_handler = Arc::new(MetricsHandler::new(app.metrics.clone()));

    let ops_router = Router::new()
        // Health check endpoints
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/metrics", get({
            let handler = metrics_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.metrics().await }
            }
        }))
        .route("/_definitions", get({
            let registry = app.registry.clone();
            move || {
                let r = registry.clone();
                async move { list_definitions(&r) }
            }
        }));

    ops_router
        .merge(app.api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

fn list_definitions(registry: &DefinitionRegistry) -> Json<Value> {
    let definitions: Vec<Value> = registry
        .definitions()
        .iter()
        .map(|d| {
            json!({
                "name": d.name(),
                "endpoint": d.endpoint_name(),
                "basePath": d.base_path(),
                "fields": d.fields(),
                "methods": d.methods(),
                "count": d.count(),
            })
        })
        .collect();
    Json(Value::Array(definitions))
}
