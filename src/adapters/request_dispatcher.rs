//! Generic CRUD handler shared by every dynamically registered endpoint
//!
//! Nothing here is specific to one endpoint: the router hands in the
//! endpoint name it matched, the operation bound to that route, and
//! whatever id and body it extracted.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::adapters::definition_registry::DefinitionRegistry;
use crate::adapters::metrics_handler::MetricsCollector;
use crate::domain::{DispatchError, RecordStore, UpsertOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request data the router extracted for one call.
#[derive(Debug, Default)]
pub struct DispatchInput {
    /// Raw `{id}` path segment
    pub id: Option<String>,
    /// Parsed JSON object body, or the reason it could not be parsed
    pub body: Option<Result<Map<String, Value>, String>>,
}

impl DispatchInput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            body: None,
        }
    }

    pub fn with_body(body: Result<Map<String, Value>, String>) -> Self {
        Self {
            id: None,
            body: Some(body),
        }
    }

    pub fn with_id_and_body(id: impl Into<String>, body: Result<Map<String, Value>, String>) -> Self {
        Self {
            id: Some(id.into()),
            body: Some(body),
        }
    }

    fn id(&self) -> Result<i64, DispatchError> {
        parse_id(self.id.as_deref().unwrap_or_default())
    }

    fn take_body(&mut self) -> Result<Map<String, Value>, DispatchError> {
        match self.body.take() {
            Some(Ok(body)) => Ok(body),
            Some(Err(reason)) => Err(DispatchError::InvalidBody(reason)),
            None => Ok(Map::new()),
        }
    }
}

/// Parses an `{id}` path segment.
pub fn parse_id(raw: &str) -> Result<i64, DispatchError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DispatchError::InvalidId(raw.to_string()))
}

pub struct RequestDispatcher {
    registry: Arc<DefinitionRegistry>,
    store: Arc<dyn RecordStore>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl RequestDispatcher {
    pub fn new(registry: Arc<DefinitionRegistry>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            registry,
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs one operation and renders the outcome, including errors, as a response.
    pub async fn dispatch(
        &self,
        operation: Operation,
        endpoint: &str,
        mut input: DispatchInput,
    ) -> Response {
        let started = Instant::now();
        tracing::debug!(
            "Dispatching {} on endpoint {} (id={:?})",
            operation,
            endpoint,
            input.id
        );

        let result = match operation {
            Operation::List => self.list(endpoint).await,
            Operation::Get => match input.id() {
                Ok(id) => self.get(endpoint, id).await,
                Err(e) => Err(e),
            },
            Operation::Create => match input.take_body() {
                Ok(body) => self.create(endpoint, body).await,
                Err(e) => Err(e),
            },
            Operation::Update => match (input.id(), input.take_body()) {
                (Ok(id), Ok(body)) => self.update(endpoint, id, body).await,
                (Err(e), _) | (_, Err(e)) => Err(e),
            },
            Operation::Delete => match input.id() {
                Ok(id) => self.delete(endpoint, id).await,
                Err(e) => Err(e),
            },
        };

        let response = result.unwrap_or_else(IntoResponse::into_response);

        if let Some(metrics) = &self.metrics {
            metrics.observe(
                operation.as_str(),
                endpoint,
                response.status().as_u16(),
                started.elapsed().as_secs_f64(),
            );
        }
        response
    }

    /// All records of `endpoint` as `[{"id": .., "data": ..}]`, ascending by id.
    pub async fn list(&self, endpoint: &str) -> Result<Response, DispatchError> {
        let records = self.store.list(endpoint).await?;
        tracing::trace!("Listing {} records for endpoint: {}", records.len(), endpoint);

        let items: Vec<Value> = records
            .into_iter()
            .map(|record| {
                let data = serde_json::from_str::<Value>(&record.data)
                    .unwrap_or(Value::String(record.data));
                json!({ "id": record.internal_id, "data": data })
            })
            .collect();

        Ok((StatusCode::OK, Json(Value::Array(items))).into_response())
    }

    pub async fn get(&self, endpoint: &str, id: i64) -> Result<Response, DispatchError> {
        match self.store.find(endpoint, id).await? {
            Some(record) => Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                record.data,
            )
                .into_response()),
            None => {
                let max = self
                    .registry
                    .get_by_endpoint(endpoint)
                    .map(|definition| definition.count());
                match max {
                    Some(max) if id > max => Err(DispatchError::ExceedsMaximum {
                        id,
                        max,
                        endpoint: endpoint.to_string(),
                    }),
                    _ => Err(DispatchError::NotFound),
                }
            }
        }
    }

    pub async fn create(
        &self,
        endpoint: &str,
        body: Map<String, Value>,
    ) -> Result<Response, DispatchError> {
        let id = self
            .store
            .create(endpoint, Value::Object(body).to_string())
            .await?;
        tracing::debug!("Created resource {} for endpoint: {}", id, endpoint);

        Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Resource created successfully", "id": id })),
        )
            .into_response())
    }

    /// Replaces the payload at `id`, or inserts it under that exact id.
    pub async fn update(
        &self,
        endpoint: &str,
        id: i64,
        body: Map<String, Value>,
    ) -> Result<Response, DispatchError> {
        let outcome = self
            .store
            .upsert(endpoint, id, Value::Object(body).to_string())
            .await?;

        let message = match outcome {
            UpsertOutcome::Created => {
                format!("A new entry was added with id: {} for endpoint: {}", id, endpoint)
            }
            UpsertOutcome::Updated => format!("Resource {} updated successfully", id),
        };
        tracing::debug!("{}", message);

        Ok((StatusCode::OK, Json(json!({ "message": message, "id": id }))).into_response())
    }

    pub async fn delete(&self, endpoint: &str, id: i64) -> Result<Response, DispatchError> {
        if !self.store.delete(endpoint, id).await? {
            return Err(DispatchError::NotFound);
        }

        Ok((
            StatusCode::OK,
            Json(json!({
                "message": format!("Resource {} deleted successfully", id),
                "id": id
            })),
        )
            .into_response())
    }
}
