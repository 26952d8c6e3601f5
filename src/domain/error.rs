//! Error taxonomy for the dynamic endpoint engine

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Configuration errors: a declaration that cannot become a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported type '{type_name}' for field '{field}'")]
    UnsupportedFieldType { field: String, type_name: String },

    #[error("HTTP methods string cannot be null or empty")]
    EmptyMethods,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("No valid HTTP methods provided in: {0}")]
    NoValidMethods(String),

    #[error("Endpoint name must not be empty")]
    EmptyEndpoint,

    #[error("Endpoint name '{0}' must be a single URL path segment")]
    InvalidEndpoint(String),

    #[error("Duplicate endpoint name '{0}'")]
    DuplicateEndpoint(String),

    #[error("Invalid declaration '{name}': {source}")]
    Declaration {
        name: String,
        #[source]
        source: Box<DefinitionError>,
    },
}

/// Two bindings claiming the same method and path.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Route {method} {path} is already bound (endpoint '{endpoint}')")]
    DuplicateRoute {
        method: String,
        path: String,
        endpoint: String,
    },
}

/// Failures of the record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("No ids left for endpoint: {0}")]
    IdSpaceExhausted(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Seeding failure; fatal for the definition it names.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to serialize mock data for endpoint '{endpoint}': {source}")]
    Serialization {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to store mock data for endpoint '{endpoint}': {source}")]
    Store {
        endpoint: String,
        #[source]
        source: StoreError,
    },
}

impl SeedError {
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Serialization { endpoint, .. } | Self::Store { endpoint, .. } => endpoint,
        }
    }
}

/// Request-time errors produced by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid id '{0}': expected an integer")]
    InvalidId(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Resource not found")]
    NotFound,

    #[error("The ID {id} is over the maximum number of entries (maxCount: {max}) for endpoint: {endpoint}")]
    ExceedsMaximum { id: i64, max: i64, endpoint: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::ExceedsMaximum { .. } => StatusCode::NOT_FOUND,
            Self::Store(StoreError::IdSpaceExhausted(_)) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = json!({ "error": self.to_string() }).to_string();
        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
