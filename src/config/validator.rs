use std::collections::HashMap;
use thiserror::Error;

use crate::config::{EndpointConfig, ServerSettings, Settings, StorageBackend, StorageSettings};
use crate::domain::definition::validate_endpoint_name;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Duplicate entry: {0}")]
    Duplicate(String),
}

/// Structural checks over the loaded settings.
///
/// Field types and method lists are checked later, when each declaration
/// becomes an `EndpointDefinition`.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_storage(&settings.storage) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_endpoints(&settings.endpoints) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_storage(storage: &StorageSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if storage.backend == StorageBackend::Sqlite
            && storage.url.as_deref().map_or(true, str::is_empty)
        {
            errors.push(ValidationError::MissingField("storage.url".to_string()));
        }

        if storage.max_connections == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "storage.max_connections".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_endpoints(endpoints: &[EndpointConfig]) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut seen = HashMap::new();

        for (idx, endpoint) in endpoints.iter().enumerate() {
            if endpoint.name.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!("endpoints[{}].name", idx)));
            }

            if endpoint.endpoint.trim().is_empty() {
                errors.push(ValidationError::MissingField(format!(
                    "endpoints[{}].endpoint",
                    idx
                )));
                continue;
            }

            if let Err(e) = validate_endpoint_name(&endpoint.endpoint) {
                errors.push(ValidationError::InvalidValue {
                    field: format!("endpoints[{}].endpoint", idx),
                    reason: e.to_string(),
                });
            }

            if let Some(prev_idx) = seen.insert(endpoint.endpoint.as_str(), idx) {
                errors.push(ValidationError::Duplicate(format!(
                    "Endpoint '{}' appears at indices {} and {}",
                    endpoint.endpoint, prev_idx, idx
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
