use std::collections::HashMap;
use std::sync::Arc;

use crate::config::EndpointConfig;
use crate::domain::{DefinitionError, EndpointDefinition};

/// Collection of endpoint definitions, populated once during startup.
///
/// Built mutably, then shared behind an `Arc`; after that every access is
/// a plain read, so the serving phase needs no locking.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: Vec<Arc<EndpointDefinition>>,
    by_endpoint: HashMap<String, usize>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from raw declarations, failing on the first bad one.
    pub fn from_configs(configs: &[EndpointConfig]) -> Result<Self, DefinitionError> {
        let mut registry = Self::new();
        for config in configs {
            let definition = EndpointDefinition::new(
                config.name.clone(),
                config.endpoint.clone(),
                &config.fields,
                &config.methods,
                config.count,
            )
            .map_err(|e| DefinitionError::Declaration {
                name: config.name.clone(),
                source: Box::new(e),
            })?;

            tracing::debug!(
                "Registered endpoint: {} (endpoint={}, methods={}, fields={:?}, count={})",
                definition.name(),
                definition.endpoint_name(),
                definition.methods(),
                definition.fields(),
                definition.count()
            );
            registry.add(definition)?;
        }
        Ok(registry)
    }

    /// Adds a definition; endpoint names must be unique.
    pub fn add(&mut self, definition: EndpointDefinition) -> Result<(), DefinitionError> {
        let endpoint = definition.endpoint_name().to_string();
        if self.by_endpoint.contains_key(&endpoint) {
            return Err(DefinitionError::DuplicateEndpoint(endpoint));
        }
        self.by_endpoint.insert(endpoint, self.definitions.len());
        self.definitions.push(Arc::new(definition));
        Ok(())
    }

    /// All definitions in declaration order.
    pub fn definitions(&self) -> &[Arc<EndpointDefinition>] {
        &self.definitions
    }

    pub fn get_by_endpoint(&self, endpoint_name: &str) -> Option<&Arc<EndpointDefinition>> {
        self.by_endpoint
            .get(endpoint_name)
            .and_then(|&idx| self.definitions.get(idx))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Only used to isolate tests.
    pub fn clear(&mut self) {
        self.definitions.clear();
        self.by_endpoint.clear();
    }
}
