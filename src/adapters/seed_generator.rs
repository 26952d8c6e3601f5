use serde_json::{Map, Value};
use std::sync::Arc;

use crate::adapters::definition_registry::DefinitionRegistry;
use crate::adapters::metrics_handler::MetricsCollector;
use crate::adapters::mock_value::MockValueGenerator;
use crate::domain::{EndpointDefinition, RecordStore, SeedError};

/// Pre-populates each endpoint with `count` synthetic records.
pub struct SeedGenerator {
    store: Arc<dyn RecordStore>,
    values: MockValueGenerator,
    metrics: Option<Arc<MetricsCollector>>,
}

impl SeedGenerator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            values: MockValueGenerator::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Builds one flat JSON object with a stringified mock value per declared field.
    pub fn generate_entry(&self, definition: &EndpointDefinition) -> Map<String, Value> {
        definition
            .fields()
            .iter()
            .map(|(field, field_type)| {
                let value = self.values.generate(*field_type, field).to_string();
                tracing::trace!("Generated value for field {}: {}", field, value);
                (field.clone(), Value::String(value))
            })
            .collect()
    }

    /// Generates and stores `definition.count()` records; a non-positive count stores none.
    pub async fn seed(&self, definition: &EndpointDefinition) -> Result<usize, SeedError> {
        let endpoint = definition.endpoint_name();
        tracing::info!("Generating mock data for endpoint: {}", endpoint);

        let mut seeded = 0;
        for _ in 0..definition.count() {
            let entry = self.generate_entry(definition);
            let payload = serde_json::to_string(&entry).map_err(|source| {
                tracing::error!("Failed to generate mock data for endpoint: {}", endpoint);
                SeedError::Serialization {
                    endpoint: endpoint.to_string(),
                    source,
                }
            })?;

            let internal_id = self.store.create(endpoint, payload).await.map_err(|source| {
                tracing::error!("Failed to store mock data for endpoint: {}", endpoint);
                SeedError::Store {
                    endpoint: endpoint.to_string(),
                    source,
                }
            })?;
            tracing::trace!("Saved generated data for endpoint {} with id {}", endpoint, internal_id);
            seeded += 1;
        }

        if let Some(metrics) = &self.metrics {
            metrics
                .seeded_records
                .with_label_values(&[endpoint])
                .inc_by(seeded as f64);
        }
        tracing::info!("Seeded {} records for endpoint: {}", seeded, endpoint);
        Ok(seeded)
    }

    /// Seeds every definition in declaration order, stopping at the first failure.
    pub async fn seed_all(&self, registry: &DefinitionRegistry) -> Result<usize, SeedError> {
        let mut total = 0;
        for definition in registry.definitions() {
            total += self.seed(definition).await?;
        }
        Ok(total)
    }
}
