use async_trait::async_trait;

pub mod definition;
pub mod error;
pub mod record;

pub use definition::{EndpointDefinition, FieldType, HttpMethod, MethodSet, API_BASE_PATH};
pub use error::{DefinitionError, DispatchError, RegistrationError, SeedError, StoreError};
pub use record::{GeneratedRecord, UpsertOutcome};

/// Storage for generated and client-written records, partitioned by endpoint.
///
/// Implementations must make `create` allocate ids atomically per endpoint
/// (`max(internal_id) + 1`, or 1 for an empty partition), and make `upsert`
/// and `delete` each a single check-then-act step.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores `data` under the next id for `endpoint` and returns that id.
    async fn create(&self, endpoint: &str, data: String) -> Result<i64, StoreError>;

    async fn find(&self, endpoint: &str, internal_id: i64)
        -> Result<Option<GeneratedRecord>, StoreError>;

    /// All records for `endpoint`, ascending by id.
    async fn list(&self, endpoint: &str) -> Result<Vec<GeneratedRecord>, StoreError>;

    /// Replaces the payload at `internal_id`, inserting it under that exact id when absent.
    async fn upsert(
        &self,
        endpoint: &str,
        internal_id: i64,
        data: String,
    ) -> Result<UpsertOutcome, StoreError>;

    /// Returns `false` when nothing was stored at `internal_id`.
    async fn delete(&self, endpoint: &str, internal_id: i64) -> Result<bool, StoreError>;

    async fn count(&self, endpoint: &str) -> Result<usize, StoreError>;

    /// Drops every record of every endpoint.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Checks that the backend can serve requests.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
