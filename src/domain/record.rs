use serde::{Deserialize, Serialize};

/// One stored mock entity.
///
/// `internal_id` is unique within `endpoint` only; the same id can exist
/// under every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    pub endpoint: String,
    pub internal_id: i64,
    pub data: String,
}

impl GeneratedRecord {
    pub fn new(endpoint: impl Into<String>, internal_id: i64, data: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            internal_id,
            data: data.into(),
        }
    }
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}
