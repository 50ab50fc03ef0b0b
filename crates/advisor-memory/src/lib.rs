//! Advisor Memory: collection-keyed semantic memory
//!
//! The [`MemoryStore`] contract is what the cache builder writes to and what
//! prompt operations recall from. [`VolatileMemoryStore`] keeps everything
//! in process and ranks by cosine similarity.

pub mod embedding;
pub mod skill;
pub mod store;

pub use embedding::HashingEmbedder;
pub use skill::{register_memory_operations, RecallOperation, RecallParams, SaveOperation, MEMORY_NAMESPACE};
pub use store::VolatileMemoryStore;

use advisor_core::{AdvisorError, OperationError};
use advisor_llm::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("embedding failed: {0}")]
    Embedding(#[from] LlmError),
    #[error("storage failed: {0}")]
    Storage(String),
}

impl From<MemoryError> for AdvisorError {
    fn from(err: MemoryError) -> Self {
        AdvisorError::Collaborator(err.to_string())
    }
}

impl From<MemoryError> for OperationError {
    fn from(err: MemoryError) -> Self {
        OperationError::Collaborator(err.to_string())
    }
}

/// A recalled record and its relevance to the query (higher is closer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMatch {
    pub id: String,
    pub text: String,
    pub relevance: f64,
}

#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Names of every collection holding at least one record.
    async fn collections(&self) -> Result<Vec<String>, MemoryError>;

    /// Upserts `text` under `id`; an existing record with the same id is
    /// replaced.
    async fn save(&self, collection: &str, id: &str, text: &str) -> Result<(), MemoryError>;

    /// Records of `collection` with relevance ≥ `min_relevance`, best first,
    /// at most `limit`. An unknown collection yields no matches.
    async fn query(
        &self,
        collection: &str,
        text: &str,
        min_relevance: f64,
        limit: usize,
    ) -> Result<Vec<MemoryMatch>, MemoryError>;
}
