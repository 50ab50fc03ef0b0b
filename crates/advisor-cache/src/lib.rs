//! Advisor Cache: lazily populated per-subscription semantic index
//!
//! ```text
//! ensure_warm(id) ─ lock(id) ─ is_cache_empty? ─ no ─→ AlreadyWarm
//!                                   │ yes
//!                 fetch → flatten → chunk → save ×N ─→ Built { chunks }
//! ```

pub mod builder;

pub use builder::{
    chunk, flatten, EmbeddingCacheBuilder, WarmOutcome, MAX_FILE_SIZE, MAX_TOKENS, NO_RECOMMENDATIONS,
};

use advisor_cloud::SourceError;
use advisor_core::AdvisorError;
use advisor_memory::MemoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl From<CacheError> for AdvisorError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Source(inner) => inner.into(),
            CacheError::Memory(inner) => inner.into(),
        }
    }
}
