//! Embedding Cache Builder
use std::sync::Arc;

use advisor_cloud::RecommendationSource;
use advisor_core::{MemoryRecord, Recommendation};
use advisor_memory::MemoryStore;
use advisor_text::{count_units, split_lines, split_paragraphs};
use dashmap::DashMap;

use crate::CacheError;

/// Flattened text above this many units gets chunked.
pub const MAX_FILE_SIZE: usize = 2048;
/// Unit bound for both lines and paragraphs when chunking.
pub const MAX_TOKENS: usize = 1024;
/// Stored when the source has nothing, so the collection is still marked warm.
pub const NO_RECOMMENDATIONS: &str = "No Azure Advisor recommendations found for this subscription.";

type BuildLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmOutcome {
    AlreadyWarm,
    Built { chunks: usize },
}

/// Populates a subscription's memory collection from the recommendation
/// source, at most once per cold start.
pub struct EmbeddingCacheBuilder {
    source: Arc<dyn RecommendationSource>,
    memory: Arc<dyn MemoryStore>,
    guards: DashMap<String, BuildLock>,
}

impl EmbeddingCacheBuilder {
    pub fn new(source: Arc<dyn RecommendationSource>, memory: Arc<dyn MemoryStore>) -> Self {
        Self {
            source,
            memory,
            guards: DashMap::new(),
        }
    }

    /// True iff no collection name starts with `subscription_id`.
    pub async fn is_cache_empty(&self, subscription_id: &str) -> Result<bool, CacheError> {
        let collections = self.memory.collections().await?;
        Ok(!collections.iter().any(|c| c.starts_with(subscription_id)))
    }

    /// Builds the collection unless it is already populated. Concurrent
    /// callers for the same subscription wait for a single build.
    pub async fn ensure_warm(&self, subscription_id: &str) -> Result<WarmOutcome, CacheError> {
        let slot = self.slot(subscription_id);
        let _guard = slot.lock().await;
        self.warm_locked(subscription_id).await
    }

    async fn warm_locked(&self, subscription_id: &str) -> Result<WarmOutcome, CacheError> {
        if !self.is_cache_empty(subscription_id).await? {
            tracing::debug!(subscription_id, "embedding cache already warm");
            return Ok(WarmOutcome::AlreadyWarm);
        }

        tracing::info!(subscription_id, "Embedding cache is empty, downloading recommendations");
        let chunks = self.build(subscription_id).await?;
        Ok(WarmOutcome::Built { chunks })
    }

    /// Fetch → flatten → chunk → persist, unconditionally. Returns the
    /// number of records written. Failures leave whatever was written.
    pub async fn build(&self, subscription_id: &str) -> Result<usize, CacheError> {
        let records = self.source.list_recommendations(subscription_id).await?;
        let chunks = if records.is_empty() {
            vec![NO_RECOMMENDATIONS.to_string()]
        } else {
            chunk(&flatten(&records))
        };
        let total = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            let record = MemoryRecord {
                collection: subscription_id.to_string(),
                id: MemoryRecord::chunk_id(subscription_id, index, total),
                text: chunk,
            };
            self.memory
                .save(&record.collection, &record.id, &record.text)
                .await?;
        }

        tracing::info!(
            subscription_id,
            recommendations = records.len(),
            chunks = total,
            "embedding cache built"
        );
        Ok(total)
    }

    fn slot(&self, subscription_id: &str) -> BuildSlot<'_> {
        let lock = self
            .guards
            .entry(subscription_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        BuildSlot {
            guards: &self.guards,
            key: subscription_id.to_string(),
            lock: Some(lock),
        }
    }

    #[cfg(test)]
    fn pending_guards(&self) -> usize {
        self.guards.len()
    }
}

/// Holds one clone of a subscription's build lock. The map entry goes
/// away with the last clone, including when the request is cancelled
/// while waiting or building.
struct BuildSlot<'a> {
    guards: &'a DashMap<String, BuildLock>,
    key: String,
    lock: Option<BuildLock>,
}

impl BuildSlot<'_> {
    async fn lock(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

impl Drop for BuildSlot<'_> {
    fn drop(&mut self) {
        // Clones are only handed out under the shard lock, so a count of 1
        // checked under that lock means nobody else holds or waits.
        drop(self.lock.take());
        self.guards
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// One line per record, joined with `\n`.
pub fn flatten(records: &[Recommendation]) -> String {
    records
        .iter()
        .map(Recommendation::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The whole text as one chunk, or paragraphs of at most [`MAX_TOKENS`]
/// units once it exceeds [`MAX_FILE_SIZE`].
pub fn chunk(text: &str) -> Vec<String> {
    if count_units(text) > MAX_FILE_SIZE {
        let lines = split_lines(text, MAX_TOKENS);
        split_paragraphs(&lines, MAX_TOKENS)
    } else {
        vec![text.to_string()]
    }
}
