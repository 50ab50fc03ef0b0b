//! In-process memory store ranked by cosine similarity
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use advisor_llm::TextEmbedding;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{MemoryError, MemoryMatch, MemoryStore};

#[derive(Debug, Clone)]
struct StoredRecord {
    text: String,
    embedding: Vec<f32>,
}

/// Volatile store: contents live as long as the process.
pub struct VolatileMemoryStore {
    embedder: Arc<dyn TextEmbedding>,
    collections: RwLock<HashMap<String, BTreeMap<String, StoredRecord>>>,
}

impl VolatileMemoryStore {
    pub fn new(embedder: Arc<dyn TextEmbedding>) -> Self {
        Self {
            embedder,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Ids stored in `collection`, sorted.
    pub async fn record_ids(&self, collection: &str) -> Vec<String> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn get(&self, collection: &str, id: &str) -> Option<String> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|records| records.get(id))
            .map(|record| record.text.clone())
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let mut vectors = self.embedder.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| MemoryError::Storage("embedder returned no vector".to_string()))
    }
}

#[async_trait]
impl MemoryStore for VolatileMemoryStore {
    async fn collections(&self) -> Result<Vec<String>, MemoryError> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn save(&self, collection: &str, id: &str, text: &str) -> Result<(), MemoryError> {
        // Embed before taking the write lock so readers are not blocked on the model.
        let embedding = self.embed_one(text).await?;

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(
                id.to_string(),
                StoredRecord {
                    text: text.to_string(),
                    embedding,
                },
            );

        tracing::debug!(collection, id, "memory record saved");
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        text: &str,
        min_relevance: f64,
        limit: usize,
    ) -> Result<Vec<MemoryMatch>, MemoryError> {
        if limit == 0 || !self.collections.read().await.contains_key(collection) {
            return Ok(Vec::new());
        }

        let query = self.embed_one(text).await?;
        let guard = self.collections.read().await;
        let Some(records) = guard.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<MemoryMatch> = records
            .iter()
            .map(|(id, record)| MemoryMatch {
                id: id.clone(),
                text: record.text.clone(),
                relevance: cosine_similarity(&query, &record.embedding),
            })
            .filter(|m| m.relevance >= min_relevance)
            .collect();

        matches.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(limit);
        Ok(matches)
    }
}

/// Cosine similarity; zero-length or mismatched vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HashingEmbedder;

    fn store() -> VolatileMemoryStore {
        VolatileMemoryStore::new(Arc::new(HashingEmbedder::default()))
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_save_is_upsert() {
        let store = store();
        store.save("sub-1", "sub-1", "first").await.unwrap();
        store.save("sub-1", "sub-1", "second").await.unwrap();

        assert_eq!(store.record_ids("sub-1").await, vec!["sub-1"]);
        assert_eq!(store.get("sub-1", "sub-1").await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_query_ranks_and_limits() {
        let store = store();
        store.save("sub-1", "a", "resize underutilized virtual machines").await.unwrap();
        store.save("sub-1", "b", "enable soft delete on storage accounts").await.unwrap();
        store.save("sub-1", "c", "buy reserved instances for virtual machines").await.unwrap();

        let matches = store.query("sub-1", "virtual machines", 0.0, 2).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].relevance >= matches[1].relevance);
        assert!(matches.iter().all(|m| m.id != "b"));
    }

    #[tokio::test]
    async fn test_query_threshold_and_unknown_collection() {
        let store = store();
        store.save("sub-1", "a", "alpha beta").await.unwrap();

        assert!(store.query("sub-1", "gamma delta", 0.99, 10).await.unwrap().is_empty());
        assert!(store.query("sub-2", "alpha", 0.0, 10).await.unwrap().is_empty());
        assert!(store.query("sub-1", "alpha", 0.0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collections_listed() {
        let store = store();
        store.save("sub-2", "x", "text").await.unwrap();
        store.save("sub-1", "y", "text").await.unwrap();
        assert_eq!(store.collections().await.unwrap(), vec!["sub-1", "sub-2"]);
    }
}
