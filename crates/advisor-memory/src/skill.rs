//! Native text-memory operations: `memory.recall` and `memory.save`
use std::sync::Arc;

use advisor_core::{
    AdvisorError, ExecutionContext, Operation, OperationError, OperationRegistry,
    COLLECTION_PARAM, KEY_PARAM, LIMIT_PARAM, RELEVANCE_PARAM,
};
use async_trait::async_trait;

use crate::{MemoryMatch, MemoryStore};

/// Namespace the native memory operations are registered under.
pub const MEMORY_NAMESPACE: &str = "memory";

const DEFAULT_COLLECTION: &str = "generic";
const DEFAULT_RELEVANCE: f64 = 0.0;
const DEFAULT_LIMIT: usize = 1;

/// Retrieval parameters read from context variables.
#[derive(Debug, Clone, PartialEq)]
pub struct RecallParams {
    pub collection: String,
    pub relevance: f64,
    pub limit: usize,
}

impl RecallParams {
    pub fn from_context(ctx: &ExecutionContext) -> Result<Self, OperationError> {
        let collection = ctx
            .get(COLLECTION_PARAM)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COLLECTION)
            .to_string();

        let relevance = match ctx.get(RELEVANCE_PARAM).map(str::trim) {
            None | Some("") => DEFAULT_RELEVANCE,
            Some(raw) => raw.parse::<f64>().ok().filter(|r| (0.0..=1.0).contains(r)).ok_or_else(|| {
                OperationError::Failed(format!(
                    "{} must be a number between 0 and 1, got '{}'",
                    RELEVANCE_PARAM, raw
                ))
            })?,
        };

        let limit = match ctx.get(LIMIT_PARAM).map(str::trim) {
            None | Some("") => DEFAULT_LIMIT,
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                OperationError::Failed(format!(
                    "{} must be a non-negative integer, got '{}'",
                    LIMIT_PARAM, raw
                ))
            })?,
        };

        Ok(Self {
            collection,
            relevance,
            limit,
        })
    }

    pub async fn recall(
        &self,
        memory: &dyn MemoryStore,
        query: &str,
    ) -> Result<Vec<MemoryMatch>, OperationError> {
        let matches = memory
            .query(&self.collection, query, self.relevance, self.limit)
            .await?;

        if matches.is_empty() {
            tracing::warn!(collection = %self.collection, "memory recall returned no matches");
        }
        Ok(matches)
    }
}

/// Recalls the texts most relevant to the `input` variable.
pub struct RecallOperation {
    memory: Arc<dyn MemoryStore>,
}

impl RecallOperation {
    pub fn new(memory: Arc<dyn MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Operation for RecallOperation {
    fn name(&self) -> &str {
        "recall"
    }

    fn description(&self) -> &str {
        "Semantic search over a memory collection"
    }

    async fn invoke(&self, ctx: &ExecutionContext) -> Result<String, OperationError> {
        let params = RecallParams::from_context(ctx)?;
        let query = ctx.get("input").unwrap_or_default();
        let matches = params.recall(self.memory.as_ref(), query).await?;

        Ok(matches
            .into_iter()
            .map(|m| m.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Stores the `input` variable under `collection` / `key`.
pub struct SaveOperation {
    memory: Arc<dyn MemoryStore>,
}

impl SaveOperation {
    pub fn new(memory: Arc<dyn MemoryStore>) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Operation for SaveOperation {
    fn name(&self) -> &str {
        "save"
    }

    fn description(&self) -> &str {
        "Save information to a memory collection"
    }

    async fn invoke(&self, ctx: &ExecutionContext) -> Result<String, OperationError> {
        let collection = ctx
            .get(COLLECTION_PARAM)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_COLLECTION);
        let key = ctx
            .get(KEY_PARAM)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OperationError::Failed(format!("{} is required", KEY_PARAM)))?;
        let text = ctx.get("input").unwrap_or_default();

        self.memory.save(collection, key, text).await?;
        Ok(String::new())
    }
}

/// Registers `recall` and `save` under [`MEMORY_NAMESPACE`].
pub fn register_memory_operations(
    registry: &mut OperationRegistry,
    memory: Arc<dyn MemoryStore>,
) -> Result<(), AdvisorError> {
    registry.register(MEMORY_NAMESPACE, Arc::new(RecallOperation::new(memory.clone())))?;
    registry.register(MEMORY_NAMESPACE, Arc::new(SaveOperation::new(memory)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HashingEmbedder, VolatileMemoryStore};

    fn memory() -> Arc<VolatileMemoryStore> {
        Arc::new(VolatileMemoryStore::new(Arc::new(HashingEmbedder::default())))
    }

    #[test]
    fn test_params_defaults() {
        let params = RecallParams::from_context(&ExecutionContext::new("q")).unwrap();
        assert_eq!(
            params,
            RecallParams {
                collection: "generic".to_string(),
                relevance: 0.0,
                limit: 1
            }
        );
    }

    #[test]
    fn test_params_parsed() {
        let ctx = ExecutionContext::new("q")
            .with("collection", "sub-1")
            .with("relevance", "0.7")
            .with("limit", "20");
        let params = RecallParams::from_context(&ctx).unwrap();
        assert_eq!(params.collection, "sub-1");
        assert_eq!(params.relevance, 0.7);
        assert_eq!(params.limit, 20);
    }

    #[test]
    fn test_invalid_params_fail() {
        let ctx = ExecutionContext::new("q").with("relevance", "high");
        assert!(matches!(RecallParams::from_context(&ctx), Err(OperationError::Failed(_))));

        let ctx = ExecutionContext::new("q").with("relevance", "1.5");
        assert!(RecallParams::from_context(&ctx).is_err());

        let ctx = ExecutionContext::new("q").with("limit", "-1");
        assert!(RecallParams::from_context(&ctx).is_err());
    }

    #[tokio::test]
    async fn test_save_then_recall() {
        let memory = memory();
        let save = SaveOperation::new(memory.clone());
        let recall = RecallOperation::new(memory.clone());

        let ctx = ExecutionContext::new("resize the idle virtual machine")
            .with("collection", "sub-1")
            .with("key", "note-1");
        assert_eq!(save.invoke(&ctx).await.unwrap(), "");

        let ctx = ExecutionContext::new("idle virtual machine")
            .with("collection", "sub-1")
            .with("relevance", "0.1")
            .with("limit", "5");
        assert_eq!(recall.invoke(&ctx).await.unwrap(), "resize the idle virtual machine");
    }

    #[tokio::test]
    async fn test_save_requires_key() {
        let save = SaveOperation::new(memory());
        let err = save.invoke(&ExecutionContext::new("text")).await.unwrap_err();
        assert_eq!(err, OperationError::Failed("key is required".to_string()));
    }

    #[test]
    fn test_registration() {
        let mut registry = OperationRegistry::new();
        register_memory_operations(&mut registry, memory()).unwrap();
        assert_eq!(registry.list(MEMORY_NAMESPACE), vec!["recall", "save"]);
    }
}
