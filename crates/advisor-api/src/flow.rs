//! Recommendation Query Flow
//!
//! ```text
//! Received → Validated → CacheChecked → [CacheBuilding] → Dispatched → Responded
//! ```
//!
//! Any state may short-circuit into an error response.

use advisor_cache::WarmOutcome;
use advisor_core::{
    AdvisorError, ExecutionContext, ExecutionResult, COLLECTION_PARAM, INPUT_PARAM, LIMIT_PARAM,
    RELEVANCE_PARAM,
};

use crate::AppState;

/// Operation answering recommendation questions.
pub const MEMORY_QUERY_OPERATION: &str = "MemoryQuery";
pub const QUERY_RELEVANCE: &str = "0.7";
pub const QUERY_LIMIT: &str = "20";

pub const MISSING_PROMPT: &str = "Please pass your user input in the body of the request";
pub const MISSING_SUBSCRIPTION: &str = "Please pass your subscriptionId in the query string";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Received,
    Validated,
    CacheChecked,
    CacheBuilding,
    Dispatched,
    Responded,
}

/// A validated recommendation question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub prompt: String,
    pub subscription_id: String,
}

impl RecommendationQuery {
    /// Prompt is checked before the subscription.
    pub fn validate(prompt: &str, subscription_id: Option<&str>) -> Result<Self, AdvisorError> {
        if prompt.is_empty() {
            tracing::error!("No user input provided in the request!");
            return Err(AdvisorError::Validation(MISSING_PROMPT.to_string()));
        }

        let subscription_id = match subscription_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::error!(prompt, "No subscription id provided in the request!");
                return Err(AdvisorError::Validation(MISSING_SUBSCRIPTION.to_string()));
            }
        };

        Ok(Self {
            prompt: prompt.to_string(),
            subscription_id: subscription_id.to_string(),
        })
    }

    pub fn context(&self) -> ExecutionContext {
        ExecutionContext::new(self.prompt.clone())
            .with(COLLECTION_PARAM, self.subscription_id.clone())
            .with(RELEVANCE_PARAM, QUERY_RELEVANCE)
            .with(LIMIT_PARAM, QUERY_LIMIT)
            .with(INPUT_PARAM, self.prompt.clone())
    }
}

struct Flow {
    state: FlowState,
}

impl Flow {
    fn advance(&mut self, next: FlowState) {
        tracing::debug!(from = ?self.state, to = ?next, "query flow");
        self.state = next;
    }
}

/// Runs one question end to end and returns the dispatch result.
pub async fn run_query(
    state: &AppState,
    prompt: &str,
    subscription_id: Option<&str>,
) -> Result<ExecutionResult, AdvisorError> {
    let mut flow = Flow {
        state: FlowState::Received,
    };

    let query = RecommendationQuery::validate(prompt, subscription_id)?;
    flow.advance(FlowState::Validated);
    tracing::info!(subscription_id = %query.subscription_id, "Processing request for subscription");

    let empty = state.cache.is_cache_empty(&query.subscription_id).await?;
    flow.advance(FlowState::CacheChecked);

    if empty {
        flow.advance(FlowState::CacheBuilding);
        tracing::info!(subscription_id = %query.subscription_id, "Embeddings cache empty for subscription");
        if let WarmOutcome::Built { chunks } = state.cache.ensure_warm(&query.subscription_id).await? {
            state.metrics.record_cache_build(chunks);
        }
    }

    let ctx = query.context();
    let result = state
        .dispatch(&state.config.plugin.name_for_model, MEMORY_QUERY_OPERATION, &ctx)
        .await;
    flow.advance(FlowState::Dispatched);

    let result = result?;
    flow.advance(FlowState::Responded);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_checked_first() {
        let err = RecommendationQuery::validate("", None).unwrap_err();
        assert_eq!(err, AdvisorError::Validation(MISSING_PROMPT.to_string()));
    }

    #[test]
    fn test_missing_or_empty_subscription() {
        for sub in [None, Some("")] {
            let err = RecommendationQuery::validate("question", sub).unwrap_err();
            assert_eq!(err, AdvisorError::Validation(MISSING_SUBSCRIPTION.to_string()));
        }
    }

    #[test]
    fn test_context_variables() {
        let query = RecommendationQuery::validate("top costs?", Some("sub-1")).unwrap();
        let ctx = query.context();

        assert_eq!(ctx.input(), "top costs?");
        assert_eq!(ctx.get("collection"), Some("sub-1"));
        assert_eq!(ctx.get("relevance"), Some("0.7"));
        assert_eq!(ctx.get("limit"), Some("20"));
        assert_eq!(ctx.get("input"), Some("top costs?"));
    }
}
