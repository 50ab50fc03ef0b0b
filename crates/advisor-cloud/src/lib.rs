//! Advisor Cloud: recommendation source
//!
//! [`RecommendationSource`] hands the cache builder every recommendation of
//! a subscription. [`AdvisorClient`] implements it against the Azure
//! Resource Manager REST API, following `nextLink` until the last page.

pub mod advisor;
mod wire;

pub use advisor::{AdvisorClient, ADVISOR_API_VERSION, MANAGEMENT_ENDPOINT};

use advisor_core::{AdvisorError, Recommendation};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No tenant found for subscription id provided in the request!")]
    SubscriptionNotFound(String),
    #[error("Please pass a valid subscriptionId in the query string")]
    InvalidSubscription(String),
    #[error("recommendation request failed: {0}")]
    Request(String),
    #[error("recommendation request returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected recommendation payload: {0}")]
    Decode(String),
}

impl From<SourceError> for AdvisorError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::SubscriptionNotFound(_) => AdvisorError::Tenant(err.to_string()),
            SourceError::InvalidSubscription(_) => AdvisorError::Validation(err.to_string()),
            other => AdvisorError::Collaborator(other.to_string()),
        }
    }
}

#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Every recommendation for the subscription, across all pages.
    async fn list_recommendations(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<Recommendation>, SourceError>;
}
