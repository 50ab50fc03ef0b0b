//! Azure Resource Manager client for Advisor recommendations
use std::time::Duration;

use advisor_core::Recommendation;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::wire::{ArmErrorBody, RecommendationPage};
use crate::{RecommendationSource, SourceError};

pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";
pub const ADVISOR_API_VERSION: &str = "2023-01-01";

/// Upper bound on followed pages, guarding against a `nextLink` loop.
const MAX_PAGES: usize = 10_000;

#[derive(Clone)]
pub struct AdvisorClient {
    http: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl AdvisorClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let base_url: String = base_url.into();
        let base_url = Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| SourceError::Request(format!("invalid management endpoint: {}", base_url)))?;

        Ok(Self {
            http,
            base_url,
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    /// `{base}/subscriptions/{id}/providers/Microsoft.Advisor/recommendations`
    /// with the id as a single encoded path segment.
    fn first_page_url(&self, subscription_id: &str) -> Result<Url, SourceError> {
        validate_subscription_id(subscription_id)?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Request(format!("invalid management endpoint: {}", self.base_url)))?
            .pop_if_empty()
            .extend([
                "subscriptions",
                subscription_id,
                "providers",
                "Microsoft.Advisor",
                "recommendations",
            ]);
        url.query_pairs_mut()
            .clear()
            .append_pair("api-version", ADVISOR_API_VERSION);
        Ok(url)
    }

    async fn fetch_page(
        &self,
        url: &str,
        subscription_id: &str,
    ) -> Result<RecommendationPage, SourceError> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::SubscriptionNotFound(subscription_id.to_string()));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ArmErrorBody>(&text) {
                Ok(body) if body.error.code == "SubscriptionNotFound" => {
                    return Err(SourceError::SubscriptionNotFound(subscription_id.to_string()));
                }
                Ok(body) => body.error.message,
                Err(_) => text,
            };
            return Err(SourceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

/// Subscription ids are GUIDs in practice; anything outside this alphabet
/// would change the request path or query.
fn validate_subscription_id(subscription_id: &str) -> Result<(), SourceError> {
    let valid = !subscription_id.is_empty()
        && subscription_id != "."
        && subscription_id != ".."
        && subscription_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(SourceError::InvalidSubscription(subscription_id.to_string()))
    }
}

impl std::fmt::Debug for AdvisorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorClient")
            .field("base_url", &self.base_url.as_str())
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[async_trait]
impl RecommendationSource for AdvisorClient {
    async fn list_recommendations(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<Recommendation>, SourceError> {
        tracing::info!(subscription_id, "Downloading Azure Advisor recommendations");

        let mut recommendations = Vec::new();
        let mut next = Some(self.first_page_url(subscription_id)?.to_string());
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                return Err(SourceError::Decode(format!(
                    "more than {} pages, aborting pagination",
                    MAX_PAGES
                )));
            }

            let page = self.fetch_page(&url, subscription_id).await?;
            recommendations.extend(page.value.into_iter().map(Recommendation::from));
            next = page.next_link.filter(|link| !link.is_empty());
        }

        tracing::debug!(subscription_id, pages, count = recommendations.len(), "recommendations downloaded");
        Ok(recommendations)
    }
}
