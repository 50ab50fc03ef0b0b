//! Advisor API: HTTP plugin surface
//!
//! Routes:
//! - `POST /api/QueryRecommendations?subscriptionId=<id>`: question about a
//!   subscription's Advisor recommendations (body = prompt)
//! - `POST /api/operations/{operationId}`: any registered plugin operation
//! - `GET /api/operations`, `GET /health`, `GET /metrics`
pub mod config;
pub mod flow;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod response;

use std::sync::Arc;

use advisor_cache::EmbeddingCacheBuilder;
use advisor_cloud::{AdvisorClient, RecommendationSource};
use advisor_core::{AdvisorError, Dispatcher, ExecutionContext, ExecutionResult, OperationRegistry};
use advisor_llm::{ChatCompletion, OpenAiClient};
use advisor_memory::{register_memory_operations, MemoryStore, VolatileMemoryStore};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError};
pub use metrics::Metrics;

/// Shared by every request. Built once, read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: Dispatcher,
    pub cache: Arc<EmbeddingCacheBuilder>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Wires the registry: native memory operations plus every prompt
    /// operation found in `config.plugin.prompts_dir`.
    pub fn new(
        config: AppConfig,
        chat: Arc<dyn ChatCompletion>,
        memory: Arc<dyn MemoryStore>,
        source: Arc<dyn RecommendationSource>,
    ) -> Result<Self, AdvisorError> {
        let mut registry = OperationRegistry::new();
        register_memory_operations(&mut registry, memory.clone())?;
        advisor_registry::load_directory(
            &config.plugin.prompts_dir,
            &config.plugin.name_for_model,
            &mut registry,
            chat,
            memory.clone(),
        )?;

        let metrics = Metrics::new().map_err(|e| AdvisorError::Config(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            dispatcher: Dispatcher::new(Arc::new(registry)),
            cache: Arc::new(EmbeddingCacheBuilder::new(source, memory)),
            metrics: Arc::new(metrics),
        })
    }

    /// Production wiring: model client from `[kernel]`, Resource Manager
    /// client from `[azure]`, in-process memory store.
    pub fn from_config(config: AppConfig) -> Result<Self, AdvisorError> {
        let model = Arc::new(OpenAiClient::new(
            config.model_settings()?,
            config.model_timeout(),
        )?);
        let memory = Arc::new(VolatileMemoryStore::new(model.clone()));

        let access_token = config.access_token();
        if access_token.is_none() {
            tracing::warn!(
                var = %config.azure.access_token_env,
                "no Resource Manager token configured, requests will be anonymous"
            );
        }
        let source = Arc::new(AdvisorClient::new(
            config.azure.management_endpoint.clone(),
            access_token,
            config.request_timeout(),
        )?);

        Self::new(config, model, memory, source)
    }

    /// Dispatches and counts the outcome.
    pub async fn dispatch(
        &self,
        namespace: &str,
        operation: &str,
        ctx: &ExecutionContext,
    ) -> Result<ExecutionResult, AdvisorError> {
        let result = self.dispatcher.execute(namespace, operation, ctx).await;
        let outcome = match &result {
            Ok(r) if r.is_success() => "success",
            Ok(_) => "failure",
            Err(AdvisorError::NotFound(_)) => "not_found",
            Err(_) => "error",
        };
        self.metrics.record_dispatch(operation, outcome);
        result
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/QueryRecommendations", post(handlers::query_recommendations))
        .route("/api/operations", get(handlers::list_operations))
        .route("/api/operations/{operation_id}", post(handlers::run_operation))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors())
        .with_state(state)
}

pub async fn run(state: AppState, addr: &str) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Advisor API listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
