//! API Handlers
use std::collections::HashMap;

use advisor_core::{AdvisorError, ExecutionContext, ADVISOR_VERSION};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::flow;
use crate::response::{plain_result, ApiError};
use crate::AppState;

pub async fn query_recommendations(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Result<Response, ApiError> {
    let subscription_id = params.get("subscriptionId").map(String::as_str);
    let result = flow::run_query(&state, &body, subscription_id).await?;
    plain_result(result)
}

/// Query pairs become context variables, the body is the input.
/// `namespace.name` addresses another namespace (ex: `memory.recall`);
/// a bare name resolves in the plugin namespace.
pub async fn run_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    body: String,
) -> Result<Response, ApiError> {
    let mut ctx = ExecutionContext::new(body);
    for (name, value) in params {
        ctx.set(name, value);
    }

    let (namespace, operation) = match operation_id.split_once('.') {
        Some((ns, op)) => (ns, op),
        None => (state.config.plugin.name_for_model.as_str(), operation_id.as_str()),
    };

    let result = state
        .dispatch(namespace, operation, &ctx)
        .await
        .map_err(|e| match e {
            AdvisorError::NotFound(_) => AdvisorError::NotFound(operation_id.clone()),
            other => other,
        })?;
    plain_result(result)
}

pub async fn list_operations(State(state): State<AppState>) -> Json<Value> {
    let registry = state.dispatcher.registry();
    let namespaces: serde_json::Map<String, Value> = registry
        .namespaces()
        .into_iter()
        .map(|ns| {
            let names = registry.list(&ns);
            (ns, json!(names))
        })
        .collect();

    Json(json!({
        "plugin": state.config.plugin.name_for_model,
        "namespaces": namespaces,
    }))
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "version": ADVISOR_VERSION })))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
