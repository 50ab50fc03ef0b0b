//! Response envelope: maps dispatch outcomes and errors to HTTP.
use advisor_cache::CacheError;
use advisor_core::{AdvisorError, ExecutionResult};
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// Error half of every handler.
#[derive(Debug)]
pub struct ApiError(pub AdvisorError);

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        Self(err)
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.message();
        match self.0 {
            // Raw message under a JSON content type
            AdvisorError::Validation(_) | AdvisorError::Tenant(_) => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, APPLICATION_JSON)],
                message,
            )
                .into_response(),
            AdvisorError::NotFound(_) => {
                (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, TEXT_PLAIN)], message).into_response()
            }
            AdvisorError::Operation(_) => {
                (StatusCode::BAD_REQUEST, [(header::CONTENT_TYPE, TEXT_PLAIN)], message).into_response()
            }
            AdvisorError::Collaborator(_) | AdvisorError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

/// 200 with the output, or 400 with the failure message.
pub fn plain_result(result: ExecutionResult) -> Result<Response, ApiError> {
    if result.is_success() {
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            result.output().to_string(),
        )
            .into_response())
    } else {
        Err(ApiError(AdvisorError::Operation(
            result.error().unwrap_or_default().to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_type(err: AdvisorError) -> (StatusCode, String) {
        let response = ApiError(err).into_response();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        (response.status(), content_type)
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            status_and_type(AdvisorError::Validation("x".into())),
            (StatusCode::BAD_REQUEST, APPLICATION_JSON.to_string())
        );
        assert_eq!(
            status_and_type(AdvisorError::Tenant("x".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_and_type(AdvisorError::NotFound("x".into())),
            (StatusCode::NOT_FOUND, TEXT_PLAIN.to_string())
        );
        assert_eq!(
            status_and_type(AdvisorError::Operation("x".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_and_type(AdvisorError::Collaborator("x".into())),
            (StatusCode::INTERNAL_SERVER_ERROR, APPLICATION_JSON.to_string())
        );
    }

    #[test]
    fn test_failed_result_is_bad_request() {
        let err = plain_result(ExecutionResult::failed("boom")).unwrap_err();
        assert_eq!(err.0, AdvisorError::Operation("boom".to_string()));
        assert_eq!(plain_result(ExecutionResult::succeeded("ok")).unwrap().status(), StatusCode::OK);
    }
}
