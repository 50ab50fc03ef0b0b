//! AdvisorClient tests against a mock Resource Manager endpoint.

use std::time::Duration;

use advisor_cloud::{AdvisorClient, RecommendationSource, SourceError};
use advisor_core::AdvisorError;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECOMMENDATIONS_PATH: &str = "/subscriptions/sub-1/providers/Microsoft.Advisor/recommendations";

fn recommendation(resource: &str) -> serde_json::Value {
    json!({
        "properties": {
            "category": "Cost",
            "impact": "Medium",
            "impactedField": "Microsoft.Compute/virtualMachines",
            "impactedValue": resource,
            "lastUpdated": "2023-06-01T00:00:00Z",
            "shortDescription": { "problem": "Underutilized", "solution": "Resize" },
            "extendedProperties": { "recommendationMessage": "Right-size" }
        }
    })
}

fn client(server: &MockServer) -> AdvisorClient {
    AdvisorClient::new(server.uri(), Some("token".to_string()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_follows_next_link_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RECOMMENDATIONS_PATH))
        .and(query_param("api-version", "2023-01-01"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [recommendation("vm-1"), recommendation("vm-2")],
            "nextLink": format!("{}/page2", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [recommendation("vm-3")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recs = client(&server).list_recommendations("sub-1").await.unwrap();
    let resources: Vec<_> = recs.iter().map(|r| r.affected_resource.as_str()).collect();
    assert_eq!(resources, vec!["vm-1", "vm-2", "vm-3"]);
    assert_eq!(recs[0].message, "Right-size");
}

#[tokio::test]
async fn test_unknown_subscription_maps_to_tenant_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECOMMENDATIONS_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).list_recommendations("sub-1").await.unwrap_err();
    assert!(matches!(err, SourceError::SubscriptionNotFound(_)));

    let err: AdvisorError = err.into();
    assert_eq!(
        err.message(),
        "No tenant found for subscription id provided in the request!"
    );
}

#[tokio::test]
async fn test_server_error_is_collaborator_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECOMMENDATIONS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": "InternalError", "message": "try later" }
        })))
        .mount(&server)
        .await;

    let err = client(&server).list_recommendations("sub-1").await.unwrap_err();
    match &err {
        SourceError::Status { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "try later");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(AdvisorError::from(err), AdvisorError::Collaborator(_)));
}

#[tokio::test]
async fn test_malformed_page_fails_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RECOMMENDATIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let err = client(&server).list_recommendations("sub-1").await.unwrap_err();
    assert!(matches!(err, SourceError::Decode(_)));
}

#[tokio::test]
async fn test_subscription_id_cannot_reshape_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .list_recommendations("x/resourceGroups?api-version=2021-04-01#")
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidSubscription(_)));

    let err: AdvisorError = err.into();
    assert!(matches!(err, AdvisorError::Validation(_)));
    assert_eq!(err.message(), "Please pass a valid subscriptionId in the query string");
}
