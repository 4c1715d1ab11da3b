//! End-to-end tests for the admission webhook handler.
//!
//! These drive the axum router directly (no network, no TLS) and assert on
//! the AdmissionReview responses the API server would receive.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use deployment_webhook::HealthState;
use deployment_webhook::webhooks::{WebhookState, create_webhook_router};

fn router() -> Router {
    let health = Arc::new(HealthState::new());
    create_webhook_router(Arc::new(WebhookState::new(health)))
}

fn admission_review(uid: &str, request_overrides: Value) -> Value {
    let mut review = json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": uid,
            "kind": {"group": "apps", "version": "v1", "kind": "Deployment"},
            "resource": {"group": "apps", "version": "v1", "resource": "deployments"},
            "operation": "CREATE",
            "name": "test",
            "namespace": "default",
            "userInfo": {},
            "dryRun": false,
        },
    });
    if let Some(overrides) = request_overrides.as_object() {
        let request = review["request"].as_object_mut().unwrap();
        for (key, value) in overrides {
            request.insert(key.clone(), value.clone());
        }
    }
    review
}

fn deployment(replicas: Value) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": "test", "namespace": "default"},
        "spec": {
            "replicas": replicas,
            "selector": {"matchLabels": {"app": "test"}},
            "template": {
                "metadata": {"labels": {"app": "test"}},
                "spec": {"containers": [{"name": "app", "image": "nginx:latest"}]},
            },
        },
    })
}

async fn post_raw(body: Vec<u8>) -> (StatusCode, Value) {
    let response = router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/validate-deployment")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_review(review: Value) -> (StatusCode, Value) {
    post_raw(serde_json::to_vec(&review).unwrap()).await
}

#[tokio::test]
async fn test_required_replicas_allowed() {
    let review = admission_review("uid-a", json!({"object": deployment(json!(3))}));
    let (status, body) = post_review(review).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["uid"], "uid-a");
    assert_eq!(body["response"]["allowed"], true);
    assert!(body["response"]["status"]["message"].is_null());
}

#[tokio::test]
async fn test_wrong_replicas_denied_with_count() {
    let review = admission_review("uid-b", json!({"object": deployment(json!(5))}));
    let (status, body) = post_review(review).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["uid"], "uid-b");
    assert_eq!(body["response"]["allowed"], false);
    let message = body["response"]["status"]["message"].as_str().unwrap();
    assert!(message.contains("5"), "message must name the count: {}", message);
}

#[tokio::test]
async fn test_zero_replicas_denied() {
    let review = admission_review("uid-c", json!({"object": deployment(json!(0))}));
    let (_, body) = post_review(review).await;

    assert_eq!(body["response"]["allowed"], false);
    let message = body["response"]["status"]["message"].as_str().unwrap();
    assert!(message.contains("0"));
}

#[tokio::test]
async fn test_unset_replicas_denied() {
    let mut object = deployment(json!(3));
    object["spec"].as_object_mut().unwrap().remove("replicas");
    let review = admission_review("uid-d", json!({"object": object}));
    let (status, body) = post_review(review).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["allowed"], false);
    let message = body["response"]["status"]["message"].as_str().unwrap();
    assert!(message.contains("unset"));
}

#[tokio::test]
async fn test_missing_object_denied() {
    // No object at all: decode fails closed instead of validating a
    // defaulted Deployment
    let review = admission_review("uid-e", json!({}));
    let (status, body) = post_review(review).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["uid"], "uid-e");
    assert_eq!(body["response"]["allowed"], false);
    let message = body["response"]["status"]["message"].as_str().unwrap();
    assert!(message.contains("DecodeFailed"));
}

#[tokio::test]
async fn test_kind_mismatch_denied() {
    let mut review = admission_review("uid-f", json!({"object": deployment(json!(3))}));
    review["request"]["kind"] = json!({"group": "", "version": "v1", "kind": "Pod"});
    let (status, body) = post_review(review).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["uid"], "uid-f");
    assert_eq!(body["response"]["allowed"], false);
    let message = body["response"]["status"]["message"].as_str().unwrap();
    assert!(message.contains("Pod"));
}

#[tokio::test]
async fn test_delete_operation_allowed() {
    let review = admission_review("uid-g", json!({"operation": "DELETE"}));
    let (status, body) = post_review(review).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["uid"], "uid-g");
    assert_eq!(body["response"]["allowed"], true);
}

#[tokio::test]
async fn test_malformed_body_yields_well_formed_review() {
    let (status, body) = post_raw(b"{not valid json".to_vec()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    // Still a well-formed AdmissionReview, never an uncontrolled error page
    assert_eq!(body["response"]["allowed"], false);
    assert!(
        body["response"]["status"]["message"]
            .as_str()
            .unwrap()
            .contains("Invalid AdmissionReview")
    );
}

#[tokio::test]
async fn test_missing_request_payload_rejected() {
    let review = json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
    });
    let (status, body) = post_review(review).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["response"]["allowed"], false);
}

#[tokio::test]
async fn test_uid_round_trip_on_every_path() {
    for (uid, overrides) in [
        ("rt-allowed", json!({"object": deployment(json!(3))})),
        ("rt-denied", json!({"object": deployment(json!(1))})),
        ("rt-no-object", json!({})),
        ("rt-delete", json!({"operation": "DELETE"})),
    ] {
        let (_, body) = post_review(admission_review(uid, overrides)).await;
        assert_eq!(body["response"]["uid"], uid, "uid must round-trip");
    }
}

#[tokio::test]
async fn test_same_review_twice_yields_same_decision() {
    let review = admission_review("uid-h", json!({"object": deployment(json!(5))}));
    let (_, first) = post_review(review.clone()).await;
    let (_, second) = post_review(review).await;
    assert_eq!(first, second);
}
