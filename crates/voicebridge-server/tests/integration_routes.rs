//! Integration tests for the Axum web server.
//!
//! These verify that the signaling and observability routes are correctly
//! wired to their handlers. The audio WebSocket itself isn't exercised here
//! (oneshot requests can't perform an upgrade handshake) — its logic is
//! covered indirectly through `voicebridge-core`'s own session tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use voicebridge_server::bootstrap::{bootstrap, CorsConfig};
use voicebridge_server::routes::create_router;

fn test_app() -> axum::Router {
    create_router(bootstrap(), &CorsConfig::AllowAll)
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn creating_a_session_returns_an_id_and_audio_url() {
    let app = test_app();
    let response = app
        .oneshot(Request::builder().method("POST").uri("/session").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    let session_id = json["session_id"].as_str().expect("session_id present");
    assert_eq!(json["audio_url"], format!("/session/{session_id}/audio"));
}

#[tokio::test]
async fn closing_an_unknown_session_returns_not_found() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/session/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_for_an_unknown_session_returns_not_found() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/session/00000000-0000-0000-0000-000000000000/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn a_freshly_created_session_has_a_zeroed_metrics_snapshot() {
    let app = test_app();

    let create_response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri("/session").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = create_response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    let session_id = json["session_id"].as_str().unwrap().to_string();

    let metrics_response = app
        .oneshot(
            Request::builder()
                .uri(format!("/session/{session_id}/metrics"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(metrics_response.status(), StatusCode::OK);
    let body = metrics_response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_events"], 0);
}

#[tokio::test]
async fn closing_a_known_session_succeeds_and_then_the_session_is_gone() {
    let app = test_app();

    let create_response = app
        .clone()
        .oneshot(Request::builder().method("POST").uri("/session").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = create_response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    let session_id = json["session_id"].as_str().unwrap().to_string();

    let close_response = app
        .clone()
        .oneshot(Request::builder().method("DELETE").uri(format!("/session/{session_id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(close_response.status(), StatusCode::NO_CONTENT);

    let metrics_response = app
        .oneshot(
            Request::builder()
                .uri(format!("/session/{session_id}/metrics"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(metrics_response.status(), StatusCode::NOT_FOUND);
}
