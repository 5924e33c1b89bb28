// Router tests for the demo site

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_greets_user_from_gateway_header() {
    // Spelled the way nginx forwards it; the gateway emits X-Auth-User-ID
    for name in ["X-Auth-User-Id", "X-Auth-User-ID", "x-auth-user-id"] {
        let response = authgate_site::app()
            .oneshot(
                Request::builder()
                    .uri("/dashboard")
                    .header(name, "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.starts_with("Hi user 1!\n\n"), "header spelled {}", name);
        assert!(body.contains("Request GET /dashboard\n"));
    }
}

#[tokio::test]
async fn test_missing_identity_is_rejected() {
    let response = authgate_site::app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(response).await, "Missing user identity\n");
}
