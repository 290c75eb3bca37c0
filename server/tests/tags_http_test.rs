//! HTTP tests for organization tags.
//!
//! Run with: `cargo test --test tags_http_test`

mod helpers;

use axum::http::{Method, StatusCode};
use serde_json::json;

use helpers::{bearer, expect_status, json_body, tags_uri, TestApp};

#[tokio::test]
async fn test_add_tags_normalizes_and_skips_existing() {
    let app = TestApp::new();
    let acme = app.create_organization("acme");
    let admin = app.create_member("admin", &acme);
    let bob = app.create_member("bob", &acme);
    app.grant(&admin, "admin", Some(&acme)).await;
    let token = app.user_token(&admin);

    let resp = app
        .oneshot(json_body(
            bearer(TestApp::request(Method::POST, &tags_uri(&acme)), &token),
            &json!({ "user_id": bob.id, "names": ["vip!", "beta tester", "vip", "..."] }),
        ))
        .await;
    let body = expect_status(resp, StatusCode::OK).await;
    assert_eq!(body["added"], json!(["vip", "betatester"]));

    // Second add only reports what is new
    let resp = app
        .oneshot(json_body(
            bearer(TestApp::request(Method::POST, &tags_uri(&acme)), &token),
            &json!({ "user_id": bob.id, "names": ["vip", "churn-risk"] }),
        ))
        .await;
    let body = expect_status(resp, StatusCode::OK).await;
    assert_eq!(body["added"], json!(["churn-risk"]));

    let mut names = app
        .state
        .tags
        .names_for(&acme, Some(&bob))
        .await
        .unwrap();
    names.sort();
    assert_eq!(names, vec!["betatester", "churn-risk", "vip"]);
}

#[tokio::test]
async fn test_remove_tags_returns_remaining() {
    let app = TestApp::new();
    let acme = app.create_organization("acme");
    let admin = app.create_member("admin", &acme);
    app.grant(&admin, "admin", Some(&acme)).await;
    let token = app.user_token(&admin);

    // Organization-wide tags: no user
    let resp = app
        .oneshot(json_body(
            bearer(TestApp::request(Method::POST, &tags_uri(&acme)), &token),
            &json!({ "names": ["enterprise", "eu"] }),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(json_body(
            bearer(TestApp::request(Method::DELETE, &tags_uri(&acme)), &token),
            &json!({ "names": ["eu", "unknown"] }),
        ))
        .await;
    let body = expect_status(resp, StatusCode::OK).await;
    assert_eq!(body["remaining"], json!(["enterprise"]));
}

#[tokio::test]
async fn test_member_cannot_manage_tags() {
    let app = TestApp::new();
    let acme = app.create_organization("acme");
    let alice = app.create_member("alice", &acme);
    let token = app.user_token(&alice);

    let resp = app
        .oneshot(json_body(
            bearer(TestApp::request(Method::POST, &tags_uri(&acme)), &token),
            &json!({ "names": ["vip"] }),
        ))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let names = app.state.tags.names_for(&acme, None).await.unwrap();
    assert!(names.is_empty());
}
