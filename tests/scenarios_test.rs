//! End-to-end scenarios for the local admin server

use adminserver_config::Environment;
use adminserver_core::items::{LDAP_TIMEOUT, LDAP_URL, LDAP_VERIFY_CERT};
use adminserver_integration_tests::{app, json_body, memory_manager, request};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_ldap_url_comes_from_environment_on_empty_store() {
    let (manager, driver) =
        memory_manager(Environment::snapshot([("LDAP_URL", "ldap://example.com")]));
    manager.load().await.unwrap();

    assert_eq!(manager.get(LDAP_URL).unwrap().get_string(), "ldap://example.com");
    assert_eq!(
        driver.snapshot().get(LDAP_URL).map(String::as_str),
        Some("ldap://example.com")
    );
}

#[tokio::test]
async fn test_put_then_get_returns_typed_values() {
    let (manager, _) = memory_manager(Environment::empty());
    let app = app(manager);

    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            "/api/configurations",
            r#"{"ldap_timeout": 10, "ldap_url": "ldaps://x"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request(Method::GET, "/api/configs", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let configs = json_body(response).await;
    assert_eq!(configs[LDAP_TIMEOUT], json!(10));
    assert_eq!(configs[LDAP_URL], json!("ldaps://x"));
}

#[tokio::test]
async fn test_invalid_json_body_changes_nothing() {
    let (manager, _) = memory_manager(Environment::empty());
    let app = app(manager);

    let before = json_body(
        app.clone()
            .oneshot(request(Method::GET, "/api/configs", ""))
            .await
            .unwrap(),
    )
    .await;

    let response = app
        .clone()
        .oneshot(request(Method::PUT, "/api/configurations", "a"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = json_body(
        app.oneshot(request(Method::GET, "/api/configs", ""))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_reset_follows_environment_changes() {
    let (manager, driver) = memory_manager(Environment::snapshot([("LDAP_URL", "ldap://a")]));
    manager.load().await.unwrap();

    manager.reset().await.unwrap();
    assert_eq!(manager.get_string(LDAP_URL).unwrap(), "ldap://a");

    manager.set_environment(Environment::snapshot([("LDAP_URL", "ldap://b")]));
    manager.reset().await.unwrap();

    assert_eq!(manager.get_string(LDAP_URL).unwrap(), "ldap://b");
    assert_eq!(
        driver.snapshot().get(LDAP_URL).map(String::as_str),
        Some("ldap://b")
    );
}

#[tokio::test]
async fn test_ping_requires_the_secret_cookie() {
    let (manager, _) = memory_manager(Environment::empty());
    let app = app(manager);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/ping")
                .header(header::COOKIE, "secret=wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request(Method::GET, "/api/ping", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!("Pong"));
}

#[tokio::test]
async fn test_bool_values_are_canonicalized() {
    let (manager, driver) = memory_manager(Environment::empty());
    manager.load().await.unwrap();

    manager.set(LDAP_VERIFY_CERT, "on").unwrap();
    assert!(manager.get_bool(LDAP_VERIFY_CERT).unwrap());
    assert_eq!(manager.get(LDAP_VERIFY_CERT).unwrap().raw(), "true");

    manager.save().await.unwrap();
    assert_eq!(
        driver.snapshot().get(LDAP_VERIFY_CERT).map(String::as_str),
        Some("true")
    );
}

#[tokio::test]
async fn test_capacity_and_reset_endpoints() {
    let (manager, _) = memory_manager(Environment::empty());
    let app = app(manager.clone());

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/systeminfo/capacity", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"total": 1000, "free": 250}));

    manager.set(LDAP_TIMEOUT, "42").unwrap();
    let response = app
        .oneshot(request(Method::POST, "/api/configurations/reset", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(manager.get_int(LDAP_TIMEOUT).unwrap(), 5);
}
