use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use deycook::{router, AppConfig, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(config: AppConfig) -> Router {
    router(Arc::new(AppState::new(&config).unwrap()))
}

fn mock_app() -> Router {
    app_with(AppConfig::default())
}

async fn call(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = call(mock_app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = call(mock_app(), "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn test_mock_recipe_is_deterministic() {
    let request = r#"{"ingredients": ["tomato", "basil", "mozzarella"]}"#;

    let (status, first) = call(mock_app(), "POST", "/recipe", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = call(mock_app(), "POST", "/api/recipe", Some(request)).await;

    assert_eq!(first, second);
    assert_eq!(first["servings"], 2);
    assert_eq!(first["title"], "Tomato-style fusion recipe");
    assert!(!first["steps"].as_array().unwrap().is_empty());
    assert_eq!(first["includeVideo"], false);
    assert!(first.get("video").is_none());
}

#[tokio::test]
async fn test_mock_recipe_accepts_string_and_bare_array() {
    let (status, body) = call(
        mock_app(),
        "POST",
        "/recipe",
        Some(r#"{"ingredients": "tomato, basil\nolive oil", "includeVideo": true}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingredients"][0]["name"], "tomato");
    assert_eq!(body["ingredients"][2]["name"], "olive oil");
    assert_eq!(body["includeVideo"], true);

    let (status, body) = call(mock_app(), "POST", "/recipe", Some(r#"["egg", "rice"]"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Egg-style fusion recipe");
}

#[tokio::test]
async fn test_invalid_ingredients_are_rejected() {
    for request in [
        r#"{"ingredients": ""}"#,
        r#"{"ingredients": []}"#,
        r#"{"ingredients": ["  ", ""]}"#,
        r#"{}"#,
    ] {
        let (status, body) = call(mock_app(), "POST", "/recipe", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "for {}", request);
        assert_eq!(
            body["error"],
            "ingredients is required as array or comma/newline string"
        );
        let sent: Value = serde_json::from_str(request).unwrap();
        assert_eq!(body["received"], sent);
    }
}

#[tokio::test]
async fn test_non_json_body_is_rejected() {
    let (status, body) = call(mock_app(), "POST", "/recipe", Some("tomato, basil")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["received"], Value::Null);
}

#[tokio::test]
async fn test_ping_in_mock_mode() {
    let (status, body) = call(mock_app(), "GET", "/api/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "model": "mock", "sample": "Pong!"}));
}

#[tokio::test]
async fn test_wrong_method() {
    let (status, _) = call(mock_app(), "GET", "/recipe", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_headers() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = mock_app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn test_send_validation_precedes_webhook() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/hook").expect(0).create_async().await;

    let mut config = AppConfig::default();
    config.relay.webhook_url = Some(format!("{}/hook", server.url()));
    let app = app_with(config);

    let (status, body) = call(
        app.clone(),
        "POST",
        "/send",
        Some(r#"{"email": "not-an-email", "recipe": {"steps": ["Cook"]}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "A valid email is required");

    let (status, body) = call(
        app,
        "POST",
        "/api/send",
        Some(r#"{"email": "cook@example.com", "recipe": {"title": "Soup", "steps": []}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Recipe is required");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_without_webhook_url() {
    let (status, body) = call(
        mock_app(),
        "POST",
        "/send",
        Some(r#"{"email": "cook@example.com", "recipe": {"steps": ["Cook"]}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Missing webhook URL");
}

#[tokio::test]
async fn test_send_relays_to_webhook() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/hook")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"email": "cook@example.com", "subject": "Your DeyCook Recipe: Soup"}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "success"}"#)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.relay.webhook_url = Some(format!("{}/hook", server.url()));

    let (status, body) = call(
        app_with(config),
        "POST",
        "/api/send",
        Some(r#"{"email": "cook@example.com", "recipe": {"title": "Soup", "steps": ["Simmer"]}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_reports_webhook_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/hook")
        .with_status(410)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Hook is gone"}"#)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.relay.webhook_url = Some(format!("{}/hook", server.url()));

    let (status, body) = call(
        app_with(config),
        "POST",
        "/send",
        Some(r#"{"email": "cook@example.com", "recipe": {"steps": ["Simmer"]}}"#),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "Hook is gone");
    assert_eq!(body["details"], json!({"message": "Hook is gone"}));
}
