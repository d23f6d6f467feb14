mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn register_returns_public_user() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.register("u1@example.com", "secret1").await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "u1@example.com");
    assert!(body["user"]["id"].is_string());
    assert!(body["user"].get("password_hash").is_none(), "hash leaked: {}", body);
    assert!(body["user"].get("password").is_none(), "password leaked: {}", body);
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let server = common::TestServer::start().await?;

    assert_eq!(server.register("u1@example.com", "secret1").await?.status(), StatusCode::CREATED);

    let res = server.register("u1@example.com", "secret2").await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(common::error_message(res).await?, "Email already registered");
    Ok(())
}

#[tokio::test]
async fn register_validates_input() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.register("not-an-email", "secret1").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_message(res).await?, "Invalid email format");

    let res = server.register("u1@example.com", "12345").await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .post(server.url("/api/register"))
        .json(&json!({ "email": "u1@example.com" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::error_message(res).await?, "Email and password are required");
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_400_with_error_body() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    common::error_message(res).await?;
    Ok(())
}

#[tokio::test]
async fn login_issues_token_and_hides_which_field_was_wrong() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.register("u1@example.com", "secret1").await?;

    let res = server.login("u1@example.com", "secret1").await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Login successful");
    assert!(body["access_token"].as_str().map(|t| !t.is_empty()).unwrap_or(false));
    assert_eq!(body["user"]["email"], "u1@example.com");

    let wrong_password = server.login("u1@example.com", "wrong-password").await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let unknown_email = server.login("u2@example.com", "secret1").await?;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let a = common::error_message(wrong_password).await?;
    let b = common::error_message(unknown_email).await?;
    assert_eq!(a, "Invalid email or password");
    assert_eq!(a, b);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_bearer_token() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.client.get(server.url("/api/events")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::error_message(res).await?, "Missing Authorization header");

    let res = server
        .client
        .get(server.url("/api/participants"))
        .bearer_auth("garbage.token.value")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::error_message(res).await?, "Invalid or expired token");

    let res = server
        .client
        .get(server.url("/api/events"))
        .header("authorization", "Token abc")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
