mod common;

use activity_tracker_api::auth::TokenService;
use activity_tracker_api::database::models::User;
use anyhow::Result;
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

fn token_user() -> User {
    User {
        id: 1,
        name: "Ghost".into(),
        username: "ghost".into(),
        chat_id: None,
        password: String::new(),
        nick: None,
        refresh_token_hash: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn protected_routes_require_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();

    for path in ["/api/friends", "/api/activities", "/api/pages/get_username", "/api/users/1"] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let body: Value = res.json().await?;
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let res = client
        .post(server.url("/api/charts/data_for_chart"))
        .json(&json!({ "id": 1, "StatusView": false }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn malformed_tokens_are_rejected() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let client = reqwest::Client::new();

    for value in ["Bearer not-a-jwt", "Basic Z2hvc3Q6cHc=", "Bearer "] {
        let res = client
            .get(server.url("/api/activities"))
            .header(header::AUTHORIZATION, value)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{value}");
        let body: Value = res.json().await?;
        assert_eq!(body["message"], "Could not validate credentials");
    }
    Ok(())
}

#[tokio::test]
async fn refresh_token_cannot_authorize_requests() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let pair = TokenService::from_config(&server.config.security).issue_pair(&token_user())?;

    let res = reqwest::Client::new()
        .get(server.url("/api/activities"))
        .bearer_auth(&pair.refresh_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_elsewhere_is_rejected() -> Result<()> {
    let server = common::TestServer::spawn().await?;
    let mut security = server.config.security.clone();
    security.secret_key = "another-secret".into();
    let pair = TokenService::from_config(&security).issue_pair(&token_user())?;

    let client = reqwest::Client::new();
    let res = client
        .get(server.url("/api/activities"))
        .bearer_auth(&pair.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(server.url(&format!("/api/users/refresh?refresh_token={}", pair.refresh_token)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Could not validate credentials");
    Ok(())
}
