mod common;

use anyhow::{Context, Result};
use reqwest::{header, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn login_rejects_wrong_password() -> Result<()> {
    let Some(server) = common::database_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let session = common::register_and_login(&client, &server, "carol").await?;

    let res = client
        .post(server.url("/api/users/login"))
        .form(&[("username", session.username.as_str()), ("password", "wrong")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()[header::WWW_AUTHENTICATE], "Bearer");
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Incorrect username or password");

    let res = client
        .post(server.url("/api/users/register"))
        .json(&json!({ "name": "dup", "username": session.username, "password": "x" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn overlong_values_are_validation_errors() -> Result<()> {
    let Some(server) = common::database_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let long = "x".repeat(51);

    let res = client
        .post(server.url("/api/users/register"))
        .json(&json!({ "name": "long", "username": long, "password": "pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let session = common::register_and_login(&client, &server, "erin").await?;
    let res = client
        .post(server.url("/api/activities"))
        .bearer_auth(&session.access_token)
        .json(&json!({ "name": long }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn refresh_rotates_and_logout_revokes() -> Result<()> {
    let Some(server) = common::database_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let session = common::register_and_login(&client, &server, "dave").await?;

    let refresh = |token: String| {
        client
            .post(server.url("/api/users/refresh"))
            .query(&[("refresh_token", token)])
            .send()
    };

    let res = refresh(session.refresh_token.clone()).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["token_type"], "bearer");
    let rotated = body["data"]["refresh_token"].as_str().context("refresh token")?.to_string();
    let access = body["data"]["access_token"].as_str().context("access token")?.to_string();

    // The presented token is spent
    let res = refresh(session.refresh_token.clone()).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/api/pages/get_username"))
        .bearer_auth(&access)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["userName"], session.username.as_str());

    let res = client
        .post(server.url("/api/users/logout"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = refresh(rotated).await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn friends_and_self_management() -> Result<()> {
    let Some(server) = common::database_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let erin = common::register_and_login(&client, &server, "erin").await?;
    let frank = common::register_and_login(&client, &server, "frank").await?;

    let res = client
        .post(server.url(&format!("/api/friends/{}", frank.id)))
        .bearer_auth(&erin.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Stored in both directions
    let res = client
        .get(server.url("/api/friends"))
        .bearer_auth(&frank.access_token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"][0]["id"].as_i64(), Some(erin.id));

    let res = client
        .post(server.url(&format!("/api/friends/{}", erin.id)))
        .bearer_auth(&erin.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .delete(server.url(&format!("/api/friends/{}", erin.id)))
        .bearer_auth(&frank.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url("/api/friends"))
        .bearer_auth(&erin.access_token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"], json!([]));

    // Only oneself can be updated or deleted
    let res = client
        .put(server.url(&format!("/api/users/{}", frank.id)))
        .bearer_auth(&erin.access_token)
        .json(&json!({ "nick": "hijacked" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .put(server.url(&format!("/api/users/{}", erin.id)))
        .bearer_auth(&erin.access_token)
        .json(&json!({ "nick": "e", "password": "new password" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["nick"], "e");

    let res = client
        .post(server.url("/api/users/login"))
        .form(&[("username", erin.username.as_str()), ("password", "new password")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(server.url(&format!("/api/users/{}", erin.id)))
        .bearer_auth(&erin.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Token of a deleted user no longer authenticates
    let res = client
        .get(server.url("/api/friends"))
        .bearer_auth(&erin.access_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
