#![allow(dead_code)]

use std::time::{Duration, Instant};

use activity_tracker_api::config::AppConfig;
use activity_tracker_api::database::DatabaseManager;
use activity_tracker_api::{server, AppState};
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Database that never answers, for tests that must not touch storage
const UNREACHABLE_DATABASE: &str = "postgres://tracker@127.0.0.1:1/tracker";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub config: AppConfig,
}

impl TestServer {
    /// Start the router in-process on a free port.
    ///
    /// With `TEST_DATABASE_URL` set the server uses that database (migrated on
    /// start); otherwise it gets a lazy pool pointing nowhere.
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig::for_tests(database_url().unwrap_or_else(|| UNREACHABLE_DATABASE.to_string()));
        let pool = DatabaseManager::connect_lazy(&config.database)?;
        if database_url().is_some() {
            DatabaseManager::migrate(&pool).await?;
        }

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let state = AppState::new(pool, config.clone());
        tokio::spawn(async move {
            let _ = server::serve(listener, state).await;
        });

        let server = Self { port, base_url, config };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(self.url("/")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok().filter(|url| !url.is_empty())
}

/// Start a server backed by `TEST_DATABASE_URL`, or `None` to skip the test
pub async fn database_server() -> Result<Option<TestServer>> {
    if database_url().is_none() {
        eprintln!("TEST_DATABASE_URL not set, skipping database-backed test");
        return Ok(None);
    }
    Ok(Some(TestServer::spawn().await?))
}

/// A registered user with an active session
pub struct Session {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
}

pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..12])
}

pub async fn register_and_login(client: &reqwest::Client, server: &TestServer, prefix: &str) -> Result<Session> {
    let username = unique_username(prefix);
    let password = "correct horse battery".to_string();

    let res = client
        .post(server.url("/api/users/register"))
        .json(&json!({ "name": prefix, "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
    let body: Value = res.json().await?;
    let id = body["data"]["id"].as_i64().context("missing user id")?;

    let res = client
        .post(server.url("/api/users/login"))
        .form(&[("username", username.as_str()), ("password", password.as_str())])
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;

    Ok(Session {
        id,
        username,
        password,
        access_token: body["data"]["access_token"].as_str().context("missing access token")?.to_string(),
        refresh_token: body["data"]["refresh_token"].as_str().context("missing refresh token")?.to_string(),
    })
}
