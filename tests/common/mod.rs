#![allow(dead_code)]

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use event_planner_api::{app, database::Database, AppConfig, AppState};

/// A server on an ephemeral port, by default backed by its own in-memory store.
/// It lives as long as the test's runtime.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::for_tests()).await
    }

    /// Same as `start`, against whatever store `config.database.url` names.
    pub async fn start_with(config: AppConfig) -> Result<Self> {
        let database = Database::connect(&config).await?;
        let state = AppState::new(config, &database);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.expect("test server");
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?)
    }

    /// Register and log in, returning the bearer token.
    pub async fn user_token(&self, email: &str) -> Result<String> {
        let res = self.register(email, "secret1").await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body: Value = self.login(email, "secret1").await?.json().await?;
        body["access_token"]
            .as_str()
            .map(str::to_string)
            .context("login response missing access_token")
    }

    pub async fn create_event(&self, token: &str, title: &str, date: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/events"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "date": date }))
            .send()
            .await?)
    }

    pub async fn join(&self, token: &str, event_id: &str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url("/api/participants"))
            .bearer_auth(token)
            .json(&json!({ "event_id": event_id }))
            .send()
            .await?)
    }
}

pub async fn error_message(res: Response) -> Result<String> {
    let body: Value = res.json().await?;
    body["error"]
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("missing error field: {}", body))
}
