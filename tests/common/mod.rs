#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use storefront_api::config::AppConfig;
use storefront_api::database::MemoryStore;
use storefront_api::server::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// The real router on a free port, backed by a fresh in-memory store.
/// Stopped when dropped.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Like `spawn`, after letting the caller adjust the configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.port = port;
        config.security.jwt_secret = TEST_SECRET.to_string();
        config.security.cors_origins = vec![
            "http://localhost:3000".to_string(),
            ALLOWED_ORIGIN.to_string(),
        ];
        configure(&mut config);

        let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            port,
            base_url,
            client: Client::new(),
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Register a user and return `(token, user)`.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<(String, Value)> {
        let res = self
            .post("/auth/register")
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == 201, "register failed: {}", res.status());

        let body: Value = res.json().await?;
        let token = body["data"]["token"]
            .as_str()
            .context("register response had no token")?
            .to_string();
        Ok((token, body["data"]["user"].clone()))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn json_body(res: Response) -> Result<Value> {
    Ok(res.json::<Value>().await?)
}

pub fn pen() -> Value {
    json!({ "name": "Pen", "price": 1.5, "category": "office", "stock": 10 })
}

pub fn shipping_address() -> Value {
    json!({
        "street": "1 Main St",
        "city": "Springfield",
        "state": "IL",
        "zipCode": "62701",
        "country": "US"
    })
}
