// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use status_board::{
    config::Config,
    routes,
    services::auth::seed_admin,
    state::AppState,
    store::{MemoryStore, SharedStore},
};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub address: String,
    pub store: SharedStore,
    pub client: reqwest::Client,
}

pub fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        port: 0,
        admin_name: "Test Admin".to_string(),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    }
}

/// Spawns the app on a random port with a fresh in-memory store.
pub async fn spawn_app() -> TestApp {
    let config = test_config();
    let store: SharedStore = Arc::new(MemoryStore::new());

    seed_admin(store.as_ref(), &config)
        .await
        .expect("Failed to seed admin");

    let state = AppState {
        store: store.clone(),
        config,
    };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        store,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    /// Registers a fresh user and returns `(token, user id)`.
    pub async fn register_user(&self, name: &str) -> (String, i64) {
        let email = format!("{}_{}@example.com", name, &uuid::Uuid::new_v4().to_string()[..8]);
        let body: Value = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "name": name, "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Register failed")
            .json()
            .await
            .expect("Failed to parse register json");

        let token = body["token"].as_str().expect("Token not found").to_string();
        let id = body["user"]["id"].as_i64().expect("User id not found");
        (token, id)
    }

    pub async fn admin_token(&self) -> String {
        let body: Value = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .send()
            .await
            .expect("Admin login failed")
            .json()
            .await
            .expect("Failed to parse login json");
        body["token"].as_str().expect("Token not found").to_string()
    }

    pub async fn create_status(&self, token: &str, title: &str, category: &str) -> Value {
        let response = self
            .client
            .post(self.url("/status"))
            .bearer_auth(token)
            .json(&json!({
                "title": title,
                "description": format!("{} description", title),
                "category": category,
            }))
            .send()
            .await
            .expect("Create status failed");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("Failed to parse status json")
    }

    pub async fn create_category(&self, token: &str, name: &str) -> Value {
        let response = self
            .client
            .post(self.url("/categories"))
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("Create category failed");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("Failed to parse category json")
    }
}
