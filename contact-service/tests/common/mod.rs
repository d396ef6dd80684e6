//! Test helpers: an in-memory backed router driven with `oneshot`, and a real server
//! against MongoDB for the ignored end-to-end suite.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
};
use contact_service::config::{ContactConfig, HttpConfig, MongoConfig};
use contact_service::error::ContactError;
use contact_service::models::{Contact, ContactFields};
use contact_service::services::{ContactStore, InMemoryContactStore, MongoContactStore};
use contact_service::{build_router, AppState, Application};
use mongodb::bson::oid::ObjectId;
use serde_json::Value;
use service_core::config::{Config as CoreConfig, Environment};
use std::sync::Arc;
use tower::util::ServiceExt;

pub fn test_config(database: &str) -> ContactConfig {
    ContactConfig {
        common: CoreConfig {
            port: 0, // Random port
            environment: Environment::Dev,
        },
        service_name: "contact-service".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: std::env::var("TEST_MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: database.to_string(),
        },
        http: HttpConfig::default(),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("Response body is not UTF-8")
    }
}

/// Router over an in-memory store; each request runs through the full middleware stack.
pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config("unused"))
    }

    pub fn with_config(config: ContactConfig) -> Self {
        let store: Arc<dyn ContactStore> = Arc::new(InMemoryContactStore::new());
        Self {
            state: AppState::new(config, store),
        }
    }

    pub fn with_store(store: impl ContactStore + 'static) -> Self {
        Self {
            state: AppState::new(test_config("unused"), Arc::new(store)),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn create_contact(&self, name: &str, number: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/api/contacts",
            Some(serde_json::json!({ "name": name, "number": number })),
        )
        .await
    }

    /// Create a contact that must succeed and return its id.
    pub async fn seed_contact(&self, name: &str, number: &str) -> String {
        let response = self.create_contact(name, number).await;
        assert_eq!(response.status, StatusCode::OK, "seed failed: {}", response.text());
        response.json()["id"]
            .as_str()
            .expect("Missing id")
            .to_string()
    }
}

/// Store whose every call fails, as if the database were unreachable.
pub struct FailingContactStore;

fn store_down() -> ContactError {
    ContactError::Store(anyhow::anyhow!("store unavailable"))
}

#[async_trait]
impl ContactStore for FailingContactStore {
    async fn health_check(&self) -> Result<(), ContactError> {
        Err(store_down())
    }

    async fn find_by_name(&self, _name: &str) -> Result<Option<Contact>, ContactError> {
        Err(store_down())
    }

    async fn find_all(&self) -> Result<Vec<Contact>, ContactError> {
        Err(store_down())
    }

    async fn count(&self) -> Result<u64, ContactError> {
        Err(store_down())
    }

    async fn find_by_id(&self, _id: &str) -> Result<Option<Contact>, ContactError> {
        Err(store_down())
    }

    async fn insert(&self, _fields: ContactFields) -> Result<Contact, ContactError> {
        Err(store_down())
    }

    async fn update_by_id(
        &self,
        _id: &str,
        _fields: ContactFields,
    ) -> Result<Option<Contact>, ContactError> {
        Err(store_down())
    }

    async fn delete_by_id(&self, _id: &str) -> Result<bool, ContactError> {
        Err(store_down())
    }
}

/// A running server backed by a throwaway MongoDB database.
pub struct SpawnedApp {
    pub address: String,
    pub store: MongoContactStore,
    pub db_name: String,
}

impl SpawnedApp {
    pub async fn spawn() -> Self {
        let db_name = format!("contact_test_{}", ObjectId::new().to_hex());
        let config = test_config(&db_name);

        let store = MongoContactStore::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .expect("Failed to connect to MongoDB");
        store
            .initialize_indexes()
            .await
            .expect("Failed to create indexes");

        let app = Application::build_with_store(config, Arc::new(store.clone()))
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the HTTP server by polling the health endpoint
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        Self {
            address,
            store,
            db_name,
        }
    }

    pub async fn cleanup(&self) {
        let _ = self.store.database().drop(None).await;
    }
}
