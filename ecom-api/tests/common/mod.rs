/// Common test utilities for integration tests
///
/// Builds the real router over an in-memory store, so no database is needed:
/// - A customer and an admin account with bearer tokens
/// - Catalogue and address seeding helpers
/// - A request helper returning status and JSON body

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use ecom_api::app::{build_router, AppState};
use ecom_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use ecom_shared::auth::jwt::TokenService;
use ecom_shared::models::address::{Address, CreateAddress};
use ecom_shared::models::product::{CreateProduct, Product};
use ecom_shared::models::user::{CreateUser, User, UserRole};
use ecom_shared::store::{memory::MemoryStore, AddressStore, ProductStore, UserStore};
use serde_json::Value;
use std::sync::Arc;
use tower::Service as _;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: MemoryStore,
    pub app: axum::Router,
    pub user: User,
    pub user_token: String,
    pub admin: User,
    pub admin_token: String,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            ttl_minutes: 30,
        },
    }
}

impl TestContext {
    /// Creates a fresh store with one customer and one admin
    pub async fn new() -> anyhow::Result<Self> {
        let store = MemoryStore::new();
        let tokens = TokenService::new(TEST_SECRET);

        let user = create_user(&store, "customer@example.com", "unused", UserRole::User).await?;
        let admin = create_user(&store, "admin@example.com", "unused", UserRole::Admin).await?;

        let user_token = tokens.issue(user.id)?;
        let admin_token = tokens.issue(admin.id)?;

        let state = AppState::new(Arc::new(store.clone()), test_config());
        let app = build_router(state);

        Ok(TestContext {
            store,
            app,
            user,
            user_token,
            admin,
            admin_token,
        })
    }

    /// Sends a request, optionally with a bearer token and JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.call(request).await
    }

    /// Sends a prepared request
    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                panic!("Expected JSON body, got: {}", String::from_utf8_lossy(&body))
            })
        };

        (status, json)
    }

    /// Adds a product straight to the store
    pub async fn seed_product(&self, price: f64, discount_price: Option<f64>) -> Product {
        self.store
            .create_product(CreateProduct {
                category_name: "Home".to_string(),
                subcategory_name: Some("Kitchen".to_string()),
                name: "Cast iron pan".to_string(),
                description: "Pre-seasoned, 26 cm".to_string(),
                brand: Some("Forge".to_string()),
                price,
                discount_price,
                is_active: true,
            })
            .await
            .unwrap()
    }

    /// Adds an address owned by `user_id` straight to the store
    pub async fn seed_address(&self, user_id: i64) -> Address {
        self.store
            .create_address(
                user_id,
                CreateAddress {
                    address_line1: "221B Baker Street".to_string(),
                    address_line2: None,
                    city: "Mumbai".to_string(),
                    state: "MH".to_string(),
                    country: "India".to_string(),
                    postal_code: "400001".to_string(),
                    is_default_shipping: true,
                    is_default_billing: true,
                },
            )
            .await
            .unwrap()
    }
}

/// Creates a user directly in the store
pub async fn create_user(
    store: &MemoryStore,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> anyhow::Result<User> {
    Ok(store
        .create_user(CreateUser {
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone_number: None,
            role,
        })
        .await?)
}
