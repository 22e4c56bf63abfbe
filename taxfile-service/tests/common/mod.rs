//! Common test utilities for taxfile-service integration tests.

#![allow(dead_code)]

use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use std::sync::Once;
use taxfile_service::config::{Config, DatabaseConfig, PubSubConfig, RedisConfig, ServerConfig};
use taxfile_service::services::{Database, MemoryCache, MemoryPublisher};
use taxfile_service::{build_router, AppState, Application};
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,taxfile_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn test_config(database_url: String) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: Secret::new(database_url),
            max_connections: 2,
            min_connections: 1,
        },
        redis: RedisConfig {
            url: Secret::new("redis://localhost:6379".to_string()),
            cache_enabled: false,
            cache_ttl_seconds: 3600,
        },
        pubsub: PubSubConfig {
            enabled: false,
            send_refund_topic: "send-refund-to-irs".to_string(),
            refund_update_topic: "refund-update-from-irs".to_string(),
        },
        service_name: "taxfile-service-test".to_string(),
    }
}

fn require_database_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must be set - integration tests need PostgreSQL")
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: Database,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn the full application with the no-op cache and publisher.
    pub async fn spawn() -> Self {
        init_tracing();

        let config = test_config(require_database_url());
        let app = Application::build(config)
            .await
            .expect("Failed to build application");

        let port = app.port();
        let db = app.state().db.clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self::wait_until_healthy(port, db).await
    }

    /// Spawn the router with in-memory cache and publisher gateways so tests
    /// can observe cache entries and published messages directly.
    pub async fn spawn_with_memory_gateways() -> (Self, Arc<MemoryCache>, Arc<MemoryPublisher>) {
        init_tracing();

        let config = test_config(require_database_url());
        let db = Database::new(config.database.url.expose_secret(), 2, 1)
            .await
            .expect("Failed to connect to test database");
        db.run_migrations().await.expect("Failed to run migrations");

        let cache = Arc::new(MemoryCache::new());
        let publisher = Arc::new(MemoryPublisher::new());
        let state = AppState {
            config,
            db: db.clone(),
            cache: cache.clone(),
            publisher: publisher.clone(),
        };

        let router = build_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        let app = Self::wait_until_healthy(port, db).await;
        (app, cache, publisher)
    }

    async fn wait_until_healthy(port: u16, db: Database) -> Self {
        let client = reqwest::Client::new();
        let address = format!("http://127.0.0.1:{}", port);
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            client,
        }
    }

    pub async fn create_user(&self, user_id: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/user", self.address))
            .json(&serde_json::json!({
                "userId": user_id,
                "firstName": "Jane",
                "lastName": "Filer"
            }))
            .send()
            .await
            .expect("Failed to execute create user request")
    }

    pub async fn create_tax_file(
        &self,
        user_id: &str,
        year: i32,
        refund: &str,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}/taxFile", self.address))
            .json(&tax_file_body(user_id, year, refund))
            .send()
            .await
            .expect("Failed to execute create tax file request")
    }

    pub async fn post_refund_event(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/processRefundEvent", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute refund event request")
    }

    pub async fn get_refund_by_file_id(&self, file_id: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/refund", self.address))
            .query(&[("fileId", file_id)])
            .send()
            .await
            .expect("Failed to execute refund query")
    }
}

pub fn unique_user_id() -> String {
    format!("user-{}", Uuid::new_v4())
}

pub fn tax_file_body(user_id: &str, year: i32, refund: &str) -> serde_json::Value {
    serde_json::json!({
        "userId": user_id,
        "year": year,
        "income": 120000,
        "expense": 20000,
        "taxRate": 30,
        "deducted": 25000,
        "refund": refund
    })
}

pub fn refund_event_body(file_id: &str, event_type: &str) -> serde_json::Value {
    serde_json::json!({
        "eventId": format!("evt-{}", Uuid::new_v4()),
        "fileId": file_id,
        "type": event_type,
        "data": {}
    })
}
