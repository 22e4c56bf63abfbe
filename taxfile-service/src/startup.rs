//! Application startup and lifecycle management.

use crate::config::Config;
use crate::handlers;
use crate::services::{
    Database, NoOpCache, NoOpPublisher, RedisCache, RedisPublisher, RefundPublisher, TaxFileCache,
};
use axum::{
    routing::{get, post},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub cache: Arc<dyn TaxFileCache>,
    pub publisher: Arc<dyn RefundPublisher>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/user",
            post(handlers::create_user).get(handlers::list_users),
        )
        .route("/user/:user_id", get(handlers::get_user))
        .route(
            "/taxFile",
            post(handlers::create_tax_file).get(handlers::get_tax_file),
        )
        .route("/taxFile/taxUser", get(handlers::get_tax_user))
        .route("/refund", get(handlers::get_refund))
        .route("/processRefundEvent", post(handlers::process_refund_event))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: Config) -> Result<Self, AppError> {
        let db = Database::new(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await?;
        db.run_migrations().await?;

        // One Redis connection manager feeds both optional gateways.
        let manager = if config.redis.cache_enabled || config.pubsub.enabled {
            let client =
                redis::Client::open(config.redis.url.expose_secret().as_str()).map_err(|e| {
                    tracing::error!("Failed to open Redis client: {}", e);
                    AppError::RedisError(e)
                })?;
            let manager = client.get_connection_manager().await.map_err(|e| {
                tracing::error!("Failed to connect to Redis: {}", e);
                AppError::RedisError(e)
            })?;
            tracing::info!("Connected to Redis");
            Some(manager)
        } else {
            None
        };

        let cache: Arc<dyn TaxFileCache> = match (&manager, config.redis.cache_enabled) {
            (Some(manager), true) => Arc::new(RedisCache::new(
                manager.clone(),
                config.redis.cache_ttl_seconds,
            )),
            _ => {
                tracing::info!("Tax file cache disabled - using no-op cache");
                Arc::new(NoOpCache)
            }
        };

        let publisher: Arc<dyn RefundPublisher> = match (&manager, config.pubsub.enabled) {
            (Some(manager), true) => Arc::new(RedisPublisher::new(
                manager.clone(),
                config.pubsub.send_refund_topic.clone(),
                config.pubsub.refund_update_topic.clone(),
            )),
            _ => {
                tracing::info!("Pub/Sub disabled - using no-op publisher");
                Arc::new(NoOpPublisher)
            }
        };

        let state = AppState {
            config: config.clone(),
            db,
            cache,
            publisher,
        };

        let app = build_router(state.clone());

        let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid listen address: {}", e)))?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(service = %config.service_name, "Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the application state for sharing with tests.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
