use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub pubsub: PubSubConfig,
    pub service_name: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub url: Secret<String>,
    pub cache_enabled: bool,
    pub cache_ttl_seconds: u64,
}

#[derive(Clone, Debug)]
pub struct PubSubConfig {
    pub enabled: bool,
    pub send_refund_topic: String,
    pub refund_update_topic: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = env::var("TAXFILE_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("TAXFILE_SERVICE_PORT")
            .unwrap_or_else(|_| "3007".to_string())
            .parse()?;

        let db_url = env::var("TAXFILE_DATABASE_URL").expect("TAXFILE_DATABASE_URL must be set");
        let max_connections = env::var("TAXFILE_DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;
        let min_connections = env::var("TAXFILE_DATABASE_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()?;

        let redis_url = env::var("TAXFILE_REDIS_URL")
            .unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let cache_enabled = env::var("TAXFILE_REDIS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);
        let cache_ttl_seconds = env::var("TAXFILE_CACHE_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()?;

        let pubsub_enabled = env::var("TAXFILE_PUBSUB_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);
        let send_refund_topic = env::var("TAXFILE_SEND_REFUND_TOPIC")
            .unwrap_or_else(|_| "send-refund-to-irs".to_string());
        let refund_update_topic = env::var("TAXFILE_REFUND_UPDATE_TOPIC")
            .unwrap_or_else(|_| "refund-update-from-irs".to_string());

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                max_connections,
                min_connections,
            },
            redis: RedisConfig {
                url: Secret::new(redis_url),
                cache_enabled,
                cache_ttl_seconds,
            },
            pubsub: PubSubConfig {
                enabled: pubsub_enabled,
                send_refund_topic,
                refund_update_topic,
            },
            service_name: "taxfile-service".to_string(),
        })
    }
}
