//! Best-effort movie cache.
//!
//! # Responsibilities
//! - Store public movie representations under `mov:<uuid>`
//! - Serve lookups for the batched movie fetch
//!
//! # Design Decisions
//! - Every failure is logged and swallowed: a broken cache behaves like an empty one
//! - Redis in production; an in-process map for tests and single-node setups
//! - If Redis is unreachable at startup the gateway runs uncached instead of failing

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use redis::{aio::ConnectionManager, AsyncCommands};
use uuid::Uuid;

use crate::config::{CacheBackendKind, CacheConfig};
use crate::models::PublicMovie;
use crate::observability::metrics;

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    Memory(Arc<DashMap<String, (String, Option<Instant>)>>),
    Disabled,
}

/// Cheaply cloneable handle shared by all requests.
#[derive(Clone)]
pub struct MovieCache {
    backend: Backend,
    ttl: Option<Duration>,
}

fn movie_key(id: &Uuid) -> String {
    format!("mov:{id}")
}

impl MovieCache {
    /// Build the cache described by `config`, connecting to Redis when selected.
    pub async fn connect(config: &CacheConfig) -> Self {
        let ttl = (config.ttl_secs > 0).then(|| Duration::from_secs(config.ttl_secs));
        let backend = match config.backend {
            CacheBackendKind::Memory => Backend::Memory(Arc::new(DashMap::new())),
            CacheBackendKind::Disabled => Backend::Disabled,
            CacheBackendKind::Redis => connect_redis(config).await,
        };
        Self { backend, ttl }
    }

    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
            ttl: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            backend: Backend::Disabled,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub async fn get_movie(&self, id: &Uuid) -> Option<PublicMovie> {
        let raw = self.get_raw(&movie_key(id)).await?;
        match serde_json::from_str::<PublicMovie>(&raw) {
            Ok(movie) => {
                metrics::record_cache("hit");
                Some(movie)
            }
            Err(e) => {
                tracing::warn!(movie_id = %id, error = %e, "Discarding undecodable cache entry");
                metrics::record_cache("error");
                None
            }
        }
    }

    pub async fn set_movie(&self, movie: &PublicMovie) {
        // Per-user data must never be shared through the cache.
        let stored = PublicMovie {
            review: None,
            ..movie.clone()
        };
        match serde_json::to_string(&stored) {
            Ok(value) => self.set_raw(movie_key(&movie.id), value).await,
            Err(e) => tracing::warn!(movie_id = %movie.id, error = %e, "Failed to encode movie for cache"),
        }
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        match &self.backend {
            Backend::Disabled => None,
            Backend::Memory(map) => {
                let hit = map.get(key).and_then(|entry| {
                    let (value, expires) = entry.value();
                    match expires {
                        Some(at) if *at <= Instant::now() => None,
                        _ => Some(value.clone()),
                    }
                });
                if hit.is_none() {
                    metrics::record_cache("miss");
                }
                hit
            }
            Backend::Redis(manager) => {
                let mut conn = manager.clone();
                match conn.get::<_, Option<String>>(key).await {
                    Ok(Some(value)) => Some(value),
                    Ok(None) => {
                        metrics::record_cache("miss");
                        None
                    }
                    Err(e) => {
                        tracing::warn!(key, error = %e, "Cache read failed");
                        metrics::record_cache("error");
                        None
                    }
                }
            }
        }
    }

    async fn set_raw(&self, key: String, value: String) {
        match &self.backend {
            Backend::Disabled => {}
            Backend::Memory(map) => {
                let expires = self.ttl.map(|ttl| Instant::now() + ttl);
                map.insert(key, (value, expires));
            }
            Backend::Redis(manager) => {
                let mut conn = manager.clone();
                let result: redis::RedisResult<()> = match self.ttl {
                    Some(ttl) => conn.set_ex(&key, value, ttl.as_secs()).await,
                    None => conn.set(&key, value).await,
                };
                if let Err(e) = result {
                    tracing::warn!(key = %key, error = %e, "Cache write failed");
                }
            }
        }
    }
}

async fn connect_redis(config: &CacheConfig) -> Backend {
    let client = match redis::Client::open(config.connection_info()) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid Redis configuration, running without cache");
            return Backend::Disabled;
        }
    };

    let timeout = Duration::from_millis(config.connect_timeout_ms);
    match tokio::time::timeout(timeout, client.get_connection_manager()).await {
        Ok(Ok(manager)) => {
            tracing::info!(host = %config.redis_host, port = config.redis_port, "Connected to Redis");
            Backend::Redis(manager)
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Redis unavailable, running without cache");
            Backend::Disabled
        }
        Err(_) => {
            tracing::warn!(timeout = ?timeout, "Redis connection timed out, running without cache");
            Backend::Disabled
        }
    }
}
