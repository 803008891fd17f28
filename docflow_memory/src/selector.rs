use docflow_core::DocumentStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{Result, StoreError};
use crate::in_memory::InMemoryStore;
use crate::redis_store::RedisStore;

/// Pick the store backend once, at startup.
///
/// `auto` probes Redis and falls back to the in-process map when the probe
/// fails; the connection is never retried afterwards. `redis` turns a failed
/// probe into an error.
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    if config.backend == StoreBackend::Memory {
        info!("Using in-memory document store");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    match probe_redis(config).await {
        Ok(store) => {
            info!("Using Redis document store");
            Ok(Arc::new(store))
        }
        Err(e) if config.backend == StoreBackend::Auto => {
            warn!("Redis unavailable ({e}); falling back to in-memory storage");
            Ok(Arc::new(InMemoryStore::new()))
        }
        Err(e) => Err(e),
    }
}

async fn probe_redis(config: &StoreConfig) -> Result<RedisStore> {
    let url = config.redis_url();
    let limit = Duration::from_secs(config.connect_timeout_secs);

    timeout(limit, RedisStore::connect(&url))
        .await
        .map_err(|_| StoreError::Connection(format!("timed out after {}s", limit.as_secs())))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable(backend: StoreBackend) -> StoreConfig {
        StoreConfig {
            backend,
            host: "127.0.0.1".to_string(),
            port: 1,
            db: 0,
            connect_timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn memory_backend_skips_probe() {
        let store = connect_store(&unreachable(StoreBackend::Memory)).await.unwrap();
        assert_eq!(store.backend_name(), "In-Memory Storage");
    }

    #[tokio::test]
    async fn auto_falls_back_when_redis_is_down() {
        let store = connect_store(&unreachable(StoreBackend::Auto)).await.unwrap();
        assert_eq!(store.backend_name(), "In-Memory Storage");
    }

    #[tokio::test]
    async fn explicit_redis_fails_when_down() {
        assert!(connect_store(&unreachable(StoreBackend::Redis)).await.is_err());
    }
}
