//! Redis Backend Module
//!
//! Networked store over a multiplexed connection. Every command is bounded
//! by the configured timeout so a stalled server degrades to a soft failure
//! instead of blocking the caller.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisResult};
use tracing::debug;

use crate::cache::backend::KvBackend;
use crate::cache::BackendInfo;
use crate::error::{StoreError, StoreResult};

// == Redis Backend ==
/// Redis-backed store.
///
/// - TTL via `SETEX`
/// - Pattern enumeration via `KEYS`
/// - Statistics from `INFO`
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
    /// Bound applied to every command
    timeout: Duration,
}

impl RedisBackend {
    /// Opens a connection to `url` and verifies it with a `PING`.
    pub async fn connect(url: &str, timeout: Duration) -> StoreResult<Self> {
        let client = Client::open(url)?;

        let conn = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| StoreError::Timeout(timeout))??;

        let backend = Self { conn, timeout };
        backend.ping().await?;
        debug!("Connected to Redis at {}", url);
        Ok(backend)
    }

    /// Awaits a command under the configured timeout.
    async fn bounded<T>(&self, command: impl Future<Output = RedisResult<T>>) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, command).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _pong: String = self.bounded(redis::cmd("PING").query_async(&mut conn)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = self.bounded(conn.get(key)).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let _: () = self.bounded(conn.set_ex(key, value, seconds)).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> StoreResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let deleted: u64 = self.bounded(conn.del(keys.to_vec())).await?;
        Ok(deleted)
    }

    async fn keys(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = self.bounded(conn.keys(pattern)).await?;
        Ok(keys)
    }

    async fn info(&self) -> StoreResult<BackendInfo> {
        let mut conn = self.conn.clone();
        let raw: String = self.bounded(redis::cmd("INFO").query_async(&mut conn)).await?;
        Ok(parse_info(&raw))
    }
}

// == INFO Parsing ==
/// Extracts the figures we report from a Redis `INFO` reply.
///
/// Missing or malformed fields fall back to `N/A` / zero.
pub fn parse_info(raw: &str) -> BackendInfo {
    let mut info = BackendInfo {
        used_memory: "N/A".to_string(),
        ..BackendInfo::default()
    };

    for line in raw.lines() {
        let Some((field, value)) = line.trim().split_once(':') else {
            continue;
        };
        let number = || value.trim().parse::<u64>().unwrap_or(0);
        match field {
            "used_memory_human" => info.used_memory = value.trim().to_string(),
            "connected_clients" => info.connected_clients = number(),
            "total_commands_processed" => info.commands_processed = number(),
            "keyspace_hits" => info.keyspace_hits = number(),
            "keyspace_misses" => info.keyspace_misses = number(),
            _ => {}
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_INFO: &str = "# Server\r\n\
        redis_version:7.2.4\r\n\
        # Clients\r\n\
        connected_clients:4\r\n\
        # Memory\r\n\
        used_memory:1103456\r\n\
        used_memory_human:1.05M\r\n\
        # Stats\r\n\
        total_commands_processed:9876\r\n\
        keyspace_hits:80\r\n\
        keyspace_misses:20\r\n";

    #[test]
    fn test_parse_info_fields() {
        let info = parse_info(SAMPLE_INFO);

        assert_eq!(info.used_memory, "1.05M");
        assert_eq!(info.connected_clients, 4);
        assert_eq!(info.commands_processed, 9876);
        assert_eq!(info.keyspace_hits, 80);
        assert_eq!(info.keyspace_misses, 20);
    }

    #[test]
    fn test_parse_info_missing_fields() {
        let info = parse_info("# Server\r\nredis_version:7.2.4\r\nkeyspace_hits:oops\r\n");

        assert_eq!(info.used_memory, "N/A");
        assert_eq!(info.connected_clients, 0);
        assert_eq!(info.keyspace_hits, 0);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let result = RedisBackend::connect("redis://127.0.0.1:1", Duration::from_millis(500)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let result = RedisBackend::connect("not a url", Duration::from_millis(100)).await;
        assert!(result.is_err());
    }
}
