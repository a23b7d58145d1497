//! Deadpool manager for authenticated Redis connections.
//!
//! Connection lifecycle: dialed, then AUTH and SELECT if configured, then
//! idle-pooled until borrowed. A borrowed idle connection is validated with
//! PING before being handed out; validation failure or exceeding the idle
//! window discards it and the pool dials a replacement.

use std::time::Duration;

use deadpool::managed::{self, Metrics, RecycleError, RecycleResult};
use redis::aio::MultiplexedConnection;
use tracing::{debug, warn};

use crate::config::RedisConfig;

/// Manager that dials, authenticates, and recycles Redis connections.
pub struct RedisConnectionManager {
    client: redis::Client,
    password: Option<String>,
    db: Option<i64>,
    idle_timeout: Duration,
}

impl RedisConnectionManager {
    /// Build a manager from the store configuration. Fails only on an
    /// unparseable URL; no connection is dialed here.
    pub fn new(config: &RedisConfig) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(config.url.as_str())?;
        Ok(Self {
            client,
            password: config.password.clone(),
            db: config.db,
            idle_timeout: config.idle_timeout,
        })
    }
}

impl managed::Manager for RedisConnectionManager {
    type Type = MultiplexedConnection;
    type Error = redis::RedisError;

    fn create(
        &self,
    ) -> impl std::future::Future<Output = Result<MultiplexedConnection, redis::RedisError>> + Send
    {
        async move {
            let mut conn = self.client.get_multiplexed_async_connection().await?;

            // AUTH and SELECT must both succeed or the connection is
            // dropped and the error surfaces to the borrower.
            if let Some(password) = &self.password {
                let _: () = redis::cmd("AUTH")
                    .arg(password)
                    .query_async(&mut conn)
                    .await?;
            }
            if let Some(db) = self.db {
                let _: () = redis::cmd("SELECT").arg(db).query_async(&mut conn).await?;
            }

            debug!("dialed new redis connection");
            Ok(conn)
        }
    }

    fn recycle(
        &self,
        conn: &mut MultiplexedConnection,
        metrics: &Metrics,
    ) -> impl std::future::Future<Output = RecycleResult<redis::RedisError>> + Send {
        async move {
            if metrics.last_used() > self.idle_timeout {
                debug!("discarding redis connection idle past reclaim window");
                return Err(RecycleError::Message("idle timeout exceeded".into()));
            }

            // Test-on-borrow: a stale connection fails here and is replaced.
            let pong: Result<String, redis::RedisError> =
                redis::cmd("PING").query_async(&mut *conn).await;
            match pong {
                Ok(_) => Ok(()),
                Err(e) => {
                    warn!(error = %e, "discarding stale redis connection");
                    Err(RecycleError::Backend(e))
                }
            }
        }
    }
}

/// Connection checked out of the pool; returns itself on drop.
pub type PooledConnection = managed::Object<RedisConnectionManager>;

/// Bounded pool of Redis connections.
pub(crate) type RedisPool = managed::Pool<RedisConnectionManager>;
