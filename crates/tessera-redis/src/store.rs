//! Redis-backed session store.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use deadpool::managed::Pool;
use tracing::{debug, warn};

use tessera_session::{Codec, Error, JsonCodec, Result, Session, SessionStore};

use crate::config::RedisConfig;
use crate::pool::{PooledConnection, RedisConnectionManager, RedisPool};

/// [`SessionStore`] persisting sessions in Redis with server-side expiry.
///
/// Each operation borrows exactly one pooled connection for its duration;
/// the connection returns to the pool on every exit path. Operations are
/// independent round trips — there is no cross-operation state, and the
/// only consistency guarantee between concurrent callers is the per-command
/// atomicity Redis itself provides.
pub struct RedisStore {
    pool: RedisPool,
    codec: Arc<dyn Codec>,
    default_max_age: i64,
    max_payload_len: usize,
    key_prefix: String,
}

impl RedisStore {
    /// Build the store and its pool without touching the network.
    /// Connections are dialed on first borrow.
    pub fn new(config: RedisConfig) -> Result<Self> {
        Self::with_codec(config, Arc::new(JsonCodec))
    }

    /// Like [`RedisStore::new`] with a custom payload codec.
    pub fn with_codec(config: RedisConfig, codec: Arc<dyn Codec>) -> Result<Self> {
        let manager = RedisConnectionManager::new(&config)
            .map_err(|e| Error::Connection(e.to_string()))?;
        let pool = Pool::builder(manager)
            .max_size(config.pool_size)
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            codec,
            default_max_age: config.default_max_age,
            max_payload_len: config.max_payload_len,
            key_prefix: config.key_prefix,
        })
    }

    /// Build the store and eagerly probe the backend with PING.
    ///
    /// A failed probe is logged at `warn` and does not invalidate the
    /// store: the backend may simply not be up yet, and the pool keeps
    /// dialing on demand. This leniency is deliberate; callers that want
    /// hard-fail construction can `?` [`RedisStore::ping`] themselves.
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let store = Self::new(config)?;
        if let Err(e) = store.ping().await {
            warn!(error = %e, "redis liveness probe failed; store returned anyway");
        }
        Ok(store)
    }

    /// Liveness probe: errors if the backend is unreachable or replies
    /// with anything but PONG.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        if pong != "PONG" {
            return Err(Error::Backend(format!("unexpected PING reply: {pong}")));
        }
        Ok(())
    }

    /// Current pool counters: (total connections, idle connections).
    pub fn status(&self) -> (usize, usize) {
        let status = self.pool.status();
        (status.size, status.available)
    }

    /// Close the pool. Idle connections are terminated; borrowed ones are
    /// dropped when returned.
    pub fn close(&self) {
        self.pool.close();
    }

    /// TTL for a save: the session's `max_age` if nonzero, else the
    /// configured default. Negative values pass through untouched and are
    /// rejected by SETEX server-side.
    fn effective_ttl(&self, max_age: i64) -> i64 {
        if max_age == 0 {
            self.default_max_age
        } else {
            max_age
        }
    }

    fn session_key(&self, token: &str) -> String {
        format!("{}{}", self.key_prefix, token)
    }

    async fn conn(&self) -> Result<PooledConnection> {
        self.pool
            .get()
            .await
            .map_err(|e| Error::Connection(e.to_string()))
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .field("default_max_age", &self.default_max_age)
            .field("max_payload_len", &self.max_payload_len)
            .finish_non_exhaustive()
    }
}

/// Map a redis-rs error into the store taxonomy: transport-level failures
/// are connection errors, everything else is a backend rejection.
fn backend_error(e: redis::RedisError) -> Error {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() {
        Error::Connection(e.to_string())
    } else {
        Error::Backend(e.to_string())
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn load(&self, session: &mut Session) -> Result<()> {
        let key = self.session_key(session.token());

        let mut conn = self.conn().await?;
        let payload: Option<Vec<u8>> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;
        drop(conn);

        // No stored payload is a normal outcome: a session that was never
        // saved, or one whose TTL expired.
        let Some(payload) = payload else {
            debug!(key = %key, "no stored session");
            return Ok(());
        };

        let map = self.codec.decode(&payload)?;
        debug!(key = %key, entries = map.len(), "loaded session");
        session.merge(map);
        Ok(())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        // Encode and size-check before acquiring a connection; an oversized
        // payload never touches the pool.
        let payload = self.codec.encode(session.values())?;
        if self.max_payload_len != 0 && payload.len() > self.max_payload_len {
            return Err(Error::PayloadTooLarge {
                len: payload.len(),
                max: self.max_payload_len,
            });
        }

        let key = self.session_key(session.token());
        let ttl = self.effective_ttl(session.max_age());

        let mut conn = self.conn().await?;
        let _: () = redis::cmd("SETEX")
            .arg(&key)
            .arg(ttl)
            .arg(&payload)
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;

        debug!(key = %key, ttl, bytes = payload.len(), "saved session");
        Ok(())
    }

    async fn delete(&self, session: &Session) -> Result<()> {
        let key = self.session_key(session.token());

        let mut conn = self.conn().await?;
        // DEL's reply is the number of removed keys; zero (already gone)
        // is not an error.
        let _removed: i64 = redis::cmd("DEL")
            .arg(&key)
            .query_async(&mut *conn)
            .await
            .map_err(backend_error)?;

        debug!(key = %key, "deleted session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 1 is never a Redis server; these stores can be built (the pool
    // dials lazily) but any network call fails fast.
    fn unreachable_store(config: RedisConfig) -> Arc<RedisStore> {
        Arc::new(RedisStore::new(config).unwrap())
    }

    fn unreachable_config() -> RedisConfig {
        RedisConfig::new("redis://127.0.0.1:1")
    }

    #[test]
    fn test_session_key_prefixes_token() {
        let store = unreachable_store(unreachable_config());
        assert_eq!(store.session_key("abc"), "sess_abc");
    }

    #[test]
    fn test_session_key_custom_prefix() {
        let store = unreachable_store(unreachable_config().with_key_prefix("app:"));
        assert_eq!(store.session_key("abc"), "app:abc");
    }

    #[test]
    fn test_effective_ttl() {
        let store = unreachable_store(unreachable_config().with_default_max_age(3600));

        assert_eq!(store.effective_ttl(0), 3600);
        assert_eq!(store.effective_ttl(120), 120);
        // Negative values are reserved; they pass through untouched.
        assert_eq!(store.effective_ttl(-1), -1);
    }

    #[test]
    fn test_invalid_url_is_connection_error() {
        let result = RedisStore::new(RedisConfig::new("not a url"));
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[tokio::test]
    async fn test_oversized_save_never_touches_backend() {
        let store = unreachable_store(unreachable_config().with_max_payload_len(64));

        let mut session = Session::new("tok-1", store.clone());
        session.set("blob", "x".repeat(1024));

        // PayloadTooLarge, not Connection: the pre-check fired before any
        // dial of the unreachable backend.
        let result = store.save(&session).await;
        assert!(matches!(
            result,
            Err(Error::PayloadTooLarge { len: _, max: 64 })
        ));

        let (size, _) = store.status();
        assert_eq!(size, 0, "no connection should have been created");
    }

    #[tokio::test]
    async fn test_zero_payload_limit_disables_check() {
        let store = unreachable_store(unreachable_config().with_max_payload_len(0));

        let mut session = Session::new("tok-1", store.clone());
        session.set("blob", "x".repeat(1024 * 1024));

        // With the limit disabled the store proceeds to the network and
        // fails there instead.
        let result = store.save(&session).await;
        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[tokio::test]
    async fn test_load_against_unreachable_backend() {
        let store = unreachable_store(unreachable_config());

        let mut session = Session::new("tok-1", store.clone());
        assert!(matches!(
            store.load(&mut session).await,
            Err(Error::Connection(_))
        ));
        assert!(session.values().is_empty());
    }

    #[tokio::test]
    async fn test_ping_against_unreachable_backend() {
        let store = unreachable_store(unreachable_config());
        assert!(matches!(store.ping().await, Err(Error::Connection(_))));
    }

    #[tokio::test]
    async fn test_connect_is_lenient_about_failed_probe() {
        // The probe fails against an unreachable backend, but connect
        // still hands back a usable store.
        let store = RedisStore::connect(unreachable_config()).await.unwrap();
        assert!(matches!(store.ping().await, Err(Error::Connection(_))));
    }
}
