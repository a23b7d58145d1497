//! Configuration for the Redis store.
//!
//! Everything is fixed at construction time; there is no process-wide
//! mutable state.

use std::time::Duration;

/// Default maximum number of pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Default window after which an idle pooled connection is discarded
/// instead of being reused.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(240);

/// Default TTL applied when a session's `max_age` is zero: 30 days.
pub const DEFAULT_MAX_AGE: i64 = 30 * 24 * 60 * 60;

/// Default cap on an encoded session payload, in bytes. Redis itself
/// allows values up to 512MB; this guards against runaway sessions.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 4096;

/// Default prefix prepended to every token to form the Redis key.
pub const DEFAULT_KEY_PREFIX: &str = "sess_";

/// Construction-time settings for [`crate::RedisStore`].
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Server address as a `redis://` or `unix://` URL.
    pub url: String,

    /// Password sent via AUTH on every new connection, if set.
    pub password: Option<String>,

    /// Database index selected via SELECT on every new connection, if set.
    pub db: Option<i64>,

    /// Maximum number of pooled connections.
    pub pool_size: usize,

    /// Idle window before a pooled connection is discarded on borrow.
    pub idle_timeout: Duration,

    /// TTL in seconds for sessions whose `max_age` is zero.
    pub default_max_age: i64,

    /// Maximum encoded payload size in bytes; zero disables the limit.
    pub max_payload_len: usize,

    /// Prefix prepended to tokens to form Redis keys.
    pub key_prefix: String,
}

impl RedisConfig {
    /// Create a configuration for `url` with every other field defaulted.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            password: None,
            db: None,
            pool_size: DEFAULT_POOL_SIZE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            default_max_age: DEFAULT_MAX_AGE,
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Authenticate new connections with `password`.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Select database `db` on new connections.
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = Some(db);
        self
    }

    /// Set the maximum number of pooled connections.
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the idle window before pooled connections are discarded.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the TTL used when a session's `max_age` is zero.
    pub fn with_default_max_age(mut self, seconds: i64) -> Self {
        self.default_max_age = seconds;
        self
    }

    /// Cap encoded payloads at `len` bytes. Zero disables the limit; use
    /// with caution.
    pub fn with_max_payload_len(mut self, len: usize) -> Self {
        self.max_payload_len = len;
        self
    }

    /// Set the key prefix prepended to every token.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RedisConfig::new("redis://127.0.0.1:6379");

        assert_eq!(config.url, "redis://127.0.0.1:6379");
        assert_eq!(config.password, None);
        assert_eq!(config.db, None);
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(config.idle_timeout, Duration::from_secs(240));
        assert_eq!(config.default_max_age, 2_592_000);
        assert_eq!(config.max_payload_len, 4096);
        assert_eq!(config.key_prefix, "sess_");
    }

    #[test]
    fn test_builder_overrides() {
        let config = RedisConfig::new("redis://127.0.0.1:6379")
            .with_password("hunter2")
            .with_db(3)
            .with_pool_size(32)
            .with_idle_timeout(Duration::from_secs(60))
            .with_default_max_age(3600)
            .with_max_payload_len(0)
            .with_key_prefix("app_");

        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.db, Some(3));
        assert_eq!(config.pool_size, 32);
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.default_max_age, 3600);
        assert_eq!(config.max_payload_len, 0);
        assert_eq!(config.key_prefix, "app_");
    }
}
