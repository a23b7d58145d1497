//! Redis-backed session storage.
//!
//! [`RedisStore`] implements `tessera_session::SessionStore` against a
//! Redis server, speaking plain commands (GET/SETEX/DEL, with AUTH and
//! SELECT at dial time) through a bounded connection pool. Stored payloads
//! expire server-side via SETEX, using the session's `max_age` or the
//! store's configured default.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tessera_redis::{RedisConfig, RedisStore};
//! use tessera_session::Session;
//!
//! let config = RedisConfig::new("redis://127.0.0.1:6379")
//!     .with_key_prefix("myapp_")
//!     .with_pool_size(16);
//! let store = Arc::new(RedisStore::connect(config).await?);
//!
//! let mut session = Session::new(token, store);
//! session.load().await?;
//! session.set("user_id", 42);
//! session.save().await?;
//! ```

mod config;
mod pool;
mod store;

pub use config::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_KEY_PREFIX, DEFAULT_MAX_AGE, DEFAULT_MAX_PAYLOAD_LEN,
    DEFAULT_POOL_SIZE, RedisConfig,
};
pub use pool::{PooledConnection, RedisConnectionManager};
pub use store::RedisStore;
