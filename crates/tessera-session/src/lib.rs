//! Token-addressed session storage with pluggable backends.
//!
//! A [`Session`] is an in-memory map of JSON values identified by an opaque
//! token string. Persistence is delegated to a [`SessionStore`], so the same
//! session logic works against Redis, an in-memory map, or anything else
//! implementing the load/save/delete trio. A [`Codec`] bridges the value
//! mapping and the byte payload a backend stores.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tessera_session::{MemoryStore, Session};
//!
//! let store = Arc::new(MemoryStore::new());
//!
//! let mut session = Session::new("tok-1234", store.clone());
//! session.set("user_id", 42);
//! session.set("theme", "dark");
//! session.save().await?;
//!
//! let mut restored = Session::new("tok-1234", store);
//! restored.load().await?;
//! assert_eq!(restored.i64_or("user_id", 0), 42);
//! ```

mod codec;
mod error;
mod memory;
mod session;
mod store;

pub use codec::{Codec, JsonCodec};
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use session::{DEFAULT_TOKEN_HEADER, Session, ValueMap};
pub use store::SessionStore;

// Re-exported so callers can build values without naming serde_json.
pub use serde_json::Value;
