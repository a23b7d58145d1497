//! In-memory session state bound to a persistence backend.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::store::SessionStore;

/// Mapping type held by a session: string keys to JSON values.
pub type ValueMap = serde_json::Map<String, Value>;

/// Conventional transport header carrying the session token.
///
/// The crate never reads or writes this header itself; it is exported for
/// HTTP layers that need to agree on a name.
pub const DEFAULT_TOKEN_HEADER: &str = "X-USER-TOKEN";

/// One session's state: an opaque token, a TTL hint, and a value mapping.
///
/// The session holds a shared handle to its backend and delegates all
/// persistence to it. The mapping is always present after construction;
/// [`Session::delete`] empties it in place rather than replacing it.
pub struct Session {
    token: String,
    max_age: i64,
    values: ValueMap,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// Create a session for `token` bound to `store`, with an empty mapping
    /// and `max_age = 0` (defer to the store's default TTL).
    pub fn new(token: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            token: token.into(),
            max_age: 0,
            values: ValueMap::new(),
            store,
        }
    }

    /// The opaque token identifying this session. Backends use it verbatim
    /// as the storage key suffix.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// TTL in seconds for the next save. Zero defers to the store's
    /// configured default. Negative values are reserved and no bundled
    /// backend acts on them.
    pub fn max_age(&self) -> i64 {
        self.max_age
    }

    /// Set the TTL hint for subsequent saves.
    pub fn set_max_age(&mut self, seconds: i64) {
        self.max_age = seconds;
    }

    /// Look up a value. Pure read, never fails.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Insert or overwrite a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a value, returning it if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// The stored value as an `i64`, or `default` if the key is absent or
    /// holds anything but an integral number. A type mismatch is treated
    /// identically to absence, never as an error.
    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.values.get(key).and_then(Value::as_i64).unwrap_or(default)
    }

    /// The stored value as an `i32`, or `default` on absence, mismatch, or
    /// overflow.
    pub fn i32_or(&self, key: &str, default: i32) -> i32 {
        self.values
            .get(key)
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(default)
    }

    /// The stored value as an `f64`, or `default` if absent or not a number.
    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.values.get(key).and_then(Value::as_f64).unwrap_or(default)
    }

    /// The stored value as an `f32`, or `default` if absent or not a number.
    pub fn f32_or(&self, key: &str, default: f32) -> f32 {
        self.values
            .get(key)
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .unwrap_or(default)
    }

    /// The stored value as an owned `String`, or `default` if absent or not
    /// a JSON string.
    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Read access to the full mapping.
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Mutable access to the full mapping.
    pub fn values_mut(&mut self) -> &mut ValueMap {
        &mut self.values
    }

    /// Insert every entry of `map`, overwriting duplicates. Local keys not
    /// present in `map` survive; this is the additive primitive backends
    /// use when merging a loaded payload.
    pub fn merge(&mut self, map: ValueMap) {
        for (key, value) in map {
            self.values.insert(key, value);
        }
    }

    /// Fetch this session's stored payload and merge it into the mapping.
    ///
    /// A token that was never saved is a normal outcome: the call succeeds
    /// and the mapping is left unchanged.
    pub async fn load(&mut self) -> Result<()> {
        let store = Arc::clone(&self.store);
        store.load(self).await
    }

    /// Persist the current mapping under this session's token.
    pub async fn save(&self) -> Result<()> {
        self.store.save(self).await
    }

    /// Remove the stored payload and clear the local mapping.
    ///
    /// The mapping is only cleared once the backend reports success; on
    /// failure local state is untouched and the error propagates.
    pub async fn delete(&mut self) -> Result<()> {
        let store = Arc::clone(&self.store);
        store.delete(self).await?;
        self.values.clear();
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token)
            .field("max_age", &self.max_age)
            .field("values", &self.values.len())
            .finish_non_exhaustive()
    }
}
