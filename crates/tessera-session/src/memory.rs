//! In-memory session store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::codec::{Codec, JsonCodec};
use crate::error::Result;
use crate::session::Session;
use crate::store::SessionStore;

/// [`SessionStore`] backed by a process-local hash map.
///
/// Payloads run through the codec exactly as a remote backend's would, so
/// codec failures and merge semantics behave like the real thing. Entries
/// live as long as the store; there is no TTL. Intended for tests and
/// single-process deployments.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    codec: Arc<dyn Codec>,
}

impl MemoryStore {
    /// Create an empty store using the JSON codec.
    pub fn new() -> Self {
        Self::with_codec(Arc::new(JsonCodec))
    }

    /// Create an empty store using a custom codec.
    pub fn with_codec(codec: Arc<dyn Codec>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            codec,
        }
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, session: &mut Session) -> Result<()> {
        let payload = {
            let entries = self.entries.read().await;
            entries.get(session.token()).cloned()
        };

        let Some(payload) = payload else {
            trace!(token = %session.token(), "no stored session");
            return Ok(());
        };

        // Decode into a fresh map first; a malformed payload must not
        // partially mutate the session.
        let map = self.codec.decode(&payload)?;
        session.merge(map);
        Ok(())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let payload = self.codec.encode(session.values())?;
        self.entries
            .write()
            .await
            .insert(session.token().to_string(), payload);
        trace!(token = %session.token(), "saved session");
        Ok(())
    }

    async fn delete(&self, session: &Session) -> Result<()> {
        // Absence is not an error, mirroring DEL semantics.
        self.entries.write().await.remove(session.token());
        trace!(token = %session.token(), "deleted session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::session::ValueMap;

    #[tokio::test]
    async fn test_save_and_load() {
        let store = Arc::new(MemoryStore::new());

        let mut session = Session::new("tok-1", store.clone());
        session.set("k", "v");
        store.save(&session).await.unwrap();

        assert_eq!(store.len().await, 1);

        let mut fresh = Session::new("tok-1", store.clone());
        store.load(&mut fresh).await.unwrap();
        assert_eq!(fresh.string_or("k", ""), "v");
    }

    #[tokio::test]
    async fn test_delete_missing_token_is_ok() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new("ghost", store.clone());

        store.delete(&session).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupt_payload_leaves_session_untouched() {
        let store = Arc::new(MemoryStore::new());
        store
            .entries
            .write()
            .await
            .insert("tok-1".into(), b"{broken".to_vec());

        let mut session = Session::new("tok-1", store.clone());
        session.set("local", 1);

        let result = store.load(&mut session).await;

        assert!(matches!(result, Err(Error::Decoding(_))));
        assert_eq!(session.values().len(), 1);
        assert_eq!(session.i64_or("local", 0), 1);
    }

    #[tokio::test]
    async fn test_custom_codec_is_exercised() {
        // Codec that refuses to encode anything, proving save goes
        // through the codec seam.
        struct RefusingCodec;

        impl Codec for RefusingCodec {
            fn encode(&self, _values: &ValueMap) -> Result<Vec<u8>> {
                Err(Error::Encoding("refused".into()))
            }

            fn decode(&self, _bytes: &[u8]) -> Result<ValueMap> {
                Err(Error::Decoding("refused".into()))
            }
        }

        let store = Arc::new(MemoryStore::with_codec(Arc::new(RefusingCodec)));
        let session = Session::new("tok-1", store.clone());

        assert!(matches!(
            store.save(&session).await,
            Err(Error::Encoding(_))
        ));
        assert!(store.is_empty().await);
    }
}
