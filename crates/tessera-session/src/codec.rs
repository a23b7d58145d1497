//! Serialization seam between the value mapping and stored bytes.

use crate::error::{Error, Result};
use crate::session::ValueMap;

/// Converts a session's value mapping to and from a byte payload.
///
/// Implementations must round-trip any mapping whose values are
/// representable in the target format. `decode` builds a fresh mapping and
/// never mutates caller state, so a malformed payload leaves the session
/// exactly as it was.
pub trait Codec: Send + Sync {
    /// Serialize the mapping. Fails with [`Error::Encoding`] if a value
    /// cannot be represented.
    fn encode(&self, values: &ValueMap) -> Result<Vec<u8>>;

    /// Deserialize a payload into a fresh mapping. Fails with
    /// [`Error::Decoding`] on malformed bytes.
    fn decode(&self, bytes: &[u8]) -> Result<ValueMap>;
}

/// JSON codec, the default for every bundled store.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, values: &ValueMap) -> Result<Vec<u8>> {
        serde_json::to_vec(values).map_err(|e| Error::Encoding(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<ValueMap> {
        serde_json::from_slice(bytes).map_err(|e| Error::Decoding(e.to_string()))
    }
}
