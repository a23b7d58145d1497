//! Storage capability trait for session backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::Session;

/// Capability contract any session backend must satisfy.
///
/// Exactly three operations: load, save, delete. Any implementor is
/// substitutable without changing [`Session`] behavior, which is the seam
/// that allows Redis, in-memory, or file-based backends to coexist.
///
/// # Semantics
///
/// - `load` merges the stored mapping into the session (additive: local
///   keys absent from the stored payload are preserved). A token with no
///   stored payload is a normal outcome, not an error.
/// - `save` persists the session's current mapping under its token.
/// - `delete` removes the stored payload. Clearing the session's local
///   mapping is the session's job, not the store's.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; multiple sessions may call into
/// the same store concurrently.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch and merge the stored mapping for `session`'s token.
    async fn load(&self, session: &mut Session) -> Result<()>;

    /// Persist `session`'s mapping under its token.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove the stored payload for `session`'s token. A missing key is
    /// not an error.
    async fn delete(&self, session: &Session) -> Result<()>;
}
