//! Durable key-value storage abstraction
//!
//! Session context is persisted as a single string value under a fixed key,
//! the same way a browser workstation would use local storage. Implementations
//! are synchronous: values are small and writes happen once per transition.

use crate::domain::Result;

/// Key-value store for durable client state
///
/// Callers treat every failure as best-effort; a failed `save` must never
/// corrupt what `load` returns for other keys.
pub trait ContextStorage: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// Returns `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}
