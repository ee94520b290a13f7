//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Record;

/// Create/read/update/delete contract over one remote collection.
///
/// Implementations are stateless between calls and never retry; a failed
/// round trip surfaces as the error of that call.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CollectionGateway<R: Record>: Send + Sync {
    /// All rows, newest-created first.
    async fn get_all(&self) -> Result<Vec<R>>;

    /// Exactly one row; a missing id is a `RemoteQuery` with `not_found`.
    async fn get_by_id(&self, id: &str) -> Result<R>;

    /// Inserts the draft and returns the stored row with server fields.
    async fn create(&self, draft: R::Draft) -> Result<R>;

    /// Merges only the supplied fields and returns the updated row.
    async fn update(&self, id: &str, patch: R::Patch) -> Result<R>;

    /// Removes the row. Deleting an absent id still succeeds.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// String key/value persistence on the local device.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
    async fn remove_item(&self, key: &str) -> Result<()>;
}
