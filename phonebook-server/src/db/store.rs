//! The data-access seam injected into the router state

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{EntryFields, PhoneBookEntry};

/// Access to the `phone_book` table.
#[async_trait]
pub trait PhoneBookStore: Send + Sync {
    /// Short backend name reported by `/health`
    fn backend(&self) -> &'static str;

    /// All entries when `id` is `None`, otherwise the entries matching `id`.
    /// Either way ordered by name ascending.
    async fn read(&self, id: Option<i64>) -> StoreResult<Vec<PhoneBookEntry>>;

    /// Insert a new entry, returning the store-assigned id.
    async fn insert(&self, fields: &EntryFields) -> StoreResult<i64>;

    /// Overwrite all fields of `id`. Succeeds even if no row matched.
    async fn update(&self, id: i64, fields: &EntryFields) -> StoreResult<()>;

    /// Remove `id`. Succeeds even if no row matched.
    async fn delete(&self, id: i64) -> StoreResult<()>;
}
