//! In-process phone book
//!
//! Backs `phonebook serve --in-memory` and stands in for MySQL in tests.
//! Failures can be injected with [`InMemoryPhoneBook::fail_with`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::store::PhoneBookStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{EntryFields, PhoneBookEntry};

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, PhoneBookEntry>,
}

/// Phone book held in memory
#[derive(Debug, Default)]
pub struct InMemoryPhoneBook {
    table: Mutex<Table>,
    failure: Mutex<Option<StoreError>>,
}

impl InMemoryPhoneBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following operation fail with `err` (or succeed again with `None`)
    pub async fn fail_with(&self, err: Option<StoreError>) {
        *self.failure.lock().await = err;
    }

    async fn check(&self) -> StoreResult<()> {
        match self.failure.lock().await.as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PhoneBookStore for InMemoryPhoneBook {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, id: Option<i64>) -> StoreResult<Vec<PhoneBookEntry>> {
        self.check().await?;
        let table = self.table.lock().await;

        let mut rows: Vec<PhoneBookEntry> = match id {
            None => table.rows.values().cloned().collect(),
            Some(id) => table.rows.get(&id).cloned().into_iter().collect(),
        };
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn insert(&self, fields: &EntryFields) -> StoreResult<i64> {
        self.check().await?;
        let mut table = self.table.lock().await;

        table.next_id += 1;
        let id = table.next_id;
        table.rows.insert(id, fields.clone().into_entry(id));
        Ok(id)
    }

    async fn update(&self, id: i64, fields: &EntryFields) -> StoreResult<()> {
        self.check().await?;
        let mut table = self.table.lock().await;

        if let Some(row) = table.rows.get_mut(&id) {
            *row = fields.clone().into_entry(id);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.check().await?;
        self.table.lock().await.rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn alice() -> EntryFields {
        EntryFields::new("Alice", "123", "Main St")
    }

    #[tokio::test]
    async fn insert_then_read_all_sorted_by_name() {
        let store = InMemoryPhoneBook::new();
        store.insert(&EntryFields::new("Carol", "3", "C St")).await.unwrap();
        let alice_id = store.insert(&alice()).await.unwrap();
        store.insert(&EntryFields::new("Bob", "2", "B St")).await.unwrap();

        let all = store.read(None).await.unwrap();
        let names: Vec<&str> = all.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob", "Carol"]);
        assert!(all.contains(&alice().into_entry(alice_id)));
    }

    #[tokio::test]
    async fn missing_id_reads_empty_and_writes_succeed() {
        let store = InMemoryPhoneBook::new();
        let id = store.insert(&alice()).await.unwrap();

        assert!(store.read(Some(id + 100)).await.unwrap().is_empty());
        store
            .update(id + 100, &EntryFields::new("Ghost", "0", "Nowhere"))
            .await
            .unwrap();
        store.delete(id + 100).await.unwrap();

        assert_eq!(store.read(None).await.unwrap(), vec![alice().into_entry(id)]);
    }

    #[tokio::test]
    async fn update_overwrites_all_fields() {
        let store = InMemoryPhoneBook::new();
        let id = store.insert(&alice()).await.unwrap();
        let fields = EntryFields::new("Alicia", "456", "Side St");

        store.update(id, &fields).await.unwrap();

        assert_eq!(store.read(Some(id)).await.unwrap(), vec![fields.into_entry(id)]);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let store = InMemoryPhoneBook::new();
        let id = store.insert(&alice()).await.unwrap();

        store.delete(id).await.unwrap();

        assert!(store.read(Some(id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_identical_inserts_get_distinct_ids() {
        let store = Arc::new(InMemoryPhoneBook::new());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&alice()).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("task panicked").unwrap());
        }

        assert_ne!(ids[0], ids[1]);
        assert_eq!(store.read(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn injected_failure_applies_until_cleared() {
        let store = InMemoryPhoneBook::new();
        store
            .fail_with(Some(StoreError::Unavailable("down".into())))
            .await;

        assert!(store.insert(&alice()).await.unwrap_err().is_transient());
        assert!(store.read(None).await.is_err());

        store.fail_with(None).await;
        assert!(store.insert(&alice()).await.is_ok());
    }
}
