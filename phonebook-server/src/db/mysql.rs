//! MySQL-backed phone book
//!
//! Opens one connection per operation and closes it before returning.
//! No pool; isolation between concurrent requests is the engine's job.

use async_trait::async_trait;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection, MySqlQueryResult};
use sqlx::query::Query;
use sqlx::{Connection, FromRow};

use super::store::PhoneBookStore;
use crate::config::{DatabaseConfig, CHARSET};
use crate::error::{StoreError, StoreResult};
use crate::models::{EntryFields, PhoneBookEntry};

const SELECT_ALL: &str = "SELECT id, name, phone, address FROM phone_book ORDER BY name ASC";
const SELECT_BY_ID: &str =
    "SELECT id, name, phone, address FROM phone_book WHERE id = ? ORDER BY name ASC";
const INSERT: &str = "INSERT INTO phone_book (name, phone, address) VALUES (?, ?, ?)";
const UPDATE: &str = "UPDATE phone_book SET name = ?, phone = ?, address = ? WHERE id = ?";
const DELETE: &str = "DELETE FROM phone_book WHERE id = ?";

/// Row as stored; the schema allows NULL in every text column
#[derive(Debug, FromRow)]
struct EntryRow {
    id: i64,
    name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

impl From<EntryRow> for PhoneBookEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: row.id,
            name: row.name.unwrap_or_default(),
            phone: row.phone.unwrap_or_default(),
            address: row.address.unwrap_or_default(),
        }
    }
}

/// Phone book over a MySQL `phone_book` table
#[derive(Clone)]
pub struct MySqlPhoneBook {
    options: MySqlConnectOptions,
}

impl MySqlPhoneBook {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name)
            .charset(CHARSET);

        Self { options }
    }

    async fn connect(&self) -> StoreResult<MySqlConnection> {
        MySqlConnection::connect_with(&self.options)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "failed to open database connection");
                StoreError::from(e)
            })
    }

    /// Run one write statement in its own transaction on a fresh connection.
    async fn execute(
        &self,
        query: Query<'_, MySql, MySqlArguments>,
    ) -> StoreResult<MySqlQueryResult> {
        let mut conn = self.connect().await?;
        let outcome = execute_in_transaction(&mut conn, query).await;
        release(conn).await;
        outcome
    }
}

async fn execute_in_transaction(
    conn: &mut MySqlConnection,
    query: Query<'_, MySql, MySqlArguments>,
) -> StoreResult<MySqlQueryResult> {
    let mut tx = conn.begin().await?;

    match query.execute(&mut *tx).await {
        Ok(done) => {
            tx.commit().await?;
            Ok(done)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err.into())
        }
    }
}

async fn release(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "error closing database connection");
    }
}

#[async_trait]
impl PhoneBookStore for MySqlPhoneBook {
    fn backend(&self) -> &'static str {
        "mysql"
    }

    async fn read(&self, id: Option<i64>) -> StoreResult<Vec<PhoneBookEntry>> {
        let mut conn = self.connect().await?;

        let rows = match id {
            None => {
                sqlx::query_as::<_, EntryRow>(SELECT_ALL)
                    .fetch_all(&mut conn)
                    .await
            }
            Some(id) => {
                sqlx::query_as::<_, EntryRow>(SELECT_BY_ID)
                    .bind(id)
                    .fetch_all(&mut conn)
                    .await
            }
        };

        release(conn).await;
        Ok(rows?.into_iter().map(PhoneBookEntry::from).collect())
    }

    async fn insert(&self, fields: &EntryFields) -> StoreResult<i64> {
        let done = self
            .execute(
                sqlx::query(INSERT)
                    .bind(&fields.name)
                    .bind(&fields.phone)
                    .bind(&fields.address),
            )
            .await?;

        let id = i64::try_from(done.last_insert_id())
            .map_err(|e| StoreError::Query(format!("insert id out of range: {}", e)))?;
        tracing::debug!(id, "inserted phone book entry");
        Ok(id)
    }

    async fn update(&self, id: i64, fields: &EntryFields) -> StoreResult<()> {
        let done = self
            .execute(
                sqlx::query(UPDATE)
                    .bind(&fields.name)
                    .bind(&fields.phone)
                    .bind(&fields.address)
                    .bind(id),
            )
            .await?;

        tracing::debug!(id, rows = done.rows_affected(), "updated phone book entry");
        Ok(())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let done = self.execute(sqlx::query(DELETE).bind(id)).await?;

        tracing::debug!(id, rows = done.rows_affected(), "deleted phone book entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require a MySQL database with the phone_book table.
    // Run with: DB_HOST=... DB_NAME=... cargo test -p phonebook-server -- --ignored

    fn store() -> MySqlPhoneBook {
        MySqlPhoneBook::new(&DatabaseConfig::from_env())
    }

    #[tokio::test]
    async fn unreachable_host_is_transient() {
        let config = DatabaseConfig {
            host: "127.0.0.1".into(),
            ..DatabaseConfig::default()
        };
        let store = MySqlPhoneBook {
            options: MySqlPhoneBook::new(&config).options.port(1),
        };

        let err = store.read(None).await.unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");

        let err = store
            .insert(&EntryFields::new("Alice", "123", "Main St"))
            .await
            .unwrap_err();
        assert!(err.is_transient(), "unexpected error: {err}");
    }

    #[test]
    fn null_columns_read_as_empty_text() {
        let row = EntryRow {
            id: 4,
            name: Some("Alice".into()),
            phone: None,
            address: None,
        };

        assert_eq!(
            PhoneBookEntry::from(row),
            EntryFields::new("Alice", "", "").into_entry(4)
        );
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn row_with_null_columns_does_not_break_listing() {
        let store = store();
        let mut conn = store.connect().await.expect("connect failed");
        let done = sqlx::query(
            "INSERT INTO phone_book (name, phone, address) VALUES (?, NULL, NULL)",
        )
        .bind("Null Fields")
        .execute(&mut conn)
        .await
        .expect("raw insert failed");
        release(conn).await;
        let id = i64::try_from(done.last_insert_id()).unwrap();

        let all = store.read(None).await.expect("read failed");
        let entry = all.iter().find(|e| e.id == id).expect("row missing from listing");
        assert_eq!(entry.phone, "");
        assert_eq!(entry.address, "");

        store.delete(id).await.expect("delete failed");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn insert_then_read_sorted() {
        let store = store();
        let id = store
            .insert(&EntryFields::new("Zed Last", "999", "End Rd"))
            .await
            .expect("insert failed");
        store
            .insert(&EntryFields::new("Aaron First", "111", "Start Rd"))
            .await
            .expect("insert failed");

        let all = store.read(None).await.expect("read failed");
        assert!(all.iter().any(|e| e.id == id && e.name == "Zed Last"));
        assert!(all.windows(2).all(|w| w[0].name <= w[1].name));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_then_delete() {
        let store = store();
        let id = store
            .insert(&EntryFields::new("Before", "1", "Old St"))
            .await
            .expect("insert failed");

        let fields = EntryFields::new("After", "2", "New St");
        store.update(id, &fields).await.expect("update failed");
        let rows = store.read(Some(id)).await.expect("read failed");
        assert_eq!(rows, vec![fields.into_entry(id)]);

        store.delete(id).await.expect("delete failed");
        assert!(store.read(Some(id)).await.expect("read failed").is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn concurrent_identical_inserts_get_distinct_ids() {
        let store = store();
        let fields = EntryFields::new("Twin", "555", "Same St");

        let (a, b) = tokio::join!(store.insert(&fields), store.insert(&fields));
        let (a, b) = (a.expect("insert failed"), b.expect("insert failed"));
        assert_ne!(a, b);

        store.delete(a).await.expect("delete failed");
        store.delete(b).await.expect("delete failed");
    }
}
