//! redb-based storage layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` (JSON) | Order records, never deleted |
//! | `orders_by_created` | `(created_at, order_id)` | `()` | Time index for day/history/lookup scans |
//! | `active_orders` | `order_id` | `()` | Non-terminal orders (pending/preparing/completed) |
//! | `staff` | `staff_id` | `StaffAccount` (JSON) | Staff records |
//! | `staff_by_username` | `username` | `staff_id` | Unique username index |
//! | `dining_tables` | `number` | `DiningTable` (JSON) | Tables by printed number |
//! | `menu_items` | `item_id` | `MenuItem` (JSON) | Catalog snapshot source |
//! | `sessions` | `session_id` | `SessionRecord` (JSON) | Refresh sessions |
//! | `refresh_index` | `sha256(refresh_token)` | `session_id` | Refresh token lookup |
//!
//! # Durability
//!
//! redb commits are durable once `commit()` returns (copy-on-write with an
//! atomic root swap). Write transactions are serialized by redb, which is what
//! the order status compare-and-set relies on.

mod catalog;
pub mod models;
mod orders;
mod sessions;
mod staff;

pub use models::{SessionRecord, StaffAccount};
pub use orders::StatusUpdate;

use redb::{Database, TableDefinition, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const ORDERS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("orders");
const ORDERS_BY_CREATED_TABLE: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("orders_by_created");
const ACTIVE_ORDERS_TABLE: TableDefinition<i64, ()> = TableDefinition::new("active_orders");
const STAFF_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("staff");
const STAFF_BY_USERNAME_TABLE: TableDefinition<&str, i64> =
    TableDefinition::new("staff_by_username");
const DINING_TABLES_TABLE: TableDefinition<u32, &[u8]> = TableDefinition::new("dining_tables");
const MENU_ITEMS_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("menu_items");
const SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");
const REFRESH_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("refresh_index");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Order id already in use: {0}")]
    OrderExists(i64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UsernameTaken(name) => {
                shared::AppError::conflict(format!("Username already exists: {name}"))
            }
            other => shared::AppError::database(other.to_string()),
        }
    }
}

/// Embedded store shared by every service
#[derive(Clone)]
pub struct Storage {
    db: Arc<Database>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Open or create the database file, creating parent directories as needed
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and ephemeral runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_BY_CREATED_TABLE)?;
            let _ = write_txn.open_table(ACTIVE_ORDERS_TABLE)?;
            let _ = write_txn.open_table(STAFF_TABLE)?;
            let _ = write_txn.open_table(STAFF_BY_USERNAME_TABLE)?;
            let _ = write_txn.open_table(DINING_TABLES_TABLE)?;
            let _ = write_txn.open_table(MENU_ITEMS_TABLE)?;
            let _ = write_txn.open_table(SESSIONS_TABLE)?;
            let _ = write_txn.open_table(REFRESH_INDEX_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }
}

fn to_bytes<T: serde::Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn from_bytes<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}
