//! Dining tables and menu items
//!
//! Both are maintained by the admin surface; the server only imports them
//! from the seed file and reads them.

use super::{DINING_TABLES_TABLE, MENU_ITEMS_TABLE, Storage, StorageResult, from_bytes, to_bytes};
use redb::{ReadableDatabase, ReadableTable};
use shared::models::{DiningTable, MenuItem};

impl Storage {
    pub fn upsert_dining_table(&self, table: &DiningTable) -> StorageResult<()> {
        let bytes = to_bytes(table)?;
        let txn = self.begin_write()?;
        {
            let mut tables = txn.open_table(DINING_TABLES_TABLE)?;
            tables.insert(table.number, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_dining_table(&self, number: u32) -> StorageResult<Option<DiningTable>> {
        let txn = self.db.begin_read()?;
        let tables = txn.open_table(DINING_TABLES_TABLE)?;
        match tables.get(number)? {
            Some(guard) => Ok(Some(from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn upsert_menu_item(&self, item: &MenuItem) -> StorageResult<()> {
        let bytes = to_bytes(item)?;
        let txn = self.begin_write()?;
        {
            let mut items = txn.open_table(MENU_ITEMS_TABLE)?;
            items.insert(item.id, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_menu_item(&self, id: i64) -> StorageResult<Option<MenuItem>> {
        let txn = self.db.begin_read()?;
        let items = txn.open_table(MENU_ITEMS_TABLE)?;
        match items.get(id)? {
            Some(guard) => Ok(Some(from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Number of tables and menu items currently stored
    pub fn catalog_counts(&self) -> StorageResult<(u64, u64)> {
        use redb::ReadableTableMetadata;

        let txn = self.db.begin_read()?;
        let tables = txn.open_table(DINING_TABLES_TABLE)?;
        let items = txn.open_table(MENU_ITEMS_TABLE)?;
        Ok((tables.len()?, items.len()?))
    }
}
