//! Staff accounts

use super::{
    STAFF_BY_USERNAME_TABLE, STAFF_TABLE, StaffAccount, Storage, StorageError, StorageResult,
    from_bytes, to_bytes,
};
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata};

/// Usernames are matched case-insensitively
fn username_key(username: &str) -> String {
    username.trim().to_lowercase()
}

impl Storage {
    /// Insert a new account; fails if the username is taken
    pub fn insert_staff(&self, account: &StaffAccount) -> StorageResult<()> {
        let key = username_key(&account.username);
        let bytes = to_bytes(account)?;
        let txn = self.begin_write()?;
        {
            let mut by_username = txn.open_table(STAFF_BY_USERNAME_TABLE)?;
            if by_username.get(key.as_str())?.is_some() {
                return Err(StorageError::UsernameTaken(account.username.clone()));
            }
            by_username.insert(key.as_str(), account.id)?;

            let mut staff = txn.open_table(STAFF_TABLE)?;
            staff.insert(account.id, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Overwrite an existing account (username is immutable)
    pub fn update_staff(&self, account: &StaffAccount) -> StorageResult<()> {
        let bytes = to_bytes(account)?;
        let txn = self.begin_write()?;
        {
            let mut staff = txn.open_table(STAFF_TABLE)?;
            staff.insert(account.id, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_staff(&self, id: i64) -> StorageResult<Option<StaffAccount>> {
        let txn = self.db.begin_read()?;
        let staff = txn.open_table(STAFF_TABLE)?;
        match staff.get(id)? {
            Some(guard) => Ok(Some(from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn find_staff_by_username(&self, username: &str) -> StorageResult<Option<StaffAccount>> {
        let key = username_key(username);
        let txn = self.db.begin_read()?;
        let by_username = txn.open_table(STAFF_BY_USERNAME_TABLE)?;
        let Some(id) = by_username.get(key.as_str())?.map(|guard| guard.value()) else {
            return Ok(None);
        };
        let staff = txn.open_table(STAFF_TABLE)?;
        match staff.get(id)? {
            Some(guard) => Ok(Some(from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn staff_count(&self) -> StorageResult<u64> {
        let txn = self.db.begin_read()?;
        let staff = txn.open_table(STAFF_TABLE)?;
        Ok(staff.len()?)
    }
}
