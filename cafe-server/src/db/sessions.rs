//! Refresh sessions
//!
//! Keyed by session id; `refresh_index` maps the SHA-256 hex digest of a
//! refresh token back to its session.

use super::{
    REFRESH_INDEX_TABLE, SESSIONS_TABLE, SessionRecord, Storage, StorageResult, from_bytes,
    to_bytes,
};
use redb::{ReadableDatabase, ReadableTable};

impl Storage {
    pub fn insert_session(&self, session: &SessionRecord) -> StorageResult<()> {
        let bytes = to_bytes(session)?;
        let txn = self.begin_write()?;
        {
            let mut sessions = txn.open_table(SESSIONS_TABLE)?;
            sessions.insert(session.id.as_str(), bytes.as_slice())?;
            let mut index = txn.open_table(REFRESH_INDEX_TABLE)?;
            index.insert(session.refresh_hash.as_str(), session.id.as_str())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_session(&self, id: &str) -> StorageResult<Option<SessionRecord>> {
        let txn = self.db.begin_read()?;
        let sessions = txn.open_table(SESSIONS_TABLE)?;
        match sessions.get(id)? {
            Some(guard) => Ok(Some(from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    pub fn find_session_by_refresh_hash(
        &self,
        refresh_hash: &str,
    ) -> StorageResult<Option<SessionRecord>> {
        let txn = self.db.begin_read()?;
        let index = txn.open_table(REFRESH_INDEX_TABLE)?;
        let Some(id) = index
            .get(refresh_hash)?
            .map(|guard| guard.value().to_string())
        else {
            return Ok(None);
        };
        let sessions = txn.open_table(SESSIONS_TABLE)?;
        match sessions.get(id.as_str())? {
            Some(guard) => Ok(Some(from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Record the expiry of a newly minted access token
    pub fn touch_session(&self, id: &str, access_expires_at: i64) -> StorageResult<bool> {
        self.modify_session(id, |session| {
            session.access_expires_at = access_expires_at;
        })
    }

    /// Mark a session revoked; returns false if it does not exist
    pub fn revoke_session(&self, id: &str, at: i64) -> StorageResult<bool> {
        self.modify_session(id, |session| {
            session.revoked_at.get_or_insert(at);
        })
    }

    /// Revoke every live session of a staff member, returning how many changed
    pub fn revoke_staff_sessions(&self, staff_id: i64, at: i64) -> StorageResult<usize> {
        let txn = self.begin_write()?;
        let mut revoked = 0;
        {
            let mut sessions = txn.open_table(SESSIONS_TABLE)?;
            let mut updates = Vec::new();
            for entry in sessions.iter()? {
                let (key, value) = entry?;
                let mut session: SessionRecord = from_bytes(value.value())?;
                if session.staff_id == staff_id && !session.is_revoked() {
                    session.revoked_at = Some(at);
                    updates.push((key.value().to_string(), to_bytes(&session)?));
                }
            }
            for (id, bytes) in updates {
                sessions.insert(id.as_str(), bytes.as_slice())?;
                revoked += 1;
            }
        }
        txn.commit()?;
        Ok(revoked)
    }

    /// Delete sessions whose refresh token expired before `now`
    pub fn purge_expired_sessions(&self, now: i64) -> StorageResult<usize> {
        let txn = self.begin_write()?;
        let purged;
        {
            let mut sessions = txn.open_table(SESSIONS_TABLE)?;
            let mut expired = Vec::new();
            for entry in sessions.iter()? {
                let (key, value) = entry?;
                let session: SessionRecord = from_bytes(value.value())?;
                if session.is_expired(now) {
                    expired.push((key.value().to_string(), session.refresh_hash));
                }
            }

            let mut index = txn.open_table(REFRESH_INDEX_TABLE)?;
            for (id, refresh_hash) in &expired {
                sessions.remove(id.as_str())?;
                index.remove(refresh_hash.as_str())?;
            }
            purged = expired.len();
        }
        txn.commit()?;
        Ok(purged)
    }

    fn modify_session(
        &self,
        id: &str,
        apply: impl FnOnce(&mut SessionRecord),
    ) -> StorageResult<bool> {
        let txn = self.begin_write()?;
        let found = {
            let mut sessions = txn.open_table(SESSIONS_TABLE)?;
            let current = sessions.get(id)?.map(|guard| guard.value().to_vec());
            match current {
                Some(bytes) => {
                    let mut session: SessionRecord = from_bytes(&bytes)?;
                    apply(&mut session);
                    let bytes = to_bytes(&session)?;
                    sessions.insert(id, bytes.as_slice())?;
                    true
                }
                None => false,
            }
        };
        txn.commit()?;
        Ok(found)
    }
}
