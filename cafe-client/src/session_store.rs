//! Staff session persistence
//!
//! The token pair lives behind [`SessionStore`] so that tests can keep it in
//! memory while devices persist it across restarts.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared::models::StaffInfo;

use crate::{ClientError, ClientResult};

/// Token pair plus the identity it was issued for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    pub staff: StaffInfo,
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// 内存存储 (测试与临时会话)
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ClientResult<Option<StoredSession>> {
        Ok(self.session.lock().clone())
    }

    fn save(&self, session: &StoredSession) -> ClientResult<()> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.session.lock() = None;
        Ok(())
    }
}

/// JSON 文件存储
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash never leaves a half-written session behind.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn store_error(action: &str, path: &Path, e: impl std::fmt::Display) -> ClientError {
    ClientError::Store(format!("failed to {} {}: {}", action, path.display(), e))
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ClientResult<Option<StoredSession>> {
        let _guard = self.lock.lock();
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_error("read", &self.path, e)),
        };
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // 损坏的文件视为未登录
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &StoredSession) -> ClientResult<()> {
        let _guard = self.lock.lock();
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| store_error("create", parent, e))?;
        }
        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(session)?;
        std::fs::write(&tmp, bytes).map_err(|e| store_error("write", &tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| store_error("replace", &self.path, e))
    }

    fn clear(&self) -> ClientResult<()> {
        let _guard = self.lock.lock();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_error("remove", &self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::StaffRole;

    fn session() -> StoredSession {
        StoredSession {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            staff: StaffInfo {
                id: 7,
                username: "marta".to_string(),
                display_name: "Marta".to_string(),
                role: StaffRole::Chef,
                is_active: true,
            },
        }
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device").join("session.json");

        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
        store.save(&session()).unwrap();

        let reopened = FileSessionStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(session()));

        reopened.clear().unwrap();
        reopened.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ truncated").unwrap();
        assert_eq!(FileSessionStore::new(&path).load().unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().staff.id, 7);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
