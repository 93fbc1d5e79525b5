//! Session context.
//!
//! Holds the persisted admin session flag. The context is created once by the
//! application and handed to whoever needs it; there is no global instance.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::SESSION_KEY;
use crate::errors::{Error, Result};
use crate::storage::KeyValueStore;

/// Persisted session details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_name: String,
    #[serde(default)]
    pub role: Option<String>,
    pub started_at: DateTime<Utc>,
}

pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<SessionInfo>>,
}

impl SessionContext {
    /// Read the persisted session, if any.
    ///
    /// A corrupt entry is discarded and treated as logged out.
    pub fn init(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let current = match store.get_value(SESSION_KEY)? {
            Some(raw) => match serde_json::from_str::<SessionInfo>(&raw) {
                Ok(info) => {
                    debug!("[Session] Restored session for {}", info.user_name);
                    Some(info)
                }
                Err(e) => {
                    warn!("[Session] Discarding unreadable session: {}", e);
                    store.delete_value(SESSION_KEY)?;
                    None
                }
            },
            None => None,
        };
        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Option<SessionInfo>>> {
        self.current
            .read()
            .map_err(|_| Error::Unexpected("Session lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Option<SessionInfo>>> {
        self.current
            .write()
            .map_err(|_| Error::Unexpected("Session lock poisoned".into()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().map(|s| s.is_some()).unwrap_or(false)
    }

    pub fn current(&self) -> Option<SessionInfo> {
        self.read().ok().and_then(|s| s.clone())
    }

    /// Record a new session, replacing any previous one.
    pub fn begin(&self, info: SessionInfo) -> Result<()> {
        let raw = serde_json::to_string(&info)?;
        self.store.set_value(SESSION_KEY, &raw)?;
        *self.write()? = Some(info);
        Ok(())
    }

    /// Forget the session, in memory and in storage.
    pub fn teardown(&self) -> Result<()> {
        self.store.delete_value(SESSION_KEY)?;
        *self.write()? = None;
        debug!("[Session] Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    fn info() -> SessionInfo {
        SessionInfo {
            user_name: "pengurus".to_string(),
            role: Some("admin".to_string()),
            started_at: Utc::now(),
        }
    }

    #[test]
    fn test_init_without_session() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let session = SessionContext::init(store).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.current(), None);
    }

    #[test]
    fn test_session_survives_reinit_until_teardown() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let session = SessionContext::init(store.clone()).unwrap();
        session.begin(info()).unwrap();

        let restored = SessionContext::init(store.clone()).unwrap();
        assert!(restored.is_authenticated());
        assert_eq!(restored.current().unwrap().user_name, "pengurus");

        restored.teardown().unwrap();
        assert!(!restored.is_authenticated());
        assert!(!SessionContext::init(store).unwrap().is_authenticated());
    }

    #[test]
    fn test_corrupt_session_is_discarded() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set_value(SESSION_KEY, "{not json").unwrap();
        let session = SessionContext::init(store.clone()).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(store.get_value(SESSION_KEY).unwrap(), None);
    }
}
