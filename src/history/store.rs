use dashmap::DashMap;
use serde_json::Value;

use super::session::SessionId;

/// Key/value storage partitioned by session. One session never sees
/// another's keys.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    fn get(&self, session: &SessionId, key: &str) -> Option<Value>;
    fn set(&self, session: &SessionId, key: &str, value: Value);
    fn clear(&self, session: &SessionId, key: &str);
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<(SessionId, String), Value>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session: &SessionId, key: &str) -> Option<Value> {
        self.entries
            .get(&(session.clone(), key.to_string()))
            .map(|entry| entry.value().clone())
    }

    fn set(&self, session: &SessionId, key: &str, value: Value) {
        self.entries.insert((session.clone(), key.to_string()), value);
    }

    fn clear(&self, session: &SessionId, key: &str) {
        self.entries.remove(&(session.clone(), key.to_string()));
    }
}
