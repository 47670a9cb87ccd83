//! Per-user configuration storage.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;

/// Stores the one configuration string each user owns.
#[async_trait]
pub trait UserConfigStore: Send + Sync {
    /// Current value for `user_id`, `None` if never set.
    async fn get(&self, user_id: &str) -> Result<Option<String>>;

    /// Replace the value for `user_id`.
    async fn set(&self, user_id: &str, value: String) -> Result<()>;
}

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserConfigStore for MemoryConfigStore {
    async fn get(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(user_id).cloned())
    }

    async fn set(&self, user_id: &str, value: String) -> Result<()> {
        self.values.write().await.insert(user_id.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_after_write() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.get("u1").await.unwrap(), None);

        store.set("u1", "profile".to_string()).await.unwrap();
        assert_eq!(store.get("u1").await.unwrap().as_deref(), Some("profile"));

        store.set("u1", "anything at all".to_string()).await.unwrap();
        assert_eq!(
            store.get("u1").await.unwrap().as_deref(),
            Some("anything at all")
        );
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = MemoryConfigStore::new();
        store.set("u1", "profile".to_string()).await.unwrap();
        assert_eq!(store.get("u2").await.unwrap(), None);
    }
}
