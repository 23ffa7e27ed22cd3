//! An in-memory `Store`. Clones share the same underlying map.

use crate::store::Store;
use anyhow::anyhow;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys that have been set.
    pub fn len(&self) -> usize {
        self.data.lock().map(|d| d.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow!("The in-memory store lock is poisoned"))?;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| anyhow!("The in-memory store lock is poisoned"))?;
        data.insert(key.to_string(), value);
        Ok(())
    }
}
