//! The persistent key-value store that holds the challenge lists and favorites.
//!
//! Each key holds one JSON value. The lists are read and written whole; there is one writer.

mod memory;
mod migrations;
mod sqlite;

use crate::error::Res;
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key holding the list of `ActiveChallenge`.
pub const ACTIVE_CHALLENGES: &str = "activeChallenges";

/// Key holding the list of `CompletedChallenge`.
pub const COMPLETED_CHALLENGES: &str = "completedChallenges";

/// Key holding the list of `Favorite`.
pub const FAVORITES: &str = "expenseFavorites";

/// A key-value store holding one JSON value per key.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Returns the value stored at `key`, or `None` if the key has never been set.
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;

    /// Replaces the value stored at `key`.
    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()>;
}

/// Loads the list stored at `key`. A missing key is an empty list.
///
/// Entries are decoded one at a time and any entry that cannot be decoded is skipped with a
/// warning. A stored value that is not a list at all is an error.
pub(crate) async fn load_list<T, S>(store: &S, key: &str) -> Res<Vec<T>>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let items = match store
        .get(key)
        .await
        .with_context(|| format!("Unable to read '{key}' from the store"))?
    {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => bail!(
            "Expected a list at '{key}' but found {}",
            json_type_name(&other)
        ),
    };

    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(ix, item)| match serde_json::from_value(item) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!("Skipping malformed entry {ix} in '{key}': {e}");
                None
            }
        })
        .collect();
    debug!("Loaded {} of {total} entries from '{key}'", decoded.len());
    Ok(decoded)
}

/// Replaces the list stored at `key` with `items`.
pub(crate) async fn save_list<T, S>(store: &S, key: &str, items: &[T]) -> Res<()>
where
    T: Serialize,
    S: Store + ?Sized,
{
    let value = serde_json::to_value(items)
        .with_context(|| format!("Unable to serialize the list for '{key}'"))?;
    store
        .set(key, value)
        .await
        .with_context(|| format!("Unable to write '{key}' to the store"))?;
    debug!("Saved {} entries to '{key}'", items.len());
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
