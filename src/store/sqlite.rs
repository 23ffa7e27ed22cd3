//! A `Store` backed by a single-table SQLite database in the home directory.

use crate::error::Res;
use crate::store::{migrations, Store};
use anyhow::{bail, Context};
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
    pool: SqlitePool,
}

impl SqliteStore {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the schema
    pub async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A store already exists at {}", path.display());
        }
        let store = Self::connect(path, true).await?;
        migrations::run(&store.pool, 0, migrations::CURRENT_VERSION).await?;
        debug!("Initialized store at {}", path.display());
        Ok(store)
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Updates the schema with migrations if it is out-of-date
    pub async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The store file is missing '{}'", path.display());
        }
        let store = Self::connect(path, false).await?;
        let version = migrations::current_version(&store.pool).await?;
        if version > migrations::CURRENT_VERSION {
            bail!(
                "The store at {} has schema version {version}, which is newer than this program \
                supports ({}). Is a newer version of spendwise installed?",
                path.display(),
                migrations::CURRENT_VERSION
            );
        }
        migrations::run(&store.pool, version, migrations::CURRENT_VERSION).await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(path: &Path, create: bool) -> Res<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open SQLite database at {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            pool,
        })
    }
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        trace!("get {key}");
        let raw: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to select '{key}'"))?;
        match raw {
            None => Ok(None),
            Some(s) => serde_json::from_str(&s)
                .map(Some)
                .with_context(|| format!("The value stored at '{key}' is not valid JSON")),
        }
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        trace!("set {key}");
        let raw = serde_json::to_string(&value)?;
        sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?) \
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert '{key}'"))?;
        Ok(())
    }
}
