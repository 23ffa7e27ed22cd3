//! Configuration file handling for spendwise.
//!
//! The configuration file is stored at `$SPEND_HOME/config.json` and contains the URL of the
//! expense backend and display settings. The SQLite file that holds the challenge and favorites
//! lists lives next to it.

use crate::error::{ErrorType, IntoResult, Res};
use crate::store::SqliteStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

const APP_NAME: &str = "spendwise";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const SPENDWISE_SQLITE: &str = "spendwise.sqlite";

/// The expense backend used when none is given.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/expenses";

/// The currency symbol used when none is configured.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$SPEND_HOME` and from there it loads `$SPEND_HOME/config.json` and opens the
/// SQLite store.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
    store: SqliteStore,
    sqlite_path: PathBuf,
}

impl Config {
    /// Creates the data directory and:
    /// - Creates an initial `config.json` file using `api_url` along with default settings
    /// - Creates and migrates the SQLite store
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/spendwise`
    /// - `api_url` - The URL of the backend's expenses resource. Defaults to
    ///   `http://localhost:8080/api/expenses`.
    ///
    /// # Errors
    /// - Returns an `ErrorType::Config` error if the URL is invalid, the directory has already
    ///   been initialized, or if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, api_url: Option<&str>) -> Result<Self> {
        Self::create_inner(dir.into(), api_url)
            .await
            .pub_result(ErrorType::Config)
    }

    async fn create_inner(maybe_relative: PathBuf, api_url: Option<&str>) -> Res<Self> {
        let api_url_str = api_url.unwrap_or(DEFAULT_API_URL);
        let api_url = parse_api_url(api_url_str)?;

        // Create the directory if it does not exist
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the spendwise home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            );
        }
        let config_file = ConfigFile {
            api_url: api_url_str.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let sqlite_path = root.join(SPENDWISE_SQLITE);
        let store = SqliteStore::init(&sqlite_path)
            .await
            .context("Unable to create the SQLite store")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            api_url,
            store,
            sqlite_path,
        })
    }

    /// This will
    /// - validate that `spend_home` exists and that the config file exists
    /// - load and validate the config file
    /// - open the SQLite store, migrating it if needed
    /// - return the loaded configuration object
    pub async fn load(spend_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(spend_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The spendwise home directory is missing, run 'spend init' first")?;
        if !root.is_dir() {
            bail!("The spendwise home '{}' is not a directory", root.display());
        }

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)?;

        let sqlite_path = root.join(SPENDWISE_SQLITE);
        let store = SqliteStore::load(&sqlite_path)
            .await
            .context("Unable to load the SQLite store")?;

        Ok(Self {
            root,
            config_path,
            config_file,
            api_url,
            store,
            sqlite_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    /// The store holding the challenge and favorites lists. Clones share one connection pool.
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn sqlite_path(&self) -> &Path {
        &self.sqlite_path
    }
}

fn parse_api_url(s: &str) -> Res<Url> {
    let url = Url::from_str(s).with_context(|| format!("Invalid API URL '{s}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("The API URL must use http or https, got '{s}'");
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "spendwise",
///   "config_version": 1,
///   "api_url": "http://localhost:8080/api/expenses",
///   "currency_symbol": "₹"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "spendwise"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// URL of the backend's expenses resource
    #[serde(default = "default_api_url")]
    api_url: String,

    /// Printed in front of amounts in reports and listings
    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: default_api_url(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or was not written by this app.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "The config file version {} is newer than this program supports ({})",
            config.config_version,
            CONFIG_VERSION
        );
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("spend_home");

        let config = Config::create(&home_dir, Some("https://example.com/api/expenses"))
            .await
            .unwrap();

        assert_eq!(
            config.api_url().as_str(),
            "https://example.com/api/expenses"
        );
        assert_eq!(config.currency_symbol(), "₹");
        assert!(config.config_path().is_file());
        assert!(config.sqlite_path().is_file());
    }

    #[tokio::test]
    async fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), None).await.unwrap();
        assert_eq!(created.api_url().as_str(), DEFAULT_API_URL);

        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(loaded.api_url(), created.api_url());
        assert_eq!(loaded.config_file, created.config_file);
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), None).await.unwrap();
        assert!(Config::create(dir.path(), None).await.is_err());
    }

    #[tokio::test]
    async fn test_config_create_rejects_bad_url() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("home");
        assert!(Config::create(&home, Some("not a url")).await.is_err());
        assert!(Config::create(&home, Some("ftp://example.com/x")).await.is_err());
        assert!(!home.join(CONFIG_JSON).exists());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("spend init"), "{err}");
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "spendwise",
            "config_version": 1
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "budgeteer",
            "config_version": 1,
            "api_url": "http://localhost:8080/api/expenses"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("file.json");
        let original = ConfigFile {
            currency_symbol: "$".to_string(),
            ..ConfigFile::default()
        };
        original.save(&path).await.unwrap();
        assert_eq!(ConfigFile::load(&path).await.unwrap(), original);
    }
}
