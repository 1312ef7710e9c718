//! Configuration file handling.
//!
//! The configuration file is stored at `$FINANCE_TRACKER_HOME/config.json`. It names the remote
//! document store (if any), the collection that holds the transactions, the request timeout and
//! the backup settings. When the file does not exist the app runs with local-only defaults.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult, Res};
use crate::sync::DEFAULT_TIMEOUT;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

const APP_NAME: &str = "finance-tracker";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const COLLECTION: &str = "transactions";
const TIMEOUT_SECS: u64 = DEFAULT_TIMEOUT.as_secs();
const SECRETS: &str = ".secrets";
const BACKUPS: &str = ".backups";
const AUTH_TOKEN: &str = "auth_token";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINANCE_TRACKER_HOME` and from there it loads `config.json`. It provides paths to
/// other items that are either configurable or are expected in a certain location within the home
/// directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    database_url: Option<Url>,
    initialized: bool,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/finance-tracker`
    /// - `database_url` - The base URL of the remote document store. `None` means local-only.
    /// - `collection` - The path of the collection under `database_url`.
    /// - `timeout_secs` - The bound on each remote call.
    ///
    /// # Errors
    /// - `Config` if `database_url` is not a valid URL or `timeout_secs` is zero.
    /// - `Io` if any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        database_url: Option<&str>,
        collection: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<Self> {
        let config_file = ConfigFile {
            database_url: database_url.map(str::to_string),
            collection: collection.unwrap_or(COLLECTION).to_string(),
            timeout_secs: timeout_secs.unwrap_or(TIMEOUT_SECS),
            ..ConfigFile::default()
        };
        let database_url = config_file.validate().pub_result(ErrorType::Config)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finance-tracker home directory")
            .pub_result(ErrorType::Io)?;
        let root = utils::canonicalize(&maybe_relative)
            .await
            .pub_result(ErrorType::Io)?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await.pub_result(ErrorType::Io)?;
        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await.pub_result(ErrorType::Io)?;

        let config_path = root.join(CONFIG_JSON);
        config_file
            .save(&config_path)
            .await
            .pub_result(ErrorType::Io)?;

        Ok(Self {
            root,
            backups,
            secrets,
            config_path,
            config_file,
            database_url,
            initialized: true,
        })
    }

    /// Loads `config.json` from `home`.
    ///
    /// If the file does not exist, returns a local-only configuration rooted at `home` without
    /// touching the filesystem.
    ///
    /// # Errors
    /// - `Config` if the file exists but cannot be read, parsed or validated.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let root = home.into();
        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            debug!(
                "No config file at '{}', using local-only defaults",
                config_path.display()
            );
            return Ok(Self::local(root));
        }
        let root = utils::canonicalize(&root)
            .await
            .pub_result(ErrorType::Config)?;
        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::load(&config_path)
            .await
            .pub_result(ErrorType::Config)?;
        let database_url = config_file.validate().pub_result(ErrorType::Config)?;
        Ok(Self {
            backups: root.join(BACKUPS),
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
            database_url,
            initialized: true,
        })
    }

    /// A configuration with default settings and no remote store.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            backups: root.join(BACKUPS),
            secrets: root.join(SECRETS),
            config_path: root.join(CONFIG_JSON),
            root,
            config_file: ConfigFile::default(),
            database_url: None,
            initialized: false,
        }
    }

    /// Whether this configuration was read from (or written to) a `config.json`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn database_url(&self) -> Option<&Url> {
        self.database_url.as_ref()
    }

    pub fn collection(&self) -> &str {
        &self.config_file.collection
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_secs)
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Returns the stored `auth_token_path` if it is absolute, otherwise resolves it against the
    /// home directory.
    pub fn auth_token_path(&self) -> PathBuf {
        let p = self.config_file.auth_token_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    /// Reads the auth token for the remote store. A missing or blank token file means the store
    /// is accessed without authentication.
    pub(crate) async fn auth_token(&self) -> Res<Option<String>> {
        let path = self.auth_token_path();
        if !path.is_file() {
            debug!("No auth token at '{}'", path.display());
            return Ok(None);
        }
        let token = utils::read(&path).await?;
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finance-tracker",
///   "config_version": 1,
///   "database_url": "https://my-ledger.firebaseio.com",
///   "collection": "transactions",
///   "timeout_secs": 10,
///   "backup_copies": 5,
///   "auth_token_path": ".secrets/auth_token"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finance-tracker"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the remote document store. Absent means local-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database_url: Option<String>,

    /// Path of the transactions collection under `database_url`
    #[serde(default = "default_collection")]
    collection: String,

    /// Seconds to wait for each remote call
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Number of backup copies to keep
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// Path to the auth token file (optional, relative to the home directory or absolute)
    /// Defaults to $FINANCE_TRACKER_HOME/.secrets/auth_token if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token_path: Option<PathBuf>,
}

fn default_collection() -> String {
    COLLECTION.to_string()
}

fn default_timeout_secs() -> u64 {
    TIMEOUT_SECS
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            database_url: None,
            collection: default_collection(),
            timeout_secs: TIMEOUT_SECS,
            backup_copies: BACKUP_COPIES,
            auth_token_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if `app_name` is wrong.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
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

    /// Checks the settings that cannot be expressed in the types and parses `database_url`.
    fn validate(&self) -> Res<Option<Url>> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        if self.collection.trim_matches('/').is_empty() {
            bail!("collection must not be empty");
        }
        let Some(url) = self.database_url.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(url).with_context(|| format!("Invalid database_url '{url}'"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("database_url must be an http or https URL, got '{url}'");
        }
        Ok(Some(url))
    }

    /// Gets the auth token path. If None, defaults to `.secrets/auth_token`.
    fn auth_token_path(&self) -> PathBuf {
        self.auth_token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(AUTH_TOKEN))
    }
}
