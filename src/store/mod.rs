//! The remote document store in which transactions are persisted.
//!
//! `Store` is deliberately small: it reads the whole collection, creates one record, or deletes
//! one record. Everything that deals with `Transaction` values, timeouts and error kinds lives in
//! `SyncAdapter`, which wraps a `Box<dyn Store>`.

mod remote;
mod test_store;

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Record, TransactionId};
use crate::{Config, Result};
use std::fmt::Debug;
use tracing::debug;

pub use remote::RemoteStore;
pub use test_store::{TestStore, TestStoreState};

/// The environment variable that switches the app to the in-memory `TestStore`.
pub const TEST_MODE_ENV: &str = "FINANCE_TRACKER_IN_TEST_MODE";

/// An asynchronous key-value collection of `Record`s.
#[async_trait::async_trait]
pub trait Store: Debug {
    /// Reads every record in the collection together with its key.
    async fn load_all(&self) -> Res<Vec<(TransactionId, Record)>>;

    /// Stores a new record and returns the key the store assigned to it.
    async fn create(&self, record: &Record) -> Res<TransactionId>;

    /// Deletes the record stored under `id`.
    async fn delete(&self, id: &TransactionId) -> Res<()>;
}

/// Which store implementation to use.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Talk to the document store configured in `config.json`.
    #[default]
    Remote,
    /// Use an in-memory store seeded with sample data.
    Testing,
}

impl Mode {
    /// Returns `Mode::Testing` when `FINANCE_TRACKER_IN_TEST_MODE` is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Remote,
        }
    }
}

/// Builds the store for `mode`. Returns `Ok(None)` when running against a remote store but no
/// `database_url` is configured, which means the app runs in local-only mode.
pub async fn store(config: &Config, mode: Mode) -> Result<Option<Box<dyn Store + Send + Sync>>> {
    match mode {
        Mode::Testing => {
            debug!("Using the in-memory test store");
            let store = TestStore::seeded().pub_result(ErrorType::Config)?;
            Ok(Some(Box::new(store)))
        }
        Mode::Remote => {
            let Some(url) = config.database_url() else {
                debug!("No database_url is configured");
                return Ok(None);
            };
            let auth_token = config.auth_token().await.pub_result(ErrorType::Config)?;
            let store = RemoteStore::new(
                url.clone(),
                config.collection(),
                auth_token,
                config.timeout(),
            )
            .pub_result(ErrorType::Config)?;
            Ok(Some(Box::new(store)))
        }
    }
}
