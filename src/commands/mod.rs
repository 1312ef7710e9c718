//! Command handlers for the tracker CLI.
//!
//! This module contains implementations for all CLI subcommands and for the interactive shell
//! that runs the same commands against one long-lived `Tracker`.

mod add;
mod delete;
mod init;
mod list;
mod shell;
mod summary;

use crate::backup::LOAD;
use crate::store::{self, Mode};
use crate::sync::SyncAdapter;
use crate::tracker::Tracker;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, warn};

pub use add::add;
pub use delete::{delete, resolve};
pub use init::init;
pub use list::{list, render_table};
pub use shell::{delete_prompted, shell, tokenize};
pub use summary::summary;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to both the command line and the interactive shell.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to stdout and the structured data (if it exists) as JSON to `debug!`.
    ///
    /// The message goes to stdout rather than the log because it is the command's actual output,
    /// e.g. the transactions table.
    pub fn print(&self) {
        println!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Builds the store selected by `mode` and `config`, and starts a session with it.
///
/// With no store configured the session is local-only. When the store cannot be reached the
/// session is local-only too, and `Tracker::status` says why. A successful load is saved as a
/// snapshot in the backups directory.
pub async fn open(config: &Config, mode: Mode) -> Result<Tracker> {
    let Some(store) = store::store(config, mode).await? else {
        debug!("Starting a local-only session");
        return Ok(Tracker::local());
    };
    let tracker = Tracker::connect(SyncAdapter::new(store, config.timeout())).await;
    if tracker.status().is_connected() {
        snapshot(config, &tracker).await;
    }
    Ok(tracker)
}

/// Saves the loaded transactions to the backups directory. Failures are logged and ignored.
async fn snapshot(config: &Config, tracker: &Tracker) {
    if !config.backups().is_dir() {
        debug!(
            "Skipping the load snapshot, '{}' does not exist",
            config.backups().display()
        );
        return;
    }
    match config.backup().save_json(LOAD, tracker.transactions()).await {
        Ok(path) => debug!("Saved a snapshot of the loaded data to {}", path.display()),
        Err(e) => warn!("Unable to save a snapshot of the loaded data: {e:#}"),
    }
}
