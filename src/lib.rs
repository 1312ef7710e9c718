pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
mod ledger;
pub mod model;
pub mod store;
mod sync;
mod tracker;
mod utils;

pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use ledger::{Ledger, Summary};
pub use store::Mode;
pub use sync::{SyncAdapter, DEFAULT_TIMEOUT};
pub use tracker::{SyncStatus, Tracker};
