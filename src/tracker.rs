//! A `Tracker` is one interactive session: a `Ledger` plus, when a remote store is reachable, the
//! `SyncAdapter` that mirrors every change to it.
//!
//! The two mutations follow different policies:
//! - `add` is confirmation-gated: the transaction only becomes visible after the store accepted it.
//! - `remove` is optimistic: the transaction disappears at once and is put back in its original
//!   position if the store rejects the delete.

use crate::error::{Error, ErrorType, Result};
use crate::ledger::{Ledger, Summary};
use crate::model::{Category, Transaction, TransactionId, TransactionType};
use crate::sync::SyncAdapter;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use tracing::{error, info, warn};

/// Whether the session is mirrored to a remote store.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum SyncStatus {
    /// Changes are saved to the remote store.
    Connected,
    /// No remote store is configured.
    Unconfigured,
    /// A remote store is configured but could not be reached when the session started.
    Unavailable(String),
}

impl SyncStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, SyncStatus::Connected)
    }
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Connected => f.write_str("Connected to the remote store"),
            SyncStatus::Unconfigured => f.write_str(
                "No remote store is configured; transactions are kept in memory only",
            ),
            SyncStatus::Unavailable(reason) => write!(
                f,
                "The remote store is unavailable ({reason}); transactions are kept in memory only"
            ),
        }
    }
}

#[derive(Debug)]
pub struct Tracker {
    ledger: Ledger,
    sync: Option<SyncAdapter>,
    status: SyncStatus,
}

impl Tracker {
    /// Creates a session that keeps transactions in memory only.
    pub fn local() -> Self {
        Self {
            ledger: Ledger::new(),
            sync: None,
            status: SyncStatus::Unconfigured,
        }
    }

    /// Creates a session backed by `sync` and loads the remote collection into the ledger.
    ///
    /// This never fails. If the collection cannot be loaded, the problem is logged, recorded in
    /// `status()`, and the session continues in local-only mode.
    pub async fn connect(sync: SyncAdapter) -> Self {
        match sync.load_all().await {
            Ok(transactions) => {
                info!("Loaded {} transactions", transactions.len());
                Self {
                    ledger: Ledger::from_transactions(transactions),
                    sync: Some(sync),
                    status: SyncStatus::Connected,
                }
            }
            Err(e) => {
                error!("Unable to connect to the remote store: {e}");
                Self {
                    ledger: Ledger::new(),
                    sync: None,
                    status: SyncStatus::Unavailable(e.to_string()),
                }
            }
        }
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn is_local_only(&self) -> bool {
        self.sync.is_none()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The transactions in the order they are displayed.
    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn summarize(&self) -> Summary {
        self.ledger.summarize()
    }

    /// Validates and records a new transaction.
    ///
    /// When connected, the transaction is sent to the store first and only appended once the
    /// store has confirmed it, under the id the store assigned.
    ///
    /// # Errors
    /// - `InvalidAmount` if the amount is missing, not a number, or not greater than zero.
    /// - `WriteFailed` if the store rejected the write. The ledger is unchanged.
    pub async fn add(
        &mut self,
        r#type: TransactionType,
        category: Category,
        description: &str,
        amount: &str,
    ) -> Result<Transaction> {
        let sync = match &self.sync {
            Some(sync) => sync,
            None => return self.ledger.add(r#type, category, description, amount),
        };
        let transaction = Transaction::new(r#type, category, description, amount)?;
        let id = sync.create(&transaction).await?;
        let transaction = transaction.with_id(id);
        self.ledger.append(transaction.clone());
        Ok(transaction)
    }

    /// Removes the transaction with the given id.
    ///
    /// When connected, the transaction is removed from the ledger immediately and restored to its
    /// original position if the store rejects the delete.
    ///
    /// # Errors
    /// - `NotFound` if no transaction has that id.
    /// - `WriteFailed` if the store rejected the delete. The transaction is back in the ledger.
    pub async fn remove(&mut self, id: &TransactionId) -> Result<Transaction> {
        let index = self.ledger.position(id).ok_or_else(|| {
            Error::msg(
                ErrorType::NotFound,
                format!("Transaction not found: '{id}'"),
            )
        })?;
        let removed = self.ledger.remove_at(index)?;
        let Some(sync) = &self.sync else {
            return Ok(removed);
        };
        match sync.delete(id).await {
            Ok(()) => Ok(removed),
            Err(e) => {
                warn!("Restoring transaction {id} after a failed delete");
                self.ledger.restore(index, removed);
                Err(e)
            }
        }
    }

    /// Removes the transaction displayed at the zero-based `row`.
    ///
    /// # Errors
    /// - `NotFound` if `row` is out of range.
    /// - `WriteFailed` as for `remove`.
    pub async fn remove_row(&mut self, row: usize) -> Result<Transaction> {
        let id = self
            .ledger
            .transactions()
            .get(row)
            .map(|t| t.id().clone())
            .ok_or_else(|| {
                Error::msg(
                    ErrorType::NotFound,
                    format!(
                        "There is no transaction in row {} (there are {})",
                        row + 1,
                        self.ledger.len()
                    ),
                )
            })?;
        self.remove(&id).await
    }

    /// Replaces the ledger with a fresh copy of the remote collection.
    ///
    /// # Errors
    /// - `ConnectionFailed` if not connected or the store cannot be read. The ledger is unchanged.
    pub async fn reload(&mut self) -> Result<usize> {
        let Some(sync) = &self.sync else {
            return Err(Error::msg(
                ErrorType::ConnectionFailed,
                format!("Unable to reload. {}", self.status),
            ));
        };
        let transactions = sync.load_all().await?;
        let count = transactions.len();
        self.ledger.replace_all(transactions);
        Ok(count)
    }
}
