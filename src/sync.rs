//! Bridges ledger mutations to a remote `Store`.
//!
//! Every call is bounded by a timeout so that an unresponsive store cannot hang the session. Read
//! failures become `ConnectionFailed`, write failures become `WriteFailed`.

use crate::error::{Error, ErrorType, IntoResult, Res, Result};
use crate::model::{Record, Transaction, TransactionId};
use crate::store::Store;
use anyhow::Context;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// The default bound on a single remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct SyncAdapter {
    store: Box<dyn Store + Send + Sync>,
    timeout: Duration,
}

impl SyncAdapter {
    pub fn new(store: Box<dyn Store + Send + Sync>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches the whole remote collection, ordered by creation time.
    ///
    /// Records that cannot be turned into a `Transaction` are logged and skipped.
    ///
    /// # Errors
    /// - `ConnectionFailed` if the store cannot be read or does not answer in time.
    pub async fn load_all(&self) -> Result<Vec<Transaction>> {
        let documents = self
            .bounded("load the remote collection", self.store.load_all())
            .await
            .pub_result(ErrorType::ConnectionFailed)?;

        let mut transactions: Vec<Transaction> = documents
            .into_iter()
            .filter_map(|(id, record)| match record.into_transaction(id.clone()) {
                Ok(txn) => Some(txn),
                Err(e) => {
                    warn!("Skipping stored transaction '{id}': {e:#}");
                    None
                }
            })
            .collect();
        transactions.sort_by(|a, b| {
            a.timestamp()
                .cmp(&b.timestamp())
                .then_with(|| a.id().cmp(b.id()))
        });
        debug!("Loaded {} transactions", transactions.len());
        Ok(transactions)
    }

    /// Stores `transaction` and returns the id the store assigned to it.
    ///
    /// # Errors
    /// - `WriteFailed` if the store rejects the write or does not answer in time.
    pub async fn create(&self, transaction: &Transaction) -> Result<TransactionId> {
        let record = Record::from(transaction);
        let id = self
            .bounded("save the transaction", self.store.create(&record))
            .await
            .pub_result(ErrorType::WriteFailed)?;
        debug!("The store saved transaction {} as {id}", transaction.id());
        Ok(id)
    }

    /// Deletes the stored transaction `id`.
    ///
    /// # Errors
    /// - `WriteFailed` if the store rejects the delete or does not answer in time.
    pub async fn delete(&self, id: &TransactionId) -> Result<()> {
        if id.is_local() {
            return Err(Error::msg(
                ErrorType::WriteFailed,
                format!("Transaction '{id}' was never saved to the remote store"),
            ));
        }
        self.bounded("delete the transaction", self.store.delete(id))
            .await
            .pub_result(ErrorType::WriteFailed)?;
        debug!("The store deleted transaction {id}");
        Ok(())
    }

    /// Runs `fut`, failing if it does not complete within the timeout.
    async fn bounded<T>(&self, what: &str, fut: impl Future<Output = Res<T>>) -> Res<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .with_context(|| {
                format!(
                    "Unable to {what}: the remote store did not answer within {}s",
                    self.timeout.as_secs_f64()
                )
            })?
            .with_context(|| format!("Unable to {what}"))
    }
}
