use crate::args::DeleteTarget;
use crate::commands::Out;
use crate::error::{Error, ErrorType};
use crate::model::{Transaction, TransactionId};
use crate::tracker::Tracker;
use crate::Result;
use tracing::info;

/// Finds the transaction that `target` refers to in the current view.
///
/// # Errors
/// - `NotFound` if the row is out of range or no transaction has the id.
pub fn resolve<'a>(tracker: &'a Tracker, target: &DeleteTarget) -> Result<&'a Transaction> {
    let found = match target {
        DeleteTarget::Row(row) => row
            .checked_sub(1)
            .and_then(|index| tracker.transactions().get(index)),
        DeleteTarget::Id(id) => tracker.ledger().get(&TransactionId::new(id.as_str())),
    };
    found.ok_or_else(|| {
        Error::msg(
            ErrorType::NotFound,
            format!(
                "There is no transaction at {target} (there are {})",
                tracker.transactions().len()
            ),
        )
    })
}

/// Deletes the transaction that `target` refers to.
///
/// The row number is resolved to the transaction's id before anything is removed, so the
/// transaction that is deleted is the one the user saw in that row.
///
/// # Errors
/// - `NotFound` if the row is out of range or no transaction has the id.
/// - `WriteFailed` if the remote store did not accept the delete. The transaction is kept.
pub async fn delete(tracker: &mut Tracker, target: &DeleteTarget) -> Result<Out<Transaction>> {
    let id = resolve(tracker, target)?.id().clone();
    let removed = tracker.remove(&id).await?;
    info!("Deleted transaction {id}");
    let message = format!(
        "Deleted {} '{}' of {}\n{}",
        removed.r#type(),
        removed.description(),
        removed.amount(),
        tracker.summarize()
    );
    Ok(Out::new(message, removed))
}
