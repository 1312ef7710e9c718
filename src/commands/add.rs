use crate::args::AddArgs;
use crate::commands::Out;
use crate::model::Transaction;
use crate::tracker::Tracker;
use crate::Result;
use tracing::info;

/// Records a new transaction and reports the updated summary.
///
/// # Errors
/// - `InvalidAmount` if the amount is not a positive number.
/// - `WriteFailed` if the remote store did not accept the transaction. Nothing is recorded.
pub async fn add(tracker: &mut Tracker, args: &AddArgs) -> Result<Out<Transaction>> {
    let transaction = tracker
        .add(
            args.r#type(),
            args.category(),
            &args.description(),
            args.amount(),
        )
        .await?;
    info!(
        "Added {} {} to {}",
        transaction.r#type(),
        transaction.amount(),
        transaction.category()
    );
    let message = format!(
        "Added {} '{}' of {} in {}\n{}",
        transaction.r#type(),
        transaction.description(),
        transaction.amount(),
        transaction.category(),
        tracker.summarize()
    );
    Ok(Out::new(message, transaction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, TransactionType};
    use crate::ErrorType;

    #[tokio::test]
    async fn test_add() {
        let mut tracker = Tracker::local();
        let args = AddArgs::new(TransactionType::Income, Category::Salary, "1,000", "");
        let out = add(&mut tracker, &args).await.unwrap();
        assert_eq!(
            out.message(),
            "Added Income 'Salary' of $1,000.00 in Salary\n\
            Balance: $1,000.00    Income: $1,000.00    Expenses: $0.00"
        );
        assert_eq!(out.structure().unwrap().description(), "Salary");
    }

    #[tokio::test]
    async fn test_add_invalid_amount() {
        let mut tracker = Tracker::local();
        let args = AddArgs::new(TransactionType::Expense, Category::Food, "abc", "Lunch");
        let err = add(&mut tracker, &args).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidAmount);
        assert!(tracker.transactions().is_empty());
    }
}
