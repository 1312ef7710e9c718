use crate::commands::Out;
use crate::ledger::Summary;
use crate::tracker::Tracker;

/// Reports the balance, total income and total expenses.
pub fn summary(tracker: &Tracker) -> Out<Summary> {
    let summary = tracker.summarize();
    Out::new(summary.to_string(), summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, TransactionType};

    #[tokio::test]
    async fn test_negative_balance() {
        let mut tracker = Tracker::local();
        tracker
            .add(TransactionType::Expense, Category::Bills, "", "12")
            .await
            .unwrap();
        assert_eq!(
            summary(&tracker).message(),
            "Balance: -$12.00    Income: $0.00    Expenses: $12.00"
        );
    }
}
