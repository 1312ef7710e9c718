//! The in-memory, ordered collection of transactions and the totals derived from it.

use crate::error::{Error, ErrorType, Result};
use crate::model::{Amount, Category, Transaction, TransactionId, TransactionType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The ordered list of transactions for one session.
///
/// Order is insertion order. Removing a transaction never reorders the others. Totals are not
/// cached; `summarize` walks the whole collection every time it is called.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        Self {
            transactions: transactions.into_iter().collect(),
        }
    }

    /// Validates the input, creates a transaction with a local id and appends it.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is missing, not a number, or not greater than zero. The
    ///   ledger is unchanged.
    pub fn add(
        &mut self,
        r#type: TransactionType,
        category: Category,
        description: &str,
        amount: &str,
    ) -> Result<Transaction> {
        let transaction = Transaction::new(r#type, category, description, amount)?;
        self.append(transaction.clone());
        Ok(transaction)
    }

    /// Appends an already-constructed transaction.
    pub fn append(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Puts `transaction` back at `index`, or at the end if `index` is past the end.
    pub fn restore(&mut self, index: usize, transaction: Transaction) {
        let index = index.min(self.transactions.len());
        self.transactions.insert(index, transaction);
    }

    /// Removes the transaction with the given id.
    ///
    /// # Errors
    /// - `NotFound` if no transaction has that id. The ledger is unchanged.
    pub fn remove(&mut self, id: &TransactionId) -> Result<Transaction> {
        let index = self.position(id).ok_or_else(|| {
            Error::msg(
                ErrorType::NotFound,
                format!("Transaction not found: '{id}'"),
            )
        })?;
        Ok(self.transactions.remove(index))
    }

    /// Removes the transaction at the zero-based `index`.
    ///
    /// # Errors
    /// - `NotFound` if `index` is out of range. The ledger is unchanged.
    pub fn remove_at(&mut self, index: usize) -> Result<Transaction> {
        if index >= self.transactions.len() {
            return Err(Error::msg(
                ErrorType::NotFound,
                format!(
                    "There is no transaction at position {} (the ledger has {})",
                    index + 1,
                    self.transactions.len()
                ),
            ));
        }
        Ok(self.transactions.remove(index))
    }

    /// Replaces the whole collection, e.g. after reloading from a remote store.
    pub fn replace_all(&mut self, transactions: impl IntoIterator<Item = Transaction>) {
        self.transactions = transactions.into_iter().collect();
    }

    pub fn position(&self, id: &TransactionId) -> Option<usize> {
        self.transactions.iter().position(|t| t.id() == id)
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id() == id)
    }

    /// The transactions in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Computes income, expense and balance totals from scratch. Totals saturate at the limits of
    /// `Decimal` rather than overflowing.
    pub fn summarize(&self) -> Summary {
        let (income, expense) = self.transactions.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expense), t| match t.r#type() {
                TransactionType::Income => (income.saturating_add(t.amount().value()), expense),
                TransactionType::Expense => (income, expense.saturating_add(t.amount().value())),
            },
        );
        Summary::new(income, expense)
    }
}

/// Total income, total expense and the balance between them.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    total_income: Amount,
    total_expense: Amount,
    balance: Amount,
}

impl Summary {
    fn new(total_income: Decimal, total_expense: Decimal) -> Self {
        Self {
            total_income: total_income.into(),
            total_expense: total_expense.into(),
            balance: total_income.saturating_sub(total_expense).into(),
        }
    }

    pub fn total_income(&self) -> Amount {
        self.total_income
    }

    pub fn total_expense(&self) -> Amount {
        self.total_expense
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Balance: {}    Income: {}    Expenses: {}",
            self.balance, self.total_income, self.total_expense
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample() -> Ledger {
        let mut ledger = Ledger::new();
        ledger
            .add(TransactionType::Income, Category::Salary, "", "1000")
            .unwrap();
        ledger
            .add(TransactionType::Expense, Category::Food, "Lunch", "20")
            .unwrap();
        ledger
    }

    #[test]
    fn test_salary_and_lunch() {
        let summary = sample().summarize();
        assert_eq!(summary.total_income().value(), dec("1000"));
        assert_eq!(summary.total_expense().value(), dec("20"));
        assert_eq!(summary.balance().value(), dec("980"));
        assert_eq!(
            summary.to_string(),
            "Balance: $980.00    Income: $1,000.00    Expenses: $20.00"
        );
    }

    #[test]
    fn test_totals_add_up_to_every_amount() {
        let mut ledger = Ledger::new();
        let inputs = [
            (TransactionType::Income, "0.01"),
            (TransactionType::Expense, "19.99"),
            (TransactionType::Expense, "$1,250.10"),
            (TransactionType::Income, "3e2"),
            (TransactionType::Expense, "0.3"),
        ];
        let mut sum = Decimal::ZERO;
        for (r#type, amount) in inputs {
            let txn = ledger.add(r#type, Category::OtherExpense, "", amount).unwrap();
            sum += txn.amount().value();
        }
        let summary = ledger.summarize();
        assert_eq!(
            summary.total_income().value() + summary.total_expense().value(),
            sum
        );
        assert_eq!(
            summary.balance().value(),
            summary.total_income().value() - summary.total_expense().value()
        );
        assert!(summary.balance().is_negative());
    }

    #[test]
    fn test_invalid_amount_leaves_ledger_unchanged() {
        let mut ledger = sample();
        for bad in ["0", "-5", "", "lots"] {
            let err = ledger
                .add(TransactionType::Expense, Category::Bills, "", bad)
                .unwrap_err();
            assert_eq!(err.error_type(), ErrorType::InvalidAmount);
        }
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_empty_description_defaults_to_category_label() {
        let ledger = sample();
        assert_eq!(ledger.transactions()[0].description(), "Salary");
        assert_eq!(ledger.transactions()[1].description(), "Lunch");
    }

    #[test]
    fn test_remove_from_empty_ledger() {
        let mut ledger = Ledger::new();
        let err = ledger.remove(&TransactionId::new("nope")).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
        let err = ledger.remove_at(0).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::NotFound);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_remove_unknown_id_or_position() {
        let mut ledger = sample();
        let before = ledger.clone();
        assert!(ledger.remove(&TransactionId::new("nope")).is_err());
        assert!(ledger.remove_at(2).is_err());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_remove_keeps_order_of_the_rest() {
        let mut ledger = sample();
        let third = ledger
            .add(TransactionType::Expense, Category::Transport, "Bus", "2.5")
            .unwrap();
        let lunch_id = ledger.transactions()[1].id().clone();

        let removed = ledger.remove(&lunch_id).unwrap();
        assert_eq!(removed.description(), "Lunch");
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.transactions()[0].description(), "Salary");
        assert_eq!(ledger.transactions()[1].id(), third.id());
        assert!(ledger.get(&lunch_id).is_none());
        assert_eq!(ledger.summarize().total_expense().value(), dec("2.5"));
    }

    #[test]
    fn test_restore_puts_transaction_back_in_place() {
        let mut ledger = sample();
        let removed = ledger.remove_at(0).unwrap();
        ledger.restore(0, removed.clone());
        assert_eq!(ledger.position(removed.id()), Some(0));

        let removed = ledger.remove_at(1).unwrap();
        ledger.restore(99, removed.clone());
        assert_eq!(ledger.position(removed.id()), Some(1));
    }

    #[test]
    fn test_replace_all_discards_previous_state() {
        let mut ledger = sample();
        let mut other = Ledger::new();
        let bonus = other
            .add(TransactionType::Income, Category::Investment, "Dividend", "42")
            .unwrap();

        ledger.replace_all(vec![bonus.clone()]);
        let summary = ledger.summarize();
        assert_eq!(ledger.transactions(), &[bonus]);
        assert_eq!(summary.total_income().value(), dec("42"));
        assert!(summary.total_expense().is_zero());
        assert_eq!(summary.balance().value(), dec("42"));

        ledger.replace_all(Vec::new());
        assert_eq!(ledger.summarize(), Summary::default());
    }

    #[test]
    fn test_largest_amounts_do_not_overflow_totals() {
        let mut ledger = Ledger::new();
        for _ in 0..3 {
            ledger
                .add(TransactionType::Income, Category::Salary, "", "1,000,000,000,000")
                .unwrap();
        }
        let err = ledger
            .add(
                TransactionType::Income,
                Category::Salary,
                "",
                "79228162514264337593543950335",
            )
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::InvalidAmount);
        assert_eq!(ledger.summarize().total_income().value(), dec("3000000000000"));
    }

    #[test]
    fn test_totals_saturate_instead_of_panicking() {
        let huge = |r#type| {
            Transaction::from_parts(
                TransactionId::local(),
                chrono::Utc::now(),
                r#type,
                Category::OtherIncome,
                "",
                Amount::new(Decimal::MAX),
            )
        };
        let ledger = Ledger::from_transactions([
            huge(TransactionType::Income),
            huge(TransactionType::Income),
            huge(TransactionType::Expense),
            huge(TransactionType::Expense),
            huge(TransactionType::Expense),
        ]);
        let summary = ledger.summarize();
        assert_eq!(summary.total_income().value(), Decimal::MAX);
        assert_eq!(summary.total_expense().value(), Decimal::MAX);
        assert!(summary.balance().is_zero());
    }

    #[test]
    fn test_summary_is_stable_across_add_remove_cycles() {
        let mut ledger = sample();
        for _ in 0..50 {
            let txn = ledger
                .add(TransactionType::Expense, Category::Shopping, "", "0.1")
                .unwrap();
            ledger.remove(txn.id()).unwrap();
        }
        assert_eq!(ledger.summarize().balance().value(), dec("980"));
    }
}
