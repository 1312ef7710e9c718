use serde::{Deserialize, Serialize};

/// Whether a transaction brings money in or takes it out.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(alias = "income", alias = "INCOME")]
    Income,
    #[serde(alias = "expense", alias = "EXPENSE")]
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The fixed set of categories a transaction can be filed under.
///
/// Categories are partitioned into income and expense groups, but a category is never checked
/// against the `TransactionType` it is recorded with.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(alias = "salary")]
    Salary,
    #[serde(alias = "freelance")]
    Freelance,
    #[serde(alias = "investment")]
    Investment,
    #[serde(
        rename = "Other Income",
        alias = "other income",
        alias = "other-income",
        alias = "other_income"
    )]
    OtherIncome,
    #[serde(alias = "food")]
    Food,
    #[serde(alias = "transport")]
    Transport,
    #[serde(alias = "bills")]
    Bills,
    #[serde(alias = "entertainment")]
    Entertainment,
    #[serde(alias = "shopping")]
    Shopping,
    #[serde(alias = "healthcare")]
    Healthcare,
    #[serde(
        rename = "Other Expense",
        alias = "other expense",
        alias = "other-expense",
        alias = "other_expense"
    )]
    OtherExpense,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// Every category, income categories first, in the order they are offered to the user.
    pub const ALL: [Category; 11] = [
        Category::Salary,
        Category::Freelance,
        Category::Investment,
        Category::OtherIncome,
        Category::Food,
        Category::Transport,
        Category::Bills,
        Category::Entertainment,
        Category::Shopping,
        Category::Healthcare,
        Category::OtherExpense,
    ];

    /// The label shown to the user and stored in the remote record.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Salary => "Salary",
            Category::Freelance => "Freelance",
            Category::Investment => "Investment",
            Category::OtherIncome => "Other Income",
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Bills => "Bills",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Healthcare => "Healthcare",
            Category::OtherExpense => "Other Expense",
        }
    }

    /// The group this category is listed under.
    pub fn group(&self) -> TransactionType {
        match self {
            Category::Salary
            | Category::Freelance
            | Category::Investment
            | Category::OtherIncome => TransactionType::Income,
            _ => TransactionType::Expense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_labels_round_trip_through_display_and_from_str() {
        for category in Category::ALL {
            assert_eq!(category.to_string(), category.label());
            assert_eq!(Category::from_str(category.label()).unwrap(), category);
        }
    }

    #[test]
    fn test_category_aliases() {
        assert_eq!(Category::from_str("food").unwrap(), Category::Food);
        assert_eq!(
            Category::from_str("other-income").unwrap(),
            Category::OtherIncome
        );
        assert_eq!(
            Category::from_str("other_expense").unwrap(),
            Category::OtherExpense
        );
        assert!(Category::from_str("Groceries").is_err());
    }

    #[test]
    fn test_groups() {
        let income = Category::ALL
            .iter()
            .filter(|c| c.group() == TransactionType::Income)
            .count();
        assert_eq!(income, 4);
        assert_eq!(Category::Healthcare.group(), TransactionType::Expense);
    }

    #[test]
    fn test_transaction_type() {
        assert_eq!(TransactionType::Income.to_string(), "Income");
        assert_eq!(
            TransactionType::from_str("expense").unwrap(),
            TransactionType::Expense
        );
        assert!(TransactionType::from_str("transfer").is_err());
    }
}
