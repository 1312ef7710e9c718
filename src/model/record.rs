//! The shape in which a transaction is stored in a remote document store.

use crate::error::Res;
use crate::model::transaction::positive;
use crate::model::{Amount, Category, Transaction, TransactionId, TransactionType};
use anyhow::Context;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A stored transaction body. The store-assigned key lives outside of the record.
///
/// ```json
/// {
///   "timestamp": 1760968800000,
///   "type": "Expense",
///   "category": "Food",
///   "description": "Lunch",
///   "amount": 20.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    /// The category label. Kept as a string so that a single unknown category in the store does
    /// not prevent the rest of the collection from being read.
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "number")]
    pub amount: Decimal,
}

impl Record {
    /// Converts the stored body back into a `Transaction` under its store key.
    pub fn into_transaction(self, id: TransactionId) -> Res<Transaction> {
        let timestamp = DateTime::from_timestamp_millis(self.timestamp)
            .with_context(|| format!("Timestamp {} is out of range", self.timestamp))?;
        let category = Category::from_str(&self.category)
            .with_context(|| format!("Unknown category '{}'", self.category))?;
        let amount = positive(Amount::new(self.amount)).map_err(anyhow::Error::from)?;
        Ok(Transaction::from_parts(
            id,
            timestamp,
            self.r#type,
            category,
            &self.description,
            amount,
        ))
    }
}

impl From<&Transaction> for Record {
    fn from(txn: &Transaction) -> Self {
        Self {
            timestamp: txn.timestamp().timestamp_millis(),
            r#type: txn.r#type(),
            category: txn.category().label().to_string(),
            description: txn.description().to_string(),
            amount: txn.amount().value(),
        }
    }
}

/// Serializes a `Decimal` as a JSON number rather than a string.
///
/// The store keeps JSON numbers as `f64`, which holds about 15 significant digits. Amounts are
/// capped at `max_amount`, so any amount given to the cent survives the trip exactly. Reading
/// goes through the number's shortest decimal form rather than its binary value, so `20.1` comes
/// back as `20.1`.
mod number {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub(super) fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => Err(serde::ser::Error::custom(format!(
                "{value} cannot be represented as a number"
            ))),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = serde_json::Number::deserialize(deserializer)?;
        let text = number.to_string();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map(|d| d.normalize())
            .map_err(|_| serde::de::Error::custom(format!("{text} is not a valid amount")))
    }
}
