use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::model::{Amount, Category, TransactionType};
use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Format used when showing a transaction's timestamp, e.g. `2025-10-20 14:05`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Prefix for ids that were generated locally and never confirmed by a remote store.
const LOCAL_PREFIX: &str = "local-";

/// The opaque identifier of a transaction.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh id for a transaction that exists only in memory.
    pub fn local() -> Self {
        Self(format!("{LOCAL_PREFIX}{}", Uuid::new_v4().simple()))
    }

    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One income or expense entry. A `Transaction` is never modified after it is created; the only
/// thing that can change is its id, which is replaced once a remote store has accepted it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    id: TransactionId,
    timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    r#type: TransactionType,
    category: Category,
    description: String,
    amount: Amount,
}

impl Transaction {
    /// Validates the user's input and creates a transaction stamped with the current time and a
    /// local id.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is missing, not a number, or not greater than zero.
    pub fn new(
        r#type: TransactionType,
        category: Category,
        description: &str,
        amount: &str,
    ) -> Result<Self> {
        let amount = parse_positive(amount)?;
        Ok(Self::from_parts(
            TransactionId::local(),
            now(),
            r#type,
            category,
            description,
            amount,
        ))
    }

    /// Assembles a transaction from values that have already been validated, e.g. when a record
    /// is read back from a store. A blank description becomes the category label.
    pub(crate) fn from_parts(
        id: TransactionId,
        timestamp: DateTime<Utc>,
        r#type: TransactionType,
        category: Category,
        description: &str,
        amount: Amount,
    ) -> Self {
        let description = match description.trim() {
            "" => category.label().to_string(),
            trimmed => trimmed.to_string(),
        };
        Self {
            id,
            timestamp,
            r#type,
            category,
            description,
            amount,
        }
    }

    /// Returns the same transaction under a store-assigned id.
    pub fn with_id(self, id: TransactionId) -> Self {
        Self { id, ..self }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn is_income(&self) -> bool {
        self.r#type == TransactionType::Income
    }

    /// Formats the timestamp as `YYYY-MM-DD HH:mm` in the given time zone.
    pub fn format_timestamp<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.timestamp
            .with_timezone(tz)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }
}

/// Parses `s` as an amount that must be strictly greater than zero.
pub fn parse_positive(s: &str) -> Result<Amount> {
    let amount = Amount::from_str(s)
        .with_context(|| format!("'{}' is not a valid amount", s.trim()))
        .pub_result(ErrorType::InvalidAmount)?;
    positive(amount)
}

/// The largest amount a single transaction may have. Totals of any realistic number of
/// transactions stay far inside the range of `Decimal`.
pub fn max_amount() -> Amount {
    Amount::new(Decimal::new(1_000_000_000_000, 0))
}

/// Checks that `amount` is strictly greater than zero and not above `max_amount`.
pub(crate) fn positive(amount: Amount) -> Result<Amount> {
    if !amount.is_positive() {
        return Err(Error::msg(
            ErrorType::InvalidAmount,
            format!("Amount must be positive, got {amount}"),
        ));
    }
    if amount > max_amount() {
        return Err(Error::msg(
            ErrorType::InvalidAmount,
            format!("Amount must be at most {}, got {amount}", max_amount()),
        ));
    }
    Ok(amount)
}

/// The current time truncated to milliseconds, which is the precision of the stored record.
fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}
