//! Types that represent the core data model, such as `Transaction` and `Category`.
mod amount;
mod category;
mod record;
mod transaction;

pub use amount::{Amount, AmountError};
pub use category::{Category, TransactionType};
pub use record::Record;
pub use transaction::{max_amount, parse_positive, Transaction, TransactionId, TIMESTAMP_FORMAT};
