//! Implements the `Store` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a remote database.

use crate::error::Res;
use crate::model::{Record, TransactionId, TransactionType};
use crate::store::Store;
use anyhow::{bail, Context};
use rust_decimal::Decimal;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// The contents of a `TestStore` and the switches used to simulate failures.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TestStoreState {
    /// The stored records in the order they were created.
    pub records: Vec<(TransactionId, Record)>,
    /// The number used for the next generated key.
    pub next_key: u64,
    /// When true, `load_all` fails as if the store were unreachable.
    pub fail_reads: bool,
    /// When true, `create` and `delete` are rejected.
    pub fail_writes: bool,
    /// When set, every call waits this long before answering.
    pub delay: Option<Duration>,
}

/// An implementation of the `Store` trait that keeps its data in memory. Clones share the same
/// state, so a test can keep a handle to inspect or manipulate what the app sees.
#[derive(Debug, Default, Clone)]
pub struct TestStore {
    state: Arc<Mutex<TestStoreState>>,
}

impl TestStore {
    /// Creates an empty `TestStore`.
    pub fn new() -> Self {
        Self::with_state(TestStoreState::default())
    }

    pub fn with_state(state: TestStoreState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Creates a `TestStore` holding the seed data from this module.
    pub fn seeded() -> Res<Self> {
        let records = load_csv(SEED_DATA)?;
        let next_key = records.len() as u64 + 1;
        Ok(Self::with_state(TestStoreState {
            records,
            next_key,
            ..TestStoreState::default()
        }))
    }

    /// Returns a copy of the current state.
    pub fn get_state(&self) -> TestStoreState {
        self.lock().clone()
    }

    /// Replaces the current state.
    pub fn set_state(&self, state: TestStoreState) {
        *self.lock() = state;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        self.lock().delay = delay;
    }

    fn lock(&self) -> MutexGuard<'_, TestStoreState> {
        // A panic while holding the lock cannot leave the state half-written, so poisoning is
        // ignored.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn wait(&self) {
        let delay = self.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait::async_trait]
impl Store for TestStore {
    async fn load_all(&self) -> Res<Vec<(TransactionId, Record)>> {
        self.wait().await;
        let state = self.lock();
        if state.fail_reads {
            bail!("The test store is unreachable");
        }
        Ok(state.records.clone())
    }

    async fn create(&self, record: &Record) -> Res<TransactionId> {
        self.wait().await;
        let mut state = self.lock();
        if state.fail_writes {
            bail!("The test store rejected the write");
        }
        let id = TransactionId::new(format!("test-{:06}", state.next_key));
        state.next_key += 1;
        state.records.push((id.clone(), record.clone()));
        Ok(id)
    }

    async fn delete(&self, id: &TransactionId) -> Res<()> {
        self.wait().await;
        let mut state = self.lock();
        if state.fail_writes {
            bail!("The test store rejected the delete");
        }
        // Deleting a missing key is not an error, same as the remote store.
        state.records.retain(|(key, _)| key != id);
        Ok(())
    }
}

/// Loads seed records from CSV data with the columns `key,timestamp,type,category,description,amount`.
fn load_csv(csv_data: &str) -> Res<Vec<(TransactionId, Record)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(csv_data.as_bytes()));

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result.context("Unable to read a seed row")?;
        let field = |ix: usize| row.get(ix).unwrap_or_default();
        let record = Record {
            timestamp: field(1).parse().context("Bad seed timestamp")?,
            r#type: TransactionType::from_str(field(2)).context("Bad seed type")?,
            category: field(3).to_string(),
            description: field(4).to_string(),
            amount: Decimal::from_str(field(5)).context("Bad seed amount")?,
        };
        records.push((TransactionId::new(field(0)), record));
    }
    Ok(records)
}

/// Seed transaction data.
const SEED_DATA: &str = r##"key,timestamp,type,category,description,amount
test-000001,1759298400000,Income,Salary,October salary,3200.00
test-000002,1759384800000,Expense,Bills,Rent,1150.00
test-000003,1759471200000,Expense,Food,Groceries,87.43
test-000004,1759557600000,Expense,Transport,Monthly bus pass,45.00
test-000005,1759644000000,Income,Freelance,Logo design,400.00
test-000006,1759730400000,Expense,Entertainment,Cinema,24.50
test-000007,1759816800000,Expense,Healthcare,,18.99
test-000008,1759903200000,Income,Investment,Dividend,12.34
"##;

impl TestStore {
    /// The total of the seed data's income rows.
    #[cfg(test)]
    pub(crate) const SEED_INCOME: &'static str = "3612.34";
    /// The total of the seed data's expense rows.
    #[cfg(test)]
    pub(crate) const SEED_EXPENSE: &'static str = "1325.92";
}
