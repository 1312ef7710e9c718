//! These structs provide the CLI interface for the finance tracker, and the grammar of the lines
//! typed into its interactive shell.

use crate::model::{Category, TransactionType};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing::level_filters::LevelFilter;

/// tracker: Record income and expenses and keep an eye on your balance.
///
/// Transactions are kept in memory for the session and, when a `database_url` is configured,
/// mirrored to a remote document store so that they are there the next time you start. Without a
/// `database_url` (or when the store cannot be reached) the tracker works in local-only mode.
///
/// Run `tracker init` once to create the home directory and its config file, then `tracker` on
/// its own starts an interactive shell.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Args {
    pub fn new(common: Common, command: Option<Command>) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    /// The subcommand to run. The interactive shell is the default.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Shell)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and its config file.
    ///
    /// Without --database-url the tracker will run in local-only mode. To use a remote store,
    /// pass the base URL of a realtime database. If the database needs authentication, put the
    /// token in $FINANCE_TRACKER_HOME/.secrets/auth_token after running init.
    Init(InitArgs),
    /// Start an interactive session (the default). Type `help` inside the shell for commands.
    Shell,
    /// Record a single transaction.
    Add(AddArgs),
    /// Delete a single transaction by its row number (as shown by `list`) or by its id.
    Delete(DeleteArgs),
    /// Print all transactions as a table, followed by the summary.
    List,
    /// Print the balance, total income and total expenses.
    Summary,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the config file, secrets and backups are held. Defaults to
    /// ~/finance-tracker
    #[arg(long, env = "FINANCE_TRACKER_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `tracker init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the remote document store, e.g. https://my-ledger.firebaseio.com
    #[arg(long)]
    database_url: Option<String>,

    /// The path of the collection that holds the transactions. Defaults to "transactions".
    #[arg(long)]
    collection: Option<String>,

    /// How many seconds to wait for each request to the remote store. Defaults to 10.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl InitArgs {
    pub fn new(
        database_url: Option<String>,
        collection: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            database_url,
            collection,
            timeout_secs,
        }
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }
}

/// Args for `add`.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// Income or Expense
    #[arg(value_name = "TYPE")]
    r#type: TransactionType,

    /// One of: Salary, Freelance, Investment, "Other Income", Food, Transport, Bills,
    /// Entertainment, Shopping, Healthcare, "Other Expense"
    category: Category,

    /// A positive amount, e.g. 20, 1,250.00 or $4.50
    #[arg(allow_hyphen_values = true)]
    amount: String,

    /// An optional description. Defaults to the category name.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    description: Vec<String>,
}

impl AddArgs {
    pub fn new(
        r#type: TransactionType,
        category: Category,
        amount: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let description = description.into();
        Self {
            r#type,
            category,
            amount: amount.into(),
            description: if description.is_empty() {
                Vec::new()
            } else {
                vec![description]
            },
        }
    }

    pub fn r#type(&self) -> TransactionType {
        self.r#type
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// The description words joined by single spaces.
    pub fn description(&self) -> String {
        self.description.join(" ")
    }
}

/// Args for `delete`.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The row number shown by `list`, or the transaction's id
    #[arg(allow_hyphen_values = true)]
    target: DeleteTarget,

    /// Delete without asking for confirmation
    #[arg(long, short)]
    yes: bool,
}

impl DeleteArgs {
    pub fn new(target: DeleteTarget, yes: bool) -> Self {
        Self { target, yes }
    }

    pub fn target(&self) -> &DeleteTarget {
        &self.target
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

/// How the user refers to a transaction: a one-based row number or an id.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DeleteTarget {
    Row(usize),
    Id(String),
}

impl FromStr for DeleteTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<usize>() {
            Ok(row) => DeleteTarget::Row(row),
            Err(_) => DeleteTarget::Id(s.to_string()),
        })
    }
}

impl Display for DeleteTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteTarget::Row(row) => write!(f, "row {row}"),
            DeleteTarget::Id(id) => write!(f, "'{id}'"),
        }
    }
}

/// One line typed into the interactive shell.
#[derive(Debug, Parser, Clone)]
#[command(
    name = "shell",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

impl ShellLine {
    pub fn command(&self) -> &ShellCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShellCommand {
    /// add <type> <category> <amount> [description...]
    Add(AddArgs),
    /// delete <row|id> [--yes]
    #[command(alias = "rm")]
    Delete(DeleteArgs),
    /// Show all transactions
    #[command(alias = "ls")]
    List,
    /// Show the balance, income and expenses
    Summary,
    /// Load the transactions from the remote store again
    Reload,
    /// Show this help
    Help,
    /// Leave the shell
    #[command(alias = "exit", alias = "q")]
    Quit,
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finance-tracker"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or FINANCE_TRACKER_HOME instead of relying on the \
                default home directory. If you continue using the program right now, you may \
                have problems!",
            );
            PathBuf::from("finance-tracker")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
