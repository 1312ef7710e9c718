use crate::args::InitArgs;
use crate::commands::Out;
use crate::Config;
use crate::Result;
use std::path::Path;

/// Creates the home directory, its subdirectories and an initial `config.json`.
///
/// # Arguments
/// - `home` - The directory that will be the home directory, e.g. `$HOME/finance-tracker`
/// - `args` - The remote store settings. Without a database URL the tracker is local-only.
///
/// # Errors
/// - `Config` if the settings are invalid.
/// - `Io` if any file operations fail.
pub async fn init(home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(
        home,
        args.database_url(),
        args.collection(),
        args.timeout_secs(),
    )
    .await?;
    let mode = match config.database_url() {
        Some(url) => format!("Transactions will be saved to '{url}'"),
        None => "No database URL was given, so the tracker will run in local-only mode".to_string(),
    };
    Ok(format!(
        "Created the finance tracker home directory at '{}'. {mode}.",
        config.root().display()
    )
    .into())
}
