use clap::Parser;
use finance_tracker::args::{Args, Command};
use finance_tracker::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // This allows for running the program without a remote database. When
    // FINANCE_TRACKER_IN_TEST_MODE is set and non-zero in length, then the mode will be
    // Mode::Testing, otherwise it will be Mode::Remote.
    let mode = Mode::from_env();

    let command = args.command();
    if let Command::Init(init_args) = &command {
        commands::init(home, init_args).await?.print();
        return Ok(());
    }

    let config = Config::load(home).await?;
    let mut tracker = commands::open(&config, mode).await?;
    if !tracker.status().is_connected() && config.database_url().is_some() {
        warn!("{}", tracker.status());
    }

    let _: () = match command {
        Command::Init(_) => {}
        Command::Shell => commands::shell(&mut tracker).await?,
        Command::Add(add_args) => commands::add(&mut tracker, &add_args).await?.print(),
        Command::Delete(delete_args) => commands::delete_prompted(&mut tracker, &delete_args)
            .await?
            .print(),
        Command::List => commands::list(&tracker).print(),
        Command::Summary => commands::summary(&tracker).print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(default_directives(level))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The library logs under its own crate name, which differs from the binary's.
const LIB_TARGET: &str = "finance_tracker";

/// Filter directives that enable `level` for both the binary and the library.
fn default_directives(level: LevelFilter) -> String {
    format!("{LIB_TARGET}={level},{}={level}", env!("CARGO_CRATE_NAME"))
}
