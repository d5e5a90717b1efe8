use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Use cached or built-in rates without contacting the rate service
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Convert { amount, from, to } => {
                fxconv::AppCommand::Convert { amount, from, to }
            }
            Commands::Rates { all } => fxconv::AppCommand::Rates { all },
            Commands::Refresh => fxconv::AppCommand::Refresh,
            Commands::Currencies => fxconv::AppCommand::Currencies,
            Commands::Shell => fxconv::AppCommand::Shell,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Currency code to convert from, e.g. USD
        from: String,
        /// Currency code to convert to, e.g. EUR
        to: String,
    },
    /// Display the current exchange rate table
    Rates {
        /// Include currencies that cannot be converted
        #[arg(short, long)]
        all: bool,
    },
    /// Fetch the latest rates and update the cache
    Refresh,
    /// List supported currencies
    Currencies,
    /// Start an interactive conversion session
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let options = fxconv::RunOptions {
        config_path: cli.config_path.as_deref(),
        offline: cli.offline,
    };
    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(cmd) => fxconv::run_command(cmd.into(), options).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
