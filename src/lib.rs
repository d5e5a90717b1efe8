pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{ConversionEngine, ConversionHistory};
use crate::providers::ProviderFactory;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    Rates {
        all: bool,
    },
    Refresh,
    Currencies,
    Shell,
}

/// Options shared by every command.
#[derive(Debug, Default, Clone)]
pub struct RunOptions<'a> {
    pub config_path: Option<&'a str>,
    pub offline: bool,
}

pub async fn run_command(command: AppCommand, options: RunOptions<'_>) -> Result<()> {
    info!("fxconv starting...");

    let config = match options.config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    if let AppCommand::Currencies = command {
        return cli::rates::currencies();
    }

    let factory = ProviderFactory::from_config(&config)?;
    debug!("Using rate cache at {}", factory.cache().path().display());

    let offline = options.offline || config.offline;
    let provider = factory.build(offline)?;
    let mut engine = ConversionEngine::with_history(
        provider,
        ConversionHistory::with_capacity(config.history_size),
    );

    match command {
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(&mut engine, &amount, &from, &to).await
        }
        AppCommand::Rates { all } => cli::rates::run(&engine, all).await,
        AppCommand::Refresh => cli::rates::refresh(&engine).await,
        AppCommand::Shell => cli::shell::run(&mut engine, &factory).await,
        AppCommand::Currencies => cli::rates::currencies(),
    }
}
