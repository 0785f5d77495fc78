// src/main.rs

//! birdalert CLI
//!
//! Local execution entry point. `run` keeps polling on the configured
//! cadence; the other commands are one-shot operator tools.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use birdalert::{
    commands::{self, CommandHandler},
    error::{AppError, Result},
    models::Config,
    pipeline,
    services::{self, ConsoleDispatcher, EbirdClient, NominatimGeocoder},
    storage::{LocalStore, RegistryHandle},
};

const API_KEY_ENV: &str = "EBIRD_API_KEY";

/// birdalert - notable bird sighting notifier
#[derive(Parser, Debug)]
#[command(name = "birdalert", version, about = "Notable bird sighting notifier")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll on the configured cadence until killed
    Run,

    /// Run exactly one poll cycle and exit
    Poll,

    /// Register or move a group's watched location
    SetLocation {
        /// Group id to configure
        #[arg(long)]
        group: String,

        /// Group display name
        #[arg(long)]
        name: String,

        /// Free-text place name
        place: Vec<String>,
    },

    /// Show a group's stored configuration
    Status {
        /// Group id to inspect
        #[arg(long)]
        group: String,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Read the eBird credential from the environment.
fn api_key() -> Result<String> {
    std::env::var(API_KEY_ENV)
        .map_err(|_| AppError::config(format!("{API_KEY_ENV} environment variable not set")))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    let store = Arc::new(LocalStore::new(&config.storage_path));

    match cli.command {
        Command::Run => {
            let client = services::create_client(&config.http)?;
            let provider = EbirdClient::new(client, &config, api_key()?);
            let dispatcher = ConsoleDispatcher;
            let registry = RegistryHandle::open(store).await?;

            pipeline::run_scheduler(&registry, &provider, &dispatcher, &config.poll).await;
        }

        Command::Poll => {
            let client = services::create_client(&config.http)?;
            let provider = EbirdClient::new(client, &config, api_key()?);
            let dispatcher = ConsoleDispatcher;
            let registry = RegistryHandle::open(store).await?;

            let stats =
                pipeline::run_cycle(&registry, &provider, &dispatcher, config.poll.max_concurrent)
                    .await;
            log::info!(
                "{} groups polled, {} notified",
                stats.groups,
                stats.notified
            );
        }

        Command::SetLocation { group, name, place } => {
            let place = place.join(" ");
            let client = services::create_client(&config.http)?;
            let geocoder = Arc::new(NominatimGeocoder::new(client, &config));
            let registry = Arc::new(RegistryHandle::open(store).await?);

            let handler =
                CommandHandler::new(registry, geocoder, config.poll.default_distance_km);
            let reply = handler.set_location(&group, &name, &place).await?;
            log::info!("{reply}");
        }

        Command::Status { group } => {
            let registry = RegistryHandle::open(store).await?;
            println!("{}", commands::status_reply(registry.get(&group).await.as_ref()));
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            Config::load(&cli.config)?.validate()?;
            log::info!("All validations passed!");
        }
    }

    Ok(())
}
