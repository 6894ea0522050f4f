//! Go Marketplace CLI - inspect and edit a persisted cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart list
//!
//! # Add a product
//! gm-cart add --id 1 --title "Cadeira Rivatti" --image-url https://example.com/1.png --price 1800
//!
//! # Change quantities
//! gm-cart increment 1
//! gm-cart decrement 1
//!
//! # Use another cart file
//! gm-cart --storage-dir /tmp/carts --key @Test:cart list --json
//! ```
//!
//! # Commands
//!
//! - `list` - Print the cart
//! - `add` - Add a product (or increment it if already present)
//! - `increment` / `decrement` - Change a product's quantity by one
//! - `clear` - Empty the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use go_marketplace_cart::{CartStore, FileStore};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::cart::{AddArgs, OutputMode};
use config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "gm-cart")]
#[command(author, version, about = "Go Marketplace cart tools")]
struct Cli {
    /// Directory holding the cart files (overrides `CART_STORAGE_DIR`)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Storage key of the cart (overrides `CART_STORAGE_KEY`)
    #[arg(long, global = true)]
    key: Option<String>,

    /// Print the cart as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    List,
    /// Add a product to the cart
    Add(AddCommand),
    /// Increase a product's quantity by one
    Increment {
        /// Product id
        id: String,
    },
    /// Decrease a product's quantity by one, removing it at zero
    Decrement {
        /// Product id
        id: String,
    },
    /// Remove every product from the cart
    Clear,
}

#[derive(Args)]
struct AddCommand {
    /// Product id
    #[arg(long)]
    id: String,

    /// Product title
    #[arg(long)]
    title: String,

    /// Product image URL
    #[arg(long)]
    image_url: String,

    /// Unit price (e.g. 18.50)
    #[arg(long)]
    price: String,
}

impl From<AddCommand> for AddArgs {
    fn from(cmd: AddCommand) -> Self {
        Self {
            id: cmd.id,
            title: cmd.title,
            image_url: cmd.image_url,
            price: cmd.price,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CliConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing. Logs go to stderr so stdout carries only the cart.
fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "go_marketplace_cart=info,go_marketplace_cli=info".into());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter));

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config.with_overrides(cli.storage_dir.clone(), cli.key.clone()),
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber. Dropping the
    // guard when main returns flushes any queued events.
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    report(run(cli, &config).await)
}

/// Log a failed command and turn the outcome into the process exit code.
fn report(result: Result<(), Box<dyn std::error::Error>>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Arc::new(FileStore::new(&config.storage_dir));
    let store = CartStore::open(storage, config.storage_key.clone()).await?;
    tracing::debug!(
        storage_dir = %config.storage_dir.display(),
        key = %config.storage_key,
        "Cart opened"
    );

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let output = match cli.command {
        Commands::List => commands::cart::list(&store, mode).await?,
        Commands::Add(cmd) => commands::cart::add(&store, cmd.into(), mode).await?,
        Commands::Increment { id } => commands::cart::increment(&store, &id, mode).await?,
        Commands::Decrement { id } => commands::cart::decrement(&store, &id, mode).await?,
        Commands::Clear => commands::cart::clear(&store, mode).await?,
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_sentry_layer<F: FnOnce()>(f: F) {
        let subscriber = tracing_subscriber::registry()
            .with(sentry_tracing::layer().event_filter(sentry_event_filter));
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn test_failed_command_is_reported_to_sentry() {
        let mut code = ExitCode::SUCCESS;
        let events = sentry::test::with_captured_events(|| {
            with_sentry_layer(|| {
                code = report(Err("product A has not been added to the cart yet".into()));
            });
        });

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(events.len(), 1);
        assert!(events.iter().all(|e| e.level == sentry::Level::Error));
    }

    #[test]
    fn test_successful_command_reports_nothing() {
        let mut code = ExitCode::FAILURE;
        let events = sentry::test::with_captured_events(|| {
            with_sentry_layer(|| code = report(Ok(())));
        });

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(events.is_empty());
    }
}
