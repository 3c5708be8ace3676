//! Slicer CLI
//!
//! Loads a fixture set, prices its basket and prints a receipt.

use std::{io, path::PathBuf, process::ExitCode};

use clap::{Args, Parser};
use slicer::{
    fixtures::{Fixture, FixtureError},
    receipt::{Receipt, ReceiptError},
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Registry,
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

#[derive(Debug, Parser)]
#[command(name = "slicer", about = "Price a basket of cheese", long_about = None)]
struct Cli {
    /// Fixture directory
    #[arg(long, env = "SLICER_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Fixture set providing the catalogue and offers
    #[arg(long, default_value = "cheeses")]
    set: String,

    /// Basket fixture; defaults to the set's own basket
    #[arg(long)]
    basket: Option<String>,

    #[command(flatten)]
    logging: LoggingConfig,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to initialise logging: {0}")]
    Logging(#[from] TryInitError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_subscriber(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, must use eprintln"
        )]
        {
            eprintln!("{err}");
        }

        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            #[expect(clippy::print_stderr, reason = "error output to user")]
            {
                eprintln!("slicer: {err}");
            }

            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let basket_name = cli.basket.as_deref().unwrap_or(&cli.set);
    let mut fixture = Fixture::with_base_path(&cli.fixtures);

    fixture
        .load_catalogue(&cli.set)?
        .load_basket(basket_name)?
        .load_offers(&cli.set)?;

    info!(set = %cli.set, basket = %basket_name, "loaded fixtures");

    let (calculator, basket) = fixture.into_parts()?;
    let receipt = Receipt::new(&calculator, &basket)?;

    receipt.write_to(io::stdout().lock())?;

    Ok(())
}

fn init_subscriber(config: &LoggingConfig) -> Result<(), CliError> {
    match config.log_format {
        LogFormat::Compact => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_writer(io::stderr),
        ),
        LogFormat::Json => init_with_layer(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_writer(io::stderr),
        ),
    }
}

fn init_with_layer<L>(config: &LoggingConfig, fmt_layer: L) -> Result<(), CliError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_err| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()?;

    Ok(())
}
