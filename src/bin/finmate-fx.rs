//! finmate-fx CLI - exchange rates and currency display from the terminal
//!
//! ## Example Usage
//!
//! ```bash
//! # Show the current rate table and where it came from
//! finmate-fx rates
//!
//! # Convert an amount
//! finmate-fx convert 250000 VND EUR
//!
//! # Convert into the preferred currency
//! finmate-fx convert 19.99 USD
//!
//! # Format an amount
//! finmate-fx format 1234.5 USD
//!
//! # Read or change the preferred currency
//! finmate-fx currency get
//! finmate-fx currency set JPY
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use finmate_fx::prelude::*;
use std::path::PathBuf;
use std::process;

/// finmate-fx: exchange rates and currency formatting for FinMate
#[derive(Parser)]
#[command(name = "finmate-fx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Exchange rates and currency formatting for FinMate", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Skip the network and use the built-in default rates
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current USD-based rate table
    Rates,

    /// Convert an amount between currencies
    Convert {
        /// Amount to convert
        #[arg(value_name = "AMOUNT", allow_negative_numbers = true)]
        amount: f64,

        /// Source currency (VND, USD, EUR, JPY)
        #[arg(value_name = "FROM")]
        from: String,

        /// Target currency (defaults to the preferred currency)
        #[arg(value_name = "TO")]
        to: Option<String>,
    },

    /// Format an amount for display
    Format {
        #[arg(value_name = "AMOUNT", allow_negative_numbers = true)]
        amount: f64,

        /// Currency (defaults to the preferred currency)
        #[arg(value_name = "CURRENCY")]
        currency: Option<String>,
    },

    /// Read or change the preferred currency
    Currency {
        #[command(subcommand)]
        action: CurrencyAction,
    },
}

#[derive(Subcommand)]
enum CurrencyAction {
    /// Show the preferred currency
    Get,

    /// Set the preferred currency
    Set {
        #[arg(value_name = "CODE")]
        code: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = dispatch(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = FxConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if cli.verbose {
        println!(
            "{} v{}",
            "finmate-fx".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Preferences: {}",
            config.preference_path.display().to_string().dimmed()
        );
    }

    if cli.offline {
        let service = CurrencyService::new(
            StaticRateSource::unavailable(),
            StaticRateSource::unavailable(),
            Box::new(JsonFilePreferenceStore::new(&config.preference_path)),
        )
        .with_ttl(config.cache_ttl());
        run(&service, cli.command).await
    } else {
        let service = config
            .build_service()
            .context("Failed to set up rate sources")?;
        run(&service, cli.command).await
    }
}

async fn run<P: RateSource, F: RateSource>(
    service: &CurrencyService<P, F>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Rates => show_rates(service).await,
        Commands::Convert { amount, from, to } => {
            let from: Currency = from.parse()?;
            let to = match to {
                Some(code) => code.parse()?,
                None => service.get_preferred_currency(),
            };
            let result = service.convert(amount, from, to).await;
            let rendered = format_conversion(&result, to);
            println!(
                "{} = {}",
                format_currency(amount, from),
                if result.is_ok() {
                    rendered.green().bold()
                } else {
                    rendered.yellow()
                }
            );
            Ok(())
        }
        Commands::Format { amount, currency } => {
            let currency = match currency {
                Some(code) => code.parse()?,
                None => service.get_preferred_currency(),
            };
            println!("{}", service.format_currency(amount, currency));
            Ok(())
        }
        Commands::Currency { action } => {
            match action {
                CurrencyAction::Get => {
                    let currency = service.get_preferred_currency();
                    println!("{} {}", currency.symbol(), currency.code().bold());
                }
                CurrencyAction::Set { code } => {
                    let currency = service
                        .set_preferred_currency(&code)
                        .with_context(|| format!("Cannot use {:?} as preferred currency", code))?;
                    println!(
                        "{} Preferred currency set to {} {}",
                        "✓".green(),
                        currency.symbol(),
                        currency.code().bold()
                    );
                }
            }
            Ok(())
        }
    }
}

async fn show_rates<P: RateSource, F: RateSource>(service: &CurrencyService<P, F>) -> Result<()> {
    let table = service.get_rates().await;
    let origin = service
        .cached_origin()
        .map(|o| o.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("{}", "Rates per 1 USD".cyan().bold());
    println!("{}", "=".repeat(32));
    for currency in Currency::ALL {
        match table.get(currency) {
            Some(rate) => println!("  {:<4} {:>20.6}", currency.code(), rate),
            None => println!("  {:<4} {:>20}", currency.code(), "missing".yellow()),
        }
    }
    println!("{}", "=".repeat(32));
    println!("Source: {}", origin.dimmed());
    if let Some(fetched_at) = service.cached_at() {
        println!(
            "Fetched: {}",
            fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
        );
    }
    Ok(())
}
