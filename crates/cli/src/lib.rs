pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use margin_core::config::{AppConfig, LoadOptions, LogFormat};
use margin_core::domain::listing::FulfillmentMode;
use margin_core::pricing::distribution::ProfitabilityBand;

use crate::commands::reprice::RepriceSource;

#[derive(Debug, Parser)]
#[command(
    name = "margin",
    about = "Margin unit-economics operator CLI",
    long_about = "Operate the unit-economics engine: migrations, demo seeding, cost and \
                  profitability batch runs, repricing, and quarantine review.",
    after_help = "Examples:\n  margin migrate\n  margin recalc-costs\n  margin reprice --target-profitability 15\n  margin quarantine --threshold 25"
)]
pub struct Cli {
    /// Path to margin.toml (defaults to ./margin.toml or ./config/margin.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog (idempotent)")]
    Seed,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, database connectivity, and schema presence")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Recompute the receipt cost basis for every product (FIFO + bundles)")]
    RecalcCosts,
    #[command(about = "Recompute profit and profitability from current listing prices")]
    RecalcProfitability {
        #[arg(long, help = "Fulfillment mode to rate against (default from config)")]
        mode: Option<FulfillmentMode>,
        #[arg(long, help = "Also list the listings falling into this profitability band")]
        band: Option<ProfitabilityBand>,
    },
    #[command(about = "Recompute listing prices from a profitability floor or campaign prices")]
    Reprice {
        #[arg(
            long,
            conflicts_with = "campaign",
            required_unless_present = "campaign",
            help = "Target profitability percent used as a floor"
        )]
        target_profitability: Option<Decimal>,
        #[arg(long, help = "Apply stored campaign prices instead of a profitability target")]
        campaign: bool,
        #[arg(long, help = "Fulfillment mode to rate against (default from config)")]
        mode: Option<FulfillmentMode>,
    },
    #[command(about = "Report listings whose price deviates too far from the reference price")]
    Quarantine {
        #[arg(long, help = "Deviation threshold percent (default from config)")]
        threshold: Option<Decimal>,
    },
}

fn init_logging(options: &LoadOptions) {
    use tracing::Level;

    // Logging must come up before the command re-loads and reports config
    // problems, so a broken config falls back to defaults here.
    let (level, format) = match AppConfig::load(options.clone()) {
        Ok(config) => (
            config.logging.level.parse::<Level>().unwrap_or(Level::INFO),
            config.logging.format,
        ),
        Err(_) => (Level::INFO, LogFormat::Compact),
    };

    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(level);
    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // A second init (e.g. in tests) is fine; the first subscriber wins.
    let _ = result;
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config.clone(), ..LoadOptions::default() };
    init_logging(&options);

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(options),
        Command::Seed => commands::seed::run(options),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(options) }
        }
        Command::Doctor { json } => commands::CommandResult {
            exit_code: 0,
            output: commands::doctor::run(options, json),
        },
        Command::RecalcCosts => commands::recalc_costs::run(options),
        Command::RecalcProfitability { mode, band } => {
            commands::recalc_profitability::run(options, mode, band)
        }
        Command::Reprice { target_profitability, campaign, mode } => {
            let source = if campaign {
                RepriceSource::Campaigns
            } else {
                // clap guarantees the target is present when --campaign is not.
                RepriceSource::TargetProfitability(target_profitability.unwrap_or_default())
            };
            commands::reprice::run(options, mode, source)
        }
        Command::Quarantine { threshold } => commands::quarantine::run(options, threshold),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
