use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;
use serde_json::Value as JsonValue;

use std::path::{Path, PathBuf};

use crate::config::{self, Config, ExchangeSettings};
use crate::error::Error;
use crate::pipeline::{self, RunOptions, TableReport};
use crate::rates::{CoinbaseClient, FixedRate, RateProvider};

use super::output::{self, OutputMode};
use super::CliError;

#[derive(Parser)]
#[command(name = "permcalc")]
#[command(about = "Generate and price every combination of a property table")]
#[command(version)]
pub struct Cli {
    /// Path to config file (overrides PERMCALC_CONFIG env var and default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (auto-enabled when stdout is piped)
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Force text output even when stdout is piped
    #[arg(long, global = true, conflicts_with = "json")]
    pub no_json: bool,

    /// Suppress all output on success (errors still go to stderr)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log pipeline details (debug level) to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate all combinations, price them and write the result workbook
    Run {
        /// Source workbook (defaults to workbook.path)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Result workbook (defaults to rewriting the input in place)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory that receives a copy of the result (defaults to output.results_dir)
        #[arg(long, conflicts_with = "no_copy")]
        results_dir: Option<PathBuf>,

        /// Do not copy the result anywhere
        #[arg(long)]
        no_copy: bool,

        /// Use this exchange rate instead of fetching one
        #[arg(long)]
        rate: Option<f64>,

        /// Source currency (defaults to exchange.from)
        #[arg(long)]
        from: Option<String>,

        /// Target currency (defaults to exchange.to)
        #[arg(long)]
        to: Option<String>,

        /// Price as of this date (YYYY-MM-DD) instead of today
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,
    },

    /// Print combinations without writing anything
    Preview {
        /// Source workbook (defaults to workbook.path)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Use this exchange rate instead of fetching one
        #[arg(long)]
        rate: Option<f64>,

        /// Price as of this date (YYYY-MM-DD) instead of today
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,

        /// Show at most this many combinations
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Validate the property table and report its shape
    Check {
        /// Source workbook (defaults to workbook.path)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Fetch and print the current exchange rate
    Rate {
        /// Source currency (defaults to exchange.from)
        #[arg(long)]
        from: Option<String>,

        /// Target currency (defaults to exchange.to)
        #[arg(long)]
        to: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show config file path
    Path,
    /// Set a configuration value
    Set {
        /// Dotted key, e.g. exchange.to
        key: String,
        value: String,
    },
    /// Reset configuration to defaults
    Reset,
    /// Verify configuration file for errors
    Verify,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {} (use YYYY-MM-DD)", s, e))
}

#[derive(Serialize)]
struct RateData {
    from: String,
    to: String,
    rate: f64,
}

#[derive(Serialize)]
struct PreviewData {
    columns: Vec<String>,
    /// total number of combinations the table generates
    total: Option<usize>,
    combinations: Vec<JsonValue>,
}

#[derive(Serialize)]
struct VerifyData {
    path: PathBuf,
    valid: bool,
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    config::load_with_override(config_path).map_err(|e| CliError::Config(e).into())
}

/// apply command-line currency overrides and reject an unusable config
fn prepare_config(
    mut config: Config,
    from: Option<String>,
    to: Option<String>,
) -> Result<Config> {
    if let Some(from) = from {
        config.exchange.from = from.trim().to_ascii_uppercase();
    }
    if let Some(to) = to {
        config.exchange.to = to.trim().to_ascii_uppercase();
    }

    let problems = config::validate(&config);
    if !problems.is_empty() {
        return Err(CliError::Config(anyhow::anyhow!(
            "invalid configuration: {}",
            problems.join("; ")
        ))
        .into());
    }

    Ok(config)
}

fn check_rate(rate: Option<f64>) -> Result<()> {
    if let Some(r) = rate {
        if !(r.is_finite() && r > 0.0) {
            return Err(CliError::InvalidArgs(format!(
                "--rate must be a positive number, got {}",
                r
            ))
            .into());
        }
    }
    Ok(())
}

/// a fixed rate when one was given, the live API otherwise
fn rate_provider(
    rate: Option<f64>,
    exchange: &ExchangeSettings,
) -> Result<Box<dyn RateProvider>, Error> {
    let provider: Box<dyn RateProvider> = match rate {
        Some(r) => Box::new(FixedRate(r)),
        None => Box::new(CoinbaseClient::from_settings(exchange)?),
    };
    Ok(provider)
}

fn input_path(input: Option<PathBuf>, config: &Config) -> PathBuf {
    input.unwrap_or_else(|| config::expand_path(&config.workbook.path))
}

pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let output_mode = OutputMode::from_flags(cli.json, cli.no_json, cli.quiet);

    match cli.command {
        Commands::Run {
            input,
            output,
            results_dir,
            no_copy,
            rate,
            from,
            to,
            today,
        } => {
            check_rate(rate)?;
            let config = prepare_config(load_config(config_path)?, from, to)?;

            let mut options =
                RunOptions::from_config(&config, today.unwrap_or_else(pipeline::today));
            options.input = input_path(input, &config);
            options.output = output.unwrap_or_else(|| options.input.clone());
            if no_copy {
                options.results_dir = None;
            } else if let Some(dir) = results_dir {
                options.results_dir = Some(dir);
            }

            let provider = rate_provider(rate, &config.exchange)?;
            let summary = pipeline::run(&options, provider.as_ref())?;

            match output_mode {
                OutputMode::Json => output::print_json(&summary),
                OutputMode::Text => {
                    println!(
                        "Wrote {} combinations to {} (sheet '{}')",
                        summary.combinations,
                        summary.output.display(),
                        options.result_sheet
                    );
                    println!(
                        "Rate: 1 {} = {} {}",
                        summary.from, summary.rate, summary.to
                    );
                    if let Some(copied) = &summary.copied_to {
                        println!("Copied to {}", copied.display());
                    }
                }
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Preview {
            input,
            rate,
            today,
            limit,
        } => {
            check_rate(rate)?;
            let config = prepare_config(load_config(config_path)?, None, None)?;
            let input = input_path(input, &config);

            let (_, table) =
                pipeline::load_table(&input, &config.workbook.source_sheet, &config.fields)?;
            if table.is_empty() {
                return Err(Error::NoData.into());
            }

            let provider = rate_provider(rate, &config.exchange)?;
            let rate = provider
                .rate(&config.exchange.from, &config.exchange.to)
                .map_err(Error::from)?;

            let today = today.unwrap_or_else(pipeline::today);
            let combinations =
                pipeline::preview(&table, rate, today, &config.fields, Some(limit))
                    .map_err(Error::from)?;
            let columns = table.columns();

            match output_mode {
                OutputMode::Json => output::print_json(&PreviewData {
                    columns,
                    total: table.combination_count(),
                    combinations: combinations.iter().map(|c| c.to_json()).collect(),
                }),
                OutputMode::Text => {
                    print!("{}", output::format_table(&columns, &combinations));
                    if let Some(total) = table.combination_count() {
                        if total > combinations.len() {
                            println!("... {} of {} combinations shown", combinations.len(), total);
                        }
                    }
                }
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Check { input } => {
            let config = load_config(config_path)?;
            let input = input_path(input, &config);

            let (_, table) =
                pipeline::load_table(&input, &config.workbook.source_sheet, &config.fields)?;
            if table.is_empty() {
                return Err(Error::NoData.into());
            }

            let report = TableReport::new(&table, config.settings.fuzzy_threshold);

            match output_mode {
                OutputMode::Json => output::print_json(&report),
                OutputMode::Text => print_report(&report),
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Rate { from, to } => {
            let config = prepare_config(load_config(config_path)?, from, to)?;
            let exchange = &config.exchange;

            let client = CoinbaseClient::from_settings(exchange).map_err(Error::from)?;
            let rate = client
                .rate(&exchange.from, &exchange.to)
                .map_err(Error::from)?;

            match output_mode {
                OutputMode::Json => output::print_json(&RateData {
                    from: exchange.from.clone(),
                    to: exchange.to.clone(),
                    rate,
                }),
                OutputMode::Text => println!("1 {} = {} {}", exchange.from, rate, exchange.to),
                OutputMode::Quiet => {}
            }
            Ok(())
        }

        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = load_config(config_path)?;
                if output_mode.is_json() {
                    output::print_json(&config);
                } else {
                    let json = serde_json::to_string_pretty(&config)
                        .context("Failed to serialize config")?;
                    println!("{}", json);
                }
                Ok(())
            }
            ConfigCommands::Path => {
                let path = config::get_config_path_with_override(config_path)
                    .map_err(CliError::Config)?;
                println!("{}", path.display());
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                let mut config = load_config(config_path)?;
                config::set_value(&mut config, &key, &value).map_err(CliError::Config)?;
                config::save_with_override(&config, config_path).map_err(CliError::Config)?;
                if !output_mode.is_quiet() {
                    println!("Set {} = {}", key, value);
                }
                Ok(())
            }
            ConfigCommands::Reset => {
                let config = Config::default();
                config::save_with_override(&config, config_path).map_err(CliError::Config)?;
                if !output_mode.is_quiet() {
                    println!("Configuration reset to defaults");
                }
                Ok(())
            }
            ConfigCommands::Verify => {
                let path = config::get_config_path_with_override(config_path)
                    .map_err(CliError::Config)?;
                let errors = config::verify(&path).map_err(CliError::Config)?;
                let valid = errors.is_empty();

                if !valid {
                    if !output_mode.is_json() {
                        println!(
                            "✗ Configuration has {} error(s): {}",
                            errors.len(),
                            path.display()
                        );
                        println!();
                        for error in &errors {
                            println!("  - {}", error);
                        }
                    }
                    return Err(CliError::Config(anyhow::anyhow!(
                        "configuration has {} error(s): {}",
                        errors.len(),
                        errors.join("; ")
                    ))
                    .into());
                }

                match output_mode {
                    OutputMode::Json => output::print_json(&VerifyData { path, valid }),
                    OutputMode::Text => {
                        println!("✓ Configuration is valid: {}", path.display())
                    }
                    OutputMode::Quiet => {}
                }
                Ok(())
            }
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "permcalc", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn print_report(report: &TableReport) {
    let width = report
        .properties
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);

    println!("Properties ({}):", report.properties.len());
    for property in &report.properties {
        let values = if property.values == 1 {
            "1 value".to_string()
        } else {
            format!("{} values", property.values)
        };
        match &property.condition {
            Some(condition) => println!(
                "  {:<width$}  {:<10}  null if: {}",
                property.name,
                values,
                condition,
                width = width
            ),
            None => println!("  {:<width$}  {}", property.name, values, width = width),
        }
    }

    match report.combinations {
        Some(n) => println!("Combinations: {}", n),
        None => println!("Combinations: too many to count"),
    }

    if !report.unknown_references.is_empty() {
        println!();
        println!("Unknown references (these conditions never null anything):");
        for unknown in &report.unknown_references {
            match &unknown.suggestion {
                Some(s) => println!(
                    "  {}: '{}' (did you mean '{}'?)",
                    unknown.target, unknown.field, s
                ),
                None => println!("  {}: '{}'", unknown.target, unknown.field),
            }
        }
    }
}
