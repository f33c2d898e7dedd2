use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand};
use realfolio::cli::analyze::OutputFormat;
use realfolio::core::log::init_logging;
use realfolio::engine::AnalysisRequest;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Analyze real (inflation-adjusted) returns across currencies
    Analyze(AnalyzeArgs),
    /// Inspect or clear the data cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show cached keys and their freshness
    Status,
    /// Delete all cached entries
    Clear,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: NaiveDate,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end_date: NaiveDate,

    /// Portfolio value at start, in base currency
    #[arg(long)]
    start_value: f64,

    /// Portfolio value at end, in base currency
    #[arg(long)]
    end_value: f64,

    /// Base currency of portfolio values (default from config)
    #[arg(long)]
    base_currency: Option<String>,

    /// Comma-separated target currencies (default from config)
    #[arg(long)]
    currencies: Option<String>,

    /// Include nominal CAGR in output
    #[arg(long)]
    cagr: bool,

    /// Force refresh of cached CPI data
    #[arg(long)]
    refresh_cache: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Analyze(args)) => {
            let command = build_analyze_command(args, cli.config_path.as_deref())?;
            realfolio::run_command(command, cli.config_path.as_deref()).await
        }
        Some(Commands::Cache { command }) => {
            let command = match command {
                CacheCommands::Status => realfolio::AppCommand::CacheStatus,
                CacheCommands::Clear => realfolio::AppCommand::CacheClear,
            };
            realfolio::run_command(command, cli.config_path.as_deref()).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    result
}

fn build_analyze_command(
    args: AnalyzeArgs,
    config_path: Option<&str>,
) -> Result<realfolio::AppCommand> {
    let config = match config_path {
        Some(path) => realfolio::config::AppConfig::load_from_path(path)?,
        None => realfolio::config::AppConfig::load()?,
    };

    let base_currency = args
        .base_currency
        .unwrap_or_else(|| config.base_currency.clone())
        .trim()
        .to_uppercase();

    let currencies: Vec<String> = match &args.currencies {
        Some(raw) => raw
            .split(',')
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect(),
        None => config.currencies.clone(),
    };

    Ok(realfolio::AppCommand::Analyze {
        request: AnalysisRequest {
            start_date: args.start_date,
            end_date: args.end_date,
            start_value: args.start_value,
            end_value: args.end_value,
            base_currency,
            currencies,
            include_nominal_cagr: args.cagr,
        },
        output: args.output,
        refresh_cache: args.refresh_cache,
    })
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = realfolio::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
providers:
  fred:
    base_url: "https://api.stlouisfed.org"
    # api_key: "your-fred-api-key"
  eurostat:
    base_url: "https://ec.europa.eu"
  frankfurter:
    base_url: "https://api.frankfurter.dev"

base_currency: "USD"
currencies: ["USD", "EUR", "GBP", "CHF"]
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    println!("Created default configuration at {}", path.display());
    Ok(())
}
