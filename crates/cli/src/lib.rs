pub mod commands;
pub mod loader;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use lanewise_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "lanewise",
    about = "Acceptance analytics and discount optimization for logistics quotes",
    after_help = "Examples:\n  lanewise summary --data quotes.csv\n  lanewise analyze --data quotes.csv --dimension customer --key CUST001\n  lanewise optimize --data quotes.csv --customer CUST001 --lane \"USA-LAX to Germany-HAM\" --shipment-type air --commodity general"
)]
pub struct Cli {
    /// Path to a lanewise.toml config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
pub struct DataArgs {
    /// CSV file with historical quote records.
    #[arg(long)]
    pub data: PathBuf,
}

/// The fixed quote context a prediction or suggestion is made for.
#[derive(Debug, Args)]
pub struct ContextArgs {
    #[arg(long)]
    pub customer: String,
    /// Lane as `usa_lax-germany_ham` or `USA-LAX to Germany-HAM`.
    #[arg(long)]
    pub lane: String,
    #[arg(long)]
    pub shipment_type: String,
    #[arg(long)]
    pub commodity: String,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// Sweep lower bound; defaults to the configured value.
    #[arg(long)]
    pub low: Option<f64>,
    /// Sweep upper bound; defaults to the configured value.
    #[arg(long)]
    pub high: Option<f64>,
    /// Sweep step; defaults to the configured value.
    #[arg(long)]
    pub step: Option<f64>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Summarize a quote dataset (volumes, rates, discount spread)")]
    Summary {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Aggregate acceptance stats for one dimension, or one key of it")]
    Analyze {
        #[command(flatten)]
        data: DataArgs,
        /// customer | lane | shipment_type | commodity
        #[arg(long)]
        dimension: String,
        /// Key to aggregate; omit for one stat per key.
        #[arg(long)]
        key: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Emit the full analysis report as JSON")]
    Report {
        #[command(flatten)]
        data: DataArgs,
    },
    #[command(about = "Sweep a discount range with the history predictor and pick the optimum")]
    Optimize {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        context: ContextArgs,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Suggest a discount from accepted history alone, without a sweep")]
    Suggest {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        context: ContextArgs,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the historical context block an external oracle would receive")]
    Context {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        context: ContextArgs,
    },
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: ConfigOverrides { log_level: cli.log_level.clone(), ..ConfigOverrides::default() },
    }) {
        Ok(config) => config,
        Err(error) => {
            let result = commands::CommandResult::failure("config", "config_validation", error.to_string());
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };

    init_logging(&config);

    let result = match cli.command {
        Command::Summary { data, json } => commands::summary::run(&config, &data, json),
        Command::Analyze { data, dimension, key, json } => {
            commands::analyze::run(&config, &data, &dimension, key.as_deref(), json)
        }
        Command::Report { data } => commands::report::run(&config, &data),
        Command::Optimize { data, context, range, json } => {
            commands::optimize::run(&config, &data, &context, &range, json).await
        }
        Command::Suggest { data, context, json } => {
            commands::suggest::run(&config, &data, &context, json)
        }
        Command::Context { data, context } => commands::context::run(&config, &data, &context),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
