use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::Runtime;

#[derive(Parser)]
#[command(name = "forecast-timeline")]
#[command(about = "Staffing timelines for sales opportunities")]
#[command(version)]
struct Cli {
    /// SQLite database path (default: ~/.local/share/forecast/forecast.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file path (default: ~/.config/forecast/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load opportunities, category tables and effort templates from a JSON snapshot
    Import {
        /// Path to the snapshot file
        #[arg(long)]
        file: PathBuf,
    },

    /// Generate (or regenerate) the resource timeline for an opportunity
    Generate {
        /// Opportunity id
        #[arg(long)]
        opportunity: String,

        /// Discard manual edits on the stored timeline
        #[arg(long, default_value = "false")]
        confirm_overwrite: bool,
    },

    /// Report whether the stored timeline has manual edits
    HasEdits {
        /// Opportunity id
        #[arg(long)]
        opportunity: String,
    },

    /// Edit one stage of one service line and cascade the change
    Recalc {
        /// Opportunity id
        #[arg(long)]
        opportunity: String,

        /// Service line
        #[arg(long)]
        service_line: String,

        /// Stage code (e.g., "4A")
        #[arg(long)]
        stage: String,

        /// New duration in weeks
        #[arg(long)]
        duration: Option<f64>,

        /// New FTE requirement
        #[arg(long)]
        fte: Option<f64>,

        /// New review status (predicted, forecast, planned)
        #[arg(long)]
        status: Option<String>,
    },

    /// Set the review status of every entry at once
    BulkStatus {
        /// Opportunity id
        #[arg(long)]
        opportunity: String,

        /// Review status (predicted, forecast, planned)
        #[arg(long)]
        status: String,

        /// Limit the change to one service line
        #[arg(long)]
        service_line: Option<String>,
    },

    /// Display the stored timeline
    Show {
        /// Opportunity id
        #[arg(long)]
        opportunity: String,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Classify a contract value against the configured category tables
    Categorize {
        /// Contract value
        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        /// Use this service line's table instead of the overall one
        #[arg(long)]
        service_line: Option<String>,
    },

    /// Configuration subcommands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as JSON
    Show,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(commands::exit_code(&e))
        }
    }
}

fn run() -> anyhow::Result<u8> {
    let cli = Cli::parse();
    let rt = Runtime::load(cli.config.as_deref(), cli.db)?;

    match cli.command {
        Commands::Import { file } => commands::import::run(&rt, &file),

        Commands::Generate {
            opportunity,
            confirm_overwrite,
        } => commands::generate::run(&rt, &opportunity, confirm_overwrite),

        Commands::HasEdits { opportunity } => commands::has_edits::run(&rt, &opportunity),

        Commands::Recalc {
            opportunity,
            service_line,
            stage,
            duration,
            fte,
            status,
        } => commands::recalc::run(
            &rt,
            &opportunity,
            &service_line,
            &stage,
            duration,
            fte,
            status.as_deref(),
        ),

        Commands::BulkStatus {
            opportunity,
            status,
            service_line,
        } => commands::bulk_status::run(&rt, &opportunity, &status, service_line.as_deref()),

        Commands::Show {
            opportunity,
            format,
        } => commands::show::run(&rt, &opportunity, format == OutputFormat::Json),

        Commands::Categorize {
            value,
            service_line,
        } => commands::categorize::run(&rt, value, service_line.as_deref()),

        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config::show(&rt),
        },
    }
}
