//! CLI application for fiscal document expense tracking.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, confirm, export, process, reset, train};

/// Expense tracker - extract and categorize expenses from fiscal documents
#[derive(Parser)]
#[command(name = "expensa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a document and predict its category
    Process(process::ProcessArgs),

    /// Process multiple documents
    Batch(batch::BatchArgs),

    /// Apply a batch of confirmed categories
    Confirm(confirm::ConfirmArgs),

    /// Train the category model
    Train(train::TrainArgs),

    /// Export the expense report
    Export(export::ExportArgs),

    /// Remove every stored expense
    Reset(reset::ResetArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Confirm(args) => confirm::run(args, config_path).await,
        Commands::Train(args) => train::run(args, config_path).await,
        Commands::Export(args) => export::run(args, config_path).await,
        Commands::Reset(args) => reset::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
