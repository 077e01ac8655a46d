//! Export command - write the expense report.

use std::path::PathBuf;

use clap::Args;
use console::style;

use expensa_core::{ExpenseStore, FileStore, Report};

use super::load_config;

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Output CSV (default: the configured export file)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = FileStore::from_config(&config.storage);

    if !store.dataset_path().exists() {
        anyhow::bail!("Dataset not found at {}", store.dataset_path().display());
    }

    let report = Report::build(&store.load_records()?);
    let output_path = args.output.unwrap_or_else(|| config.storage.export_path());
    report.export(&output_path)?;

    println!(
        "{} Exported {} expenses to {}",
        style("✓").green(),
        report.rows.len(),
        output_path.display()
    );
    println!(
        "   Generated {}",
        report
            .generated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
    );

    for category in &report.categories {
        println!(
            "   {:<20} {:>4} {:>14}",
            category.category,
            category.count,
            category.total.round_dp(2)
        );
    }
    println!(
        "   {:<20} {:>4} {:>14}",
        style("Total expenses").bold(),
        report.rows.len() - report.skipped,
        report.total.round_dp(2)
    );

    if report.skipped > 0 {
        println!(
            "{} {} entries had no readable value and were left out of the totals",
            style("⚠").yellow(),
            report.skipped
        );
    }

    Ok(())
}
