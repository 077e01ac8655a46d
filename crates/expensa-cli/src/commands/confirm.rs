//! Confirm command - apply human-confirmed categories.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use expensa_core::models::expense::parse_confirmations;
use expensa_core::RetrainStatus;

use super::{load_config, open_service};

/// Arguments for the confirm command.
#[derive(Args)]
pub struct ConfirmArgs {
    /// JSON payload of the form {"data": [...]}
    #[arg(required = true)]
    payload: PathBuf,
}

pub async fn run(args: ConfirmArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let content = fs::read_to_string(&args.payload)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", args.payload.display(), e))?;

    // Reject bad payloads before touching the model or the dataset
    let batch = parse_confirmations(&content)
        .map_err(|e| anyhow::anyhow!("Invalid confirmation payload: {}", e))?;

    let service = open_service(&config)?;
    let outcome = service.confirm(&batch)?;

    println!(
        "{} Saved {} expenses ({} learned online), dataset now has {} entries",
        style("✓").green(),
        outcome.appended,
        outcome.learned,
        outcome.dataset_size
    );

    match outcome.retrain {
        RetrainStatus::Skipped => {
            let every = service.policy().every();
            let remaining = every - outcome.dataset_size % every;
            println!(
                "{} Next retrain in {} entries",
                style("ℹ").blue(),
                remaining
            );
        }
        RetrainStatus::Completed { trained_on } => {
            println!(
                "{} Category model retrained on {} entries",
                style("✓").green(),
                trained_on
            );
        }
        RetrainStatus::Failed(reason) => {
            eprintln!(
                "{} Retraining failed, previous model kept: {}",
                style("⚠").yellow(),
                reason
            );
        }
    }

    Ok(())
}
