//! Train command - initial or forced training of the category model.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use expensa_core::models::expense::{ExpenseRecord, LabeledExample};
use expensa_core::{ClassificationService, ExpenseStore, FileStore};

use super::load_config;

/// Arguments for the train command.
#[derive(Args)]
pub struct TrainArgs {
    /// Labeled CSV with `description` and `category` columns to import first
    #[arg(short, long)]
    from: Option<PathBuf>,
}

pub async fn run(args: TrainArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    std::fs::create_dir_all(&config.storage.data_dir)?;

    let store = FileStore::from_config(&config.storage);

    if let Some(path) = &args.from {
        let examples = read_labeled(path)?;
        if examples.is_empty() {
            anyhow::bail!("No labeled rows found in {}", path.display());
        }
        store.append_examples(&examples)?;
        println!(
            "{} Imported {} labeled examples from {}",
            style("✓").green(),
            examples.len(),
            path.display()
        );
    }

    let size = store.dataset_size()?;
    if size == 0 {
        anyhow::bail!(
            "The dataset at {} has no labeled entries. Use --from to import some.",
            store.dataset_path().display()
        );
    }

    info!("Training on {} examples", size);
    let service = ClassificationService::bootstrap(store, config.classifier.clone())?;
    let model = service.current_model();

    println!(
        "{} Trained category model on {} entries ({} categories: {})",
        style("✓").green(),
        model.trained_on(),
        model.categories().len(),
        model.categories().join(", ")
    );
    println!("   Saved to {}", config.storage.model_path().display());

    Ok(())
}

/// Read `description,category` pairs, dropping incomplete rows.
fn read_labeled(path: &Path) -> anyhow::Result<Vec<LabeledExample>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let mut examples = Vec::new();
    for row in reader.deserialize() {
        let record: ExpenseRecord = row?;
        if let Some(example) = record.labeled() {
            examples.push(example);
        }
    }
    Ok(examples)
}
