//! Reset command - clear the expense dataset.

use clap::Args;
use console::style;

use expensa_core::{ExpenseStore, FileStore};

use super::load_config;

/// Arguments for the reset command.
#[derive(Args)]
pub struct ResetArgs {
    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
}

pub async fn run(args: ResetArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = FileStore::from_config(&config.storage);

    if !args.yes {
        anyhow::bail!(
            "This removes every entry in {}. Re-run with --yes to confirm.",
            store.dataset_path().display()
        );
    }

    store.reset()?;

    println!(
        "{} Dataset {} was reset",
        style("✓").green(),
        store.dataset_path().display()
    );

    Ok(())
}
