//! Validate round definition files before adding them to a data directory.

use std::path::PathBuf;

use anyhow::Result;
use archery_content::{LoadProgress, RoundLoader};
use archery_core::ValidationError;
use clap::Parser;
use console::style;

/// Validate round definition files
#[derive(Parser)]
pub struct Validate {
    /// A round JSON file, or a directory of them
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

impl Validate {
    pub fn execute(self) -> Result<()> {
        let result = if self.path.is_dir() {
            let mut progress = |progress: LoadProgress| {
                println!(
                    "  {} {} ({}/{})",
                    style("✓").green(),
                    progress.current,
                    progress.loaded,
                    progress.total
                );
            };
            RoundLoader::load_dir_with_progress(&self.path, &mut progress)
                .map(|catalog| catalog.iter().cloned().collect::<Vec<_>>())
        } else {
            RoundLoader::load(&self.path)
        };

        let rounds = match result {
            Ok(rounds) => rounds,
            Err(err) => {
                if let Some(invalid) = err.downcast_ref::<ValidationError>() {
                    println!(
                        "{} {}: {}",
                        style("Invalid round").bold().red(),
                        invalid.round,
                        invalid.rule
                    );
                }
                return Err(err);
            }
        };

        println!();
        println!("{}", style("Valid rounds:").bold().green());
        for round in &rounds {
            println!(
                "  {:>4}  {} ({} arrows, {})",
                round.id,
                round.display_name,
                round.total_arrows(),
                if round.is_outdoor { "outdoor" } else { "indoor" }
            );
        }
        Ok(())
    }
}
