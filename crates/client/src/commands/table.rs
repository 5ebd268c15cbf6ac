//! Handicap table excerpt, as printed on a reference card.

use anyhow::Result;
use archery_core::TableTarget;
use clap::Parser;
use console::style;

use super::{RoundArgs, load_reference};
use crate::config::CliConfig;

/// Handicap table excerpt around a score or handicap
#[derive(Parser)]
pub struct Table {
    #[command(flatten)]
    round: RoundArgs,

    /// Centre the excerpt on this score
    #[arg(short, long, required_unless_present = "handicap", conflicts_with = "handicap")]
    score: Option<u32>,

    /// Centre the excerpt on this handicap
    #[arg(long, value_name = "HANDICAP")]
    handicap: Option<f64>,
}

impl Table {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let oracles = load_reference(config)?;
        let round = self.round.find(&oracles.rounds)?;
        let table = self.round.handicap_table(round, &oracles.config)?;

        let target = match (self.score, self.handicap) {
            (Some(score), _) => TableTarget::Score(score),
            (None, Some(handicap)) => TableTarget::Handicap(handicap),
            (None, None) => anyhow::bail!("Either --score or --handicap is required"),
        };

        println!(
            "{} {} ({} system)",
            style("Round:").bold().cyan(),
            round.display_name,
            table.system()
        );
        println!();
        println!("  {:>8}  {:>6}", style("Handicap").bold(), style("Score").bold());
        for row in table.table_window(target) {
            let line = format!("{:>8}  {:>6}", row.handicap, row.score);
            if row.highlighted {
                println!("{} {}", style("▶").yellow(), style(line).bold().yellow());
            } else {
                println!("  {}", line);
            }
        }
        Ok(())
    }
}
