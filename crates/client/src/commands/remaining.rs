//! Arrows left at each distance after a number of arrows shot.

use anyhow::Result;
use archery_core::{end_size_limit, remaining_arrows};
use clap::Parser;
use console::style;

use super::{RoundArgs, load_reference};
use crate::config::CliConfig;

/// Arrows left at each distance
#[derive(Parser)]
pub struct Remaining {
    #[command(flatten)]
    round: RoundArgs,

    /// Arrows shot so far
    #[arg(long, default_value_t = 0)]
    shot: u32,
}

impl Remaining {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let oracles = load_reference(config)?;
        let round = self.round.find(&oracles.rounds)?;
        let sub_type = self.round.sub_type();

        let remaining = remaining_arrows(round, sub_type, self.shot).ok_or_else(|| {
            anyhow::anyhow!("{} has no distances for sub-type {:?}", round.display_name, sub_type)
        })?;

        println!(
            "{} {} after {} arrows",
            style("Round:").bold().cyan(),
            round.display_name,
            self.shot
        );
        for entry in &remaining {
            println!(
                "  {:>4} {}  {:>3} arrows",
                entry.distance,
                entry.unit,
                entry.remaining
            );
        }

        let next = end_size_limit(
            Some(round),
            sub_type,
            self.shot,
            oracles.config.end_size_for(Some(round)),
        );
        if next == 0 {
            println!("{}", style("Round complete").bold().green());
        } else {
            println!("{} {} arrows", style("Next end:").bold().cyan(), next);
        }
        Ok(())
    }
}
