//! Handicap for a score, or the score a handicap predicts.

use anyhow::Result;
use clap::Parser;
use console::style;

use super::{RoundArgs, load_reference};
use crate::config::CliConfig;

/// Handicap for a score, or score for a handicap
#[derive(Parser)]
pub struct Handicap {
    #[command(flatten)]
    round: RoundArgs,

    /// Score to look up
    #[arg(short, long, required_unless_present = "handicap", conflicts_with = "handicap")]
    score: Option<u32>,

    /// Handicap to look up
    #[arg(long, value_name = "HANDICAP")]
    handicap: Option<f64>,
}

impl Handicap {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let oracles = load_reference(config)?;
        let round = self.round.find(&oracles.rounds)?;
        let table = self.round.handicap_table(round, &oracles.config)?;

        println!(
            "{} {} ({} system, max score {})",
            style("Round:").bold().cyan(),
            round.display_name,
            table.system(),
            table.max_score()
        );

        match (self.score, self.handicap) {
            (Some(score), _) => {
                let handicap = table.handicap_for_score(score);
                println!(
                    "{} {} → handicap {}",
                    style("Score:").bold().cyan(),
                    score,
                    style(handicap).bold().green()
                );
            }
            (None, Some(handicap)) => {
                let score = table.score_for_handicap(handicap);
                println!(
                    "{} {} → score {}",
                    style("Handicap:").bold().cyan(),
                    handicap,
                    style(score).bold().green()
                );
            }
            (None, None) => anyhow::bail!("Either --score or --handicap is required"),
        }
        Ok(())
    }
}
