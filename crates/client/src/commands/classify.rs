//! Classification achieved by a completed round score.

use anyhow::Result;
use archery_core::{AgeCategory, ArcherProfile, Bowstyle, Classification, Gender};
use clap::Parser;
use console::style;

use super::{RoundArgs, load_reference, parse_name};
use crate::config::CliConfig;

/// Classification achieved by a score
#[derive(Parser)]
pub struct Classify {
    #[command(flatten)]
    round: RoundArgs,

    /// Round score
    #[arg(short, long)]
    score: u32,

    #[command(flatten)]
    archer: ArcherArgs,
}

/// Who shot the score.
#[derive(clap::Args)]
pub struct ArcherArgs {
    /// recurve, compound, barebow or longbow
    #[arg(short, long, value_parser = parse_name::<Bowstyle>)]
    bow: Bowstyle,

    /// male or female
    #[arg(short, long, default_value = "male", value_parser = parse_name::<Gender>)]
    gender: Gender,

    /// adult, 50+, u21, u18, u16, u15, u14 or u12
    #[arg(short, long, default_value = "adult", value_parser = parse_name::<AgeCategory>)]
    age: AgeCategory,
}

impl ArcherArgs {
    pub fn profile(&self) -> ArcherProfile {
        ArcherProfile {
            bowstyle: self.bow,
            gender: self.gender,
            age: self.age,
        }
    }
}

impl Classify {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let oracles = load_reference(config)?;
        let round = self.round.find(&oracles.rounds)?;
        let profile = self.archer.profile();

        let thresholds = oracles
            .classifications
            .try_thresholds(round, &profile)
            .map_err(|missing| {
                anyhow::anyhow!(
                    "{} {} {} on {}: {}",
                    profile.age,
                    profile.gender,
                    profile.bowstyle,
                    round.display_name,
                    missing
                )
            })?;

        println!(
            "{} {} ({} {} {})",
            style("Round:").bold().cyan(),
            round.display_name,
            profile.age,
            profile.gender,
            profile.bowstyle
        );
        println!();
        for classification in Classification::ALL {
            let needed = thresholds.get(classification);
            let marker = if self.score >= needed { "✓" } else { " " };
            println!(
                "  {} {:<24} {:>5}",
                style(marker).green(),
                classification.to_string(),
                needed
            );
        }
        println!();

        let sub_type = self.round.sub_type();
        let face = self.round.face();
        match oracles
            .classifications
            .classify(self.score, round, &profile, sub_type, face)
        {
            Some(result) => println!(
                "{} {} {}",
                style("Classification:").bold().cyan(),
                style(result.classification).bold().green(),
                if result.is_official {
                    style("(official)").green()
                } else {
                    style("(unofficial)").yellow()
                }
            ),
            None => println!(
                "{} below {}",
                style("Classification:").bold().cyan(),
                Classification::Archer3rd
            ),
        }
        Ok(())
    }
}
