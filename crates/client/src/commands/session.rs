//! Session commands: start a session, enter ends, print the score sheet.
//!
//! Edits go through the runtime's single-writer worker; `score` reads the
//! store directly.

use std::sync::Arc;

use anyhow::{Context, Result};
use archery_core::{
    AgeCategory, ArcherProfile, Arrow, ArrowRecord, Bowstyle, Face, Gender, SectionKind,
    SessionId, SessionSummary,
};
use clap::Parser;
use console::style;
use runtime::{
    ArrowRepository, NewSession, OracleBundle, RuntimeConfig, ScoringRuntime, SessionRepository,
};

use super::{find_round, load_reference, open_store, parse_name};
use crate::config::CliConfig;

fn start_runtime(config: &CliConfig) -> Result<(ScoringRuntime, OracleBundle)> {
    let oracles = load_reference(config)?;
    let store = Arc::new(open_store(config)?);
    let runtime = ScoringRuntime::start(store, oracles.clone(), RuntimeConfig::default());
    Ok((runtime, oracles))
}

/// Start a scoring session
#[derive(Parser)]
pub struct NewSessionCommand {
    /// Round id or name; omit for free practice
    #[arg(short, long, value_name = "ROUND")]
    round: Option<String>,

    /// Sub-type id (defaults to the round's first)
    #[arg(long, value_name = "ID", requires = "round")]
    sub_type: Option<u32>,

    /// Face shot (defaults to the round's primary face)
    #[arg(long, value_name = "FACE", value_parser = parse_name::<Face>)]
    face: Option<Face>,

    /// Bowstyle; enables classification once the round is complete
    #[arg(short, long, value_parser = parse_name::<Bowstyle>)]
    bow: Option<Bowstyle>,

    #[arg(short, long, default_value = "male", value_parser = parse_name::<Gender>)]
    gender: Gender,

    #[arg(short, long, default_value = "adult", value_parser = parse_name::<AgeCategory>)]
    age: AgeCategory,
}

impl NewSessionCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let (runtime, oracles) = start_runtime(config)?;

        let mut draft = NewSession::default();
        if let Some(key) = &self.round {
            let round = find_round(&oracles.rounds, key)?;
            draft = NewSession::for_round(round.id, self.sub_type);
        }
        if let Some(face) = self.face {
            draft = draft.with_face(face);
        }
        if let Some(bowstyle) = self.bow {
            draft = draft.with_archer(ArcherProfile {
                bowstyle,
                gender: self.gender,
                age: self.age,
            });
        }

        let handle = runtime.handle();
        let session = handle.create_session(draft).await?;
        let next = handle.next_end_size(session.id).await?;
        runtime.shutdown().await?;

        println!(
            "{} {} started ({} arrows per end)",
            style("Session").bold().green(),
            session.id.0,
            next
        );
        Ok(())
    }
}

/// Enter an end: appended, or inserted/replaced at an arrow number
#[derive(Parser)]
pub struct EndCommand {
    /// Session id
    #[arg(value_name = "SESSION")]
    session: u32,

    /// Arrow values: X, 10..1, M
    #[arg(value_name = "ARROW", required = true, value_parser = parse_name::<Arrow>)]
    arrows: Vec<Arrow>,

    /// Insert the end so its first arrow gets this number
    #[arg(long, value_name = "N", conflicts_with = "replace_at")]
    insert_at: Option<u32>,

    /// Overwrite the end starting at this arrow number
    #[arg(long, value_name = "N")]
    replace_at: Option<u32>,
}

impl EndCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let (runtime, _) = start_runtime(config)?;
        let handle = runtime.handle();
        let session = SessionId(self.session);

        let expected = handle.next_end_size(session).await?;
        let records = match (self.insert_at, self.replace_at) {
            (Some(first), _) => handle.insert_end(session, first, self.arrows).await?,
            (None, Some(first)) => {
                let size = self.arrows.len();
                handle
                    .replace_end(session, first, size, self.arrows)
                    .await?
            }
            (None, None) => {
                if self.arrows.len() as u32 > expected {
                    tracing::warn!(
                        "{} arrows entered, {} left at this distance; the rest count as surplus",
                        self.arrows.len(),
                        expected
                    );
                }
                handle.append_end(session, self.arrows).await?
            }
        };
        runtime.shutdown().await?;

        print_arrows(&records);
        Ok(())
    }
}

/// Delete arrows from a session
#[derive(Parser)]
pub struct DeleteCommand {
    /// Session id
    #[arg(value_name = "SESSION")]
    session: u32,

    /// First arrow number to delete
    #[arg(value_name = "FIRST")]
    first: u32,

    /// Number of arrows to delete
    #[arg(value_name = "COUNT")]
    count: u32,
}

impl DeleteCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let (runtime, _) = start_runtime(config)?;
        let handle = runtime.handle();
        let records = handle
            .delete_end(SessionId(self.session), self.first, self.count)
            .await?;
        runtime.shutdown().await?;

        print_arrows(&records);
        Ok(())
    }
}

fn print_arrows(records: &[ArrowRecord]) {
    let arrows: Vec<String> = records.iter().map(|r| r.arrow.to_string()).collect();
    println!(
        "{} {} arrows: {}",
        style("Session").bold().cyan(),
        records.len(),
        arrows.join(" ")
    );
}

/// Score sheet and statistics of a session
#[derive(Parser)]
pub struct Score {
    /// Session id
    #[arg(value_name = "SESSION")]
    session: u32,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Score {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let oracles = load_reference(config)?;
        let store = open_store(config)?;
        let id = SessionId(self.session);

        let session = store
            .session(id)?
            .with_context(|| format!("No session {} in {}", id.0, store.base_dir().display()))?;
        let round = match session.round_id {
            Some(round_id) => Some(
                oracles
                    .round(round_id)
                    .with_context(|| format!("{} references unknown round {}", id, round_id))?,
            ),
            None => None,
        };
        let arrows: Vec<Arrow> = store
            .snapshot(id)?
            .into_iter()
            .map(|record| record.arrow)
            .collect();

        let context = oracles.summary_context(&session, round);
        let summary = SessionSummary::compute(&arrows, &context);

        if self.json {
            let json = serde_json::to_string_pretty(&summary.sheet)
                .context("Failed to serialize score sheet to JSON")?;
            println!("{}", json);
            return Ok(());
        }

        let title = round.map_or("Practice", |round| round.display_name.as_str());
        println!(
            "{} {} ({})",
            style("Session").bold().cyan(),
            id.0,
            title
        );
        print_summary(&summary);
        Ok(())
    }
}

fn print_summary(summary: &SessionSummary) {
    for section in &summary.sheet.sections {
        let heading = match section.kind {
            SectionKind::Distance { distance, unit } => format!("{} {}", distance, unit),
            SectionKind::Surplus => "Surplus".to_string(),
            SectionKind::Unbounded => "Arrows".to_string(),
        };
        println!();
        println!("{}", style(heading).bold().yellow());
        for row in &section.ends {
            let arrows: Vec<String> = row.arrows.iter().map(|a| format!("{:>2}", a)).collect();
            println!(
                "  {:>3}  {}  {:>3}  {:>5}",
                row.end_number,
                arrows.join(" "),
                row.totals.score,
                row.running_total
            );
        }
        let subtotal = &section.subtotal;
        println!(
            "  {} hits {}, score {}, golds {}, Xs {}",
            style("Subtotal:").bold(),
            subtotal.hits,
            subtotal.score,
            subtotal.golds,
            subtotal.xs
        );
    }

    let total = summary.sheet.round_total();
    println!();
    println!(
        "{} {} arrows, {} hits, score {}, golds {}, Xs {}",
        style("Total:").bold().green(),
        total.arrows,
        total.hits,
        style(total.score).bold(),
        total.golds,
        total.xs
    );

    if let Some(remaining) = summary.remaining.as_ref().filter(|_| !summary.is_complete) {
        let left: Vec<String> = remaining
            .iter()
            .map(|r| format!("{} at {} {}", r.remaining, r.distance, r.unit))
            .collect();
        println!("{} {}", style("Remaining:").bold().cyan(), left.join(", "));
    }
    if let Some(handicap) = summary.handicap {
        println!("{} {}", style("Handicap:").bold().cyan(), handicap);
    }
    if let Some(result) = summary.classification {
        println!(
            "{} {}{}",
            style("Classification:").bold().cyan(),
            result.classification,
            if result.is_official { "" } else { " (unofficial)" }
        );
    }
}
