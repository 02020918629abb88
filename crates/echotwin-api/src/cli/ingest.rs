//! `echotwin ingest`: load exported transcripts into memory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;

use echotwin_core::transcript::TranscriptIngestor;

use crate::state::AppState;

pub async fn ingest(state: &AppState, dir: Option<PathBuf>, json: bool) -> Result<()> {
    let source = state.transcript_source(dir);
    let location = source.dir().display().to_string();
    let ingestor = TranscriptIngestor::new(source, state.transcript_parser(), state.store.clone());

    let spinner = (!json).then(|| super::spinner(&format!("Ingesting transcripts from {location}...")));
    let report = ingestor.ingest_all().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = report.with_context(|| format!("ingest from {location} failed"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    for file in &report.ingested {
        println!("  {} {}", style("✓").green(), file);
    }
    for file in &report.skipped {
        println!("  {} {} {}", style("-").dim(), file, style("(already ingested)").dim());
    }
    for (file, reason) in &report.failed {
        println!("  {} {} {}", style("✗").red(), file, style(reason).red());
    }
    println!();
    println!(
        "  {} message{} stored from {} file{}",
        style(report.messages).bold(),
        if report.messages == 1 { "" } else { "s" },
        style(report.ingested.len()).bold(),
        if report.ingested.len() == 1 { "" } else { "s" },
    );
    println!();

    Ok(())
}
