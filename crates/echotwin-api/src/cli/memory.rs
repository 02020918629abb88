//! Memory commands: list conversations, semantic search, reconciliation.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use echotwin_core::memory::retriever::MemoryRetriever;

use crate::state::AppState;

use super::truncate;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|h| Cell::new(h).fg(Color::White)));
    table
}

/// List the most recent exchanges, newest first.
pub async fn list_conversations(state: &AppState, limit: u32, json: bool) -> Result<()> {
    let exchanges = state.store.recent(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&exchanges)?);
        return Ok(());
    }

    if exchanges.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Start one with `echotwin chat`.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = new_table(&["When", "Mood", "Language", "Message", "Reply"]);
    for exchange in &exchanges {
        table.add_row(vec![
            Cell::new(exchange.timestamp.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
            Cell::new(exchange.mood.to_string()).fg(Color::Magenta),
            Cell::new(exchange.language_mix.to_string()).fg(Color::Cyan),
            Cell::new(truncate(&exchange.user_input, 40)),
            Cell::new(truncate(&exchange.ai_response, 60)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} conversation{}",
        style(exchanges.len()).bold(),
        if exchanges.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Semantic search over past exchanges, most similar first.
pub async fn search(
    state: &AppState,
    query: &str,
    limit: usize,
    days_back: Option<u32>,
    json: bool,
) -> Result<()> {
    let days_back = match days_back {
        Some(0) => None,
        Some(days) => Some(days),
        None => state.config.retrieval.days_back_filter(),
    };

    let retriever = MemoryRetriever::new(state.store.exchange_index(), state.store.embedder());
    let hits = retriever.retrieve_context(query, limit, days_back).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!();
        println!("  {} No matching memories.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = new_table(&["Distance", "Date", "Mood", "Exchange"]);
    for hit in &hits {
        table.add_row(vec![
            Cell::new(format!("{:.3}", hit.distance)).fg(Color::Yellow),
            Cell::new(hit.record.date.to_string()).fg(Color::DarkGrey),
            Cell::new(hit.record.mood.to_string()).fg(Color::Magenta),
            Cell::new(truncate(&hit.record.document, 80)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// Repair exchanges missing from the vector index, or rebuild it entirely.
pub async fn reconcile(state: &AppState, rebuild: bool, json: bool) -> Result<()> {
    let message = if rebuild {
        "Rebuilding vector index..."
    } else {
        "Reconciling vector index..."
    };
    let spinner = (!json).then(|| super::spinner(message));
    let report = if rebuild {
        state.store.rebuild_vector_index().await
    } else {
        state.store.reconcile().await
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mark = if report.failed == 0 {
        style("✓").green()
    } else {
        style("!").yellow()
    };
    println!();
    println!(
        "  {} scanned {}, repaired {}, still missing {}",
        mark,
        style(report.scanned).bold(),
        style(report.repaired).green(),
        style(report.failed).red()
    );
    println!();
    Ok(())
}
