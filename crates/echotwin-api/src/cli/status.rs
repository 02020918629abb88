//! `echotwin stats`: conversation statistics dashboard.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.store.stats().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} EchoTwin v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Memory ──").dim());
    println!("  Conversations:     {}", style(stats.total_conversations).bold());
    println!("  Last 24 hours:     {}", style(stats.recent_conversations).green());
    println!("  Transcript lines:  {}", stats.total_chat_messages);
    println!();

    if !stats.language_stats.is_empty() {
        println!("  {}", style("── Languages ──").dim());
        for (label, count) in &stats.language_stats {
            println!("  {label:<16} {count}");
        }
        println!();
    }

    println!("  {}", style("── System ──").dim());
    println!("  Persona:   {}", style(state.persona.speaker_name()).cyan());
    println!(
        "  Generator: {}",
        match state.orchestrator.as_ref() {
            Some(o) => style(o.provider_name().to_string()).green(),
            None => style("not configured".to_string()).yellow(),
        }
    );
    println!("  Data dir:  {}", style(state.data_dir.display()).dim());
    println!();

    Ok(())
}
