//! `echotwin prompt`: show the rendered persona prompt.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub fn show_prompt(state: &AppState, json: bool) -> Result<()> {
    let prompt = state.persona.system_prompt();

    if json {
        let out = serde_json::json!({
            "persona": state.persona.persona().map(|p| p.name.clone()),
            "style_markers": state.persona.markers(),
            "system_prompt": prompt,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if state.persona.persona().is_none() {
        eprintln!(
            "  {} No persona loaded ({}); showing the neutral prompt.",
            style("i").blue().bold(),
            state.config.persona.file
        );
    }
    println!("{prompt}");
    Ok(())
}
