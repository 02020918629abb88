//! Interactive chat REPL.

use anyhow::{bail, Result};
use console::style;
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::state::{api_key_from_env, AppState, API_KEY_ENV};

/// Words that end the session.
const EXIT_COMMANDS: &[&str] = &["quit", "exit", "bye"];

const SIGN_OFF: &str = "Sarsarle, catch you later! 😊";

pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_COMMANDS.iter().any(|cmd| line.eq_ignore_ascii_case(cmd))
}

/// Key from the environment, else an interactive password prompt.
pub fn resolve_api_key() -> Result<SecretString> {
    if let Some(key) = api_key_from_env() {
        return Ok(key);
    }

    let key: String = dialoguer::Password::new()
        .with_prompt(format!("{API_KEY_ENV} is not set. Enter API key"))
        .interact()?;
    if key.trim().is_empty() {
        bail!("an API key is required for chat");
    }
    Ok(SecretString::from(key))
}

fn print_banner(state: &AppState, model: &str) {
    println!();
    println!(
        "  {} {}",
        style("💬").bold(),
        style(state.persona.speaker_name()).cyan().bold()
    );
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    println!(
        "  {}",
        style(format!("Type {} to leave", EXIT_COMMANDS.join(" / "))).dim()
    );
    println!("  {}", style("---").dim());
    println!();
}

/// Run the chat loop until an exit word or end of input.
pub async fn run_chat(state: &AppState) -> Result<()> {
    let Some(orchestrator) = state.orchestrator.as_ref() else {
        bail!("no generator configured; check {API_KEY_ENV} and the [generator] config");
    };

    print_banner(state, &state.config.generator.model);

    let speaker = state.persona.speaker_name();
    let addressee = state.persona.addressee_name();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(format!("{addressee}: ").as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if is_exit_command(input) {
            println!("{speaker}: {SIGN_OFF}");
            break;
        }

        let spinner = super::spinner("thinking...");
        let outcome = orchestrator.respond(input, "").await;
        spinner.finish_and_clear();

        println!("{speaker}: {}", outcome.response);
        if let Some(warning) = outcome.storage_warning {
            println!("  {}", style(format!("(not saved to memory: {warning})")).dim());
        }
        println!();
    }

    Ok(())
}
