//! EchoTwin CLI and REST API entry point.
//!
//! Binary name: `echotwin`
//!
//! Parses CLI arguments, opens the stores and wires the persona, then
//! dispatches to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use echotwin_observe::{init_tracing, shutdown_tracing, LogFormat};

use cli::{Cli, Commands};
use state::{api_key_from_env, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,echotwin=debug",
        _ => "trace",
    };
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    if let Err(e) = init_tracing(filter, format, cli.otel) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "echotwin", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Only commands that generate replies need a key.
    let api_key = match &cli.command {
        Commands::Chat => Some(cli::chat::resolve_api_key()?),
        Commands::Serve { .. } => api_key_from_env(),
        _ => None,
    };

    // Long-running commands pick up new transcripts before the persona is built.
    let ingest_first = matches!(cli.command, Commands::Chat | Commands::Serve { .. });
    let state = AppState::init(api_key, ingest_first).await?;

    match cli.command {
        Commands::Chat => {
            cli::chat::run_chat(&state).await?;
        }

        Commands::Ingest { dir } => {
            cli::ingest::ingest(&state, dir, cli.json).await?;
        }

        Commands::Conversations { limit } => {
            cli::memory::list_conversations(&state, limit, cli.json).await?;
        }

        Commands::Stats => {
            cli::status::stats(&state, cli.json).await?;
        }

        Commands::Search {
            query,
            limit,
            days_back,
        } => {
            cli::memory::search(&state, &query, limit, days_back, cli.json).await?;
        }

        Commands::Prompt => {
            cli::persona::show_prompt(&state, cli.json)?;
        }

        Commands::Reconcile { rebuild } => {
            cli::memory::reconcile(&state, rebuild, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} {} listening on {}",
                console::style("⚡").bold(),
                console::style(state.persona.speaker_name()).cyan(),
                console::style(format!("http://{addr}")).cyan()
            );
            if state.orchestrator.is_none() {
                println!(
                    "  {}",
                    console::style("No generator configured: /api/chat runs in demo mode").yellow()
                );
            }
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
