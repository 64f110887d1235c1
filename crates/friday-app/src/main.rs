//! Friday application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration (file, env, flags)
//! 2. Install tracing
//! 3. Build the assistant (pipeline, context, learning store, executor)
//! 4. Answer `--once` or every stdin line with one JSON reply per line

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use friday_app::cli::CliArgs;
use friday_app::{Assistant, AssistantReply, LoggingExecutor};
use friday_core::config::FridayConfig;

async fn emit(out: &mut tokio::io::Stdout, reply: &AssistantReply) -> std::io::Result<()> {
    match serde_json::to_string(reply) {
        Ok(line) => {
            out.write_all(line.as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode reply");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = FridayConfig::load_or_default(&config_file);
    config.apply_env_overrides();
    if let Some(dir) = &args.data_dir {
        config.general.data_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(level) = &args.log_level {
        config.general.log_level = level.clone();
    }

    // Tracing. RUST_LOG wins over everything else.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Friday v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;
    tracing::info!(
        path = %config_file.display(),
        learning = %config.learning_path().display(),
        "Configuration loaded"
    );

    let assistant = Assistant::new(&config, Arc::new(LoggingExecutor));
    // Read the learning record up front so the first reply does not wait on disk.
    let learned = assistant.learning().load().await;
    tracing::info!(custom_commands = learned.custom_commands.len(), "Learning record ready");
    let mut stdout = tokio::io::stdout();

    if let Some(text) = args.once {
        let reply = assistant.handle_utterance(&text).await;
        emit(&mut stdout, &reply).await?;
        assistant.flush_learning().await;
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let reply = assistant.handle_utterance(&line).await;
        emit(&mut stdout, &reply).await?;
    }

    assistant.flush_learning().await;
    tracing::info!("Input closed, shutting down");
    Ok(())
}
