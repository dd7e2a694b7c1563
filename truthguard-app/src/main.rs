use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use truthguard_client::build_client;
use truthguard_common::observability::{LogConfig, init_logging};
use truthguard_config::{TruthGuardConfig, TruthGuardConfigLoader, default_config_path};
use truthguard_controller::InteractionController;
use truthguard_core::ContentType;

mod cli;
mod render;
mod session;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1) Load config (env wins over files, flags win over env)
    let mut cfg = load_config(&cli)?;
    cli.apply(&mut cfg);
    cfg.validate()?;

    // 2) Logging from the config file
    let log_path = init_logging(LogConfig {
        app_name: "truthguard",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.level.clone(),
    })?;
    tracing::info!(event = "app.start", log = %log_path.display(), mode = ?cfg.client.mode);

    let client = build_client(&cfg)?;

    let controller = Arc::new(InteractionController::new(client.clone(), cfg.limits));
    match &cli.command {
        Command::Health => {
            let healthy = client.health_check().await.unwrap_or(false);
            println!(
                "{} backend is {}",
                client.name(),
                if healthy { "reachable" } else { "unreachable" }
            );
            return Ok(if healthy {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        Command::Text { text } => {
            controller.set_text(session::resolve_text(text).await?)?;
        }
        Command::Image { path } => {
            session::stage_media(&controller, ContentType::Image, path).await?;
        }
        Command::Video { path } => {
            session::stage_media(&controller, ContentType::Video, path).await?;
        }
    }

    match session::run_submission(controller).await {
        Ok(result) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(result.as_ref())?);
            } else {
                println!("{}", render::report(&result));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(event = "app.analysis_failed", error = %e);
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn load_config(cli: &Cli) -> Result<TruthGuardConfig> {
    let mut loader = TruthGuardConfigLoader::new();
    match &cli.config {
        Some(path) => loader = loader.with_file(path),
        None => {
            if let Some(path) = default_config_path() {
                loader = loader.with_optional_file(path);
            }
            loader = loader.with_optional_file("truthguard.yaml");
        }
    }
    Ok(loader.load()?)
}
