//! Dilemma Lab - AI ethics dilemma simulator
//!
//! A terminal application presenting ethical dilemmas faced by AI
//! developers. Each decision is recorded in the session history and
//! explained by a Gemini-generated analysis, or by a built-in fallback
//! when no API key is configured.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, unknown scenario in --play, etc.)

mod analyzer;
mod app;
mod catalog;
mod cli;
mod config;
mod models;
mod render;
mod session;
mod stats;

use analyzer::GeminiAnalyzer;
use anyhow::{Context, Result};
use catalog::Catalog;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use session::Session;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(log_level(&args, &config));

    info!("Dilemma Lab v{}", env!("CARGO_PKG_VERSION"));
    debug!("Model: {}, API: {}", config.ai.model, config.ai.api_url);

    if let Err(e) = run(args, config).await {
        error!("Session failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .dilemma-lab.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Set [ai].api_key or GEMINI_API_KEY to enable AI analysis.");
    Ok(())
}

/// Pick the log level from flags, falling back to the config file.
fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging. Logs go to stderr so they stay out of the views.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the session and run it interactively or from --play.
async fn run(args: Args, config: Config) -> Result<()> {
    let catalog = Catalog::builtin();
    catalog
        .validate()
        .context("Built-in scenario catalog is invalid")?;
    let catalog = Arc::new(catalog);

    if args.list {
        print!("{}", render::render_catalog(&catalog));
        return Ok(());
    }

    let gemini = config.gemini();
    if gemini.credential().is_none() {
        warn!("No API key configured; analyses will use the offline fallback");
    }

    let analyzer = GeminiAnalyzer::new(gemini).context("Failed to create HTTP client")?;
    let mut session = Session::new(catalog, Arc::new(analyzer));

    let steps = args.play_steps().map_err(anyhow::Error::msg)?;
    if steps.is_empty() {
        app::run_interactive(&mut session).await
    } else {
        info!("Playing {} scripted decisions", steps.len());
        app::run_script(&mut session, &steps).await
    }
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    let mut config = if let Some(ref config_path) = args.config {
        Config::load(config_path)?
    } else {
        // Try default location
        Config::load_default()?.unwrap_or_default()
    };

    config.merge_with_args(args);
    Ok(config)
}
