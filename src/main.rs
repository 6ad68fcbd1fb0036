//! toolrunner — tool-calling agent service.
//!
//! Usage:
//!   toolrunner serve           Start the HTTP service (POST /tool)
//!   toolrunner ask "<query>"   Run one request and print the JSON result
//!   toolrunner tools           List the tools offered to the model

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use toolrunner::api;
use toolrunner::app::AppContext;
use toolrunner::config;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "toolrunner")]
#[command(version)]
#[command(about = "Tool-calling agent service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to toolrunner home directory (holds toolrunner.toml).
    #[arg(long)]
    home: Option<String>,

    /// Log level (debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP service.
    Serve {
        /// Address to bind, overriding the config.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run a single request through the tool loop.
    Ask {
        /// The natural-language request.
        query: String,
    },

    /// List the registered tools.
    Tools,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Values in .env win over the inherited environment.
    let dotenv = dotenvy::dotenv_override();

    let home_dir = cli
        .home
        .as_deref()
        .map(config::resolve_home)
        .unwrap_or_else(config::default_home_dir);

    let cfg = config::load_effective(&home_dir)?;

    // Initialize logging
    let level = cli.log_level.clone().unwrap_or_else(|| cfg.log_level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match dotenv {
        Ok(path) => info!("Read dotenv file from: {}", path.display()),
        Err(e) if e.not_found() => info!("No dotenv file found"),
        Err(e) => warn!("Failed to read dotenv file: {}", e),
    }

    match cli.command {
        Commands::Serve { bind } => cmd_serve(cfg, bind).await,
        Commands::Ask { query } => cmd_ask(cfg, &query).await,
        Commands::Tools => cmd_tools(cfg, &home_dir),
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

async fn cmd_serve(mut cfg: config::ToolRunnerConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        cfg.bind_addr = bind;
    }
    let addr = cfg.bind_addr.clone();

    println!(
        "{} Starting toolrunner (model: {}, bind: {})",
        ">>>".green().bold(),
        cfg.model,
        addr,
    );

    let ctx = AppContext::from_config(cfg)?;
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let cancel = CancellationToken::new();
    let server_cancel = cancel.clone();
    let server = tokio::spawn(api::serve(ctx, listener, server_cancel));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    println!("\n{} Shutting down gracefully...", "<<<".red().bold());
    cancel.cancel();

    let shutdown_timeout = tokio::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(joined) => joined.context("Server task panicked")??,
        Err(_) => warn!("Server did not stop within {:?}", shutdown_timeout),
    }

    info!("Shutdown complete");
    Ok(())
}

async fn cmd_ask(cfg: config::ToolRunnerConfig, query: &str) -> Result<()> {
    let ctx = AppContext::from_config(cfg)?;
    let output = ctx.runner.run(query).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_tools(cfg: config::ToolRunnerConfig, home_dir: &Path) -> Result<()> {
    let config_path: PathBuf = home_dir.join(config::CONFIG_FILE);
    let ctx = AppContext::from_config(cfg)?;

    println!();
    println!("{}", "=== Tools ===".bold());
    println!("  Config: {}", config_path.display());
    println!();
    for def in ctx.runner.registry().describe_all() {
        println!("  {}", def.name.green().bold());
        println!("    {}", def.description.dimmed());
        if let Some(props) = def.parameters["properties"].as_object() {
            let required = &def.parameters["required"];
            for (name, prop) in props {
                let is_required = required
                    .as_array()
                    .is_some_and(|r| r.iter().any(|v| v == name.as_str()));
                println!(
                    "    - {}: {}{}",
                    name,
                    prop["type"].as_str().unwrap_or("any"),
                    if is_required { "" } else { " (optional)" },
                );
            }
        }
        println!();
    }
    Ok(())
}
