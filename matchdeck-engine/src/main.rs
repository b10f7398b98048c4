//! Swipe session simulator (matchdeck-sim) - Main entry point
//!
//! Replays a scripted swipe session against the engine and logs every
//! emitted event as JSON. Uses the HTTP collaborators when a `[provider]`
//! section is configured, in-memory ones otherwise.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use matchdeck_common::{models::parse_candidates, QueueKind, ViewerProfile};
use matchdeck_engine::provider::{
    DecisionSink, HttpDecisionSink, HttpInsightProvider, InsightProvider, MemoryDecisionSink,
    MemoryInsightProvider,
};
use matchdeck_engine::{sim, EngineConfig, SwipeEngine};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for matchdeck-sim
#[derive(Parser, Debug)]
#[command(name = "matchdeck-sim")]
#[command(about = "Replay a scripted swipe session")]
#[command(version)]
struct Args {
    /// JSON file holding the ordered candidate list
    #[arg(short, long, env = "MATCHDECK_CANDIDATES")]
    candidates: PathBuf,

    /// Session script
    #[arg(short, long)]
    script: PathBuf,

    /// Config file (overrides MATCHDECK_CONFIG and the platform default)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Treat the queue as group matches
    #[arg(long)]
    group: bool,

    /// Viewer display name used to seed insight generation
    #[arg(long, env = "MATCHDECK_VIEWER_NAME")]
    viewer_name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = EngineConfig::load(args.config.as_deref()).context("Failed to load config")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "matchdeck_engine={level},matchdeck_common={level}",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(args, config).await {
        error!("Simulation failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(args: Args, config: EngineConfig) -> Result<()> {
    let candidates_json = std::fs::read_to_string(&args.candidates)
        .with_context(|| format!("Failed to read {}", args.candidates.display()))?;
    let candidates = parse_candidates(&candidates_json).context("Invalid candidate list")?;

    let steps = sim::load_script(&args.script)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;

    let provider: Arc<dyn InsightProvider>;
    let sink: Arc<dyn DecisionSink>;
    match &config.provider {
        Some(remote) => {
            info!("Using matching service at {}", remote.base_url);
            provider = Arc::new(HttpInsightProvider::new(remote)?);
            sink = Arc::new(HttpDecisionSink::new(remote)?);
        }
        None => {
            info!("No provider configured, using in-memory collaborators");
            provider = Arc::new(MemoryInsightProvider::new());
            sink = Arc::new(MemoryDecisionSink::new());
        }
    }

    let kind = if args.group {
        QueueKind::Group
    } else {
        QueueKind::Individual
    };

    let mut engine = SwipeEngine::new(config, provider, sink);
    if let Some(name) = args.viewer_name {
        engine = engine.with_viewer(ViewerProfile {
            display_name: name,
            ..ViewerProfile::default()
        });
    }

    info!(
        session_id = %engine.session_id(),
        candidates = candidates.len(),
        steps = steps.len(),
        kind = %kind,
        "Starting simulated session"
    );

    let logger = tokio::spawn(sim::log_events(engine.subscribe()));
    let summary = sim::run_session(&mut engine, candidates, kind, &steps).await;

    // Dropping the engine closes the bus and ends the logger
    drop(engine);
    let _ = logger.await;

    println!(
        "decisions={} undone={} position={}/{}",
        summary.decisions, summary.undone, summary.cursor, summary.total
    );
    Ok(())
}
