//! Scripted session replay
//!
//! A script is one command per line; blank lines and `#` comments are
//! skipped.
//!
//! ```text
//! drag 150 10      # synthetic drag from (0,0), released at (150,10)
//! left | right     # direct commit
//! key left|right   # programmatic swipe (commits after the leave delay)
//! undo [prompt]    # plain undo, or undo through the live prompt
//! redo
//! wait 300         # let timers and fetches run
//! reset [individual|group]
//! ```

use crate::error::{Error, Result};
use crate::swipe::{Key, SwipeEngine};
use matchdeck_common::events::MatchEvent;
use matchdeck_common::{Candidate, Direction, QueueKind};
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Interval between the synthetic pointer samples of a `drag` step
const DRAG_SAMPLE_MS: u64 = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Drag { x: f64, y: f64 },
    Commit(Direction),
    Key(Key),
    Undo { via_prompt: bool },
    Redo,
    Wait(Duration),
    Reset(Option<QueueKind>),
}

/// Read and parse a script file
pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let source = std::fs::read_to_string(path)?;
    parse_script(&source)
}

/// Parse a whole script, reporting the first bad line
pub fn parse_script(source: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        steps.push(parse_line(line).map_err(|message| Error::Script {
            line: index + 1,
            message,
        })?);
    }
    Ok(steps)
}

fn parse_line(line: &str) -> std::result::Result<ScriptStep, String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let expect_args = |n: usize| {
        if args.len() == n {
            Ok(())
        } else {
            Err(format!("'{}' takes {} argument(s), got {}", command, n, args.len()))
        }
    };

    match command {
        "drag" => {
            expect_args(2)?;
            Ok(ScriptStep::Drag {
                x: parse_number(args[0])?,
                y: parse_number(args[1])?,
            })
        }
        "left" => expect_args(0).map(|_| ScriptStep::Commit(Direction::Left)),
        "right" => expect_args(0).map(|_| ScriptStep::Commit(Direction::Right)),
        "key" => {
            expect_args(1)?;
            match args[0] {
                "left" => Ok(ScriptStep::Key(Key::ArrowLeft)),
                "right" => Ok(ScriptStep::Key(Key::ArrowRight)),
                other => Err(format!("unknown key '{}'", other)),
            }
        }
        "undo" => match args.as_slice() {
            [] => Ok(ScriptStep::Undo { via_prompt: false }),
            ["prompt"] => Ok(ScriptStep::Undo { via_prompt: true }),
            _ => Err("usage: undo [prompt]".to_string()),
        },
        "redo" => expect_args(0).map(|_| ScriptStep::Redo),
        "wait" => {
            expect_args(1)?;
            let millis: u64 = args[0]
                .parse()
                .map_err(|_| format!("invalid duration '{}'", args[0]))?;
            Ok(ScriptStep::Wait(Duration::from_millis(millis)))
        }
        "reset" => match args.as_slice() {
            [] => Ok(ScriptStep::Reset(None)),
            ["individual"] => Ok(ScriptStep::Reset(Some(QueueKind::Individual))),
            ["group"] => Ok(ScriptStep::Reset(Some(QueueKind::Group))),
            _ => Err("usage: reset [individual|group]".to_string()),
        },
        other => Err(format!("unknown command '{}'", other)),
    }
}

fn parse_number(word: &str) -> std::result::Result<f64, String> {
    word.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid number '{}'", word))
}

/// Where a replayed session ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub decisions: usize,
    pub undone: usize,
    pub cursor: usize,
    pub total: usize,
}

/// Replay `steps` against `engine`, starting from a fresh queue
pub async fn run_session(
    engine: &mut SwipeEngine,
    candidates: Vec<Candidate>,
    kind: QueueKind,
    steps: &[ScriptStep],
) -> SessionSummary {
    engine.reset(candidates.clone(), kind);

    for step in steps {
        debug!(step = ?step, "Script step");
        match step {
            ScriptStep::Drag { x, y } => drag(engine, *x, *y),
            ScriptStep::Commit(direction) => {
                engine.commit(*direction);
            }
            ScriptStep::Key(key) => {
                engine.handle_key(*key);
            }
            ScriptStep::Undo { via_prompt: false } => {
                engine.undo(None);
            }
            ScriptStep::Undo { via_prompt: true } => {
                match engine.undo_prompt().map(|p| p.decision_id.clone()) {
                    Some(id) => {
                        engine.undo(Some(&id));
                    }
                    None => warn!("No live undo prompt, step skipped"),
                }
            }
            ScriptStep::Redo => {
                engine.redo();
            }
            ScriptStep::Wait(duration) => wait(engine, *duration).await,
            ScriptStep::Reset(next_kind) => {
                engine.reset(candidates.clone(), next_kind.unwrap_or(engine.kind()));
            }
        }
        engine.process_pending_internal();
    }

    let summary = SessionSummary {
        decisions: engine.history().past_len(),
        undone: engine.history().future_len(),
        cursor: engine.cursor(),
        total: engine.candidates().len(),
    };
    info!(
        decisions = summary.decisions,
        undone = summary.undone,
        cursor = summary.cursor,
        total = summary.total,
        "Session finished"
    );
    summary
}

/// Straight-line drag from the origin in a few pointer samples
fn drag(engine: &mut SwipeEngine, x: f64, y: f64) {
    const POINTER: u64 = 1;
    const SAMPLES: u32 = 4;

    let start = Instant::now();
    if !engine.begin_drag(POINTER, 0.0, 0.0, start) {
        warn!("Drag ignored by engine");
        return;
    }
    for i in 1..=SAMPLES {
        let f = f64::from(i) / f64::from(SAMPLES);
        let at = start + Duration::from_millis(DRAG_SAMPLE_MS * u64::from(i));
        engine.update_drag(POINTER, x * f, y * f, at);
    }
    engine.end_drag(POINTER);
}

/// Let background work run for `duration`
async fn wait(engine: &mut SwipeEngine, duration: Duration) {
    let deadline = Instant::now() + duration;
    loop {
        tokio::select! {
            _ = sleep_until(deadline) => break,
            _ = engine.process_next_internal() => {}
        }
    }
}

/// Log every event as JSON until the bus closes
pub async fn log_events(mut rx: broadcast::Receiver<MatchEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => info!(kind = event.kind(), "{}", json),
                Err(e) => warn!(error = %e, "Failed to serialize event"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
