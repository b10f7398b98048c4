//! Engine actor loop and its command handle
//!
//! [`SwipeEngine::spawn`] moves the engine onto its own task. The loop
//! multiplexes host commands with internal completions, so every state
//! change still happens on a single task.

use super::controller::{Key, SwipeEngine};
use super::gesture::PointerId;
use crate::error::{Error, Result};
use matchdeck_common::events::{EventBus, MatchEvent};
use matchdeck_common::{Candidate, DecisionId, Direction, QueueKind};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, Instrument};

/// Host commands accepted by the engine loop
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Reset {
        candidates: Vec<Candidate>,
        kind: QueueKind,
    },
    BeginDrag {
        pointer_id: PointerId,
        x: f64,
        y: f64,
        at: Instant,
    },
    UpdateDrag {
        pointer_id: PointerId,
        x: f64,
        y: f64,
        at: Instant,
    },
    EndDrag {
        pointer_id: PointerId,
    },
    CancelDrag,
    Swipe(Direction),
    Key(Key),
    Undo {
        expected: Option<DecisionId>,
    },
    Redo,
    SetDisabled(bool),
    Shutdown,
}

impl SwipeEngine {
    /// Apply one host command
    pub fn execute(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Reset { candidates, kind } => self.reset(candidates, kind),
            EngineCommand::BeginDrag {
                pointer_id,
                x,
                y,
                at,
            } => {
                self.begin_drag(pointer_id, x, y, at);
            }
            EngineCommand::UpdateDrag {
                pointer_id,
                x,
                y,
                at,
            } => {
                self.update_drag(pointer_id, x, y, at);
            }
            EngineCommand::EndDrag { pointer_id } => {
                self.end_drag(pointer_id);
            }
            EngineCommand::CancelDrag => {
                self.cancel_drag();
            }
            EngineCommand::Swipe(direction) => {
                self.trigger_swipe(direction);
            }
            EngineCommand::Key(key) => {
                self.handle_key(key);
            }
            EngineCommand::Undo { expected } => {
                self.undo(expected.as_ref());
            }
            EngineCommand::Redo => {
                self.redo();
            }
            EngineCommand::SetDisabled(disabled) => self.set_disabled(disabled),
            // Handled by the loop
            EngineCommand::Shutdown => {}
        }
    }

    /// Drive the engine until `Shutdown` or every handle is dropped
    pub async fn run(mut self, mut commands: mpsc::Receiver<EngineCommand>) {
        let span = self.span().clone();
        async move {
            info!("Swipe engine loop started");
            loop {
                tokio::select! {
                    command = commands.recv() => match command {
                        Some(EngineCommand::Shutdown) | None => break,
                        Some(command) => self.execute(command),
                    },
                    Some(event) = self.internal_rx_mut().recv() => {
                        self.handle_internal(event);
                    }
                }
            }
            info!("Swipe engine loop stopped");
        }
        .instrument(span)
        .await
    }

    /// Move the engine onto its own task
    pub fn spawn(self, command_capacity: usize) -> (EngineHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(command_capacity);
        let handle = EngineHandle {
            commands: tx,
            bus: self.event_bus().clone(),
        };
        let task = tokio::spawn(self.run(rx));
        (handle, task)
    }
}

/// Cloneable sender for a spawned engine
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<EngineCommand>,
    bus: EventBus,
}

impl EngineHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.bus.subscribe()
    }

    pub async fn send(&self, command: EngineCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::InvalidState("engine loop has stopped".to_string()))
    }

    pub async fn reset(&self, candidates: Vec<Candidate>, kind: QueueKind) -> Result<()> {
        self.send(EngineCommand::Reset { candidates, kind }).await
    }

    /// Stamps the event with the current instant
    pub async fn begin_drag(&self, pointer_id: PointerId, x: f64, y: f64) -> Result<()> {
        self.send(EngineCommand::BeginDrag {
            pointer_id,
            x,
            y,
            at: Instant::now(),
        })
        .await
    }

    /// Stamps the event with the current instant
    pub async fn update_drag(&self, pointer_id: PointerId, x: f64, y: f64) -> Result<()> {
        self.send(EngineCommand::UpdateDrag {
            pointer_id,
            x,
            y,
            at: Instant::now(),
        })
        .await
    }

    pub async fn end_drag(&self, pointer_id: PointerId) -> Result<()> {
        self.send(EngineCommand::EndDrag { pointer_id }).await
    }

    pub async fn swipe(&self, direction: Direction) -> Result<()> {
        self.send(EngineCommand::Swipe(direction)).await
    }

    pub async fn key(&self, key: Key) -> Result<()> {
        self.send(EngineCommand::Key(key)).await
    }

    pub async fn undo(&self, expected: Option<DecisionId>) -> Result<()> {
        self.send(EngineCommand::Undo { expected }).await
    }

    pub async fn redo(&self) -> Result<()> {
        self.send(EngineCommand::Redo).await
    }

    pub async fn set_disabled(&self, disabled: bool) -> Result<()> {
        self.send(EngineCommand::SetDisabled(disabled)).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        debug!("Engine shutdown requested");
        self.send(EngineCommand::Shutdown).await
    }
}
