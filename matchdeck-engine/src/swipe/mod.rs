//! Swipe-decision engine
//!
//! Leaf components first: the gesture tracker and the decision history are
//! synchronous state machines, the insight orchestrator owns the only
//! asynchronous work, and the controller coordinates all three.

pub mod controller;
pub mod events;
pub mod gesture;
pub mod handle;
pub mod history;
pub mod insight;
pub mod preview;
pub mod timers;

pub use controller::{Key, SwipeEngine};
pub use events::{InsightOutcome, InternalEvent};
pub use gesture::{GestureTracker, PointerId};
pub use handle::{EngineCommand, EngineHandle};
pub use history::DecisionHistory;
pub use insight::{fetch_insight, InsightOrchestrator, InsightView};
pub use preview::{trait_sequence, FALLBACK_TRAITS};
