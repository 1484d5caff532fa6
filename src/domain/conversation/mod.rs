//! Conversation domain module.
//!
//! Drives the guided intake: which phase a turn lands in, what the assistant
//! should talk about, and when the risk verdict is computed.

mod directive;
mod engine;
mod message;
mod orchestrator;
mod phase;
mod state;

pub use directive::{AssistantDirective, ReplyMode};
pub use engine::PhaseTransitionEngine;
pub use message::{recent_history, ChatMessage, Role};
pub use orchestrator::{TurnError, TurnInput, TurnOrchestrator, TurnOutcome};
pub use phase::{Phase, PhaseTag};
pub use state::SessionState;
