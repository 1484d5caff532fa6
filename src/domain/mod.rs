//! Domain layer containing the pure core.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (validation errors, codes, state machine)
//! - `risk` - Push/pull exertion risk computation
//! - `intake` - Measurements collected during the conversation
//! - `conversation` - Phases, session state and the turn orchestrator
//! - `retrieval` - Solution-database request and result shapes

pub mod conversation;
pub mod foundation;
pub mod intake;
pub mod retrieval;
pub mod risk;
