//! Narrative Adapters.
//!
//! Implementations of the NarrativeGenerator and IntakeExtractor ports.
//!
//! ## Available Adapters
//!
//! - `LlmNarrator` - Phase-specific prompts sent to a LanguageModel
//! - `LlmIntakeExtractor` - JSON-mode intake parsing through a LanguageModel
//! - `TemplateNarrator` / `ScriptedIntakeExtractor` - Deterministic doubles

mod json_reply;
mod llm_intake_extractor;
mod llm_narrator;
pub mod prompts;
mod scripted;

pub use json_reply::extract_json_object;
pub use llm_intake_extractor::{history_to_text, parse_extraction, LlmIntakeExtractor, EXTRACTION_PROMPT};
pub use llm_narrator::{LlmNarrator, DEFAULT_HISTORY_LIMIT};
pub use scripted::{ScriptedIntakeExtractor, TemplateNarrator};
