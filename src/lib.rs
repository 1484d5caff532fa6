//! Ergo Intake - Conversational push/pull risk assessment
//!
//! This crate guides a user through describing a manual pushing or pulling
//! task, computes a psychophysical risk verdict for it, and answers follow-up
//! questions with solutions retrieved from a vector store.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
