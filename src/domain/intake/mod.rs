//! Intake Module - structured measurements collected during the conversation.
//!
//! Fields are nullable until the user supplies them. Once every required
//! field is present the intake can be frozen into [`TaskMeasurements`] for
//! the risk engine.

mod bounds;
mod form;
#[allow(clippy::module_inception)]
mod intake;

pub use bounds::{FieldRange, IntakeBounds};
pub use form::{IntakeForm, NumericInput};
pub use intake::{
    missing_required_fields, IncompleteIntake, Intake, IntakeField, TaskAction,
    TaskMeasurements, WorkEnvironment, REQUIRED_FIELDS,
};
