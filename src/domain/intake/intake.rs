//! Intake - measured parameters of one push/pull task.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Direction of the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Push,
    Pull,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskAction::Push => "push",
            TaskAction::Pull => "pull",
        }
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "push" => Ok(TaskAction::Push),
            "pull" => Ok(TaskAction::Pull),
            other => Err(ValidationError::invalid_format(
                IntakeField::Action.name(),
                format!("expected 'push' or 'pull', got '{}'", other),
            )),
        }
    }
}

/// A measured intake field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntakeField {
    Action,
    InitialForce,
    SustainedForce,
    HandHeight,
    Distance,
    Frequency,
}

/// Fields that must be present before the task can be assessed.
///
/// Sustained force is collected but not required.
pub const REQUIRED_FIELDS: [IntakeField; 5] = [
    IntakeField::Action,
    IntakeField::InitialForce,
    IntakeField::HandHeight,
    IntakeField::Distance,
    IntakeField::Frequency,
];

impl IntakeField {
    /// Wire name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            IntakeField::Action => "action",
            IntakeField::InitialForce => "initialForce",
            IntakeField::SustainedForce => "sustainedForce",
            IntakeField::HandHeight => "handHeight",
            IntakeField::Distance => "distance",
            IntakeField::Frequency => "frequency",
        }
    }

    pub fn is_required(&self) -> bool {
        REQUIRED_FIELDS.contains(self)
    }
}

impl fmt::Display for IntakeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Free-text context about where the task happens. Used for retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkEnvironment {
    pub summary: Option<String>,
    pub surface: Option<String>,
    pub slope: Option<String>,
    pub load_type: Option<String>,
    pub constraints: Option<String>,
}

impl WorkEnvironment {
    pub fn is_empty(&self) -> bool {
        self.descriptors().next().is_none()
    }

    /// Non-empty descriptors in a fixed order.
    pub fn descriptors(&self) -> impl Iterator<Item = &str> {
        [
            &self.summary,
            &self.surface,
            &self.slope,
            &self.load_type,
            &self.constraints,
        ]
        .into_iter()
        .filter_map(|value| value.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    }

    fn merge(&mut self, update: &WorkEnvironment) {
        merge_field(&mut self.summary, &update.summary);
        merge_field(&mut self.surface, &update.surface);
        merge_field(&mut self.slope, &update.slope);
        merge_field(&mut self.load_type, &update.load_type);
        merge_field(&mut self.constraints, &update.constraints);
    }
}

/// Task measurements as collected so far. Every field is nullable until known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Intake {
    pub action: Option<TaskAction>,
    pub initial_force: Option<f64>,
    pub sustained_force: Option<f64>,
    pub hand_height: Option<f64>,
    pub distance: Option<f64>,
    pub frequency: Option<f64>,

    pub force_unit: Option<String>,
    pub height_unit: Option<String>,
    pub distance_unit: Option<String>,
    pub frequency_unit: Option<String>,

    pub environment: WorkEnvironment,
}

impl Intake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the field has been collected.
    pub fn has(&self, field: IntakeField) -> bool {
        match field {
            IntakeField::Action => self.action.is_some(),
            IntakeField::InitialForce => self.initial_force.is_some(),
            IntakeField::SustainedForce => self.sustained_force.is_some(),
            IntakeField::HandHeight => self.hand_height.is_some(),
            IntakeField::Distance => self.distance.is_some(),
            IntakeField::Frequency => self.frequency.is_some(),
        }
    }

    /// Required fields still missing, in collection order.
    pub fn missing_required_fields(&self) -> Vec<IntakeField> {
        missing_required_fields(self)
    }

    pub fn is_complete(&self) -> bool {
        REQUIRED_FIELDS.iter().all(|field| self.has(*field))
    }

    /// Returns true if any measured field carries a value.
    pub fn has_structured_input(&self) -> bool {
        self.action.is_some()
            || self.initial_force.is_some()
            || self.sustained_force.is_some()
            || self.hand_height.is_some()
            || self.distance.is_some()
            || self.frequency.is_some()
    }

    /// Overwrites fields that are present in `update`; others are kept.
    pub fn merge(&mut self, update: &Intake) {
        if update.action.is_some() {
            self.action = update.action;
        }
        merge_number(&mut self.initial_force, update.initial_force);
        merge_number(&mut self.sustained_force, update.sustained_force);
        merge_number(&mut self.hand_height, update.hand_height);
        merge_number(&mut self.distance, update.distance);
        merge_number(&mut self.frequency, update.frequency);
        merge_field(&mut self.force_unit, &update.force_unit);
        merge_field(&mut self.height_unit, &update.height_unit);
        merge_field(&mut self.distance_unit, &update.distance_unit);
        merge_field(&mut self.frequency_unit, &update.frequency_unit);
        self.environment.merge(&update.environment);
    }

    /// Freezes the intake into measurements that can be assessed.
    pub fn freeze(&self) -> Result<TaskMeasurements, IncompleteIntake> {
        match (
            self.action,
            self.initial_force,
            self.hand_height,
            self.distance,
            self.frequency,
        ) {
            (Some(action), Some(initial_force), Some(hand_height), Some(distance), Some(frequency)) => {
                Ok(TaskMeasurements {
                    action,
                    initial_force,
                    sustained_force: self.sustained_force,
                    hand_height,
                    distance,
                    frequency,
                })
            }
            _ => Err(IncompleteIntake {
                missing: self.missing_required_fields(),
            }),
        }
    }
}

/// Required fields absent from `intake`. Never includes sustained force.
pub fn missing_required_fields(intake: &Intake) -> Vec<IntakeField> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !intake.has(*field))
        .collect()
}

fn merge_number(target: &mut Option<f64>, update: Option<f64>) {
    if update.is_some() {
        *target = update;
    }
}

fn merge_field(target: &mut Option<String>, update: &Option<String>) {
    if let Some(value) = update {
        if !value.trim().is_empty() {
            *target = Some(value.clone());
        }
    }
}

/// Intake was frozen before every required field was collected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Intake is missing required fields: {}", format_fields(.missing))]
pub struct IncompleteIntake {
    pub missing: Vec<IntakeField>,
}

fn format_fields(fields: &[IntakeField]) -> String {
    fields
        .iter()
        .map(IntakeField::name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A complete intake, frozen for assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMeasurements {
    pub action: TaskAction,
    pub initial_force: f64,
    pub sustained_force: Option<f64>,
    pub hand_height: f64,
    pub distance: f64,
    pub frequency: f64,
}
