//! Boundary validation of intake values.
//!
//! The risk engine only rejects non-finite input and non-positive frequency.
//! Range checks against the collection bounds happen here, before values
//! reach the session.

use serde::{Deserialize, Serialize};

use super::{Intake, IntakeField};
use crate::domain::foundation::ValidationError;

/// Inclusive range accepted for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Accepted ranges for the measured fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeBounds {
    pub hand_height: FieldRange,
    pub distance: FieldRange,
    pub frequency: FieldRange,
}

impl Default for IntakeBounds {
    fn default() -> Self {
        Self {
            hand_height: FieldRange::new(0.0, 2.5),
            distance: FieldRange::new(0.1, 100.0),
            frequency: FieldRange::new(0.1, 60.0),
        }
    }
}

impl IntakeBounds {
    /// Validates every present field. Absent fields are not an error here.
    pub fn validate(&self, intake: &Intake) -> Result<(), ValidationError> {
        let fields = [
            (IntakeField::InitialForce, intake.initial_force),
            (IntakeField::SustainedForce, intake.sustained_force),
            (IntakeField::HandHeight, intake.hand_height),
            (IntakeField::Distance, intake.distance),
            (IntakeField::Frequency, intake.frequency),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                self.check(field, value)?;
            }
        }
        Ok(())
    }

    /// Splits an intake into its in-bounds values and the violations.
    ///
    /// Offending fields are cleared; everything else is kept.
    pub fn retain_valid(&self, mut intake: Intake) -> (Intake, Vec<ValidationError>) {
        let mut violations = Vec::new();
        let checks: [(IntakeField, &mut Option<f64>); 5] = [
            (IntakeField::InitialForce, &mut intake.initial_force),
            (IntakeField::SustainedForce, &mut intake.sustained_force),
            (IntakeField::HandHeight, &mut intake.hand_height),
            (IntakeField::Distance, &mut intake.distance),
            (IntakeField::Frequency, &mut intake.frequency),
        ];
        for (field, slot) in checks {
            if let Some(value) = *slot {
                if let Err(err) = self.check(field, value) {
                    violations.push(err);
                    *slot = None;
                }
            }
        }
        (intake, violations)
    }

    fn check(&self, field: IntakeField, value: f64) -> Result<(), ValidationError> {
        match field {
            IntakeField::InitialForce | IntakeField::SustainedForce => positive(field, value),
            IntakeField::HandHeight => within(field, value, self.hand_height),
            IntakeField::Distance => within(field, value, self.distance),
            IntakeField::Frequency => within(field, value, self.frequency),
            IntakeField::Action => Ok(()),
        }
    }
}

fn finite(field: IntakeField, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::non_finite(field.name(), value))
    }
}

fn positive(field: IntakeField, value: f64) -> Result<(), ValidationError> {
    if finite(field, value)? > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::not_positive(field.name(), value))
    }
}

fn within(field: IntakeField, value: f64, range: FieldRange) -> Result<(), ValidationError> {
    if range.contains(finite(field, value)?) {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(
            field.name(),
            range.min,
            range.max,
            value,
        ))
    }
}
