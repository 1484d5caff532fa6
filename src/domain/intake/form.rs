//! Loosely typed intake input.
//!
//! Form boxes and model replies send numbers either as JSON numbers or as
//! strings. Both are read into [`IntakeForm`] and converted to an [`Intake`].

use serde::{Deserialize, Serialize};

use super::{Intake, IntakeField, TaskAction, WorkEnvironment};
use crate::domain::foundation::ValidationError;

/// A number as sent by a client: `12`, `"12"`, or `" 12.5 "`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Blank text reads as absent.
    pub fn parse(&self, field: IntakeField) -> Result<Option<f64>, ValidationError> {
        match self {
            NumericInput::Number(n) => Ok(Some(*n)),
            NumericInput::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(None);
                }
                text.parse::<f64>().map(Some).map_err(|_| {
                    ValidationError::invalid_format(
                        field.name(),
                        format!("'{}' is not a number", text),
                    )
                })
            }
        }
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

/// Intake fields before type checking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeForm {
    pub action: Option<String>,
    pub initial_force: Option<NumericInput>,
    pub sustained_force: Option<NumericInput>,
    pub hand_height: Option<NumericInput>,
    pub distance: Option<NumericInput>,
    pub frequency: Option<NumericInput>,
    pub force_unit: Option<String>,
    pub height_unit: Option<String>,
    pub distance_unit: Option<String>,
    pub frequency_unit: Option<String>,
    pub environment: WorkEnvironment,
}

impl IntakeForm {
    /// Converts every field, failing on the first malformed one.
    pub fn into_intake(self) -> Result<Intake, ValidationError> {
        let (intake, mut errors) = self.into_intake_lenient();
        if errors.is_empty() {
            Ok(intake)
        } else {
            Err(errors.remove(0))
        }
    }

    /// Converts what it can; malformed fields are left empty and reported.
    pub fn into_intake_lenient(self) -> (Intake, Vec<ValidationError>) {
        let mut errors = Vec::new();

        let action = match self.action.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => raw
                .parse::<TaskAction>()
                .map_err(|err| errors.push(err))
                .ok(),
        };

        let mut number = |field: IntakeField, input: Option<NumericInput>| {
            input.and_then(|value| value.parse(field).unwrap_or_else(|err| {
                errors.push(err);
                None
            }))
        };

        let initial_force = number(IntakeField::InitialForce, self.initial_force);
        let sustained_force = number(IntakeField::SustainedForce, self.sustained_force);
        let hand_height = number(IntakeField::HandHeight, self.hand_height);
        let distance = number(IntakeField::Distance, self.distance);
        let frequency = number(IntakeField::Frequency, self.frequency);

        let intake = Intake {
            action,
            initial_force,
            sustained_force,
            hand_height,
            distance,
            frequency,
            force_unit: self.force_unit,
            height_unit: self.height_unit,
            distance_unit: self.distance_unit,
            frequency_unit: self.frequency_unit,
            environment: self.environment,
        };
        (intake, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(json: &str) -> IntakeForm {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let intake = form(
            r#"{"action":"Push","initialForce":"22.5","handHeight":1,"distance":" 5 ","frequency":null}"#,
        )
        .into_intake()
        .unwrap();

        assert_eq!(intake.action, Some(TaskAction::Push));
        assert_eq!(intake.initial_force, Some(22.5));
        assert_eq!(intake.hand_height, Some(1.0));
        assert_eq!(intake.distance, Some(5.0));
        assert_eq!(intake.frequency, None);
    }

    #[test]
    fn blank_strings_are_absent() {
        let intake = form(r#"{"action":"","sustainedForce":"  "}"#).into_intake().unwrap();
        assert_eq!(intake.action, None);
        assert_eq!(intake.sustained_force, None);
    }

    #[test]
    fn strict_conversion_rejects_non_numeric_text() {
        let err = form(r#"{"distance":"far"}"#).into_intake().unwrap_err();
        assert_eq!(err.field(), "distance");
    }

    #[test]
    fn strict_conversion_rejects_unknown_action() {
        let err = form(r#"{"action":"lift"}"#).into_intake().unwrap_err();
        assert_eq!(err.field(), "action");
    }

    #[test]
    fn lenient_conversion_keeps_good_fields() {
        let (intake, errors) =
            form(r#"{"action":"pull","frequency":"often","distance":3}"#).into_intake_lenient();
        assert_eq!(intake.action, Some(TaskAction::Pull));
        assert_eq!(intake.distance, Some(3.0));
        assert_eq!(intake.frequency, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field(), "frequency");
    }

    #[test]
    fn carries_units_and_environment() {
        let intake = form(r#"{"forceUnit":"lb","environment":{"surface":"tile"}}"#)
            .into_intake()
            .unwrap();
        assert_eq!(intake.force_unit.as_deref(), Some("lb"));
        assert_eq!(intake.environment.surface.as_deref(), Some("tile"));
    }
}
