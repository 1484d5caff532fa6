//! Prompt templates for the Ergo assistant.

use crate::domain::conversation::{AssistantDirective, Phase};
use crate::domain::intake::{Intake, IntakeField};
use crate::domain::retrieval::build_context_block;
use crate::domain::risk::RiskResult;

pub const INTRODUCE_PROMPT: &str = "\
You are Ergo, a helpful ergonomics assistant. You should respond to the message sent by the user.

Make sure to speak in a conversational tone and be sure to introduce yourself and state your intent to the user.";

pub const CLARIFY_PROMPT: &str = "\
You are Ergo, a helpful assistant.

Your job is to help the user discover solutions to the ergonomics issues surrounding a specific task within their job.
The task will always be either a push or a pull task.

The user will need to provide the type of task, the initial force needed to get the object moving,
the sustained force needed to keep it moving, the height of the worker's hands above the ground,
the distance that the object is pushed, and the frequency with which the action is performed.

To be able to solve the problem accurately, you should prompt the user to provide any missing inputs.
Please do this in a conversational way, ideally by only asking for one piece of information at a time.";

pub const CONFIRM_PROMPT: &str = "\
You are Ergo, a helpful ergonomics assistant.

You have collected every measurement needed to assess a push or pull task.
Repeat the collected values back to the user in a short list, with units where known,
and ask them to confirm before you run the assessment.";

pub const RESULT_PROMPT: &str = "\
You are Ergo, a helpful ergonomics assistant.

You have assessed the user's push or pull task against a population capacity model.
Explain the verdict plainly. If the task is not acceptable, say what share of workers
would be fatigued and which inputs contribute most to the risk. Do not invent numbers;
use only the figures given.";

pub const SOLVE_PROMPT: &str = "\
You are Ergo, a helpful ergonomics assistant.

At this point, you likely have all of the inputs from the user regarding a task that they want
you to help develop a solution for. You should also have access to some context from a solution database
which should provide some solutions that are relevant to the user's problem.

Please devise a list of 3 specific solutions from the context block and cite the source blocks next to each solution.";

pub const CHAT_PROMPT: &str = "You are a helpful chat bot named Ergo.";

/// System prompt for the phase the directive lands in.
pub fn system_prompt(directive: &AssistantDirective) -> &'static str {
    match directive.phase.known() {
        Some(Phase::Intro) => INTRODUCE_PROMPT,
        Some(Phase::Intake) => CLARIFY_PROMPT,
        Some(Phase::ConfirmCalc) => CONFIRM_PROMPT,
        Some(Phase::Calc) | Some(Phase::Interpret) => RESULT_PROMPT,
        Some(Phase::RetrieveSolve) => SOLVE_PROMPT,
        None => CHAT_PROMPT,
    }
}

/// User-turn content for the directive.
pub fn user_prompt(directive: &AssistantDirective) -> String {
    let message = directive.message.trim();
    match directive.phase.known() {
        Some(Phase::Intake) => format!(
            "Missing fields:\n{}\n\nAlready collected:\n{}\n\nLatest user message:\n{}",
            missing_list(&directive.missing_fields),
            collected_json(&directive.intake),
            message
        ),
        Some(Phase::ConfirmCalc) => format!(
            "Collected measurements:\n{}\n\nLatest user message:\n{}",
            describe_intake(&directive.intake),
            message
        ),
        Some(Phase::Calc) | Some(Phase::Interpret) => {
            let verdict = directive
                .calc
                .as_ref()
                .map(describe_verdict)
                .unwrap_or_else(|| "No assessment is available.".to_string());
            format!("Assessment:\n{}\n\nLatest user message:\n{}", verdict, message)
        }
        Some(Phase::RetrieveSolve) => format!(
            "Latest user message:\n{}\n\nContext block: (these are the most relevant solutions that were pulled from our database)\n{}",
            message,
            build_context_block(&directive.sources)
        ),
        Some(Phase::Intro) | None => message.to_string(),
    }
}

fn missing_list(fields: &[IntakeField]) -> String {
    let names: Vec<&str> = fields.iter().map(IntakeField::name).collect();
    serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
}

fn collected_json(intake: &Intake) -> String {
    serde_json::to_string(intake).unwrap_or_else(|_| "{}".to_string())
}

fn with_unit(value: f64, unit: Option<&str>) -> String {
    match unit {
        Some(unit) if !unit.trim().is_empty() => format!("{} {}", value, unit.trim()),
        _ => value.to_string(),
    }
}

/// One line per collected measurement.
pub fn describe_intake(intake: &Intake) -> String {
    let mut lines = Vec::new();
    if let Some(action) = intake.action {
        lines.push(format!("- Action: {}", action));
    }
    let force_unit = intake.force_unit.as_deref();
    let rows = [
        ("Initial force", intake.initial_force, force_unit),
        ("Sustained force", intake.sustained_force, force_unit),
        ("Hand height", intake.hand_height, intake.height_unit.as_deref()),
        ("Distance", intake.distance, intake.distance_unit.as_deref()),
        ("Frequency", intake.frequency, intake.frequency_unit.as_deref()),
    ];
    for (label, value, unit) in rows {
        if let Some(value) = value {
            lines.push(format!("- {}: {}", label, with_unit(value, unit)));
        }
    }
    let environment: Vec<&str> = intake.environment.descriptors().collect();
    if !environment.is_empty() {
        lines.push(format!("- Environment: {}", environment.join("; ")));
    }
    lines.join("\n")
}

/// Plain-text rendering of a verdict for the result prompt.
pub fn describe_verdict(result: &RiskResult) -> String {
    let mut lines = vec![
        result.summary.clone(),
        format!("Maximum acceptable load: {:.2}", result.max_acceptable_load),
        format!(
            "Acceptable force threshold: {:.2}",
            result.acceptable_force_threshold
        ),
    ];
    if let Some(fatigued) = result.percent_workers_fatigued {
        lines.push(format!("Workers fatigued: {}", fatigued));
    }
    if !result.contributions.is_empty() {
        lines.push("Contributions:".to_string());
        for contribution in &result.contributions {
            lines.push(format!(
                "- {}: {:.0}%",
                contribution.factor.label(),
                contribution.rounded_share() * 100.0
            ));
        }
    }
    lines.join("\n")
}
