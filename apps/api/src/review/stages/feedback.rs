//! Feedback — narrative assessment built from the profile and its analysis.

use serde_json::Value;

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SCHEMA_INSTRUCTION};
use crate::review::models::{AnalysisResult, ExtractedProfile, Feedback};
use crate::review::prompts::{fill_template, FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM};
use crate::review::stage::{decode, GenerationRequest, Stage, StageError};

pub fn build_request(
    extracted: &ExtractedProfile,
    analysis: &AnalysisResult,
) -> Result<GenerationRequest, serde_json::Error> {
    let cv_data = serde_json::to_string_pretty(extracted)?;
    let analysis_data = serde_json::to_string_pretty(analysis)?;
    Ok(GenerationRequest {
        system: format!("{FEEDBACK_SYSTEM} {JSON_ONLY_SYSTEM}"),
        prompt: fill_template(
            FEEDBACK_PROMPT_TEMPLATE,
            &[
                ("schema_instruction", SCHEMA_INSTRUCTION),
                ("cv_data", &cv_data),
                ("analysis_data", &analysis_data),
            ],
        ),
    })
}

/// Decodes the feedback. The five narrative fields must be present and non-blank.
pub fn interpret(value: Value) -> Result<Feedback, StageError> {
    let feedback: Feedback = decode(Stage::Feedback, value)?;
    let narrative = [
        ("general_feedback", &feedback.general_feedback),
        ("experience_feedback", &feedback.experience_feedback),
        ("skills_feedback", &feedback.skills_feedback),
        ("education_feedback", &feedback.education_feedback),
        ("presentation_feedback", &feedback.presentation_feedback),
    ];
    if let Some((field, _)) = narrative.iter().find(|(_, text)| text.trim().is_empty()) {
        return Err(StageError::SchemaViolation {
            stage: Stage::Feedback,
            detail: format!("{field} is empty"),
        });
    }
    Ok(feedback)
}

pub fn fallback() -> Feedback {
    Feedback {
        general_feedback:
            "Feedback generation could not be completed due to technical issues.".to_string(),
        experience_feedback: "Unable to provide specific experience feedback.".to_string(),
        skills_feedback: "Unable to provide specific skills feedback.".to_string(),
        education_feedback: "Unable to provide specific education feedback.".to_string(),
        presentation_feedback: "Unable to provide specific presentation feedback.".to_string(),
        specific_improvements: vec!["Please review the CV manually for improvements".to_string()],
        positive_aspects: vec!["CV contains valuable information".to_string()],
    }
}
