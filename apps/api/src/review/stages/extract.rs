//! Extract — raw CV text to a structured profile.

use serde_json::Value;

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SCHEMA_INSTRUCTION};
use crate::review::models::ExtractedProfile;
use crate::review::prompts::{fill_template, EXTRACTION_PROMPT_TEMPLATE, EXTRACTION_SYSTEM};
use crate::review::stage::{decode, GenerationRequest, Stage, StageError};

pub const FALLBACK_NAME: &str = "Could not extract";

pub fn build_request(source_text: &str) -> GenerationRequest {
    GenerationRequest {
        system: format!("{EXTRACTION_SYSTEM} {JSON_ONLY_SYSTEM}"),
        prompt: fill_template(
            EXTRACTION_PROMPT_TEMPLATE,
            &[
                ("schema_instruction", SCHEMA_INSTRUCTION),
                ("cv_text", source_text),
            ],
        ),
    }
}

pub fn interpret(value: Value) -> Result<ExtractedProfile, StageError> {
    decode(Stage::Extract, value)
}

/// Empty profile; `raw_text` is filled in from the record when applied.
pub fn fallback() -> ExtractedProfile {
    ExtractedProfile {
        name: Some(FALLBACK_NAME.to_string()),
        ..ExtractedProfile::default()
    }
}
