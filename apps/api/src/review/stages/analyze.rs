//! Analyze — scored assessment of the extracted profile.

use serde_json::{Map, Value};

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SCHEMA_INSTRUCTION};
use crate::review::models::{AnalysisResult, ExtractedProfile};
use crate::review::prompts::{fill_template, ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::review::stage::{decode, GenerationRequest, Stage, StageError};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;
pub const FALLBACK_SCORE: f64 = 50.0;
const NOT_COMPLETED: &str = "Analysis could not be completed";

pub fn build_request(extracted: &ExtractedProfile) -> Result<GenerationRequest, serde_json::Error> {
    let cv_data = serde_json::to_string_pretty(extracted)?;
    Ok(GenerationRequest {
        system: format!("{ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}"),
        prompt: fill_template(
            ANALYSIS_PROMPT_TEMPLATE,
            &[
                ("schema_instruction", SCHEMA_INSTRUCTION),
                ("cv_data", &cv_data),
            ],
        ),
    })
}

/// Decodes the analysis and rejects scores outside [0, 100]. Scores are
/// never clamped: an out-of-range score means the reply is untrustworthy.
pub fn interpret(value: Value) -> Result<AnalysisResult, StageError> {
    let analysis: AnalysisResult = decode(Stage::Analyze, value)?;
    let score = analysis.overall_score;
    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(StageError::SchemaViolation {
            stage: Stage::Analyze,
            detail: format!("overall_score {score} is outside [{MIN_SCORE}, {MAX_SCORE}]"),
        });
    }
    Ok(analysis)
}

pub fn fallback() -> AnalysisResult {
    AnalysisResult {
        overall_score: FALLBACK_SCORE,
        strengths: vec![NOT_COMPLETED.to_string()],
        weaknesses: vec![NOT_COMPLETED.to_string()],
        experience_analysis: Map::new(),
        skills_analysis: Map::new(),
        education_analysis: Map::new(),
        market_alignment: Map::new(),
        years_experience: None,
        seniority_level: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::review::parser::parse_response;
    use crate::review::testing::ANALYSIS_REPLY;

    #[test]
    fn test_prompt_contains_profile_json() {
        let profile = ExtractedProfile {
            name: Some("Jane Doe".to_string()),
            certifications: vec!["CKA".to_string()],
            ..ExtractedProfile::default()
        };
        let request = build_request(&profile).unwrap();
        assert!(request.prompt.contains("\"certifications\": [\n    \"CKA\"\n  ]"));
        assert!(request.prompt.contains("overall_score"));
    }

    #[test]
    fn test_interpret_fenced_reply() {
        let analysis = interpret(parse_response(ANALYSIS_REPLY).unwrap()).unwrap();
        assert_eq!(analysis.overall_score, 87.5);
        assert_eq!(analysis.strengths.len(), 2);
        assert_eq!(analysis.years_experience, Some(6));
        assert_eq!(analysis.seniority_level.as_deref(), Some("senior"));
        assert_eq!(analysis.market_alignment["assessment"], "well aligned");
    }

    #[test]
    fn test_interpret_accepts_bounds() {
        for score in [0.0, 100.0] {
            let analysis = interpret(json!({"overall_score": score})).unwrap();
            assert_eq!(analysis.overall_score, score);
        }
    }

    #[test]
    fn test_interpret_rejects_out_of_range_score() {
        for score in [-1.0, 100.5, 870.0] {
            let err = interpret(json!({"overall_score": score})).unwrap_err();
            assert!(err.to_string().contains("outside [0, 100]"));
        }
    }

    #[test]
    fn test_interpret_rejects_wrong_types() {
        assert!(interpret(json!({"overall_score": "87"})).is_err());
        assert!(interpret(json!({"overall_score": 80, "strengths": "many"})).is_err());
        assert!(interpret(json!({"strengths": []})).is_err());
    }

    #[test]
    fn test_fallback_shape() {
        let analysis = fallback();
        assert_eq!(analysis.overall_score, 50.0);
        assert_eq!(analysis.strengths, vec![NOT_COMPLETED.to_string()]);
        assert_eq!(analysis.weaknesses.len(), 1);
        assert!(analysis.skills_analysis.is_empty());
        assert!(analysis.market_alignment.is_empty());
    }
}
