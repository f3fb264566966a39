//! Recommend — career guidance from profile, analysis and feedback.

use serde_json::Value;

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SCHEMA_INSTRUCTION};
use crate::review::models::{AnalysisResult, ExtractedProfile, Feedback, Recommendations};
use crate::review::prompts::{fill_template, RECOMMENDATION_PROMPT_TEMPLATE, RECOMMENDATION_SYSTEM};
use crate::review::stage::{decode, GenerationRequest, Stage, StageError};

pub fn build_request(
    extracted: &ExtractedProfile,
    analysis: &AnalysisResult,
    feedback: &Feedback,
) -> Result<GenerationRequest, serde_json::Error> {
    let cv_data = serde_json::to_string_pretty(extracted)?;
    let analysis_data = serde_json::to_string_pretty(analysis)?;
    let feedback_data = serde_json::to_string_pretty(feedback)?;
    Ok(GenerationRequest {
        system: format!("{RECOMMENDATION_SYSTEM} {JSON_ONLY_SYSTEM}"),
        prompt: fill_template(
            RECOMMENDATION_PROMPT_TEMPLATE,
            &[
                ("schema_instruction", SCHEMA_INSTRUCTION),
                ("cv_data", &cv_data),
                ("analysis_data", &analysis_data),
                ("feedback_data", &feedback_data),
            ],
        ),
    })
}

pub fn interpret(value: Value) -> Result<Recommendations, StageError> {
    decode(Stage::Recommend, value)
}

pub fn fallback() -> Recommendations {
    let one = |s: &str| vec![s.to_string()];
    Recommendations {
        skill_development: one("Focus on developing relevant technical and soft skills"),
        experience_gaps: one("Consider gaining more experience in key areas"),
        career_path_suggestions: one("Explore opportunities for career advancement"),
        immediate_actions: one("Review and update CV regularly"),
        long_term_goals: one("Set clear career objectives and milestones"),
        industry_trends: one("Stay updated with industry developments"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::review::parser::parse_response;
    use crate::review::stages::{analyze, extract, feedback};
    use crate::review::testing::RECOMMENDATION_REPLY;

    #[test]
    fn test_prompt_contains_all_three_inputs() {
        let request =
            build_request(&extract::fallback(), &analyze::fallback(), &feedback::fallback())
                .unwrap();
        assert!(request.prompt.contains(extract::FALLBACK_NAME));
        assert!(request.prompt.contains("Analysis could not be completed"));
        assert!(request.prompt.contains("Unable to provide specific skills feedback."));
    }

    #[test]
    fn test_placeholders_in_model_output_stay_literal() {
        let fb = Feedback {
            general_feedback: "Mention {cv_data} and {analysis_data} explicitly.".to_string(),
            ..feedback::fallback()
        };
        let request = build_request(&extract::fallback(), &analyze::fallback(), &fb).unwrap();
        assert!(request
            .prompt
            .contains("Mention {cv_data} and {analysis_data} explicitly."));
        assert_eq!(request.prompt.matches(extract::FALLBACK_NAME).count(), 1);
    }

    #[test]
    fn test_interpret_untagged_fence() {
        let recs = interpret(parse_response(RECOMMENDATION_REPLY).unwrap()).unwrap();
        assert_eq!(recs.career_path_suggestions, vec!["Staff engineer".to_string()]);
        assert_eq!(recs.industry_trends.len(), 1);
    }

    #[test]
    fn test_interpret_missing_lists_default_empty() {
        let recs = interpret(json!({"immediate_actions": ["Add a summary"]})).unwrap();
        assert!(recs.skill_development.is_empty());
        assert_eq!(recs.immediate_actions.len(), 1);
    }

    #[test]
    fn test_interpret_rejects_object_items() {
        let value = json!({"skill_development": [{"skill": "Go"}]});
        assert!(interpret(value).is_err());
    }

    #[test]
    fn test_fallback_fills_all_six_lists() {
        let recs = fallback();
        for list in [
            &recs.skill_development,
            &recs.experience_gaps,
            &recs.career_path_suggestions,
            &recs.immediate_actions,
            &recs.long_term_goals,
            &recs.industry_trends,
        ] {
            assert_eq!(list.len(), 1);
        }
    }
}
