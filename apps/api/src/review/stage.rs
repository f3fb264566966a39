//! Stage — one model-backed transformation step of the review pipeline.
//!
//! All four stages share one contract: check inputs, render a request, call
//! the generation client, interpret the reply, fall back on failure. The
//! per-stage templates, schemas and fallbacks live in `review::stages`.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::llm_client::{CallError, GenerationClient};
use crate::review::models::{
    AnalysisResult, ExtractedProfile, Feedback, ProcessingStatus, Recommendations, ReviewRecord,
};
use crate::review::parser::{parse_response, ParseError};
use crate::review::stages::{analyze, extract, feedback, recommend};

// ────────────────────────────────────────────────────────────────────────────
// Inputs and errors
// ────────────────────────────────────────────────────────────────────────────

/// A record field a stage may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    SourceText,
    Extracted,
    Analysis,
    Feedback,
}

impl RecordField {
    pub fn description(self) -> &'static str {
        match self {
            Self::SourceText => "source text",
            Self::Extracted => "extracted data",
            Self::Analysis => "analysis results",
            Self::Feedback => "feedback",
        }
    }

    pub fn is_present(self, record: &ReviewRecord) -> bool {
        match self {
            Self::SourceText => record.source_text().is_some(),
            Self::Extracted => record.extracted.is_some(),
            Self::Analysis => record.analysis.is_some(),
            Self::Feedback => record.feedback.is_some(),
        }
    }
}

fn describe_fields(fields: &[RecordField]) -> String {
    let names: Vec<_> = fields.iter().map(|f| f.description()).collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

#[derive(Debug, Error)]
pub enum StageError {
    /// A declared dependency is absent. Fatal: the driver halts.
    #[error("Missing {} for {stage}", describe_fields(.missing))]
    MissingInput {
        stage: Stage,
        missing: Vec<RecordField>,
    },

    #[error("generation call failed: {0}")]
    Call(#[from] CallError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("reply does not match the {stage} schema: {detail}")]
    SchemaViolation { stage: Stage, detail: String },

    #[error("failed to serialize {stage} input: {source}")]
    Input {
        stage: Stage,
        source: serde_json::Error,
    },
}

impl StageError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request / output types
// ────────────────────────────────────────────────────────────────────────────

/// What the generation client is sent for one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
}

/// The typed value a stage contributes to the record.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Extracted(ExtractedProfile),
    Analysis(AnalysisResult),
    Feedback(Feedback),
    Recommendations(Recommendations),
}

impl StageOutput {
    /// Writes the output into its slot. Extraction output always carries the
    /// record's own source text as `raw_text`.
    pub fn apply(self, record: &mut ReviewRecord) {
        match self {
            Self::Extracted(mut profile) => {
                profile.raw_text = record.source_text.clone().unwrap_or_default();
                record.extracted = Some(profile);
            }
            Self::Analysis(analysis) => record.analysis = Some(analysis),
            Self::Feedback(feedback) => record.feedback = Some(feedback),
            Self::Recommendations(recs) => record.recommendations = Some(recs),
        }
    }
}

/// How a stage run ended, as seen by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The model reply was used.
    Completed,
    /// The fallback was used and an error recorded; downstream may continue.
    Degraded,
    /// A required input was missing; nothing was called.
    Halted,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Analyze,
    Feedback,
    Recommend,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Extract => "extraction",
            Self::Analyze => "analysis",
            Self::Feedback => "feedback",
            Self::Recommend => "recommendations",
        })
    }
}

impl Stage {
    /// Pipeline order.
    pub const ALL: [Stage; 4] = [
        Stage::Extract,
        Stage::Analyze,
        Stage::Feedback,
        Stage::Recommend,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Extract => "Extraction",
            Self::Analyze => "Analysis",
            Self::Feedback => "Feedback",
            Self::Recommend => "Recommendation",
        }
    }

    pub fn required_inputs(self) -> &'static [RecordField] {
        match self {
            Self::Extract => &[RecordField::SourceText],
            Self::Analyze => &[RecordField::Extracted],
            Self::Feedback => &[RecordField::Extracted, RecordField::Analysis],
            Self::Recommend => &[
                RecordField::Extracted,
                RecordField::Analysis,
                RecordField::Feedback,
            ],
        }
    }

    pub fn running_status(self) -> ProcessingStatus {
        match self {
            Self::Extract => ProcessingStatus::Extracting,
            Self::Analyze => ProcessingStatus::Analyzing,
            Self::Feedback => ProcessingStatus::GeneratingFeedback,
            Self::Recommend => ProcessingStatus::GeneratingRecommendations,
        }
    }

    pub fn complete_status(self) -> ProcessingStatus {
        match self {
            Self::Extract => ProcessingStatus::ExtractionComplete,
            Self::Analyze => ProcessingStatus::AnalysisComplete,
            Self::Feedback => ProcessingStatus::FeedbackComplete,
            Self::Recommend => ProcessingStatus::RecommendComplete,
        }
    }

    pub fn missing_inputs(self, record: &ReviewRecord) -> Vec<RecordField> {
        self.required_inputs()
            .iter()
            .copied()
            .filter(|field| !field.is_present(record))
            .collect()
    }

    /// Renders the instruction template with the stage's inputs. Deterministic.
    pub fn build_request(self, record: &ReviewRecord) -> Result<GenerationRequest, StageError> {
        let missing = self.missing_inputs(record);
        if !missing.is_empty() {
            return Err(StageError::MissingInput {
                stage: self,
                missing,
            });
        }

        let to_input_error = |source: serde_json::Error| StageError::Input {
            stage: self,
            source,
        };

        // The missing-input check above guarantees every `Some` below.
        match (
            self,
            record.source_text(),
            record.extracted.as_ref(),
            record.analysis.as_ref(),
            record.feedback.as_ref(),
        ) {
            (Self::Extract, Some(text), ..) => Ok(extract::build_request(text)),
            (Self::Analyze, _, Some(extracted), ..) => {
                analyze::build_request(extracted).map_err(to_input_error)
            }
            (Self::Feedback, _, Some(extracted), Some(analysis), _) => {
                feedback::build_request(extracted, analysis).map_err(to_input_error)
            }
            (Self::Recommend, _, Some(extracted), Some(analysis), Some(fb)) => {
                recommend::build_request(extracted, analysis, fb).map_err(to_input_error)
            }
            _ => Err(StageError::MissingInput {
                stage: self,
                missing: self.required_inputs().to_vec(),
            }),
        }
    }

    pub async fn invoke(
        self,
        client: &dyn GenerationClient,
        request: &GenerationRequest,
    ) -> Result<String, CallError> {
        client.generate(&request.system, &request.prompt).await
    }

    /// Parses the reply and decodes it into this stage's schema.
    pub fn interpret(self, reply: &str) -> Result<StageOutput, StageError> {
        let value = parse_response(reply)?;
        match self {
            Self::Extract => extract::interpret(value).map(StageOutput::Extracted),
            Self::Analyze => analyze::interpret(value).map(StageOutput::Analysis),
            Self::Feedback => feedback::interpret(value).map(StageOutput::Feedback),
            Self::Recommend => recommend::interpret(value).map(StageOutput::Recommendations),
        }
    }

    /// Fixed schema-valid placeholder used when generation fails.
    pub fn fallback(self) -> StageOutput {
        match self {
            Self::Extract => StageOutput::Extracted(extract::fallback()),
            Self::Analyze => StageOutput::Analysis(analyze::fallback()),
            Self::Feedback => StageOutput::Feedback(feedback::fallback()),
            Self::Recommend => StageOutput::Recommendations(recommend::fallback()),
        }
    }

    /// Runs the stage against the record.
    ///
    /// Missing inputs record an error and return `Halted` without touching
    /// `status` or calling the client. Any other failure is absorbed: one
    /// error is recorded, the fallback is applied and the stage completes.
    pub async fn run(self, client: &dyn GenerationClient, record: &mut ReviewRecord) -> StageOutcome {
        let request = match self.build_request(record) {
            Err(err) if err.is_fatal() => {
                error!(stage = %self, "{err}");
                record.errors.push(err.to_string());
                return StageOutcome::Halted;
            }
            request => request,
        };

        record.advance(self.running_status());
        info!(stage = %self, "Stage started");

        let outcome = match self.generate(client, request).await {
            Ok(output) => {
                output.apply(record);
                info!(stage = %self, "Stage completed");
                StageOutcome::Completed
            }
            Err(err) => {
                warn!(stage = %self, "Stage fell back to placeholder output: {err}");
                record
                    .errors
                    .push(format!("{} generation failed: {err}", self.title()));
                self.fallback().apply(record);
                StageOutcome::Degraded
            }
        };

        record.advance(self.complete_status());
        outcome
    }

    async fn generate(
        self,
        client: &dyn GenerationClient,
        request: Result<GenerationRequest, StageError>,
    ) -> Result<StageOutput, StageError> {
        let reply = self.invoke(client, &request?).await?;
        self.interpret(&reply)
    }
}

/// Decodes a parsed reply into a stage schema, mapping serde failures to
/// `SchemaViolation`.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    stage: Stage,
    value: Value,
) -> Result<T, StageError> {
    serde_json::from_value(value).map_err(|e| StageError::SchemaViolation {
        stage,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::testing::ScriptedClient;

    fn extracted_record() -> ReviewRecord {
        let mut record = ReviewRecord::new("cv.txt", "Jane Doe\nRust engineer");
        record.advance(ProcessingStatus::ExtractionComplete);
        record.extracted = Some(ExtractedProfile {
            name: Some("Jane Doe".to_string()),
            raw_text: "Jane Doe\nRust engineer".to_string(),
            ..ExtractedProfile::default()
        });
        record
    }

    #[test]
    fn test_required_inputs_per_stage() {
        assert_eq!(Stage::Extract.required_inputs(), &[RecordField::SourceText]);
        assert_eq!(Stage::Analyze.required_inputs(), &[RecordField::Extracted]);
        assert_eq!(
            Stage::Recommend.required_inputs(),
            &[
                RecordField::Extracted,
                RecordField::Analysis,
                RecordField::Feedback
            ]
        );
    }

    #[test]
    fn test_missing_input_message_names_fields_and_stage() {
        let record = ReviewRecord::new("cv.txt", "text");
        let err = Stage::Feedback.build_request(&record).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "Missing extracted data and analysis results for feedback"
        );
    }

    #[test]
    fn test_blank_source_text_counts_as_missing() {
        let record = ReviewRecord::new("cv.txt", "   \n");
        assert_eq!(
            Stage::Extract.missing_inputs(&record),
            vec![RecordField::SourceText]
        );
    }

    #[test]
    fn test_build_request_is_deterministic() {
        let record = extracted_record();
        let first = Stage::Analyze.build_request(&record).unwrap();
        let second = Stage::Analyze.build_request(&record).unwrap();
        assert_eq!(first, second);
        assert!(first.prompt.contains("\"name\": \"Jane Doe\""));
    }

    #[test]
    fn test_fallback_is_idempotent() {
        for stage in Stage::ALL {
            assert_eq!(stage.fallback(), stage.fallback());
        }
    }

    #[test]
    fn test_interpret_wrong_shape_is_schema_violation() {
        let err = Stage::Recommend
            .interpret(r#"{"skill_development": "learn Rust"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            StageError::SchemaViolation {
                stage: Stage::Recommend,
                ..
            }
        ));
    }

    #[test]
    fn test_interpret_unparseable_is_parse_error() {
        let err = Stage::Feedback.interpret("no json here").unwrap_err();
        assert!(matches!(err, StageError::Parse(ParseError::Malformed(_))));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_apply_extracted_overwrites_raw_text() {
        let mut record = ReviewRecord::new("cv.txt", "original text");
        StageOutput::Extracted(ExtractedProfile {
            raw_text: "model echoed something else".to_string(),
            ..ExtractedProfile::default()
        })
        .apply(&mut record);
        assert_eq!(record.extracted.unwrap().raw_text, "original text");
    }

    #[tokio::test]
    async fn test_missing_input_does_not_call_client_or_advance() {
        for stage in [Stage::Analyze, Stage::Feedback, Stage::Recommend] {
            let client = ScriptedClient::new(vec![]);
            let mut record = ReviewRecord::new("cv.txt", "text");
            record.advance(ProcessingStatus::ExtractionComplete);

            let outcome = stage.run(&client, &mut record).await;

            assert_eq!(outcome, StageOutcome::Halted);
            assert_eq!(client.calls(), 0);
            assert_eq!(record.status, ProcessingStatus::ExtractionComplete);
            assert_eq!(record.errors.len(), 1);
            assert!(record.errors[0].ends_with(&format!("for {stage}")));
        }
    }

    #[tokio::test]
    async fn test_call_failure_applies_fallback_and_completes() {
        let client = ScriptedClient::new(vec![Err(CallError::RateLimited { retries: 3 })]);
        let mut record = extracted_record();

        let outcome = Stage::Analyze.run(&client, &mut record).await;

        assert_eq!(outcome, StageOutcome::Degraded);
        assert_eq!(record.status, ProcessingStatus::AnalysisComplete);
        assert_eq!(record.errors.len(), 1);
        assert!(record.errors[0].starts_with("Analysis generation failed"));
        let analysis = record.analysis.unwrap();
        assert_eq!(analysis.overall_score, 50.0);
    }

    #[tokio::test]
    async fn test_success_sends_stage_prompt() {
        let client = ScriptedClient::new(vec![Ok(r#"{"overall_score": 72,
            "strengths": ["Clear impact"], "weaknesses": ["No summary"]}"#
            .to_string())]);
        let mut record = extracted_record();

        let outcome = Stage::Analyze.run(&client, &mut record).await;

        assert_eq!(outcome, StageOutcome::Completed);
        assert!(record.errors.is_empty());
        assert_eq!(record.analysis.unwrap().overall_score, 72.0);
        let sent = client.requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].0.contains("CV analyst"));
        assert!(sent[0].1.contains("Jane Doe"));
    }
}
