//! Review record and the value objects each stage produces.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

// ────────────────────────────────────────────────────────────────────────────
// Processing status
// ────────────────────────────────────────────────────────────────────────────

/// Position of a review in the pipeline.
///
/// Variants are declared in pipeline order, so the derived `Ord` is the
/// progression order. `Failed` sits outside the order and is absorbing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    #[default]
    Pending,
    Started,
    ProcessedFileComplete,
    Extracting,
    ExtractionComplete,
    Analyzing,
    AnalysisComplete,
    GeneratingFeedback,
    FeedbackComplete,
    GeneratingRecommendations,
    RecommendComplete,
    Completed,
    Failed,
}

/// Statuses at which the streaming driver yields, in order.
pub const PROGRESS: [ProcessingStatus; 6] = [
    ProcessingStatus::Started,
    ProcessingStatus::ProcessedFileComplete,
    ProcessingStatus::ExtractionComplete,
    ProcessingStatus::AnalysisComplete,
    ProcessingStatus::FeedbackComplete,
    ProcessingStatus::Completed,
];

impl ProcessingStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `next` keeps the status monotonic.
    pub fn can_advance_to(self, next: ProcessingStatus) -> bool {
        match (self, next) {
            (Self::Failed, _) => false,
            (_, Self::Failed) => true,
            (current, next) => next > current,
        }
    }

    /// Share of the yield points already passed, 0–100.
    pub fn progress_percent(self) -> u8 {
        match self {
            Self::Completed => 100,
            Self::Failed | Self::Pending => 0,
            status => {
                let passed = PROGRESS.iter().filter(|p| **p <= status).count();
                (passed * 100 / PROGRESS.len()) as u8
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Waiting to start",
            Self::Started => "Processing uploaded file",
            Self::ProcessedFileComplete => "Processed uploaded file",
            Self::Extracting => "Extracting data from CV",
            Self::ExtractionComplete => "Extracted data from CV",
            Self::Analyzing => "Analyzing CV content",
            Self::AnalysisComplete => "Analyzed CV content",
            Self::GeneratingFeedback => "Generating feedback",
            Self::FeedbackComplete => "Generated feedback",
            Self::GeneratingRecommendations => "Generating recommendations",
            Self::RecommendComplete => "Generated recommendations",
            Self::Completed => "CV review completed",
            Self::Failed => "Processing failed",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction output
// ────────────────────────────────────────────────────────────────────────────

/// Closed skill proficiency scale. Anything else fails decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkEntry {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub gpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    #[serde(default)]
    pub level: Option<SkillLevel>,
    #[serde(default)]
    pub years_experience: Option<u32>,
}

/// Structured profile produced by the Extract stage.
///
/// `raw_text` is never taken from the model: the stage overwrites it with the
/// record's `source_text` when the profile is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<WorkEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub raw_text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis, feedback, recommendations
// ────────────────────────────────────────────────────────────────────────────

/// Scored assessment. `overall_score` is validated to [0, 100] on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub overall_score: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub experience_analysis: Map<String, Value>,
    #[serde(default)]
    pub skills_analysis: Map<String, Value>,
    #[serde(default)]
    pub education_analysis: Map<String, Value>,
    #[serde(default)]
    pub market_alignment: Map<String, Value>,
    #[serde(default)]
    pub years_experience: Option<u32>,
    // Free text: the vocabulary is not fixed.
    #[serde(default)]
    pub seniority_level: Option<String>,
}

/// Narrative assessment. The five prose fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub general_feedback: String,
    pub experience_feedback: String,
    pub skills_feedback: String,
    pub education_feedback: String,
    pub presentation_feedback: String,
    #[serde(default)]
    pub specific_improvements: Vec<String>,
    #[serde(default)]
    pub positive_aspects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default)]
    pub skill_development: Vec<String>,
    #[serde(default)]
    pub experience_gaps: Vec<String>,
    #[serde(default)]
    pub career_path_suggestions: Vec<String>,
    #[serde(default)]
    pub immediate_actions: Vec<String>,
    #[serde(default)]
    pub long_term_goals: Vec<String>,
    #[serde(default)]
    pub industry_trends: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Review record
// ────────────────────────────────────────────────────────────────────────────

/// The single state object threaded through every stage of one review.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub source_name: Option<String>,
    pub source_text: Option<String>,
    pub extracted: Option<ExtractedProfile>,
    pub analysis: Option<AnalysisResult>,
    pub feedback: Option<Feedback>,
    pub recommendations: Option<Recommendations>,
    pub errors: Vec<String>,
    pub status: ProcessingStatus,
}

impl ReviewRecord {
    pub fn new(source_name: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            source_name: Some(source_name.into()),
            source_text: Some(source_text.into()),
            status: ProcessingStatus::Started,
            ..Self::default()
        }
    }

    /// Moves `status` forward. Regressions and exits from `Failed` are refused.
    pub fn advance(&mut self, next: ProcessingStatus) -> bool {
        if !self.status.can_advance_to(next) {
            warn!(
                "Refusing status transition {:?} -> {:?}",
                self.status, next
            );
            return false;
        }
        self.status = next;
        true
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.advance(ProcessingStatus::Failed);
    }

    /// Non-empty source text, if any.
    pub fn source_text(&self) -> Option<&str> {
        self.source_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Downloadable summary of a review, `null` for stages never reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub file_name: Option<String>,
    pub extracted_data: Option<ExtractedProfile>,
    pub analysis_results: Option<AnalysisResult>,
    pub feedback: Option<Feedback>,
    pub recommendations: Option<Recommendations>,
    pub errors: Vec<String>,
}

impl ReviewReport {
    pub fn download_name(&self) -> String {
        format!(
            "cv_review_{}.json",
            self.file_name.as_deref().unwrap_or("document")
        )
    }
}

impl From<&ReviewRecord> for ReviewReport {
    fn from(record: &ReviewRecord) -> Self {
        Self {
            file_name: record.source_name.clone(),
            extracted_data: record.extracted.clone(),
            analysis_results: record.analysis.clone(),
            feedback: record.feedback.clone(),
            recommendations: record.recommendations.clone(),
            errors: record.errors.clone(),
        }
    }
}
