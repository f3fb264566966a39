//! Test doubles shared by the review module tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{CallError, GenerationClient};

/// Replays a fixed list of replies, one per call, and records every request.
/// Calls past the end of the script fail with `CallError::EmptyContent`.
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, CallError>>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, CallError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// `(system, prompt)` pairs in call order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, system: &str, user_payload: &str) -> Result<String, CallError> {
        self.requests
            .lock()
            .unwrap()
            .push((system.to_string(), user_payload.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CallError::EmptyContent))
    }
}

pub const EXTRACTION_REPLY: &str = r#"```json
{
  "name": "Jane Doe",
  "email": "jane@example.com",
  "phone": null,
  "location": "Berlin, Germany",
  "summary": "Backend engineer focused on Rust services.",
  "experience": [
    {
      "company": "Acme",
      "position": "Senior Engineer",
      "start_date": "2019-03",
      "end_date": null,
      "description": "Payments platform",
      "achievements": ["Cut p99 latency by 40%"]
    }
  ],
  "education": [
    {"institution": "TU Berlin", "degree": "MSc", "field_of_study": "Computer Science", "gpa": 1.3}
  ],
  "skills": [
    {"name": "Rust", "level": "expert", "years_experience": 6},
    {"name": "SQL", "level": "advanced", "years_experience": null}
  ],
  "certifications": ["AWS Solutions Architect"],
  "languages": ["English", "German"]
}
```"#;

pub const ANALYSIS_REPLY: &str = r#"Here is my analysis:
```json
{
  "overall_score": 87.5,
  "strengths": ["Quantified achievements", "Deep Rust expertise"],
  "weaknesses": ["Short summary"],
  "experience_analysis": {"progression": "steady"},
  "skills_analysis": {"market_demand": "high"},
  "education_analysis": {"relevance": "strong"},
  "market_alignment": {"assessment": "well aligned"},
  "years_experience": 6,
  "seniority_level": "senior"
}
```
Let me know if you need more detail."#;

pub const FEEDBACK_REPLY: &str = r#"{
  "general_feedback": "A strong, focused CV.",
  "experience_feedback": "Achievements are well quantified.",
  "skills_feedback": "Skills match backend roles.",
  "education_feedback": "Relevant degree.",
  "presentation_feedback": "Clean structure.",
  "specific_improvements": ["Expand the summary"],
  "positive_aspects": ["Clear impact statements"]
}"#;

pub const RECOMMENDATION_REPLY: &str = r#"```
{
  "skill_development": ["Distributed tracing"],
  "experience_gaps": ["People leadership"],
  "career_path_suggestions": ["Staff engineer"],
  "immediate_actions": ["Rewrite the summary"],
  "long_term_goals": ["Lead a platform team"],
  "industry_trends": ["Memory-safe infrastructure"]
}
```"#;
