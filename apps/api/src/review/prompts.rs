// Review stage prompt templates.
// Placeholders are filled by `fill_template`; shared fragments come from
// llm_client::prompts.

/// Replaces every `{key}` placeholder in a single left-to-right pass.
///
/// Inserted values are never rescanned, so placeholder-looking text inside
/// CV content or earlier model output reaches the prompt verbatim. Braces
/// that do not open a known placeholder are kept as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let hit = values.iter().find_map(|&(key, value)| {
            tail.strip_prefix(key)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Extract
// ────────────────────────────────────────────────────────────────────────────

pub const EXTRACTION_SYSTEM: &str = "You are an expert CV parser. \
    Extract structured information from CV text faithfully and completely.";

/// Replace: {cv_text}, {schema_instruction}
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract structured information from the CV text below.

Extract the following information:
- name: Full name of the person
- email: Email address
- phone: Phone number
- location: City, State/Country
- summary: Professional summary or objective
- experience: work experiences with company, position, start_date, end_date, description and achievements
- education: educational background with institution, degree, field_of_study, start_date, end_date and gpa
- skills: skills with name, level and years_experience
- certifications: certifications held
- languages: languages spoken

For dates, use "YYYY-MM", or "YYYY" if only the year is available.
For skill levels, use exactly one of: beginner, intermediate, advanced, expert.

OUTPUT SCHEMA:
{
  "name": "string" | null,
  "email": "string" | null,
  "phone": "string" | null,
  "location": "string" | null,
  "summary": "string" | null,
  "experience": [
    {
      "company": "string",
      "position": "string",
      "start_date": "YYYY-MM" | null,
      "end_date": "YYYY-MM" | null,
      "description": "string" | null,
      "achievements": ["string"]
    }
  ],
  "education": [
    {
      "institution": "string",
      "degree": "string",
      "field_of_study": "string" | null,
      "start_date": "YYYY" | null,
      "end_date": "YYYY" | null,
      "gpa": number | null
    }
  ],
  "skills": [
    {"name": "string", "level": "beginner" | "intermediate" | "advanced" | "expert" | null, "years_experience": integer | null}
  ],
  "certifications": ["string"],
  "languages": ["string"]
}

{schema_instruction}

CV TEXT:
{cv_text}"#;

// ────────────────────────────────────────────────────────────────────────────
// Analyze
// ────────────────────────────────────────────────────────────────────────────

pub const ANALYSIS_SYSTEM: &str = "You are an expert CV analyst and career consultant. \
    Analyze structured CV data and provide comprehensive, honest insights.";

/// Replace: {cv_data}, {schema_instruction}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the CV data below.

Analyze the following aspects:
1. Overall CV strength and market competitiveness
2. Experience quality and progression
3. Skills alignment with market demands
4. Education relevance and impact
5. Strengths and weaknesses
6. Market alignment and career trajectory

OUTPUT SCHEMA:
{
  "overall_score": number between 0 and 100,
  "strengths": ["3-5 key strengths"],
  "weaknesses": ["3-5 areas for improvement"],
  "experience_analysis": {"depth": "...", "progression": "...", "achievements": "..."},
  "skills_analysis": {"relevance": "...", "market_demand": "...", "gaps": "..."},
  "education_analysis": {"relevance": "...", "impact": "..."},
  "market_alignment": {"assessment": "...", "trajectory": "..."},
  "years_experience": integer | null,
  "seniority_level": "string" | null
}

{schema_instruction}

CV DATA:
{cv_data}"#;

// ────────────────────────────────────────────────────────────────────────────
// Feedback
// ────────────────────────────────────────────────────────────────────────────

pub const FEEDBACK_SYSTEM: &str = "You are an expert career coach and CV reviewer. \
    Generate constructive, actionable feedback. \
    Be encouraging, balance criticism with positive reinforcement, \
    and focus on improvement opportunities.";

/// Replace: {cv_data}, {analysis_data}, {schema_instruction}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Write feedback on the CV using the data and analysis below.

Provide feedback in the following areas:
1. General feedback: overall impression and key observations
2. Experience feedback: work experience quality, progression and presentation
3. Skills feedback: relevance, market alignment and development areas
4. Education feedback: impact and relevance of the educational background
5. Presentation feedback: structure, formatting and clarity
6. Specific improvements: 5-7 actionable suggestions
7. Positive aspects: 3-5 strengths to highlight

OUTPUT SCHEMA:
{
  "general_feedback": "string",
  "experience_feedback": "string",
  "skills_feedback": "string",
  "education_feedback": "string",
  "presentation_feedback": "string",
  "specific_improvements": ["string"],
  "positive_aspects": ["string"]
}

All five *_feedback fields are REQUIRED and must be non-empty prose.

{schema_instruction}

CV DATA:
{cv_data}

ANALYSIS RESULTS:
{analysis_data}"#;

// ────────────────────────────────────────────────────────────────────────────
// Recommend
// ────────────────────────────────────────────────────────────────────────────

pub const RECOMMENDATION_SYSTEM: &str = "You are an expert career development consultant. \
    Generate specific, realistic recommendations for CV improvement and career growth, \
    covering both technical and soft skills.";

/// Replace: {cv_data}, {analysis_data}, {feedback_data}, {schema_instruction}
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Recommend next steps for this candidate using the data, analysis and feedback below.

Provide recommendations in the following areas:
1. Skill development: specific skills to acquire or improve
2. Experience gaps: areas where experience could be enhanced
3. Career path suggestions: potential trajectories and opportunities
4. Immediate actions: quick wins and short-term improvements
5. Long-term goals: strategic career development objectives
6. Industry trends: relevant insights and emerging opportunities

Suggest relevant certifications or training where useful and give realistic timelines.

OUTPUT SCHEMA:
{
  "skill_development": ["string"],
  "experience_gaps": ["string"],
  "career_path_suggestions": ["string"],
  "immediate_actions": ["string"],
  "long_term_goals": ["string"],
  "industry_trends": ["string"]
}

{schema_instruction}

CV DATA:
{cv_data}

ANALYSIS RESULTS:
{analysis_data}

FEEDBACK:
{feedback_data}"#;
