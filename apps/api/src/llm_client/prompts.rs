// Shared prompt fragments.
// Each review stage defines its own template in review/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// Appended to every stage template, after the schema hint.
pub const SCHEMA_INSTRUCTION: &str = "\
    Return a single JSON object matching the schema above. \
    Use null for unknown optional values and [] for empty lists. \
    Do NOT invent facts that are not supported by the input.";
