// Per-stage templates, schemas and fallbacks.
// Dispatch lives in review::stage; these modules only know their own shape.

pub mod analyze;
pub mod extract;
pub mod feedback;
pub mod recommend;
