// Shared prompt constants used by both the interview and synthesis prompts.
// Each module that talks to the model defines its own prompts.rs alongside it.

/// Phrase the interview scripts tell the model to say once it has enough material.
/// The engine only recognizes it (see `interview::classify`); it never emits it.
pub const COMPLETION_PHRASE: &str = "Great! I have what I need.";

/// Body of any document section that has nothing to report.
pub const SECTION_FALLBACK: &str = "None this period.";
