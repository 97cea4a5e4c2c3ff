// Interview orchestration: one user action drives one model round trip.
// All model calls go through llm_client via the CompletionBackend trait.

pub mod classify;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
