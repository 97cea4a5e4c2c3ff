use std::sync::Arc;

use crate::llm_client::CompletionBackend;

/// Shared application state injected into all route handlers via Axum extractors.
/// Sessions are not stored here; each request carries its own token.
#[derive(Clone)]
pub struct AppState {
    /// Remote model capability. Production: `LlmClient`.
    pub backend: Arc<dyn CompletionBackend>,
}
