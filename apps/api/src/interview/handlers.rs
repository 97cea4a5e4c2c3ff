//! Axum route handlers for the interview session API.
//!
//! The server keeps no session state. Every request carries the session
//! token; every response returns the updated session, its new token, and the
//! fragment the client should write to the URL (absent before the interview
//! starts).

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::orchestrator::{Orchestrator, TurnOutcome};
use crate::session::codec;
use crate::session::models::{Mode, Phase, Session, Timeframe};
use crate::session::store::SessionError;
use crate::state::AppState;
use crate::synthesis::synthesizer::export_filename;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectModeRequest {
    #[serde(default)]
    pub token: Option<String>,
    pub mode: Mode,
}

#[derive(Debug, Deserialize)]
pub struct SelectTimeframeRequest {
    #[serde(default)]
    pub token: Option<String>,
    pub timeframe: Timeframe,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTurnRequest {
    #[serde(default)]
    pub token: Option<String>,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SessionEnvelope {
    pub session: Session,
    /// Working token; always present so pre-interview choices survive the round trip.
    pub token: String,
    /// Token to persist in the URL fragment, or null while choosing mode/timeframe.
    pub fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TurnOutcome>,
}

impl SessionEnvelope {
    fn new(orchestrator: Orchestrator, outcome: Option<TurnOutcome>) -> Self {
        let token = codec::encode(orchestrator.session());
        let fragment = codec::fragment(orchestrator.session());
        Self {
            session: orchestrator.into_session(),
            token,
            fragment,
            outcome,
        }
    }
}

fn orchestrator_for(state: &AppState, token: Option<&str>) -> Orchestrator {
    Orchestrator::new(codec::decode_or_fresh(token), Arc::clone(&state.backend))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/session/restore
///
/// Hydrates a session from a token. Missing or undecodable tokens yield a fresh session.
pub async fn handle_restore(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Json<SessionEnvelope> {
    let orchestrator = orchestrator_for(&state, request.token.as_deref());
    Json(SessionEnvelope::new(orchestrator, None))
}

/// POST /api/v1/session/mode
pub async fn handle_select_mode(
    State(state): State<AppState>,
    Json(request): Json<SelectModeRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    let mut orchestrator = orchestrator_for(&state, request.token.as_deref());
    orchestrator.select_mode(request.mode)?;
    Ok(Json(SessionEnvelope::new(orchestrator, None)))
}

/// POST /api/v1/session/timeframe
pub async fn handle_select_timeframe(
    State(state): State<AppState>,
    Json(request): Json<SelectTimeframeRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    let mut orchestrator = orchestrator_for(&state, request.token.as_deref());
    orchestrator.select_timeframe(request.timeframe)?;
    Ok(Json(SessionEnvelope::new(orchestrator, None)))
}

/// POST /api/v1/session/turn
///
/// Blank text is a no-op (`outcome: "ignored"`), not an error.
pub async fn handle_submit_turn(
    State(state): State<AppState>,
    Json(request): Json<SubmitTurnRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    let mut orchestrator = orchestrator_for(&state, request.token.as_deref());
    let outcome = orchestrator.submit_user_turn(&request.text).await?;
    Ok(Json(SessionEnvelope::new(orchestrator, Some(outcome))))
}

/// POST /api/v1/session/skip
pub async fn handle_skip(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    let mut orchestrator = orchestrator_for(&state, request.token.as_deref());
    let outcome = orchestrator.skip_turn().await?;
    Ok(Json(SessionEnvelope::new(orchestrator, Some(outcome))))
}

/// POST /api/v1/session/retry-generation
pub async fn handle_retry_generation(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    let mut orchestrator = orchestrator_for(&state, request.token.as_deref());
    let outcome = orchestrator.retry_generation().await?;
    Ok(Json(SessionEnvelope::new(orchestrator, Some(outcome))))
}

/// POST /api/v1/session/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<SessionEnvelope>, AppError> {
    let mut orchestrator = orchestrator_for(&state, request.token.as_deref());
    orchestrator.reset()?;
    Ok(Json(SessionEnvelope::new(orchestrator, None)))
}

/// POST /api/v1/session/export
///
/// Returns the completed document as a markdown attachment.
pub async fn handle_export(Json(request): Json<TokenRequest>) -> Result<Response, AppError> {
    let session = codec::decode_or_fresh(request.token.as_deref());
    if session.phase() != Phase::Complete {
        return Err(SessionError::InvalidTransition {
            operation: "export",
            phase: session.phase(),
        }
        .into());
    }

    let filename = export_filename(&session, Utc::now().date_naive())
        .context("complete session without an export filename")?;
    let disposition = format!("attachment; filename=\"{filename}\"");

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        session.document().to_string(),
    )
        .into_response())
}
