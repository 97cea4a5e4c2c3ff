//! Interview Orchestrator: drives one conversational turn end-to-end.
//!
//! Flow for a user turn: reject blank input → append user turn → build the
//! mode's system prompt → send the transcript → classify the reply →
//! either append the follow-up question, or generate the document and hand off.
//!
//! Model failures never escape as errors. They become an apologetic assistant
//! turn and the phase stays where it was (or, for generation, falls back to
//! `collecting` so the user can retry). Only contract violations (wrong phase,
//! request already in flight) are returned as `OrchestratorError`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::interview::classify::{classify_response, ResponseKind};
use crate::interview::prompts::{
    build_system_prompt, GENERATION_FAILURE_MESSAGE, HANDOFF_MESSAGE, SKIP_INSTRUCTION,
    SKIP_MARKER, TURN_FAILURE_MESSAGE,
};
use crate::llm_client::{ChatMessage, CompletionBackend, CompletionRequest, TURN_MAX_TOKENS};
use crate::session::models::{Mode, Phase, Session, Speaker, Timeframe};
use crate::session::store::SessionError;
use crate::synthesis::synthesizer;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("a model request is already in flight for this session")]
    Busy,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What a user action ended up doing to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Blank input; nothing changed and no request was sent.
    Ignored,
    /// The model asked a follow-up question.
    Continued,
    /// The interview finished and the document was generated.
    Completed,
    /// The interview turn failed; an apology was appended.
    TurnFailed,
    /// Document generation failed; the session is back in `collecting`.
    GenerationFailed,
}

/// Clears the busy flag on drop, so every exit path releases it.
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, OrchestratorError> {
        if flag.swap(true, Ordering::AcqRel) {
            return Err(OrchestratorError::Busy);
        }
        Ok(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Owns one session and the capability to reach the model.
pub struct Orchestrator {
    session: Session,
    backend: Arc<dyn CompletionBackend>,
    busy: Arc<AtomicBool>,
}

impl Orchestrator {
    pub fn new(session: Session, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            session,
            backend,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn select_mode(&mut self, mode: Mode) -> Result<(), OrchestratorError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.session.select_mode(mode)?;
        Ok(())
    }

    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> Result<(), OrchestratorError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.session.select_timeframe(timeframe)?;
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), OrchestratorError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        self.session.reset();
        Ok(())
    }

    pub async fn submit_user_turn(&mut self, text: &str) -> Result<TurnOutcome, OrchestratorError> {
        if text.trim().is_empty() {
            return Ok(TurnOutcome::Ignored);
        }
        self.run_turn("submit_user_turn", text, None).await
    }

    /// Records `[Skipped]` and asks the model to move on or wrap up.
    pub async fn skip_turn(&mut self) -> Result<TurnOutcome, OrchestratorError> {
        self.run_turn("skip_turn", SKIP_MARKER, Some(SKIP_INSTRUCTION))
            .await
    }

    /// Runs document generation again without another interview turn.
    ///
    /// Legal in `collecting` once the user has answered something, and in
    /// `generating`, which a session restored from a token taken mid-generation
    /// can be left in.
    pub async fn retry_generation(&mut self) -> Result<TurnOutcome, OrchestratorError> {
        const OPERATION: &str = "retry_generation";
        let _guard = BusyGuard::acquire(&self.busy)?;
        match self.session.phase() {
            Phase::Collecting if self.session.has_user_turn() => {}
            Phase::Collecting => {
                return Err(SessionError::NothingToGenerate {
                    operation: OPERATION,
                }
                .into())
            }
            Phase::Generating => {}
            phase => {
                return Err(SessionError::InvalidTransition {
                    operation: OPERATION,
                    phase,
                }
                .into())
            }
        }
        info!("Retrying document generation from {}", self.session.phase());
        self.generate_document().await
    }

    /// `transcript_text` is what the transcript records; `model_text`, when
    /// given, replaces it in the final message sent to the model.
    async fn run_turn(
        &mut self,
        operation: &'static str,
        transcript_text: &str,
        model_text: Option<&str>,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let (mode, timeframe) = self.interview_selection(operation)?;

        self.session.append_turn(Speaker::User, transcript_text)?;

        let system = build_system_prompt(mode, timeframe, self.session.collected_topics());
        let mut messages = ChatMessage::from_transcript(self.session.transcript());
        if let (Some(model_text), Some(last)) = (model_text, messages.last_mut()) {
            last.content = model_text.to_string();
        }

        let reply = self
            .backend
            .complete(CompletionRequest {
                system: Some(system),
                messages,
                max_tokens: TURN_MAX_TOKENS,
            })
            .await;

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Interview turn failed: {e}");
                self.session
                    .append_turn(Speaker::Assistant, TURN_FAILURE_MESSAGE)?;
                return Ok(TurnOutcome::TurnFailed);
            }
        };

        match classify_response(&reply) {
            ResponseKind::Continue => {
                self.session.append_turn(Speaker::Assistant, reply)?;
                Ok(TurnOutcome::Continued)
            }
            ResponseKind::Complete => {
                info!(
                    "Completion marker detected after {} turns",
                    self.session.transcript().len()
                );
                self.generate_document().await
            }
        }
    }

    /// Mode and timeframe of a session that is collecting; anything else is
    /// a phase violation.
    fn interview_selection(
        &self,
        operation: &'static str,
    ) -> Result<(Mode, Timeframe), SessionError> {
        let invalid = SessionError::InvalidTransition {
            operation,
            phase: self.session.phase(),
        };
        if self.session.phase() != Phase::Collecting {
            return Err(invalid);
        }
        match (self.session.mode(), self.session.timeframe()) {
            (Some(mode), Some(timeframe)) => Ok((mode, timeframe)),
            _ => Err(invalid),
        }
    }

    /// Caller holds the busy guard and has checked the session is collecting
    /// or already generating.
    async fn generate_document(&mut self) -> Result<TurnOutcome, OrchestratorError> {
        if self.session.phase() != Phase::Generating {
            self.session.begin_generation()?;
        }

        match synthesizer::generate(self.backend.as_ref(), &self.session).await {
            Ok(document) => {
                self.session.append_handoff(HANDOFF_MESSAGE)?;
                self.session.complete_generation(document)?;
                Ok(TurnOutcome::Completed)
            }
            Err(e) => {
                warn!("Document generation failed: {e}");
                self.session.abort_generation()?;
                self.session
                    .append_turn(Speaker::Assistant, GENERATION_FAILURE_MESSAGE)?;
                Ok(TurnOutcome::GenerationFailed)
            }
        }
    }
}
