//! Session transitions: the only code allowed to mutate a `Session`.
//!
//! Every operation checks the current phase first and returns
//! `SessionError::InvalidTransition` without touching state when called
//! outside its legal phase.

use thiserror::Error;
use tracing::info;

use crate::session::models::{Mode, Phase, Session, Speaker, Timeframe, Turn};

/// Opening question appended by `select_timeframe`. Replace `{period}`.
pub const OPENING_PROMPT_TEMPLATE: &str = "Great! Let's capture what you worked on {period}. \
What did you work on? Tell me about 1-2 things that stood out.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{operation} is not allowed while the session is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: Phase,
    },

    #[error("generated document is empty")]
    EmptyDocument,

    #[error("{operation} needs at least one user answer in the transcript")]
    NothingToGenerate { operation: &'static str },
}

pub fn opening_prompt(timeframe: Timeframe) -> String {
    OPENING_PROMPT_TEMPLATE.replace("{period}", timeframe.period_phrase())
}

impl Session {
    fn require_phase(&self, operation: &'static str, expected: Phase) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                operation,
                phase: self.phase,
            })
        }
    }

    fn push_turn(&mut self, speaker: Speaker, text: impl Into<String>) {
        let last = self.transcript.last().map(|t| t.created_at);
        self.transcript.push(Turn::new(speaker, text, last));
    }

    pub fn select_mode(&mut self, mode: Mode) -> Result<(), SessionError> {
        self.require_phase("select_mode", Phase::ChoosingMode)?;
        self.mode = Some(mode);
        self.phase = Phase::ChoosingTimeframe;
        info!("Session mode selected: {mode}");
        Ok(())
    }

    pub fn select_timeframe(&mut self, timeframe: Timeframe) -> Result<(), SessionError> {
        self.require_phase("select_timeframe", Phase::ChoosingTimeframe)?;
        self.timeframe = Some(timeframe);
        self.phase = Phase::Collecting;
        self.push_turn(Speaker::Assistant, opening_prompt(timeframe));
        info!("Session timeframe selected: {timeframe}; interview started");
        Ok(())
    }

    pub fn append_turn(&mut self, speaker: Speaker, text: impl Into<String>) -> Result<(), SessionError> {
        self.require_phase("append_turn", Phase::Collecting)?;
        self.push_turn(speaker, text);
        Ok(())
    }

    pub fn begin_generation(&mut self) -> Result<(), SessionError> {
        self.require_phase("begin_generation", Phase::Collecting)?;
        self.phase = Phase::Generating;
        info!("Session entering generation ({} turns)", self.transcript.len());
        Ok(())
    }

    /// Appends the assistant's closing message while the document is being
    /// finalized. Regular turns are only accepted while collecting.
    pub fn append_handoff(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.require_phase("append_handoff", Phase::Generating)?;
        self.push_turn(Speaker::Assistant, text);
        Ok(())
    }

    /// Stores the document and closes the interview. An empty document would
    /// break the document/phase coupling, so it is rejected.
    pub fn complete_generation(&mut self, document: impl Into<String>) -> Result<(), SessionError> {
        self.require_phase("complete_generation", Phase::Generating)?;
        let document = document.into();
        if document.trim().is_empty() {
            return Err(SessionError::EmptyDocument);
        }
        self.document = document;
        self.phase = Phase::Complete;
        info!("Session complete ({} chars of document)", self.document.len());
        Ok(())
    }

    /// Returns a failed generation to `collecting` so the user can retry.
    pub fn abort_generation(&mut self) -> Result<(), SessionError> {
        self.require_phase("abort_generation", Phase::Generating)?;
        self.phase = Phase::Collecting;
        info!("Session generation aborted; back to collecting");
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Session::default();
        info!("Session reset");
    }
}
