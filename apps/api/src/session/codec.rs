//! Session token codec.
//!
//! `encode` serializes the session to JSON and base64url-encodes the UTF-8
//! bytes (no padding), so every character is legal in a URL fragment and
//! arbitrary Unicode survives the round trip. `decode` never panics: every
//! failure comes back as a `DecodeFailure` and callers fall back to a fresh
//! session.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;
use tracing::warn;

use crate::session::models::{Phase, Session};

#[derive(Debug, Error)]
pub enum DecodeFailure {
    #[error("token is empty")]
    Empty,

    #[error("token is not valid base64url: {0}")]
    Transform(#[from] base64::DecodeError),

    #[error("token payload is not UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("token payload is not a valid session: {0}")]
    Structure(#[from] serde_json::Error),

    #[error("token describes an impossible session: {0}")]
    Inconsistent(&'static str),
}

pub fn encode(session: &Session) -> String {
    // Session holds only strings, enums, maps and timestamps; JSON
    // serialization of those cannot fail.
    let json = serde_json::to_vec(session).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

pub fn decode(token: &str) -> Result<Session, DecodeFailure> {
    let token = token.trim().trim_start_matches('#');
    if token.is_empty() {
        return Err(DecodeFailure::Empty);
    }

    let bytes = URL_SAFE_NO_PAD.decode(token)?;
    let json = String::from_utf8(bytes)?;
    let session: Session = serde_json::from_str(&json)?;
    validate(&session)?;
    Ok(session)
}

/// Decodes an optional token, degrading to a fresh session on absence or failure.
pub fn decode_or_fresh(token: Option<&str>) -> Session {
    match token {
        None => Session::default(),
        Some(t) if t.trim().is_empty() => Session::default(),
        Some(t) => decode(t).unwrap_or_else(|e| {
            warn!("Discarding undecodable session token: {e}");
            Session::default()
        }),
    }
}

/// Token to write into the URL fragment, or `None` while the session is
/// still in a pre-interview phase.
pub fn fragment(session: &Session) -> Option<String> {
    session.phase.is_persisted().then(|| encode(session))
}

fn validate(session: &Session) -> Result<(), DecodeFailure> {
    let past_mode = session.phase > Phase::ChoosingMode;
    let past_timeframe = session.phase > Phase::ChoosingTimeframe;

    if past_mode && session.mode.is_none() {
        return Err(DecodeFailure::Inconsistent("mode missing after mode selection"));
    }
    if past_timeframe && session.timeframe.is_none() {
        return Err(DecodeFailure::Inconsistent(
            "timeframe missing after timeframe selection",
        ));
    }
    if (session.phase == Phase::Complete) == session.document.is_empty() {
        return Err(DecodeFailure::Inconsistent(
            "document must be present exactly when complete",
        ));
    }
    if !past_timeframe && !session.transcript.is_empty() {
        return Err(DecodeFailure::Inconsistent(
            "transcript present before the interview started",
        ));
    }
    Ok(())
}
