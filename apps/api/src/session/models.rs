use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Interview script and document template selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    General,
    Founder,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::General => "general",
            Mode::Founder => "founder",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    Daily,
    Weekly,
    Sprint,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Sprint => "sprint",
        }
    }

    /// Phrase used in the opening question ("what you worked on this week").
    pub fn period_phrase(&self) -> &'static str {
        match self {
            Timeframe::Daily => "today",
            Timeframe::Weekly => "this week",
            Timeframe::Sprint => "this sprint",
        }
    }

    /// Title used in the generated document header ("Weekly Entry").
    pub fn entry_title(&self) -> &'static str {
        match self {
            Timeframe::Daily => "Daily",
            Timeframe::Weekly => "Weekly",
            Timeframe::Sprint => "Sprint",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position in the interview state machine.
///
/// Ordering follows the forward direction of the machine; only `reset` and
/// `abort_generation` move backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    ChoosingMode,
    ChoosingTimeframe,
    Collecting,
    Generating,
    Complete,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ChoosingMode => "choosing-mode",
            Phase::ChoosingTimeframe => "choosing-timeframe",
            Phase::Collecting => "collecting",
            Phase::Generating => "generating",
            Phase::Complete => "complete",
        }
    }

    /// Pre-interview phases are never written to the URL fragment.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, Phase::ChoosingMode | Phase::ChoosingTimeframe)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Role name on the model wire format.
    pub fn role(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
        }
    }
}

/// One message in the transcript. `created_at` is informational only;
/// transcript order is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Builds a turn stamped no earlier than `not_before`.
    /// Millisecond precision matches what the token can carry.
    pub fn new(speaker: Speaker, text: impl Into<String>, not_before: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now().trunc_subsecs(3);
        let created_at = match not_before {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        Self {
            speaker,
            text: text.into(),
            created_at,
        }
    }
}

/// Category keys the topic map starts with.
pub const TOPIC_SEEDS: &[&str] = &[
    "projects",
    "collaboration",
    "design",
    "companyBuilding",
    "learned",
    "outside",
];

/// Advisory notes per category, threaded into every system prompt.
pub type CollectedTopics = BTreeMap<String, Vec<String>>;

pub fn seed_topics() -> CollectedTopics {
    TOPIC_SEEDS
        .iter()
        .map(|key| (key.to_string(), Vec::new()))
        .collect()
}

/// The full state of one interview-to-document run.
///
/// Fields are private to the `session` module so every mutation goes
/// through the transition operations in `store.rs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub(super) mode: Option<Mode>,
    pub(super) timeframe: Option<Timeframe>,
    pub(super) phase: Phase,
    pub(super) transcript: Vec<Turn>,
    #[serde(default)]
    pub(super) document: String,
    #[serde(default = "seed_topics")]
    pub(super) collected_topics: CollectedTopics,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            mode: None,
            timeframe: None,
            phase: Phase::ChoosingMode,
            transcript: Vec::new(),
            document: String::new(),
            collected_topics: seed_topics(),
        }
    }
}

impl Session {
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn timeframe(&self) -> Option<Timeframe> {
        self.timeframe
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn collected_topics(&self) -> &CollectedTopics {
        &self.collected_topics
    }

    pub fn has_user_turn(&self) -> bool {
        self.transcript.iter().any(|t| t.speaker == Speaker::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_is_empty_and_seeded() {
        let session = Session::default();
        assert_eq!(session.phase(), Phase::ChoosingMode);
        assert!(session.mode().is_none());
        assert!(session.timeframe().is_none());
        assert!(session.transcript().is_empty());
        assert!(session.document().is_empty());
        assert_eq!(session.collected_topics().len(), TOPIC_SEEDS.len());
        assert!(session.collected_topics().values().all(|v| v.is_empty()));
    }

    #[test]
    fn test_phase_serializes_kebab_case() {
        let json = serde_json::to_string(&Phase::ChoosingTimeframe).unwrap();
        assert_eq!(json, "\"choosing-timeframe\"");
        let phase: Phase = serde_json::from_str("\"complete\"").unwrap();
        assert_eq!(phase, Phase::Complete);
    }

    #[test]
    fn test_only_interview_phases_are_persisted() {
        assert!(!Phase::ChoosingMode.is_persisted());
        assert!(!Phase::ChoosingTimeframe.is_persisted());
        assert!(Phase::Collecting.is_persisted());
        assert!(Phase::Generating.is_persisted());
        assert!(Phase::Complete.is_persisted());
    }

    #[test]
    fn test_turn_timestamp_never_goes_backwards() {
        let future = Utc::now().trunc_subsecs(3) + chrono::Duration::seconds(60);
        let turn = Turn::new(Speaker::User, "hello", Some(future));
        assert_eq!(turn.created_at, future);
    }

    #[test]
    fn test_timeframe_phrases() {
        assert_eq!(Timeframe::Daily.period_phrase(), "today");
        assert_eq!(Timeframe::Weekly.period_phrase(), "this week");
        assert_eq!(Timeframe::Sprint.period_phrase(), "this sprint");
        assert_eq!(Timeframe::Sprint.entry_title(), "Sprint");
    }
}
