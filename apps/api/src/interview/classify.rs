//! Completion detection for interview replies.
//!
//! The interview scripts ask the model to say a fixed phrase once it has
//! enough material. Matching is a case-insensitive substring check against
//! a small marker set; everything else is treated as another question.

/// Lowercase markers that signal the interview is over.
pub const COMPLETION_MARKERS: &[&str] = &[
    "i have what i need",
    "great! i have",
    "i think i have enough",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Another interview question; append it verbatim.
    Continue,
    /// The model has enough material; start document generation.
    Complete,
}

pub fn classify_response(text: &str) -> ResponseKind {
    let lowered = text.to_lowercase();
    if COMPLETION_MARKERS.iter().any(|m| lowered.contains(m)) {
        ResponseKind::Complete
    } else {
        ResponseKind::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_phrase_completes() {
        assert_eq!(
            classify_response("Great! I have what I need."),
            ResponseKind::Complete
        );
    }

    #[test]
    fn test_markers_match_in_any_case() {
        assert_eq!(
            classify_response("GREAT! I HAVE WHAT I NEED."),
            ResponseKind::Complete
        );
        assert_eq!(
            classify_response("Thanks. I Think I Have Enough to work with."),
            ResponseKind::Complete
        );
        assert_eq!(
            classify_response("great! i have a clear picture now"),
            ResponseKind::Complete
        );
    }

    #[test]
    fn test_marker_embedded_in_longer_reply_completes() {
        let reply = "That's a strong outcome.\n\nOkay — I have what I need to draft this.";
        assert_eq!(classify_response(reply), ResponseKind::Complete);
    }

    #[test]
    fn test_follow_up_question_continues() {
        assert_eq!(
            classify_response("How many teammates were affected, and for how long?"),
            ResponseKind::Continue
        );
        assert_eq!(classify_response(""), ResponseKind::Continue);
    }

    #[test]
    fn test_near_miss_does_not_complete() {
        assert_eq!(
            classify_response("Great! What did you learn from it?"),
            ResponseKind::Continue
        );
    }
}
