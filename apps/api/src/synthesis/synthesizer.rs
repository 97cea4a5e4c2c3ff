//! Document Synthesizer: turns a finished interview into the brag doc entry.
//!
//! Flow: transcript + mode template → LLM generate → strip code fences →
//!       backfill missing sections → return markdown.
//!
//! The returned text is exactly what the session stores and what export
//! hands out; nothing wraps it afterwards.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::prompts::SECTION_FALLBACK;
use crate::llm_client::{
    ChatMessage, CompletionBackend, CompletionRequest, LlmError, GENERATION_MAX_TOKENS,
};
use crate::session::models::{Mode, Session};
use crate::synthesis::prompts::{build_generation_prompt, sections_for};

#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("model request failed: {0}")]
    Model(#[from] LlmError),

    #[error("session has no mode or timeframe to build a template from")]
    MissingSelection,

    #[error("model returned an empty document")]
    EmptyDocument,
}

/// Generates the document for `session`, dated today (UTC).
pub async fn generate(
    backend: &dyn CompletionBackend,
    session: &Session,
) -> Result<String, GenerationFailure> {
    generate_on(backend, session, Utc::now().date_naive()).await
}

/// Generates the document for `session` with an explicit entry date.
pub async fn generate_on(
    backend: &dyn CompletionBackend,
    session: &Session,
    date: NaiveDate,
) -> Result<String, GenerationFailure> {
    let (mode, timeframe) = match (session.mode(), session.timeframe()) {
        (Some(mode), Some(timeframe)) => (mode, timeframe),
        _ => return Err(GenerationFailure::MissingSelection),
    };

    let mut messages = ChatMessage::from_transcript(session.transcript());
    messages.push(ChatMessage::user(build_generation_prompt(mode, timeframe, date)));

    let raw = backend
        .complete(CompletionRequest {
            system: None,
            messages,
            max_tokens: GENERATION_MAX_TOKENS,
        })
        .await
        .map_err(|e| {
            warn!("Document generation request failed: {e}");
            GenerationFailure::Model(e)
        })?;

    let document = normalize_document(&raw, mode).ok_or(GenerationFailure::EmptyDocument)?;
    info!(
        "Generated {mode} document ({} chars from {} transcript turns)",
        document.len(),
        session.transcript().len()
    );
    Ok(document)
}

/// Strips fences and backfills sections. `None` when the model said nothing.
pub fn normalize_document(raw: &str, mode: Mode) -> Option<String> {
    let stripped = strip_code_fences(raw);
    if stripped.is_empty() {
        return None;
    }
    Some(backfill_sections(&stripped, sections_for(mode)))
}

/// Removes every code-fence line (``` or ~~~ of any length, with or without
/// a language tag) and trims surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    let kept: Vec<&str> = text.lines().filter(|line| !is_fence_line(line)).collect();
    let joined = kept.join("\n");
    let trimmed = trim_fence_run(joined.trim());
    trimmed.trim().to_string()
}

fn fence_run_len(s: &str) -> usize {
    match s.chars().next() {
        Some(c @ ('`' | '~')) => s.chars().take_while(|&x| x == c).count(),
        _ => 0,
    }
}

/// Language tags dropped along with a fence run glued to the content.
const GLUED_INFO_TAGS: &[&str] = &["markdown", "md"];

fn is_info_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')
}

/// A fence line is a run of 3+ fence chars followed by an optional info
/// string: one tag word, then anything without backticks.
fn is_fence_line(line: &str) -> bool {
    let t = line.trim();
    let run = fence_run_len(t);
    if run < 3 {
        return false;
    }
    // Fence chars are ASCII, so the run length is also a byte offset.
    let info = t[run..].trim();
    let tag_len = info.chars().take_while(|&c| is_info_char(c)).count();
    let rest = &info[tag_len..];
    rest.is_empty() || (tag_len > 0 && rest.starts_with(char::is_whitespace) && !rest.contains('`'))
}

/// Drops a fence run glued to the very start or end of the text
/// (e.g. "```markdown## Entry ...```" on one line).
fn trim_fence_run(text: &str) -> &str {
    let mut text = text;
    let mut fence_char = None;
    let lead = fence_run_len(text);
    if lead >= 3 {
        fence_char = text.chars().next();
        text = &text[lead..];
        let tag_len = text.chars().take_while(|&c| is_info_char(c)).count();
        if GLUED_INFO_TAGS
            .iter()
            .any(|tag| text[..tag_len].eq_ignore_ascii_case(tag))
        {
            text = &text[tag_len..];
        }
    }
    let fence_char = fence_char.or_else(|| text.chars().last().filter(|&c| matches!(c, '`' | '~')));
    if let Some(c) = fence_char {
        let tail = text.chars().rev().take_while(|&x| x == c).count();
        if tail >= 3 {
            text = &text[..text.len() - tail];
        }
    }
    text
}

struct Section<'a> {
    title: &'a str,
    body: Vec<&'a str>,
}

fn section_key(title: &str) -> String {
    title
        .trim()
        .trim_end_matches(|c: char| c == ':' || c == '#')
        .trim()
        .to_lowercase()
}

/// Re-emits the document with every template section present, in template
/// order. Omitted or empty sections get the fallback body; sections the
/// model added on its own are kept after the template ones.
pub fn backfill_sections(text: &str, template: &[&str]) -> String {
    let mut preamble: Vec<&str> = Vec::new();
    let mut found: Vec<Section<'_>> = Vec::new();

    for line in text.lines() {
        if let Some(title) = line.strip_prefix("### ") {
            found.push(Section {
                title: title.trim(),
                body: Vec::new(),
            });
        } else if let Some(current) = found.last_mut() {
            current.body.push(line);
        } else {
            preamble.push(line);
        }
    }

    let mut used = vec![false; found.len()];
    let mut blocks: Vec<String> = Vec::new();

    let preamble = preamble.join("\n");
    if !preamble.trim().is_empty() {
        blocks.push(preamble.trim().to_string());
    }

    for title in template {
        let key = section_key(title);
        let matched = found
            .iter()
            .enumerate()
            .find(|(i, s)| !used[*i] && section_key(s.title) == key)
            .map(|(i, _)| i);

        let body = match matched {
            Some(i) => {
                used[i] = true;
                found[i].body.join("\n").trim().to_string()
            }
            None => {
                warn!("Generated document omitted section '{title}'; filling fallback");
                String::new()
            }
        };
        blocks.push(render_section(title, &body));
    }

    for (i, section) in found.iter().enumerate() {
        if !used[i] {
            blocks.push(render_section(section.title, section.body.join("\n").trim()));
        }
    }

    blocks.join("\n\n")
}

fn render_section(title: &str, body: &str) -> String {
    let body = if body.is_empty() { SECTION_FALLBACK } else { body };
    format!("### {title}\n{body}")
}

/// Download name for a completed document:
/// `brag-doc-<mode>-<timeframe>-<YYYY-MM-DD>.md`.
pub fn export_filename(session: &Session, date: NaiveDate) -> Option<String> {
    if session.document().is_empty() {
        return None;
    }
    let mode = session.mode()?;
    let timeframe = session.timeframe()?;
    Some(format!(
        "brag-doc-{mode}-{timeframe}-{}.md",
        date.format("%Y-%m-%d")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::{ok, server_error, ScriptedBackend};
    use crate::session::models::{Speaker, Timeframe};
    use crate::synthesis::prompts::{FOUNDER_SECTIONS, GENERAL_SECTIONS};

    fn interviewed(mode: Mode) -> Session {
        let mut session = Session::default();
        session.select_mode(mode).unwrap();
        session.select_timeframe(Timeframe::Weekly).unwrap();
        session
            .append_turn(Speaker::User, "Shipped the login flow")
            .unwrap();
        session
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_strip_fences_with_language_tag() {
        let input = "```markdown\n## Entry\n\n### Projects\n- Shipped X\n```";
        assert_eq!(strip_code_fences(input), "## Entry\n\n### Projects\n- Shipped X");
    }

    #[test]
    fn test_strip_bare_fences_and_whitespace() {
        let input = "\n\n```\n## Entry\n```\n\n";
        assert_eq!(strip_code_fences(input), "## Entry");
    }

    #[test]
    fn test_strip_long_and_tilde_fences() {
        assert_eq!(strip_code_fences("````md\n## Entry\n````"), "## Entry");
        assert_eq!(strip_code_fences("~~~\n## Entry\n~~~"), "## Entry");
    }

    #[test]
    fn test_strip_fence_glued_to_content() {
        assert_eq!(strip_code_fences("```## Entry```"), "## Entry");
        assert_eq!(
            strip_code_fences("```markdown## Entry\n- Shipped```"),
            "## Entry\n- Shipped"
        );
        assert_eq!(strip_code_fences("~~~md\n## Entry~~~"), "## Entry");
    }

    #[test]
    fn test_strip_fence_with_multi_word_info_string() {
        assert_eq!(strip_code_fences("```markdown title\n## Entry\n```"), "## Entry");
    }

    #[test]
    fn test_glued_run_keeps_ordinary_first_word() {
        assert_eq!(strip_code_fences("```Shipped login```"), "Shipped login");
    }

    #[test]
    fn test_unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fences("  ## Entry\nuse `code` inline  "), "## Entry\nuse `code` inline");
    }

    #[test]
    fn test_backfill_adds_omitted_sections_in_order() {
        let doc = "## 2025-03-14 - Weekly Entry\n\n### Projects\n- Shipped login, -30% signup time";
        let out = backfill_sections(doc, GENERAL_SECTIONS);
        assert_eq!(
            out,
            "## 2025-03-14 - Weekly Entry\n\n\
             ### Projects\n- Shipped login, -30% signup time\n\n\
             ### Collaboration & Mentorship\nNone this period.\n\n\
             ### Design & Documentation\nNone this period.\n\n\
             ### What I Learned\nNone this period."
        );
    }

    #[test]
    fn test_backfill_fills_empty_sections_and_keeps_extras() {
        let doc = "### What I Learned\n\n### Bonus\n- extra\n### Team & Velocity\n- unblocked 5";
        let out = backfill_sections(doc, FOUNDER_SECTIONS);
        assert!(out.starts_with("### Customer & Revenue Impact\nNone this period."));
        assert!(out.contains("### Team & Velocity\n- unblocked 5"));
        assert!(out.contains("### What I Learned\nNone this period."));
        assert!(out.ends_with("### Bonus\n- extra"));
    }

    #[test]
    fn test_backfill_matches_titles_case_insensitively() {
        let doc = "### projects:\n- one";
        let out = backfill_sections(doc, GENERAL_SECTIONS);
        assert!(out.starts_with("### Projects\n- one"));
        assert_eq!(out.matches("### ").count(), GENERAL_SECTIONS.len());
    }

    #[test]
    fn test_normalize_rejects_blank_output() {
        assert!(normalize_document("```\n\n```", Mode::General).is_none());
        assert!(normalize_document("   ", Mode::General).is_none());
    }

    #[tokio::test]
    async fn test_generate_sends_transcript_then_template() {
        let backend = ScriptedBackend::with(vec![ok(
            "```markdown\n## 2025-03-14 - Weekly Entry\n### Projects\n- Shipped\n```",
        )]);
        let session = interviewed(Mode::General);

        let document = generate_on(backend.as_ref(), &session, date()).await.unwrap();

        assert!(!document.contains("```"));
        assert!(document.contains("### Design & Documentation\nNone this period."));

        let seen = backend.requests();
        assert_eq!(seen.len(), 1);
        let request = &seen[0];
        assert!(request.system.is_none());
        assert_eq!(request.max_tokens, GENERATION_MAX_TOKENS);
        assert_eq!(request.messages.len(), session.transcript().len() + 1);
        assert_eq!(request.messages[1].content, "Shipped the login flow");
        let last = request.messages.last().unwrap();
        assert_eq!(last.role, "user");
        assert!(last.content.contains("## 2025-03-14 - Weekly Entry"));
    }

    #[tokio::test]
    async fn test_generate_reports_backend_failure() {
        let backend = ScriptedBackend::with(vec![server_error()]);
        let result = generate_on(backend.as_ref(), &interviewed(Mode::Founder), date()).await;
        assert!(matches!(result, Err(GenerationFailure::Model(_))));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_reply() {
        let backend = ScriptedBackend::with(vec![ok("```\n```")]);
        let result = generate_on(backend.as_ref(), &interviewed(Mode::General), date()).await;
        assert!(matches!(result, Err(GenerationFailure::EmptyDocument)));
    }

    #[tokio::test]
    async fn test_generate_requires_selection() {
        let backend = ScriptedBackend::with(vec![ok("doc")]);
        let result = generate_on(backend.as_ref(), &Session::default(), date()).await;
        assert!(matches!(result, Err(GenerationFailure::MissingSelection)));
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn test_export_filename_only_for_complete_sessions() {
        let mut session = interviewed(Mode::Founder);
        assert!(export_filename(&session, date()).is_none());
        session.begin_generation().unwrap();
        session.complete_generation("## doc").unwrap();
        assert_eq!(
            export_filename(&session, date()).as_deref(),
            Some("brag-doc-founder-weekly-2025-03-14.md")
        );
    }
}
