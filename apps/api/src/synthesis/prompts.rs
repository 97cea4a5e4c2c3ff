// All LLM prompt constants for document synthesis.
// Reuses cross-cutting fragments from llm_client::prompts.

use chrono::NaiveDate;

use crate::llm_client::prompts::SECTION_FALLBACK;
use crate::session::models::{Mode, Timeframe};

/// Section headers of the general template, in document order.
pub const GENERAL_SECTIONS: &[&str] = &[
    "Projects",
    "Collaboration & Mentorship",
    "Design & Documentation",
    "What I Learned",
];

/// Section headers of the founder template, in document order.
pub const FOUNDER_SECTIONS: &[&str] = &[
    "Customer & Revenue Impact",
    "Team & Velocity",
    "Strategic Decisions & Insights",
    "What I Learned",
];

pub fn sections_for(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::General => GENERAL_SECTIONS,
        Mode::Founder => FOUNDER_SECTIONS,
    }
}

/// Generation prompt for the general template.
/// Replace: {date}, {entry_title}, {fallback}
pub const GENERAL_GENERATION_TEMPLATE: &str = r#"Based on our conversation, generate a brag document entry in markdown format.

USE THIS EXACT STRUCTURE:

## {date} - {entry_title} Entry

### Projects
[List work items focused on OUTCOMES and VALUE delivered. Each bullet must show: WHAT you did + WHY it mattered + RESULT/IMPACT. Include metrics. If nothing discussed, write "{fallback}"]

### Collaboration & Mentorship
[ONLY list work that is primarily about helping others - mentoring, code reviews, unblocking teammates. Do NOT duplicate items from Projects. If nothing discussed, write "{fallback}"]

### Design & Documentation
[List docs, designs, or technical writing. Include purpose/impact. If nothing discussed, write "{fallback}"]

### What I Learned
[CRITICAL: Extract learning even from routine work - insights about process, approach, decisions, or what you'd do differently. Strategic thinking and decision frameworks ARE learning. If genuinely nothing was learned, write "{fallback}"]

CRITICAL FORMATTING RULES:
- Focus on OUTCOMES not activities: "Shipped X resulting in Y" not "Worked on X"
- Include ALL numbers/metrics mentioned: team size, time saved, revenue, % improvement, days blocked, etc.
- Show business impact: revenue protected, deals enabled, customers helped, risks averted
- Each bullet: Action Verb + What + Impact + (Metric if available)
- Examples of good bullets:
  * "Unblocked 5-person DevOps team from day-long blocker on critical $500K portal launch, preventing further schedule delays"
  * "Designed and implemented onboarding sequence for new $10K/month client, establishing core revenue-generating service delivery"
  * "Shaped technical strategy for agentic development integration, aligning 3-person dev team on approach before implementation"
- Avoid duplicating the same work in multiple sections
- Use active, specific language: "Led", "Shipped", "Unblocked", "Designed", "Scaled"
- Capture insights and decision frameworks in Learning section
- Never omit a section; a section with nothing discussed contains exactly "{fallback}"

Generate ONLY the markdown, no additional commentary."#;

/// Generation prompt for the founder template.
/// Replace: {date}, {entry_title}, {fallback}
pub const FOUNDER_GENERATION_TEMPLATE: &str = r#"Based on our conversation, generate a founder-focused brag document entry in markdown format.

USE THIS EXACT STRUCTURE:

## {date} - {entry_title} Entry

### Customer & Revenue Impact
[List work that directly affected customers, revenue, or product-market fit. Each bullet must show: WHAT + BUSINESS IMPACT + METRICS. Include: $ amounts, customer count, retention signals, deal values. If nothing discussed, write "{fallback}"]

### Team & Velocity
[List work that unblocked people, improved team speed, or built culture. Show: WHO was affected (how many people), WHAT they were blocked on, TIME saved/delays prevented. If nothing discussed, write "{fallback}"]

### Strategic Decisions & Insights
[List resource allocation choices, strategic pivots, market insights, or decision frameworks. Show: WHAT you decided + WHY (the reasoning/insight) + WHAT it enables. If nothing discussed, write "{fallback}"]

### What I Learned
[CRITICAL: Capture strategic insights, decision frameworks, and mental models developed. Even routine founder work teaches about market, team, product, or self. Strategic thinking like "alignment on what/why before how" IS learning. If genuinely nothing, write "{fallback}"]

CRITICAL FORMATTING FOR FOUNDERS:
- Lead with business impact: revenue, customers, velocity, market insight
- Include ALL metrics: $ amounts, team sizes, time scales, customer counts
- Show strategic reasoning: "Decided to X (instead of Y) because Z, enabling W"
- Capture what you learned about running your business
- Examples of good founder bullets:
  * "Unblocked 5-person DevOps team from day-long deployment blocker, preventing delays on critical $500K portal launch for flagship enterprise customer"
  * "Closed initial setup for new $10K MRR client, establishing core service delivery that validates pricing model"
  * "Guided 3-person dev team toward alignment on strategic approach before tactical implementation, learning that 'what/why before how' reduces rework cycles"
  * "Learned: Forcing alignment on objectives before discussing implementation reduces technical rework and builds team ownership"
- Never omit a section; a section with nothing discussed contains exactly "{fallback}"

Generate ONLY the markdown, no additional commentary."#;

/// Builds the final user message that asks for the document.
pub fn build_generation_prompt(mode: Mode, timeframe: Timeframe, date: NaiveDate) -> String {
    let template = match mode {
        Mode::General => GENERAL_GENERATION_TEMPLATE,
        Mode::Founder => FOUNDER_GENERATION_TEMPLATE,
    };

    template
        .replace("{date}", &date.format("%Y-%m-%d").to_string())
        .replace("{entry_title}", timeframe.entry_title())
        .replace("{fallback}", SECTION_FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_header_carries_date_and_timeframe() {
        let prompt = build_generation_prompt(Mode::General, Timeframe::Weekly, date());
        assert!(prompt.contains("## 2025-03-14 - Weekly Entry"));
        let prompt = build_generation_prompt(Mode::Founder, Timeframe::Daily, date());
        assert!(prompt.contains("## 2025-03-14 - Daily Entry"));
    }

    #[test]
    fn test_every_section_header_is_in_its_template() {
        for mode in [Mode::General, Mode::Founder] {
            let prompt = build_generation_prompt(mode, Timeframe::Sprint, date());
            for section in sections_for(mode) {
                assert!(
                    prompt.contains(&format!("### {section}\n")),
                    "{mode} template missing section {section}"
                );
            }
        }
    }

    #[test]
    fn test_fallback_rule_is_spelled_out() {
        let prompt = build_generation_prompt(Mode::Founder, Timeframe::Sprint, date());
        assert!(prompt.contains("write \"None this period.\""));
        assert!(!prompt.contains("{fallback}"));
    }
}
