//! Section splitting, per-category block classification, and line rendering.
//!
//! A section is a blank-line-delimited chunk of a reply. Each category has a
//! secondary classifier that decides whether a section gets a specialized
//! layout (score breakdown, customer list, action plan) or falls back to a
//! paragraph. Within a block, lines are classified in a single flat pass:
//! numbered, bulleted, `label: value` (score blocks only), or plain text.
//! Classification never fails; it only narrows to a less specific layout.

use once_cell::sync::Lazy;
use regex::Regex;

use super::inline::split_inline;
use super::{BlockKind, RenderBlock, RenderLine, ResponseCategory};

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s*").unwrap());

/// Tone applied to the value side of a `label: value` row in a score block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTone {
    Positive,
    Negative,
    Neutral,
    Plain,
}

/// Pick a tone for the right-hand side of a `label: value` row.
///
/// The "management" exclusion is a preserved special case: score deltas carry
/// a bare `-`, but so do phrases like "account management", and the product
/// rule is to never style those negative. Do not generalize this without
/// product clarification.
pub fn style_value(value: &str) -> ValueTone {
    if value.contains('+') {
        return ValueTone::Positive;
    }
    if value.contains('-') && !value.to_lowercase().contains("management") {
        return ValueTone::Negative;
    }
    if value.contains('%') || is_numeric(value) {
        return ValueTone::Neutral;
    }
    ValueTone::Plain
}

fn is_numeric(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

/// Split a message into sections on blank-line boundaries. A line is blank if
/// it is empty after trimming, so CRLF input and stray trailing spaces split
/// the same way. Sections that would be empty are never produced.
pub(crate) fn split_sections(text: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end_matches('\r'));
        }
    }
    if !current.is_empty() {
        sections.push(current.join("\n"));
    }

    sections
}

/// Render one section under the message's category. Exactly one block per
/// section, so order and count survive the pass.
pub(crate) fn render_section(category: ResponseCategory, section: &str) -> RenderBlock {
    match category {
        ResponseCategory::Email => render_email_section(section),
        ResponseCategory::Scoring => {
            let kind = if is_score_block(section) {
                BlockKind::ScoreBreakdown
            } else {
                BlockKind::Paragraph
            };
            render_block(kind, section.lines())
        }
        ResponseCategory::Customers => {
            let kind = if is_customer_block(section) {
                BlockKind::CustomerList
            } else {
                BlockKind::Paragraph
            };
            render_block(kind, section.lines())
        }
        ResponseCategory::Strategy => {
            let kind = if is_actionable(section) {
                BlockKind::ActionPlan
            } else {
                BlockKind::Paragraph
            };
            render_block(kind, section.lines())
        }
        // Agenda, explanation and general replies are shaped at the line
        // level only; there is no section-level layout to pick.
        ResponseCategory::Agenda | ResponseCategory::Explanation | ResponseCategory::General => {
            render_block(BlockKind::Paragraph, section.lines())
        }
    }
}

// These are literal substring tests matching the backend's observed phrasing,
// not general patterns. "1."/"2."/"3." in particular is intentionally not a
// digit-dot regex.
fn is_score_block(section: &str) -> bool {
    section.contains("Score:")
        || section.contains("Industry")
        || section.contains("bonus")
        || section.contains("points")
}

fn is_customer_block(section: &str) -> bool {
    ["1.", "2.", "3."].iter().any(|marker| section.contains(marker))
}

fn is_actionable(section: &str) -> bool {
    let lower = section.to_lowercase();
    ["next", "action", "recommend", "step"]
        .iter()
        .any(|kw| lower.contains(kw))
}

fn render_email_section(section: &str) -> RenderBlock {
    let mut lines = section.lines();
    if let Some(first) = lines.next() {
        let trimmed = first.trim();
        if let Some(subject) = strip_prefix_ignore_ascii_case(trimmed, "subject:") {
            let mut rendered = vec![RenderLine::Text {
                fragments: split_inline(subject.trim()),
            }];
            rendered.extend(lines.map(|l| classify_line(BlockKind::Subject, l)));
            return RenderBlock {
                kind: BlockKind::Subject,
                lines: rendered,
            };
        }
    }
    render_block(BlockKind::Paragraph, section.lines())
}

fn strip_prefix_ignore_ascii_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    if line.len() >= prefix.len() && line.is_char_boundary(prefix.len()) {
        let (head, rest) = line.split_at(prefix.len());
        if head.eq_ignore_ascii_case(prefix) {
            return Some(rest);
        }
    }
    None
}

fn render_block<'a>(kind: BlockKind, lines: impl Iterator<Item = &'a str>) -> RenderBlock {
    RenderBlock {
        kind,
        lines: lines.map(|l| classify_line(kind, l)).collect(),
    }
}

/// Flat, single-pass line classifier. No nesting: a bullet under a numbered
/// item is still just a bullet.
fn classify_line(kind: BlockKind, line: &str) -> RenderLine {
    let trimmed = line.trim();

    if let Some(caps) = NUMBERED.captures(trimmed) {
        let rest = &trimmed[caps.get(0).expect("full match").end()..];
        if kind == BlockKind::ScoreBreakdown && rest.contains(':') {
            let (label, value) = split_label_value(rest);
            let tone = style_value(&value);
            return RenderLine::Score {
                number: Some(caps[1].to_string()),
                label,
                value,
                tone,
            };
        }
        return RenderLine::Numbered {
            number: caps[1].to_string(),
            fragments: split_inline(rest),
        };
    }

    if let Some(rest) = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('•'))
    {
        return RenderLine::Bullet {
            fragments: split_inline(rest.trim_start()),
        };
    }

    if kind == BlockKind::ScoreBreakdown && trimmed.contains(':') {
        let (label, value) = split_label_value(trimmed);
        let tone = style_value(&value);
        return RenderLine::Score {
            number: None,
            label,
            value,
            tone,
        };
    }

    RenderLine::Text {
        fragments: split_inline(trimmed),
    }
}

fn split_label_value(line: &str) -> (String, String) {
    match line.split_once(':') {
        Some((label, value)) => (label.trim().to_string(), value.trim().to_string()),
        None => (line.trim().to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Fragment;

    #[test]
    fn test_style_value_positive() {
        assert_eq!(style_value("+15%"), ValueTone::Positive);
        assert_eq!(style_value("+20"), ValueTone::Positive);
    }

    #[test]
    fn test_style_value_negative() {
        assert_eq!(style_value("-20%"), ValueTone::Negative);
        assert_eq!(style_value("-5 points"), ValueTone::Negative);
    }

    #[test]
    fn test_style_value_management_exclusion() {
        // "account management" has no leading sign and must not read as a
        // negative delta
        assert_eq!(style_value("account management"), ValueTone::Plain);
        assert_eq!(style_value("self-management tools"), ValueTone::Plain);
    }

    #[test]
    fn test_style_value_neutral() {
        assert_eq!(style_value("85"), ValueTone::Neutral);
        assert_eq!(style_value("12%"), ValueTone::Neutral);
    }

    #[test]
    fn test_style_value_plain() {
        assert_eq!(style_value("strong"), ValueTone::Plain);
        assert_eq!(style_value(""), ValueTone::Plain);
    }

    #[test]
    fn test_split_sections_preserves_order_and_skips_blanks() {
        let sections = split_sections("first\n\nsecond\nstill second\n\n   \n\nthird\n");
        assert_eq!(sections, vec!["first", "second\nstill second", "third"]);
    }

    #[test]
    fn test_split_sections_handles_crlf() {
        let sections = split_sections("a\r\n\r\nb\r\n");
        assert_eq!(sections, vec!["a", "b"]);
    }

    #[test]
    fn test_split_sections_empty_input() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n  \n").is_empty());
    }

    #[test]
    fn test_numbered_line_keeps_captured_number() {
        let line = classify_line(BlockKind::CustomerList, "2. Beta Inc - 80% Match");
        match line {
            RenderLine::Numbered { number, fragments } => {
                assert_eq!(number, "2");
                assert_eq!(fragments, vec![Fragment::Plain("Beta Inc - 80% Match".to_string())]);
            }
            other => panic!("expected numbered line, got {other:?}"),
        }
    }

    #[test]
    fn test_score_block_numbered_label_value() {
        let line = classify_line(BlockKind::ScoreBreakdown, "1. Industry Status: +15");
        match line {
            RenderLine::Score { number, label, value, tone } => {
                assert_eq!(number.as_deref(), Some("1"));
                assert_eq!(label, "Industry Status");
                assert_eq!(value, "+15");
                assert_eq!(tone, ValueTone::Positive);
            }
            other => panic!("expected score line, got {other:?}"),
        }
    }

    #[test]
    fn test_colon_is_plain_text_outside_score_blocks() {
        let line = classify_line(BlockKind::Paragraph, "Timeline: Q3 rollout");
        assert!(matches!(line, RenderLine::Text { .. }));
    }

    #[test]
    fn test_bullet_markers() {
        assert!(matches!(
            classify_line(BlockKind::Paragraph, "- dash bullet"),
            RenderLine::Bullet { .. }
        ));
        assert!(matches!(
            classify_line(BlockKind::Paragraph, "• dot bullet"),
            RenderLine::Bullet { .. }
        ));
    }

    #[test]
    fn test_customer_block_needs_literal_markers() {
        assert!(is_customer_block("1. Acme Corp"));
        assert!(!is_customer_block("4. Delta LLC"));
    }

    #[test]
    fn test_score_block_markers() {
        assert!(is_score_block("Fit Score: 85"));
        assert!(is_score_block("Industry match is strong"));
        assert!(is_score_block("awarded 10 bonus points"));
        assert!(!is_score_block("nothing relevant here"));
    }
}
