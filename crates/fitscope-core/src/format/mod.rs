//! Classification and layout of free-text backend replies.
//!
//! Data flow: message text -> category detection -> blank-line sections ->
//! per-category block renderer -> inline markup. The whole pass is pure,
//! synchronous string processing over an already-fetched string: the same
//! text always produces the same tree, and no input can make it fail. The
//! classification is heuristic best-effort; an unrecognized shape degrades to
//! plain paragraphs, never to an error.

pub mod category;
pub mod inline;
pub mod section;

pub use category::{detect_category, ResponseCategory};
pub use inline::{split_inline, Fragment};
pub use section::{style_value, ValueTone};

/// Layout hint for one rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Email subject header; the first line carries the subject text.
    Subject,
    Paragraph,
    ScoreBreakdown,
    CustomerList,
    ActionPlan,
}

/// One classified line inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderLine {
    Numbered {
        number: String,
        fragments: Vec<Fragment>,
    },
    Bullet {
        fragments: Vec<Fragment>,
    },
    /// A `label: value` row in a score breakdown, with an optional leading
    /// list number kept as a badge.
    Score {
        number: Option<String>,
        label: String,
        value: String,
        tone: ValueTone,
    },
    Text {
        fragments: Vec<Fragment>,
    },
}

/// One rendered block; exactly one per non-blank section of the message.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub kind: BlockKind,
    pub lines: Vec<RenderLine>,
}

/// The render tree handed to the UI shell for one message.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTree {
    pub category: ResponseCategory,
    pub blocks: Vec<RenderBlock>,
}

/// Format a full backend reply into a render tree.
///
/// Sections come back in message order, one block per non-blank section;
/// blank sections are skipped and nothing else is dropped.
pub fn format_message(text: &str) -> RenderTree {
    let category = detect_category(text);
    let blocks = section::split_sections(text)
        .iter()
        .map(|s| section::render_section(category, s))
        .collect();

    RenderTree { category, blocks }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_count_matches_section_count() {
        let text = "intro paragraph\n\n- a\n- b\n\nclosing thought";
        let tree = format_message(text);
        assert_eq!(tree.blocks.len(), 3);
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let text = "Fit Score: 85\n\n1. Industry Status: +15\n2. Feature Match: +20";
        assert_eq!(format_message(text), format_message(text));
    }

    #[test]
    fn test_empty_message_renders_nothing() {
        let tree = format_message("");
        assert_eq!(tree.category, ResponseCategory::General);
        assert!(tree.blocks.is_empty());
    }
}
