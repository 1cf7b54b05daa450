//! End-to-end formatting scenarios: raw backend text in, render tree out.

use fitscope_core::format::{
    format_message, split_inline, BlockKind, Fragment, RenderLine, ResponseCategory, ValueTone,
};

fn line_text(line: &RenderLine) -> String {
    match line {
        RenderLine::Numbered { fragments, .. }
        | RenderLine::Bullet { fragments }
        | RenderLine::Text { fragments } => fragments.iter().map(|f| f.text()).collect(),
        RenderLine::Score { label, value, .. } => format!("{}: {}", label, value),
    }
}

#[test]
fn test_email_reply_gets_subject_and_body_blocks() {
    let tree = format_message("Subject: Follow-up\n\nDear Jane, thanks for the call.");

    assert_eq!(tree.category, ResponseCategory::Email);
    assert_eq!(tree.blocks.len(), 2);

    assert_eq!(tree.blocks[0].kind, BlockKind::Subject);
    assert_eq!(line_text(&tree.blocks[0].lines[0]), "Follow-up");

    assert_eq!(tree.blocks[1].kind, BlockKind::Paragraph);
    assert_eq!(
        line_text(&tree.blocks[1].lines[0]),
        "Dear Jane, thanks for the call."
    );
}

#[test]
fn test_scoring_reply_gets_label_value_rows() {
    let tree = format_message("Fit Score: 85\n\n1. Industry Status: +15\n2. Feature Match: +20");

    assert_eq!(tree.category, ResponseCategory::Scoring);
    assert_eq!(tree.blocks.len(), 2);
    assert_eq!(tree.blocks[1].kind, BlockKind::ScoreBreakdown);
    assert_eq!(tree.blocks[1].lines.len(), 2);

    match &tree.blocks[1].lines[0] {
        RenderLine::Score { number, label, tone, .. } => {
            assert_eq!(number.as_deref(), Some("1"));
            assert_eq!(label, "Industry Status");
            assert_eq!(*tone, ValueTone::Positive);
        }
        other => panic!("expected score row, got {other:?}"),
    }
    match &tree.blocks[1].lines[1] {
        RenderLine::Score { label, tone, .. } => {
            assert_eq!(label, "Feature Match");
            assert_eq!(*tone, ValueTone::Positive);
        }
        other => panic!("expected score row, got {other:?}"),
    }
}

#[test]
fn test_customer_reply_gets_numbered_rows() {
    let tree = format_message(
        "Here are similar customers:\n\n1. Acme Corp - 90% Match\n2. Beta Inc - 80% Match",
    );

    assert_eq!(tree.category, ResponseCategory::Customers);
    assert_eq!(tree.blocks.len(), 2);
    assert_eq!(tree.blocks[1].kind, BlockKind::CustomerList);

    let numbers: Vec<_> = tree.blocks[1]
        .lines
        .iter()
        .map(|line| match line {
            RenderLine::Numbered { number, .. } => number.clone(),
            other => panic!("expected numbered row, got {other:?}"),
        })
        .collect();
    assert_eq!(numbers, vec!["1", "2"]);
}

#[test]
fn test_strategy_reply_gets_action_rows() {
    let tree =
        format_message("We recommend the following:\n\n- Start with onboarding\n- Schedule training");

    assert_eq!(tree.category, ResponseCategory::Strategy);
    assert_eq!(tree.blocks.len(), 2);
    assert_eq!(tree.blocks[0].kind, BlockKind::ActionPlan);

    let bullets: Vec<_> = tree.blocks[1]
        .lines
        .iter()
        .map(|line| match line {
            RenderLine::Bullet { fragments } => {
                fragments.iter().map(|f| f.text()).collect::<String>()
            }
            other => panic!("expected bullet row, got {other:?}"),
        })
        .collect();
    assert_eq!(bullets, vec!["Start with onboarding", "Schedule training"]);
}

#[test]
fn test_empty_message_is_general_with_no_blocks() {
    let tree = format_message("");
    assert_eq!(tree.category, ResponseCategory::General);
    assert!(tree.blocks.is_empty());
}

#[test]
fn test_inline_bold_prefix() {
    let fragments = split_inline("**Important**: review this.");
    assert_eq!(
        fragments,
        vec![
            Fragment::Bold("Important".to_string()),
            Fragment::Plain(": review this.".to_string()),
        ]
    );
}

#[test]
fn test_section_order_and_count_survive_formatting() {
    let text = "alpha\n\nbeta line one\nbeta line two\n\n\n\ngamma";
    let tree = format_message(text);
    assert_eq!(tree.blocks.len(), 3);
    assert_eq!(line_text(&tree.blocks[0].lines[0]), "alpha");
    assert_eq!(line_text(&tree.blocks[2].lines[0]), "gamma");
}

#[test]
fn test_arbitrary_garbage_never_panics() {
    for text in [
        "***",
        ":::::",
        "1.",
        "-",
        "•",
        "\n\n\n",
        "Subject:",
        "Score:\u{0}weird",
        "🙂 **emoji** text",
        "subject: x\n\n€€€ dear hello",
    ] {
        let _ = format_message(text);
    }
}
