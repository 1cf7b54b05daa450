//! Response category detection.
//!
//! The backend answers chat queries with free text whose overall shape
//! (email draft, score breakdown, customer list, ...) decides which layout
//! the UI should use. Detection is an ordered table of keyword rules over the
//! lowercased message; the first matching rule wins. The order is deliberate:
//! several keyword sets can co-occur in one message (a strategy paragraph
//! mentioning "recommend" inside a score breakdown), and earlier categories
//! are the more specific signals.

/// The heuristically detected shape of a backend reply. Recomputed from the
/// message text on every render, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCategory {
    Email,
    Scoring,
    Customers,
    Strategy,
    Agenda,
    Explanation,
    General,
}

/// One detection rule: every keyword in `all` must appear, plus at least one
/// of `any` (an empty `any` list means the `all` set alone decides).
struct Rule {
    category: ResponseCategory,
    all: &'static [&'static str],
    any: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        category: ResponseCategory::Email,
        all: &["subject:"],
        any: &["dear", "hello"],
    },
    Rule {
        category: ResponseCategory::Scoring,
        all: &[],
        any: &["fit score", "base score", "industry status"],
    },
    Rule {
        category: ResponseCategory::Customers,
        all: &[],
        any: &["similar customer", "match percentage"],
    },
    Rule {
        category: ResponseCategory::Strategy,
        all: &[],
        any: &["recommend", "next step", "action item"],
    },
    Rule {
        category: ResponseCategory::Agenda,
        all: &[],
        any: &["agenda", "talking point"],
    },
    Rule {
        category: ResponseCategory::Explanation,
        all: &[],
        any: &["in summary", "this is because", "the reason"],
    },
];

/// Detect the category of a full message. Total over all strings; anything
/// that matches no rule (including the empty string) is `General`.
pub fn detect_category(text: &str) -> ResponseCategory {
    let haystack = text.to_lowercase();

    RULES
        .iter()
        .find(|rule| {
            rule.all.iter().all(|kw| haystack.contains(kw))
                && (rule.any.is_empty() || rule.any.iter().any(|kw| haystack.contains(kw)))
        })
        .map(|rule| rule.category)
        .unwrap_or(ResponseCategory::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_needs_subject_and_greeting() {
        assert_eq!(
            detect_category("Subject: Follow-up\n\nDear Jane,"),
            ResponseCategory::Email
        );
        // A subject line alone is not an email
        assert_eq!(
            detect_category("Subject: quarterly numbers attached"),
            ResponseCategory::General
        );
    }

    #[test]
    fn test_scoring_keywords() {
        assert_eq!(detect_category("Fit Score: 85"), ResponseCategory::Scoring);
        assert_eq!(
            detect_category("the base score starts at 50"),
            ResponseCategory::Scoring
        );
        assert_eq!(
            detect_category("Industry Status: strong"),
            ResponseCategory::Scoring
        );
    }

    #[test]
    fn test_customers_strategy_agenda_explanation() {
        assert_eq!(
            detect_category("Here are similar customers:"),
            ResponseCategory::Customers
        );
        assert_eq!(
            detect_category("We recommend the following:"),
            ResponseCategory::Strategy
        );
        assert_eq!(
            detect_category("Proposed agenda for Tuesday"),
            ResponseCategory::Agenda
        );
        assert_eq!(
            detect_category("In summary, the match is strong."),
            ResponseCategory::Explanation
        );
    }

    #[test]
    fn test_priority_email_beats_scoring() {
        let text = "Subject: your fit score\n\nHello Sam, the fit score is 72.";
        assert_eq!(detect_category(text), ResponseCategory::Email);
    }

    #[test]
    fn test_priority_scoring_beats_strategy() {
        let text = "Fit Score: 85. We recommend onboarding first.";
        assert_eq!(detect_category(text), ResponseCategory::Scoring);
    }

    #[test]
    fn test_detection_is_case_insensitive() {
        assert_eq!(detect_category("FIT SCORE: 90"), ResponseCategory::Scoring);
        assert_eq!(
            detect_category("SUBJECT: hi\nHELLO there"),
            ResponseCategory::Email
        );
    }

    #[test]
    fn test_empty_and_unmatched_fall_back_to_general() {
        assert_eq!(detect_category(""), ResponseCategory::General);
        assert_eq!(
            detect_category("nothing special about this text"),
            ResponseCategory::General
        );
    }
}
