use std::sync::LazyLock;

use regex::Regex;

pub const SENTINEL: &str = "N/A";
pub const EXCERPT_MAX_CHARS: usize = 500;

// Label opens its line (optionally as a list item); value stops at the first
// `]` or end of line.
static FEATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:[-*][ \t]+)?(?:\*\*)?New Feature(?:\*\*)?:(?:\*\*)?[ \t]*\[?([^\]\n]*)",
    )
    .unwrap()
});

/// Headline pulled from a section body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub summary: String,
    /// Byte range of the line carrying the label, newline included.
    pub line: (usize, usize),
}

pub fn feature(body: &str) -> Option<Feature> {
    let caps = FEATURE_RE.captures(body)?;
    let whole = caps.get(0)?;

    let summary = clean_value(&caps[1]);
    let summary = if summary.is_empty() {
        SENTINEL.to_string()
    } else {
        summary
    };

    let start = body[..whole.start()].rfind('\n').map_or(0, |i| i + 1);
    let end = body[whole.end()..]
        .find('\n')
        .map_or(body.len(), |i| whole.end() + i + 1);

    Some(Feature {
        summary,
        line: (start, end),
    })
}

fn clean_value(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c == '[' || c == ']' || c.is_whitespace())
        .to_string()
}

/// Body text minus the feature line, trimmed and hard-cut.
pub fn excerpt(body: &str, feature: Option<&Feature>) -> String {
    let text = match feature {
        Some(f) => {
            let (start, end) = f.line;
            format!("{}{}", &body[..start], &body[end..])
        }
        None => body.to_string(),
    };
    truncate_chars(text.trim(), EXCERPT_MAX_CHARS)
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_feature() {
        let f = feature("**New Feature:** [AI trip planner]\nBody text.").unwrap();
        assert_eq!(f.summary, "AI trip planner");
        assert_eq!(f.line, (0, 35));
    }

    #[test]
    fn plain_label_and_value() {
        let f = feature("New Feature: Price alerts  \nmore").unwrap();
        assert_eq!(f.summary, "Price alerts");
    }

    #[test]
    fn value_stops_at_closing_bracket() {
        let f = feature("**New Feature:** [Genie assistant] (beta)").unwrap();
        assert_eq!(f.summary, "Genie assistant");
    }

    #[test]
    fn label_with_empty_value_is_sentinel() {
        let f = feature("**New Feature:**\nsomething").unwrap();
        assert_eq!(f.summary, SENTINEL);
        let f = feature("**New Feature:** []").unwrap();
        assert_eq!(f.summary, SENTINEL);
    }

    #[test]
    fn missing_label() {
        assert!(feature("**UX Impact:** faster checkout").is_none());
        assert!(feature("new feature: lowercase").is_none());
    }

    #[test]
    fn label_mid_sentence_is_not_a_field() {
        assert!(feature("Our Brand New Feature: pricing tweaks").is_none());
        assert!(feature("Intro.\nThey call it a New Feature: nothing more").is_none());
    }

    #[test]
    fn label_as_list_item() {
        let f = feature("Intro.\n- **New Feature:** [Deal radar]\nMore.").unwrap();
        assert_eq!(f.summary, "Deal radar");
        assert_eq!(
            excerpt("Intro.\n- **New Feature:** [Deal radar]\nMore.", Some(&f)),
            "Intro.\nMore."
        );
    }

    #[test]
    fn first_label_wins() {
        let f = feature("**New Feature:** [One]\n**New Feature:** [Two]").unwrap();
        assert_eq!(f.summary, "One");
    }

    #[test]
    fn excerpt_drops_feature_line() {
        let body = "\n**New Feature:** [AI trip planner]\nBody text.";
        let f = feature(body);
        assert_eq!(excerpt(body, f.as_ref()), "Body text.");
    }

    #[test]
    fn excerpt_keeps_surrounding_lines() {
        let body = "Intro.\n**New Feature:** [X]\n**UX Impact:** Y";
        let f = feature(body);
        assert_eq!(excerpt(body, f.as_ref()), "Intro.\n**UX Impact:** Y");
    }

    #[test]
    fn excerpt_is_hard_cut() {
        let body = "é".repeat(EXCERPT_MAX_CHARS + 20);
        let e = excerpt(&body, None);
        assert_eq!(e.chars().count(), EXCERPT_MAX_CHARS);
    }

    #[test]
    fn excerpt_of_blank_body() {
        assert_eq!(excerpt("  \n \n", None), "");
    }
}
