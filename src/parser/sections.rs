use std::sync::LazyLock;

use regex::Regex;

// `##` exactly: `###` has a third hash where the whitespace must be.
static SECTION_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*##[ \t]+(.*?)\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// Split a report into `## heading` / body pairs.
///
/// Anything before the first second-level heading (report title, preamble) is
/// discarded. Deeper headings stay inside the body they appear in.
pub fn split_sections(markdown: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in markdown.lines() {
        if let Some(caps) = SECTION_HEADING_RE.captures(line) {
            if let Some((heading, body)) = current.take() {
                sections.push(Section {
                    heading,
                    body: body.join("\n"),
                });
            }
            current = Some((caps[1].to_string(), Vec::new()));
            continue;
        }
        if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }

    if let Some((heading, body)) = current {
        sections.push(Section {
            heading,
            body: body.join("\n"),
        });
    }

    sections
}

/// Strip emphasis markers and an ATX closing sequence from heading text.
///
/// An opening marker takes the text up to the next marker of the same kind,
/// so `**Kayak** (KAYAK Software)` gives `Kayak`. Unbalanced markers are fine:
/// `**Kayak*` and `**Kayak` both give `Kayak`.
pub fn entity_name(heading: &str) -> String {
    let mut text = heading.trim();

    // "## Kayak ##" closing hashes need a space before them
    let without_hashes = text.trim_end_matches('#');
    if without_hashes.len() < text.len() && without_hashes.ends_with(char::is_whitespace) {
        text = without_hashes;
    }

    if let Some(marker) = text.chars().next().filter(|c| is_emphasis(*c)) {
        let inner = text.trim_start_matches(marker);
        if let Some(end) = inner.find(marker) {
            text = &inner[..end];
        }
    }

    text.trim_matches(|c: char| is_emphasis(c) || c.is_whitespace())
        .to_string()
}

fn is_emphasis(c: char) -> bool {
    c == '*' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headings(md: &str) -> Vec<String> {
        split_sections(md).into_iter().map(|s| s.heading).collect()
    }

    #[test]
    fn splits_on_second_level_only() {
        let md = "# Weekly Report\nintro\n## Kayak\nbody\n### Detail\nmore\n## Expedia\nx";
        let sections = split_sections(md);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].heading, "Kayak");
        assert_eq!(sections[0].body, "body\n### Detail\nmore");
        assert_eq!(sections[1].heading, "Expedia");
        assert_eq!(sections[1].body, "x");
    }

    #[test]
    fn preamble_is_not_a_section() {
        assert!(split_sections("# Title\nJust an intro paragraph.").is_empty());
    }

    #[test]
    fn empty_input() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("   \n\n").is_empty());
    }

    #[test]
    fn heading_without_body() {
        let sections = split_sections("## Kayak");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "");
    }

    #[test]
    fn crlf_and_indented_headings() {
        assert_eq!(headings("  ## **Agoda**\r\nbody\r\n"), vec!["**Agoda**"]);
    }

    #[test]
    fn hash_without_space_is_body_text() {
        let sections = split_sections("## Kayak\n##nospace\n");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "##nospace");
    }

    #[test]
    fn strips_emphasis() {
        assert_eq!(entity_name("**Kayak**"), "Kayak");
        assert_eq!(entity_name("*Kayak*"), "Kayak");
        assert_eq!(entity_name("__Trip.com__"), "Trip.com");
        assert_eq!(entity_name("  Booking.com  "), "Booking.com");
        assert_eq!(entity_name("** eDreams ODIGEO **"), "eDreams ODIGEO");
    }

    #[test]
    fn unbalanced_emphasis_is_best_effort() {
        assert_eq!(entity_name("**Kayak*"), "Kayak");
        assert_eq!(entity_name("**Kayak"), "Kayak");
        assert_eq!(entity_name("Kayak**"), "Kayak");
        assert_eq!(entity_name("****"), "");
    }

    #[test]
    fn text_after_emphasis_is_dropped() {
        assert_eq!(entity_name("**Kayak** (KAYAK Software)"), "Kayak");
        assert_eq!(entity_name("__Agoda__ - Booking Holdings"), "Agoda");
        assert_eq!(entity_name("*Trip.com* update"), "Trip.com");
        assert_eq!(entity_name("**eDreams_ODIGEO**"), "eDreams_ODIGEO");
    }

    #[test]
    fn closing_hashes() {
        assert_eq!(entity_name("Kayak ##"), "Kayak");
        assert_eq!(entity_name("C#"), "C#");
    }
}
