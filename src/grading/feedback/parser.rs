//! Parser for raw annotated feedback strings.
//!
//! Grammar (markers may repeat and appear in any order after the description):
//!
//! ```text
//! feedback    := [label ":"] description marker* ["FORBEDRING:" explanation]
//! marker      := "[CITAT: \"" text "\"]" | "OMSKRIV TIL: \"" text "\""
//! ```
//!
//! Malformed input degrades to empty fields; parsing never fails.

use std::sync::OnceLock;

use regex::Regex;

use super::{FeedbackCategory, FeedbackItem};

/// Label used when a string carries no category prefix.
pub const DEFAULT_LABEL: &str = "Andet";

pub const CITATION_MARKER: &str = "[CITAT:";
pub const SUGGESTION_MARKER: &str = "OMSKRIV TIL:";
pub const EXPLANATION_MARKER: &str = "FORBEDRING:";

struct Patterns {
    label: Regex,
    citation: Regex,
    suggestion: Regex,
    legacy_citation: Regex,
    legacy_suggestion: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        label: compile(r#"^([^:\[\]"]+):"#),
        // Quoted spans may cross line breaks when they cite multi-line text.
        citation: compile(r#"(?s)\[CITAT: "(.*?)"\]"#),
        suggestion: compile(r#"(?s)OMSKRIV TIL: "(.*?)""#),
        // Older strings: missing closing quote/bracket or irregular spacing.
        legacy_citation: compile(r#"\[CITAT:\s*"?([^"\]]*)"#),
        legacy_suggestion: compile(r#"OMSKRIV TIL:\s*"?([^"\[]*)"#),
    })
}

fn compile(pattern: &str) -> Regex {
    // Patterns are constants covered by tests.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid feedback pattern {pattern}: {e}"))
}

/// Parse a raw feedback string into a [`FeedbackItem`].
pub fn parse(raw: &str) -> FeedbackItem {
    let p = patterns();
    let raw = raw.trim();

    let (label, body_start) = match p.label.captures(raw) {
        Some(caps) => {
            let label = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            if label.is_empty() || is_marker_keyword(label) {
                (None, 0)
            } else {
                (Some(label), end)
            }
        }
        None => (None, 0),
    };

    FeedbackItem {
        category: label
            .map(FeedbackCategory::from_label)
            .unwrap_or(FeedbackCategory::Other),
        label: label.unwrap_or(DEFAULT_LABEL).to_string(),
        description: description(&raw[body_start..]),
        citations: extract(raw, &p.citation, &p.legacy_citation, CITATION_MARKER),
        suggestions: extract(raw, &p.suggestion, &p.legacy_suggestion, SUGGESTION_MARKER),
        explanation: explanation(raw),
    }
}

fn is_marker_keyword(label: &str) -> bool {
    matches!(label, "OMSKRIV TIL" | "FORBEDRING" | "CITAT")
}

/// Text up to the first `[` or unquoted annotation marker.
fn description(body: &str) -> String {
    let end = [
        body.find('['),
        find_unquoted(body, SUGGESTION_MARKER),
        find_unquoted(body, EXPLANATION_MARKER),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(body.len());
    body[..end].trim().to_string()
}

/// All strict matches in order; falls back to one lenient match when the
/// marker is present but nothing matched strictly.
fn extract(raw: &str, strict: &Regex, legacy: &Regex, marker: &str) -> Vec<String> {
    let found: Vec<String> = strict
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    if !found.is_empty() || !raw.contains(marker) {
        return found;
    }

    legacy
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| truncate_at_markers(m.as_str()))
        .filter(|text| !text.is_empty())
        .map(|text| vec![text.to_string()])
        .unwrap_or_default()
}

fn truncate_at_markers(text: &str) -> &str {
    let end = [CITATION_MARKER, SUGGESTION_MARKER, EXPLANATION_MARKER]
        .iter()
        .filter_map(|m| text.find(m))
        .min()
        .unwrap_or(text.len());
    text[..end].trim()
}

/// Byte offset of the first `marker` outside a `"..."` span.
///
/// When quotes are unbalanced and every occurrence looks quoted, the last
/// occurrence is used.
pub fn find_unquoted(raw: &str, marker: &str) -> Option<usize> {
    let mut quoted = false;
    for (i, c) in raw.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if !quoted && raw[i..].starts_with(marker) {
            return Some(i);
        }
    }
    raw.rfind(marker)
}

fn explanation(raw: &str) -> String {
    find_unquoted(raw, EXPLANATION_MARKER)
        .map(|i| raw[i + EXPLANATION_MARKER.len()..].trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_item() {
        let raw = r#"Struktur: Svag indledning [CITAT: "Jeg vil skrive om"] OMSKRIV TIL: "Denne opgave undersøger" [CITAT: "til sidst"] OMSKRIV TIL: "Afslutningsvis" FORBEDRING: Det giver læseren overblik."#;
        let item = parse(raw);

        assert_eq!(item.category, FeedbackCategory::Structure);
        assert_eq!(item.label, "Struktur");
        assert_eq!(item.description, "Svag indledning");
        assert_eq!(item.citations, vec!["Jeg vil skrive om", "til sidst"]);
        assert_eq!(
            item.suggestions,
            vec!["Denne opgave undersøger", "Afslutningsvis"]
        );
        assert_eq!(item.explanation, "Det giver læseren overblik.");
    }

    #[test]
    fn missing_label_defaults_to_andet() {
        let item = parse("Godt arbejde med kilderne");
        assert_eq!(item.label, DEFAULT_LABEL);
        assert_eq!(item.category, FeedbackCategory::Other);
        assert_eq!(item.description, "Godt arbejde med kilderne");
        assert!(item.citations.is_empty());
        assert!(item.explanation.is_empty());
    }

    #[test]
    fn unknown_label_is_kept_but_categorized_as_other() {
        let item = parse("Layout: for små marginer");
        assert_eq!(item.label, "Layout");
        assert_eq!(item.category, FeedbackCategory::Other);
        assert_eq!(item.description, "for små marginer");
    }

    #[test]
    fn marker_is_not_mistaken_for_label() {
        let item = parse(r#"OMSKRIV TIL: "bedre" FORBEDRING: klarere"#);
        assert_eq!(item.label, DEFAULT_LABEL);
        assert_eq!(item.suggestions, vec!["bedre"]);
        assert_eq!(item.explanation, "klarere");
    }

    #[test]
    fn citation_and_suggestion_counts_may_differ() {
        let raw = r#"Sprog: Gentagelser [CITAT: "a"] [CITAT: "b"] OMSKRIV TIL: "c""#;
        let item = parse(raw);
        assert_eq!(item.citations, vec!["a", "b"]);
        assert_eq!(item.suggestions, vec!["c"]);
        assert_eq!(item.suggestion_for(1), Some("c"));
    }

    #[test]
    fn legacy_single_citation_without_closing_bracket() {
        let raw = r#"Sprog: Lange sætninger [CITAT: "Det var en lang dag" OMSKRIV TIL: "Dagen var lang" FORBEDRING: Kortere"#;
        let item = parse(raw);
        assert_eq!(item.citations, vec!["Det var en lang dag"]);
        assert_eq!(item.suggestions, vec!["Dagen var lang"]);
    }

    #[test]
    fn legacy_suggestion_without_quotes() {
        let raw = "Sprog: Stavefejl OMSKRIV TIL: desuden FORBEDRING: Korrekt stavning";
        let item = parse(raw);
        assert_eq!(item.suggestions, vec!["desuden"]);
        assert_eq!(item.explanation, "Korrekt stavning");
    }

    #[test]
    fn single_well_formed_citation() {
        let item = parse(r#"Fagligt indhold: Mangler kilde [CITAT: "x"]"#);
        assert_eq!(item.citations, vec!["x"]);
    }

    #[test]
    fn description_stops_at_unquoted_markers() {
        let item = parse("Sprog: Stavefejl OMSKRIV TIL: desuden");
        assert_eq!(item.description, "Stavefejl");
        let item = parse("Struktur: Rodet FORBEDRING: Saml pointerne");
        assert_eq!(item.description, "Rodet");
        assert_eq!(item.explanation, "Saml pointerne");
    }

    #[test]
    fn quoted_explanation_marker_is_ignored() {
        let raw = r#"Sprog: Uklart [CITAT: "Min FORBEDRING: bedre kilder"] OMSKRIV TIL: "Jeg forbedrer kildebrugen" FORBEDRING: Tydeligere."#;
        let item = parse(raw);
        assert_eq!(item.citations, vec!["Min FORBEDRING: bedre kilder"]);
        assert_eq!(item.explanation, "Tydeligere.");
    }

    #[test]
    fn find_unquoted_skips_quoted_spans() {
        let raw = r#"a "FORBEDRING: x" FORBEDRING: y"#;
        assert_eq!(find_unquoted(raw, EXPLANATION_MARKER), Some(18));
        assert_eq!(find_unquoted("ingen markør", EXPLANATION_MARKER), None);
        // Unbalanced quote: fall back to the last occurrence.
        assert_eq!(find_unquoted(r#"a "FORBEDRING: x"#, EXPLANATION_MARKER), Some(3));
    }

    #[test]
    fn multi_line_citation() {
        let item = parse("Sprog: Brud [CITAT: \"første linje\nanden linje\"] OMSKRIV TIL: \"samlet\"");
        assert_eq!(item.citations, vec!["første linje\nanden linje"]);
        assert_eq!(item.suggestions, vec!["samlet"]);
    }

    #[test]
    fn empty_input_degrades_gracefully() {
        let item = parse("");
        assert_eq!(item.label, DEFAULT_LABEL);
        assert!(item.description.is_empty());
        assert!(item.citations.is_empty());
        assert!(item.suggestions.is_empty());
    }
}
