//! Assembly of raw feedback strings in the annotated wire format.

use super::parser::{find_unquoted, EXPLANATION_MARKER};
use super::FeedbackCategory;

/// Builder for a raw feedback string.
#[derive(Debug, Clone)]
pub struct RawFeedbackBuilder {
    label: String,
    description: String,
    pairs: Vec<(String, String)>,
    explanation: Option<String>,
}

impl RawFeedbackBuilder {
    pub fn new(category: FeedbackCategory, description: impl Into<String>) -> Self {
        Self::with_label(category.label(), description)
    }

    pub fn with_label(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            pairs: Vec::new(),
            explanation: None,
        }
    }

    /// Add a citation with its rewrite suggestion.
    pub fn pair(mut self, citation: impl Into<String>, suggestion: impl Into<String>) -> Self {
        self.pairs.push((citation.into(), suggestion.into()));
        self
    }

    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn build(&self) -> String {
        let mut out = format!("{}: {}", self.label, self.description);
        out.push_str(&format_pairs(
            self.pairs.iter().map(|(c, s)| (c.as_str(), s.as_str())),
        ));
        if let Some(explanation) = &self.explanation {
            out.push_str(&format!(" {} {}", EXPLANATION_MARKER, explanation));
        }
        out
    }
}

/// Quote-safe text for use inside a `"..."` marker. Text without `"` is unchanged.
pub fn sanitize_quoted(text: &str) -> String {
    text.replace('"', "'")
}

fn format_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .map(|(citation, suggestion)| {
            format!(
                " [CITAT: \"{}\"] OMSKRIV TIL: \"{}\"",
                sanitize_quoted(citation),
                sanitize_quoted(suggestion)
            )
        })
        .collect()
}

/// Insert citation/suggestion pairs immediately before the `FORBEDRING:` marker,
/// or at the end when the string has none.
pub fn insert_pairs(raw: &str, pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return raw.to_string();
    }
    let formatted = format_pairs(pairs.iter().map(|(c, s)| (c.as_str(), s.as_str())));
    match find_unquoted(raw, EXPLANATION_MARKER) {
        Some(idx) => {
            let head = raw[..idx].trim_end();
            format!("{}{} {}", head, formatted, &raw[idx..])
        }
        None => format!("{}{}", raw.trim_end(), formatted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::feedback::parse;

    #[test]
    fn builds_wire_format() {
        let raw = RawFeedbackBuilder::new(FeedbackCategory::Structure, "svag")
            .pair("a", "b")
            .explanation("c")
            .build();
        assert_eq!(
            raw,
            r#"Struktur: svag [CITAT: "a"] OMSKRIV TIL: "b" FORBEDRING: c"#
        );
    }

    #[test]
    fn built_string_parses_back() {
        let raw = RawFeedbackBuilder::new(FeedbackCategory::Language, "Uklare sætninger")
            .pair("første", "1")
            .pair("anden", "2")
            .pair("tredje", "3")
            .explanation("Mere præcist sprog.")
            .build();
        let item = parse(&raw);
        assert_eq!(item.category, FeedbackCategory::Language);
        assert_eq!(item.citations, vec!["første", "anden", "tredje"]);
        assert_eq!(item.suggestions, vec!["1", "2", "3"]);
        assert_eq!(item.explanation, "Mere præcist sprog.");
    }

    #[test]
    fn quotes_are_neutralized() {
        let raw = RawFeedbackBuilder::new(FeedbackCategory::Content, "x")
            .pair("han sagde \"nej\"", "ok")
            .build();
        let item = parse(&raw);
        assert_eq!(item.citations, vec!["han sagde 'nej'"]);
    }

    #[test]
    fn inserts_before_explanation() {
        let raw = r#"Struktur: svag [CITAT: "a"] OMSKRIV TIL: "b" FORBEDRING: c"#;
        let enriched = insert_pairs(raw, &[("d".to_string(), "e".to_string())]);
        assert_eq!(
            enriched,
            r#"Struktur: svag [CITAT: "a"] OMSKRIV TIL: "b" [CITAT: "d"] OMSKRIV TIL: "e" FORBEDRING: c"#
        );
    }

    #[test]
    fn inserts_before_unquoted_explanation_only() {
        let raw = r#"Sprog: x [CITAT: "se FORBEDRING: her"] FORBEDRING: c"#;
        let enriched = insert_pairs(raw, &[("d".to_string(), "e".to_string())]);
        assert_eq!(
            enriched,
            r#"Sprog: x [CITAT: "se FORBEDRING: her"] [CITAT: "d"] OMSKRIV TIL: "e" FORBEDRING: c"#
        );
        let item = parse(&enriched);
        assert_eq!(item.citations, vec!["se FORBEDRING: her", "d"]);
        assert_eq!(item.explanation, "c");
    }

    #[test]
    fn citations_keep_whitespace() {
        let raw = RawFeedbackBuilder::new(FeedbackCategory::Language, "x")
            .pair("to  mellemrum\nog linjeskift", "ok")
            .build();
        assert_eq!(parse(&raw).citations, vec!["to  mellemrum\nog linjeskift"]);
    }

    #[test]
    fn appends_when_no_explanation() {
        let enriched = insert_pairs("Sprog: flot", &[("d".to_string(), "e".to_string())]);
        assert_eq!(enriched, r#"Sprog: flot [CITAT: "d"] OMSKRIV TIL: "e""#);
    }
}
