//! Synthesis of additional improvement items from the assignment text.
//!
//! All randomness comes from the caller's [`Rng`], so a seeded generator
//! yields reproducible output.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grading::feedback::parser::{CITATION_MARKER, EXPLANATION_MARKER, SUGGESTION_MARKER};
use crate::grading::feedback::writer::{insert_pairs, RawFeedbackBuilder};
use crate::grading::feedback::{FeedbackCategory, FeedbackItem};
use crate::utils::split_sentences;

const VERBS: &[&str] = &[
    "Styrk", "Uddyb", "Præcisér", "Udbyg", "Skærp", "Nuancér", "Tydeliggør",
];

const TOPICS: &[&str] = &[
    "argumentation",
    "analyse",
    "formulering",
    "sammenhæng",
    "dokumentation",
    "konklusion",
    "brug af eksempler",
];

const SUGGESTION_PREFIXES: &[&str] = &["Overvej at", "Prøv at", "Du kunne", "Det vil hjælpe at"];

const SUGGESTION_ACTIONS: &[&str] = &[
    "omformulere sætningen, så pointen står tydeligere",
    "underbygge påstanden med en konkret kilde",
    "uddybe sammenhængen til opgavens problemformulering",
    "gøre formuleringen mere præcis og fagligt funderet",
    "forklare, hvordan eksemplet understøtter din analyse",
    "dele sætningen op, så hver del bærer én pointe",
];

const EXPLANATION_PREFIXES: &[&str] = &["Dette vil", "En sådan ændring vil", "Det vil"];

const EXPLANATION_EFFECTS: &[&str] = &[
    "gøre din argumentation mere overbevisende",
    "styrke den faglige sammenhæng i opgaven",
    "give læseren et klarere overblik",
    "vise et højere fagligt niveau",
    "øge præcisionen i din fremstilling",
];

/// Minimum snippet length in characters (exclusive).
const MIN_SNIPPET_CHARS: usize = 10;

fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

/// A sentence can be quoted verbatim only if it cannot close the quote or
/// be read as a marker.
fn is_quotable(sentence: &str) -> bool {
    !sentence.contains('"')
        && ![CITATION_MARKER, SUGGESTION_MARKER, EXPLANATION_MARKER]
            .iter()
            .any(|marker| sentence.contains(marker))
}

/// Candidate citation snippets: unique quotable sentences longer than ten characters.
#[derive(Debug, Clone, Default)]
pub struct SnippetPool<'a> {
    sentences: Vec<&'a str>,
}

impl<'a> SnippetPool<'a> {
    pub fn from_text(text: &'a str) -> Self {
        let mut sentences: Vec<&str> = Vec::new();
        for sentence in split_sentences(text) {
            if sentence.chars().count() > MIN_SNIPPET_CHARS
                && is_quotable(sentence)
                && !sentences.contains(&sentence)
            {
                sentences.push(sentence);
            }
        }
        Self { sentences }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Up to `count` distinct snippets not already in `exclude`.
    pub fn pick<R: Rng>(&self, rng: &mut R, count: usize, exclude: &[String]) -> Vec<String> {
        let available: Vec<&str> = self
            .sentences
            .iter()
            .copied()
            .filter(|s| !exclude.iter().any(|e| e == s))
            .collect();
        available
            .choose_multiple(rng, count)
            .map(|s| s.to_string())
            .collect()
    }
}

fn suggestion<R: Rng>(rng: &mut R) -> String {
    format!(
        "{} {}.",
        pick(rng, SUGGESTION_PREFIXES),
        pick(rng, SUGGESTION_ACTIONS)
    )
}

fn explanation<R: Rng>(rng: &mut R) -> String {
    format!(
        "{} {}.",
        pick(rng, EXPLANATION_PREFIXES),
        pick(rng, EXPLANATION_EFFECTS)
    )
}

/// Build a new raw improvement string modelled on `base`.
pub fn synthesize_item<R: Rng>(
    category: FeedbackCategory,
    base: &FeedbackItem,
    pool: &SnippetPool<'_>,
    rng: &mut R,
) -> String {
    let description = format!(
        "{} din {} i {}",
        pick(rng, VERBS),
        pick(rng, TOPICS),
        category.label().to_lowercase()
    );

    let count = rng.gen_range(1..=3);
    let mut builder = RawFeedbackBuilder::with_label(base.label.clone(), description);
    for citation in pool.pick(rng, count, &[]) {
        let text = suggestion(rng);
        builder = builder.pair(citation, text);
    }
    builder.explanation(explanation(rng)).build()
}

/// Add one or two citation/suggestion pairs to an item that has at most one citation.
///
/// Items with more citations, or an empty pool, are returned unchanged.
pub fn enrich_item<R: Rng>(raw: &str, pool: &SnippetPool<'_>, rng: &mut R) -> String {
    let item = FeedbackItem::parse(raw);
    if item.citations.len() > 1 || pool.is_empty() {
        return raw.to_string();
    }

    let count = rng.gen_range(1..=2);
    let pairs: Vec<(String, String)> = pool
        .pick(rng, count, &item.citations)
        .into_iter()
        .map(|citation| {
            let text = suggestion(rng);
            (citation, text)
        })
        .collect();
    insert_pairs(raw, &pairs)
}
