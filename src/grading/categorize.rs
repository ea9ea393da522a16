//! Grouping of raw feedback by category, with length-proportional balancing
//! of improvement items.

use std::collections::BTreeMap;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grading::feedback::{FeedbackCategory, FeedbackItem};
use crate::grading::synthesis::{enrich_item, synthesize_item, SnippetPool};
use crate::grading::types::Assignment;

/// Raw feedback strings grouped by category, in display order.
pub type CategorizedFeedback = BTreeMap<FeedbackCategory, Vec<String>>;

/// Which side of the evaluation a list of feedback strings comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Strengths,
    Improvements,
}

/// Bucket strings by their `"<Label>: "` prefix; unprefixed or unknown go to `Other`.
pub fn bucket(items: &[String]) -> CategorizedFeedback {
    let mut buckets = CategorizedFeedback::new();
    for item in items {
        let category = FeedbackCategory::of_raw(item).unwrap_or(FeedbackCategory::Other);
        buckets.entry(category).or_default().push(item.clone());
    }
    buckets
}

/// Feedback items expected for an assignment of `word_count` words, before weighting.
pub fn base_target(word_count: usize) -> usize {
    match word_count {
        0..=499 => 2,
        500..=1499 => 3,
        1500..=2999 => 4,
        _ => 5,
    }
}

/// Weighted target for one category, never below 1.
pub fn target_count(word_count: usize, category: FeedbackCategory) -> usize {
    let weighted = base_target(word_count) as f64 * category.importance_factor();
    (weighted.round() as usize).max(1)
}

/// Group feedback by category.
///
/// Improvements are balanced against the assignment length when the full
/// text is available; strengths are returned as bucketed.
pub fn categorize<R: Rng>(
    items: &[String],
    kind: FeedbackKind,
    assignment: Option<&Assignment>,
    rng: &mut R,
) -> CategorizedFeedback {
    let buckets = bucket(items);
    if kind == FeedbackKind::Strengths {
        return buckets;
    }

    match assignment.and_then(|a| a.body().map(|body| (a, body))) {
        Some((assignment, body)) => {
            balance(buckets, body, assignment.effective_word_count(), rng)
        }
        None => buckets,
    }
}

/// Truncate or fill each non-empty bucket to its target, then enrich sparsely cited items.
///
/// Existing items keep their position; synthesized items are appended.
pub fn balance<R: Rng>(
    buckets: CategorizedFeedback,
    text: &str,
    word_count: usize,
    rng: &mut R,
) -> CategorizedFeedback {
    let pool = SnippetPool::from_text(text);
    let mut balanced = CategorizedFeedback::new();

    for (category, mut items) in buckets {
        if items.is_empty() {
            continue;
        }

        let target = target_count(word_count, category);
        if items.len() > target {
            debug!(
                "Truncating {} from {} to {} items",
                category,
                items.len(),
                target
            );
            items.truncate(target);
        } else if items.len() < target {
            let originals: Vec<FeedbackItem> =
                items.iter().map(|raw| FeedbackItem::parse(raw)).collect();
            let needed = target - items.len();
            debug!("Synthesizing {} items for {}", needed, category);
            for i in 0..needed {
                let base = &originals[i % originals.len()];
                items.push(synthesize_item(category, base, &pool, rng));
            }
        }

        let enriched = items
            .iter()
            .map(|raw| enrich_item(raw, &pool, rng))
            .collect();
        balanced.insert(category, enriched);
    }

    balanced
}

/// Total number of items across all categories.
pub fn total_items(feedback: &CategorizedFeedback) -> usize {
    feedback.values().map(Vec::len).sum()
}
