//! Ranked, actionable next steps drawn from the improvement feedback.

use serde::{Deserialize, Serialize};

use crate::grading::categorize::CategorizedFeedback;
use crate::grading::feedback::{FeedbackCategory, FeedbackItem};

/// Number of next steps shown by default.
pub const DEFAULT_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    pub category: FeedbackCategory,
    pub priority: u8,
    pub action: String,
}

fn render_action(category: FeedbackCategory, point: &str) -> String {
    match category {
        FeedbackCategory::Content => format!("Styrk det faglige indhold: {}", point),
        FeedbackCategory::CriticalThinking => format!("Uddyb din kritiske refleksion: {}", point),
        FeedbackCategory::Structure => format!("Forbedr opgavens opbygning: {}", point),
        FeedbackCategory::Language => format!("Arbejd med sproget: {}", point),
        FeedbackCategory::PracticalApplication => {
            format!("Knyt teorien til praksis: {}", point)
        }
        FeedbackCategory::Other => format!("Se også på: {}", point),
    }
}

/// Top `limit` improvements by category priority, stable within a category.
pub fn next_steps(improvements: &CategorizedFeedback, limit: usize) -> Vec<NextStep> {
    let mut ranked: Vec<(FeedbackCategory, FeedbackItem)> = improvements
        .iter()
        .flat_map(|(&category, items)| {
            items
                .iter()
                .map(move |raw| (category, FeedbackItem::parse(raw)))
        })
        .collect();
    ranked.sort_by_key(|(category, _)| std::cmp::Reverse(category.priority()));

    ranked
        .into_iter()
        .take(limit)
        .map(|(category, item)| {
            let point = if item.description.is_empty() {
                item.explanation
            } else {
                item.description
            };
            NextStep {
                category,
                priority: category.priority(),
                action: render_action(category, &point),
            }
        })
        .collect()
}
