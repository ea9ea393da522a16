//! Report formatting for evaluation output.
//!
//! Display metadata for categories lives here and nowhere else; the
//! computation in the rest of `grading` never reads it.

use crate::grading::feedback::{FeedbackCategory, FeedbackItem};
use crate::grading::history::AccuracyStats;
use crate::grading::types::GradePrediction;
use crate::grading::EvaluationReport;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable formatted output.
    Pretty,
    /// JSON output.
    Json,
    /// Markdown report.
    Markdown,
    /// Single line summary.
    Compact,
}

/// How a category is shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryStyle {
    pub label: &'static str,
    pub icon: &'static str,
    /// ANSI SGR color code.
    pub color: &'static str,
}

/// Static display table, one entry per category.
pub fn category_style(category: FeedbackCategory) -> CategoryStyle {
    let (icon, color) = match category {
        FeedbackCategory::Content => ("📚", "34"),
        FeedbackCategory::Structure => ("🧱", "35"),
        FeedbackCategory::Language => ("✍", "36"),
        FeedbackCategory::CriticalThinking => ("🔍", "33"),
        FeedbackCategory::PracticalApplication => ("🛠", "32"),
        FeedbackCategory::Other => ("•", "37"),
    };
    CategoryStyle {
        label: category.label(),
        icon,
        color,
    }
}

/// Format an evaluation report.
pub fn format_report(report: &EvaluationReport, format: OutputFormat, verbose: bool) -> String {
    match format {
        OutputFormat::Pretty => format_pretty(report, verbose),
        OutputFormat::Json => to_json(report),
        OutputFormat::Markdown => format_markdown(report),
        OutputFormat::Compact => format_compact(report),
    }
}

/// Format an auto-graded or standalone prediction.
pub fn format_prediction(prediction: &GradePrediction, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(prediction),
        OutputFormat::Markdown => {
            let mut output = format!(
                "## Forventet karakter: {}\n\n- Sikkerhed: {:.0}%\n- Interval: {} til {}\n",
                prediction.predicted_grade,
                prediction.confidence * 100.0,
                prediction.range.min,
                prediction.range.max
            );
            if let Some(q) = &prediction.question_evaluation {
                output.push_str(&format!("- Vurdering: {}\n", q.explanation));
            }
            output
        }
        OutputFormat::Pretty | OutputFormat::Compact => {
            let mut output = format!(
                "Predicted {} ({:.0}% confidence, range {}..{})",
                prediction.predicted_grade,
                prediction.confidence * 100.0,
                prediction.range.min,
                prediction.range.max
            );
            if let Some(q) = &prediction.question_evaluation {
                output.push_str(&format!(": {}", q.explanation));
            }
            output
        }
    }
}

/// Format aggregate accuracy statistics.
pub fn format_stats(stats: &AccuracyStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(stats),
        OutputFormat::Compact => format!(
            "{} evaluations, {:.1}% mean accuracy",
            stats.total, stats.mean_accuracy
        ),
        OutputFormat::Pretty | OutputFormat::Markdown => {
            let mut output = String::new();
            output.push_str(&format!("Evaluations: {}\n", stats.total));
            output.push_str(&format!("Exact matches: {}\n", stats.exact_matches));
            output.push_str(&format!("Within range: {}\n", stats.within_range));
            output.push_str(&format!("Misses: {}\n", stats.misses));
            output.push_str(&format!("Mean accuracy: {:.1}%\n", stats.mean_accuracy));
            output.push_str(&format!(
                "Mean confidence: {:.0}%\n",
                stats.mean_confidence * 100.0
            ));
            if !stats.grade_distribution.is_empty() {
                output.push_str("LLM grades:\n");
                for (grade, count) in &stats.grade_distribution {
                    output.push_str(&format!("  {:>3}: {}\n", grade.symbol(), count));
                }
            }
            output
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn progress_bar(score: u8, width: usize) -> String {
    let filled = (score as usize * width + 50) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled.min(width)))
}

fn format_pretty(report: &EvaluationReport, verbose: bool) -> String {
    let mut output = String::new();
    let prediction = &report.prediction;

    output.push_str(&format!("\x1b[1mKarakter: {}\x1b[0m\n", report.llm_grade));
    output.push_str(&format!(
        "Forventet: {} ({:.0}% sikkerhed, interval {} til {})\n",
        prediction.predicted_grade,
        prediction.confidence * 100.0,
        prediction.range.min,
        prediction.range.max
    ));
    output.push_str(&format!("Overensstemmelse: {}%\n\n", report.accuracy));

    if !report.reasoning.is_empty() {
        output.push_str(&format!("{}\n\n", report.reasoning));
    }

    output.push_str("Kategorier:\n");
    for score in report.category_scores.values() {
        if score.total == 0 && score.category == FeedbackCategory::Other {
            continue;
        }
        let style = category_style(score.category);
        output.push_str(&format!(
            "  \x1b[{}m{} {:<20}\x1b[0m {} {:>3}%\n",
            style.color,
            style.icon,
            style.label,
            progress_bar(score.score, 20),
            score.score
        ));
    }

    output.push_str("\nStyrker:\n");
    for (category, items) in &report.strengths {
        for raw in items {
            let item = FeedbackItem::parse(raw);
            output.push_str(&format!(
                "  {} {}\n",
                category_style(*category).icon,
                item.description
            ));
        }
    }

    output.push_str("\nForbedringer:\n");
    for (category, items) in &report.improvements {
        let style = category_style(*category);
        for raw in items {
            let item = FeedbackItem::parse(raw);
            output.push_str(&format!("  {} {}\n", style.icon, item.description));
            if verbose {
                for (citation, suggestion) in item.pairs() {
                    output.push_str(&format!("      \"{}\"\n", citation));
                    if let Some(suggestion) = suggestion {
                        output.push_str(&format!("      -> \"{}\"\n", suggestion));
                    }
                }
                if !item.explanation.is_empty() {
                    output.push_str(&format!("      {}\n", item.explanation));
                }
            }
        }
    }

    if !report.next_steps.is_empty() {
        output.push_str("\nNæste skridt:\n");
        for (i, step) in report.next_steps.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, step.action));
        }
    }

    output
}

fn format_markdown(report: &EvaluationReport) -> String {
    let mut output = String::new();
    let prediction = &report.prediction;

    output.push_str(&format!("# Karakter: {}\n\n", report.llm_grade));
    output.push_str(&format!(
        "Forventet karakter **{}** ({:.0}% sikkerhed, interval {} til {}). Overensstemmelse: {}%.\n\n",
        prediction.predicted_grade,
        prediction.confidence * 100.0,
        prediction.range.min,
        prediction.range.max,
        report.accuracy
    ));

    output.push_str("| Kategori | Score | Punkter |\n|---|---|---|\n");
    for score in report.category_scores.values() {
        output.push_str(&format!(
            "| {} | {}% | {} |\n",
            score.category.label(),
            score.score,
            score.total
        ));
    }

    output.push_str("\n## Styrker\n\n");
    for items in report.strengths.values() {
        for raw in items {
            output.push_str(&format!("- {}\n", FeedbackItem::parse(raw).description));
        }
    }

    output.push_str("\n## Forbedringer\n\n");
    for (category, items) in &report.improvements {
        output.push_str(&format!("### {}\n\n", category.label()));
        for raw in items {
            let item = FeedbackItem::parse(raw);
            output.push_str(&format!("- **{}**\n", item.description));
            for (citation, suggestion) in item.pairs() {
                output.push_str(&format!("  - > {}\n", citation));
                if let Some(suggestion) = suggestion {
                    output.push_str(&format!("    Omskriv til: _{}_\n", suggestion));
                }
            }
            if !item.explanation.is_empty() {
                output.push_str(&format!("  - {}\n", item.explanation));
            }
        }
        output.push('\n');
    }

    if !report.next_steps.is_empty() {
        output.push_str("## Næste skridt\n\n");
        for (i, step) in report.next_steps.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, step.action));
        }
    }

    output
}

fn format_compact(report: &EvaluationReport) -> String {
    format!(
        "{} predicted={} range={}..{} confidence={:.2} accuracy={}",
        report.llm_grade,
        report.prediction.predicted_grade,
        report.prediction.range.min,
        report.prediction.range.max,
        report.prediction.confidence,
        report.accuracy
    )
}
