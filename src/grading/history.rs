//! Evaluation history persistence and aggregate accuracy statistics.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::grading::types::{Assignment, Grade, GradeRange};
use crate::grading::EvaluationReport;

/// Default history directory, relative to the working directory.
pub const DEFAULT_HISTORY_DIR: &str = ".karakter/history";

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid history record: {0}")]
    Json(#[from] serde_json::Error),
}

/// One saved evaluation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// RFC 3339 timestamp.
    pub evaluated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub word_count: usize,
    pub llm_grade: Grade,
    pub predicted_grade: Grade,
    pub range: GradeRange,
    pub confidence: f64,
    pub accuracy: u8,
    #[serde(default)]
    pub automatically_graded: bool,
}

impl EvaluationRecord {
    pub fn from_report(report: &EvaluationReport, assignment: Option<&Assignment>) -> Self {
        Self {
            evaluated_at: chrono::Utc::now().to_rfc3339(),
            subject: assignment.and_then(|a| a.subject.clone()),
            word_count: assignment.map_or(0, Assignment::effective_word_count),
            llm_grade: report.llm_grade,
            predicted_grade: report.prediction.predicted_grade,
            range: report.prediction.range,
            confidence: report.prediction.confidence,
            accuracy: report.accuracy,
            automatically_graded: report.prediction.is_automatically_graded,
        }
    }
}

/// Aggregate agreement between LLM grades and predictions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccuracyStats {
    pub total: usize,
    pub exact_matches: usize,
    pub within_range: usize,
    pub misses: usize,
    pub mean_accuracy: f64,
    pub mean_confidence: f64,
    /// How often each LLM grade occurred.
    pub grade_distribution: BTreeMap<Grade, usize>,
}

/// Generate a filename for a new record.
pub fn record_filename() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%6f");
    format!("evaluation_{}.json", timestamp)
}

/// Save a record into `dir`, creating it if needed.
pub fn save_record(record: &EvaluationRecord, dir: &Path) -> Result<PathBuf, HistoryError> {
    fs::create_dir_all(dir)?;
    let mut path = dir.join(record_filename());
    let mut suffix = 1;
    while path.exists() {
        let stem = record_filename();
        path = dir.join(stem.replace(".json", &format!("_{}.json", suffix)));
        suffix += 1;
    }
    let json = serde_json::to_string_pretty(record)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn load_record(path: &Path) -> Result<EvaluationRecord, HistoryError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Record files in `dir`, sorted by name (oldest first). A missing directory is empty.
pub fn list_records(dir: &Path) -> Result<Vec<PathBuf>, HistoryError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            records.push(path);
        }
    }

    records.sort();
    Ok(records)
}

pub fn load_all(dir: &Path) -> Result<Vec<EvaluationRecord>, HistoryError> {
    list_records(dir)?
        .iter()
        .map(|path| load_record(path))
        .collect()
}

/// Summarize accuracy across records. All zero for an empty slice.
pub fn aggregate_accuracy(records: &[EvaluationRecord]) -> AccuracyStats {
    if records.is_empty() {
        return AccuracyStats::default();
    }

    let mut stats = AccuracyStats {
        total: records.len(),
        ..Default::default()
    };
    for record in records {
        match record.accuracy {
            100 => stats.exact_matches += 1,
            0 => stats.misses += 1,
            _ => stats.within_range += 1,
        }
        *stats.grade_distribution.entry(record.llm_grade).or_default() += 1;
    }

    let n = records.len() as f64;
    stats.mean_accuracy = records.iter().map(|r| r.accuracy as f64).sum::<f64>() / n;
    stats.mean_confidence = records.iter().map(|r| r.confidence).sum::<f64>() / n;
    stats
}
