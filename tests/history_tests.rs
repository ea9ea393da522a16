//! Integration tests for evaluation history on disk.

use std::fs;

use rand::rngs::StdRng;
use rand::SeedableRng;

use karakter::grading::history::{
    aggregate_accuracy, list_records, load_all, load_record, save_record, EvaluationRecord,
};
use karakter::grading::{Assignment, Evaluation, EvaluationEngine, Grade, GradeRange};

fn record(llm: Grade, predicted: Grade, accuracy: u8, confidence: f64) -> EvaluationRecord {
    EvaluationRecord {
        evaluated_at: "2024-05-01T12:00:00+00:00".to_string(),
        subject: Some("historie".to_string()),
        word_count: 1200,
        llm_grade: llm,
        predicted_grade: predicted,
        range: GradeRange::around(predicted, 1, 1),
        confidence,
        accuracy,
        automatically_graded: false,
    }
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let original = record(Grade::Ten, Grade::Ten, 100, 0.85);

    let path = save_record(&original, dir.path()).unwrap();
    assert!(path.starts_with(dir.path()));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("evaluation_") && name.ends_with(".json"));

    assert_eq!(load_record(&path).unwrap(), original);
}

#[test]
fn list_skips_other_files_and_missing_dirs() {
    let dir = tempfile::tempdir().unwrap();
    assert!(list_records(&dir.path().join("nowhere")).unwrap().is_empty());

    save_record(&record(Grade::Seven, Grade::Seven, 100, 0.8), dir.path()).unwrap();
    save_record(&record(Grade::Four, Grade::Seven, 75, 0.7), dir.path()).unwrap();
    fs::write(dir.path().join("notes.txt"), "ikke en post").unwrap();

    let paths = list_records(dir.path()).unwrap();
    assert_eq!(paths.len(), 2);
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
}

#[test]
fn corrupt_record_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("evaluation_bad.json"), "{not json").unwrap();
    assert!(load_all(dir.path()).is_err());
}

#[test]
fn aggregates_saved_history() {
    let dir = tempfile::tempdir().unwrap();
    let records = [
        record(Grade::Ten, Grade::Ten, 100, 0.9),
        record(Grade::Seven, Grade::Ten, 75, 0.8),
        record(Grade::Zero, Grade::Twelve, 0, 0.7),
    ];
    for r in &records {
        save_record(r, dir.path()).unwrap();
    }

    let stats = aggregate_accuracy(&load_all(dir.path()).unwrap());
    assert_eq!(stats.total, 3);
    assert_eq!(stats.exact_matches, 1);
    assert_eq!(stats.within_range, 1);
    assert_eq!(stats.misses, 1);
    assert!((stats.mean_accuracy - 175.0 / 3.0).abs() < 1e-9);
    assert!((stats.mean_confidence - 0.8).abs() < 1e-9);
    assert_eq!(stats.grade_distribution[&Grade::Ten], 1);
    assert_eq!(stats.grade_distribution.len(), 3);
}

#[test]
fn record_from_engine_report() {
    let evaluation = Evaluation::new(
        Grade::Twelve,
        "Fremragende",
        vec!["Fagligt indhold: Dyb forståelse".to_string()],
        vec![],
    );
    let assignment = Assignment {
        subject: Some("matematik".to_string()),
        word_count: Some(900),
        ..Default::default()
    };
    let report = EvaluationEngine::new().analyze(
        &evaluation,
        Some(&assignment),
        &mut StdRng::seed_from_u64(4),
    );

    let record = EvaluationRecord::from_report(&report, Some(&assignment));
    assert_eq!(record.llm_grade, Grade::Twelve);
    assert_eq!(record.predicted_grade, report.prediction.predicted_grade);
    assert_eq!(record.accuracy, report.accuracy);
    assert_eq!(record.word_count, 900);
    assert_eq!(record.subject.as_deref(), Some("matematik"));
    assert!(chrono::DateTime::parse_from_rfc3339(&record.evaluated_at).is_ok());
}
