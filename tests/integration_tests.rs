//! Integration tests for the talent matcher

use std::path::Path;
use std::sync::Arc;
use talent_match::config::Config;
use talent_match::input::manager::{InputManager, LoadedDocument};
use talent_match::output::formatter::ReportGenerator;
use talent_match::output::report::{MatchReport, ReportMetadata};
use talent_match::processing::embeddings::Embedder;
use talent_match::processing::entities::labels;
use talent_match::processing::extraction::{EntityExtractor, RawEntity};
use talent_match::processing::gazetteer::GazetteerExtractor;
use talent_match::processing::pipeline::{MatchEngine, Outcome, PostingSource};
use talent_match::{MatchError, Result};

/// Keyword-count embedding over a small vocabulary, plus a bias dimension
struct FakeEmbedder;

impl Embedder for FakeEmbedder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = ["python", "django", "react", "aws", "kubernetes", "java", "oracle"]
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect();
        vector.push(1.0);
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        "fake-keywords"
    }
}

struct FakeExtractor;

impl EntityExtractor for FakeExtractor {
    fn predict(&self, _text: &str, _label_set: &[String], _threshold: f32) -> Result<Vec<RawEntity>> {
        Err(MatchError::Extraction("model not loaded".to_string()))
    }
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(Path::new("tests/fixtures").join(name)).unwrap()
}

fn gazetteer_engine() -> MatchEngine {
    MatchEngine::new(
        Arc::new(GazetteerExtractor::new().unwrap()),
        Arc::new(FakeEmbedder),
        &Config::default().extraction,
    )
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let result = manager.extract_text(path).await;
    assert!(result.is_ok());

    let text = result.unwrap();
    assert!(text.contains("JANE DOE"));
    assert!(text.contains("Backend Developer"));
    assert!(text.contains("ReactJS"));
}

#[tokio::test]
async fn test_load_keeps_text_documents() {
    let manager = InputManager::new();
    let loaded = manager.load(Path::new("tests/fixtures/sample_job.txt")).await.unwrap();
    assert!(matches!(loaded, LoadedDocument::Text(ref t) if t.contains("3+ years")));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let text1 = manager.extract_text(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let text2 = manager.extract_text(path).await.unwrap();
    assert_eq!(text1, text2);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("tests/fixtures/unsupported.xyz")).await;
    assert!(matches!(result, Err(MatchError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let result = manager.extract_text(Path::new("tests/fixtures/nonexistent.txt")).await;
    assert!(matches!(result, Err(MatchError::InvalidInput(_))));
}

#[test]
fn test_posting_and_profile_gap_report() {
    let engine = gazetteer_engine();

    let posting_run = engine.process_posting("sample_job.txt", PostingSource::Text(fixture("sample_job.txt")));
    assert_eq!(posting_run.outcome, Outcome::Success);
    let posting = &posting_run.posting;
    assert_eq!(posting.entities.first_text(labels::MIN_YEARS_REQ), Some("3"));
    assert!(posting.processed_text.contains("Requirements: Python and Django"));

    let run = engine.process_profile_text("jane", &fixture("sample_resume.txt"), posting);
    assert_eq!(run.outcome, Outcome::Success);

    let profile = &run.profile;
    // Jan 2019 - Jan 2021 overlaps Jun 2020 - Jun 2022
    assert_eq!(profile.total_years, 3.4);
    assert_eq!(profile.entities.first_text(labels::TOTAL_YEARS_CALC), Some("3.4"));
    assert_eq!(profile.entities.first_text(labels::PROJECT), Some("Project Manager"));
    assert!(profile
        .entities
        .texts_with_labels(&[labels::SKILL_DETECTED])
        .contains(&"Numpy".to_string()));

    let gap = engine.compare(posting, profile);
    assert_eq!(gap.matches[0], "3.4 Years Experience (Matches 3+ Req)");
    assert!(gap.matches.contains(&"ReactJS".to_string()));
    assert!(gap.matches.contains(&"AWS".to_string()));
    assert_eq!(gap.misses, vec!["Kubernetes"]);
    assert!(gap.extras.contains(&"PostgreSQL".to_string()));
    assert!(!gap.extras.contains(&"ReactJS".to_string()));
}

#[test]
fn test_ranking_report() {
    let engine = gazetteer_engine();
    let posting_run = engine.process_posting("sample_job.txt", PostingSource::Text(fixture("sample_job.txt")));

    let runs = vec![
        engine.process_profile_text(
            "java.txt",
            "Java developer using Oracle and Spring. Jan 2010 - Jan 2012",
            &posting_run.posting,
        ),
        engine.process_profile_text("jane.txt", &fixture("sample_resume.txt"), &posting_run.posting),
    ];

    let report = MatchReport::build(&engine, &posting_run, runs, ReportMetadata::new(engine.embedding_model(), 5));

    assert_eq!(report.best().unwrap().id, "jane.txt");
    assert_eq!(report.candidates[1].rank, 2);
    assert!(report.candidates[0].score > report.candidates[1].score);
    assert_eq!(report.metadata.embedding_model, "fake-keywords");

    let markdown = ReportGenerator::new()
        .generate_report(&report, talent_match::config::OutputFormat::Markdown)
        .unwrap();
    assert!(markdown.contains("| 1 | jane.txt |"));
}

#[test]
fn test_failed_extraction_still_scores() {
    let engine = MatchEngine::new(Arc::new(FakeExtractor), Arc::new(FakeEmbedder), &Config::default().extraction);
    let posting_run = engine.process_posting("job", PostingSource::Text(fixture("sample_job.txt")));
    assert!(matches!(posting_run.outcome, Outcome::ExtractionFailed(_)));

    let run = engine.process_profile_text("jane", &fixture("sample_resume.txt"), &posting_run.posting);

    assert!(matches!(run.outcome, Outcome::ExtractionFailed(_)));
    assert!(run.profile.entities.is_empty());
    assert!(run.profile.score > 0.0);

    let gap = engine.compare(&posting_run.posting, &run.profile);
    assert!(gap.matches.is_empty() && gap.misses.is_empty() && gap.extras.is_empty());
}
