//! Posting and profile processing runs
//!
//! Document Reader → Text Normalizer → {Experience Calculator, Orchestrator}
//! → Similarity Scorer. Models are injected once and shared read-only across
//! runs. Every stage degrades instead of failing; the run reports what
//! degraded through [`Outcome`].

use crate::config::ExtractionConfig;
use crate::error::MatchError;
use crate::input::pdf_reader::PdfReader;
use crate::processing::embeddings::{Embedder, SimilarityScorer};
use crate::processing::entities::EntityList;
use crate::processing::experience::{calculate_experience_years, calculate_experience_years_at};
use crate::processing::extraction::{EntityExtractor, ExtractionOrchestrator, ExtractionOutcome};
use crate::processing::skill_gap::{GapReport, SkillGapComparator};
use crate::processing::text_processor::{DocumentKind, TextProcessor};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Where a posting description comes from
#[derive(Debug, Clone)]
pub enum PostingSource {
    Text(String),
    /// PDF bytes
    Document(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: String,
    pub raw_text: String,
    pub processed_text: String,
    pub entities: EntityList,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub processed_text: String,
    pub total_years: f64,
    pub entities: EntityList,
    pub embedding: Option<Vec<f32>>,
    pub score: f64,
}

/// How a processing run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    /// Entities are empty, the embedding may still exist
    ExtractionFailed(String),
    /// No embedding, so no score
    EmbeddingFailed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    fn from_stages(extraction: &ExtractionOutcome, embedding_error: Option<String>) -> Self {
        match (extraction, embedding_error) {
            (_, Some(reason)) => Outcome::EmbeddingFailed(reason),
            (ExtractionOutcome::Failed { reason }, None) => Outcome::ExtractionFailed(reason.clone()),
            (ExtractionOutcome::Extracted(_), None) => Outcome::Success,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostingRun {
    pub posting: Posting,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub struct ProfileRun {
    pub profile: Profile,
    pub outcome: Outcome,
}

pub struct MatchEngine {
    orchestrator: ExtractionOrchestrator,
    embedder: Arc<dyn Embedder>,
    normalizer: TextProcessor,
    reader: PdfReader,
    comparator: SkillGapComparator,
    profile_labels: Vec<String>,
    posting_labels: Vec<String>,
    reference_date: Option<NaiveDate>,
}

impl MatchEngine {
    pub fn new(
        extractor: Arc<dyn EntityExtractor>,
        embedder: Arc<dyn Embedder>,
        config: &ExtractionConfig,
    ) -> Self {
        Self {
            orchestrator: ExtractionOrchestrator::new(extractor).with_threshold(config.threshold),
            embedder,
            normalizer: TextProcessor::new(),
            reader: PdfReader::new(),
            comparator: SkillGapComparator::default(),
            profile_labels: config.profile_labels.clone(),
            posting_labels: config.posting_labels.clone(),
            reference_date: None,
        }
    }

    pub fn with_reader(mut self, reader: PdfReader) -> Self {
        self.reader = reader;
        self
    }

    /// Resolve open-ended date ranges against a fixed date instead of today
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn process_posting(&self, id: impl Into<String>, source: PostingSource) -> PostingRun {
        let id = id.into();
        let start_time = Instant::now();

        let raw_text = match source {
            PostingSource::Text(text) => text,
            PostingSource::Document(bytes) => self.reader.read_bytes(&bytes),
        };
        let processed_text = self.normalizer.normalize(&raw_text, DocumentKind::Posting);

        let extraction = self.orchestrator.extract_posting(&processed_text, &self.posting_labels);
        let scorer = SimilarityScorer::new(self.embedder.as_ref());
        let embedded = if processed_text.is_empty() {
            Err(MatchError::Embedding("posting has no readable text".to_string()))
        } else {
            scorer.embed_posting(&processed_text)
        };
        let (embedding, embedding_error) = match embedded {
            Ok(vector) => (Some(vector), None),
            Err(e) => {
                warn!("Posting {} has no embedding: {}", id, e);
                (None, Some(e.to_string()))
            }
        };

        let outcome = Outcome::from_stages(&extraction, embedding_error);
        let entities = extraction.into_entities();
        info!(
            "Processed posting {} ({} entities) in {:.2?}",
            id,
            entities.len(),
            start_time.elapsed()
        );

        PostingRun {
            posting: Posting { id, raw_text, processed_text, entities, embedding },
            outcome,
        }
    }

    /// Process a PDF submission against a posting
    pub fn process_profile(&self, id: impl Into<String>, document: &[u8], posting: &Posting) -> ProfileRun {
        let raw_text = self.reader.read_bytes(document);
        self.process_profile_text(id, &raw_text, posting)
    }

    /// Process already-extracted profile text against a posting
    pub fn process_profile_text(&self, id: impl Into<String>, raw_text: &str, posting: &Posting) -> ProfileRun {
        let id = id.into();
        let start_time = Instant::now();

        let processed_text = self.normalizer.normalize(raw_text, DocumentKind::Profile);
        let total_years = match self.reference_date {
            Some(date) => calculate_experience_years_at(&processed_text, date),
            None => calculate_experience_years(&processed_text),
        };

        let extraction = self
            .orchestrator
            .extract_profile(&processed_text, &self.profile_labels, total_years);
        let entities = extraction.entities();

        let scorer = SimilarityScorer::new(self.embedder.as_ref());
        let (embedding, embedding_error) = match scorer.embed_profile(&entities, total_years, &processed_text) {
            Ok(vector) => (Some(vector), None),
            Err(e) => {
                warn!("Profile {} has no embedding, skipping score: {}", id, e);
                (None, Some(e.to_string()))
            }
        };

        let score = SimilarityScorer::score(embedding.as_deref(), posting.embedding.as_deref());
        let outcome = Outcome::from_stages(&extraction, embedding_error);
        info!(
            "Processed profile {} against {}: score {:.2} in {:.2?}",
            id,
            posting.id,
            score,
            start_time.elapsed()
        );

        ProfileRun {
            profile: Profile { id, processed_text, total_years, entities, embedding, score },
            outcome,
        }
    }

    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    pub fn compare(&self, posting: &Posting, profile: &Profile) -> GapReport {
        self.comparator.compare(&posting.entities, &profile.entities)
    }
}

/// Highest score first, ties keep submission order
pub fn rank_profiles(mut profiles: Vec<Profile>) -> Vec<Profile> {
    profiles.sort_by(|a, b| by_score_desc(a.score, b.score));
    profiles
}

/// [`rank_profiles`] for runs that carry their outcome
pub fn rank_runs(mut runs: Vec<ProfileRun>) -> Vec<ProfileRun> {
    runs.sort_by(|a, b| by_score_desc(a.profile.score, b.profile.score));
    runs
}

fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
