//! Embedding generation and similarity scoring

use crate::config::ModelConfig;
use crate::error::{MatchError, Result};
use crate::processing::entities::{labels, EntityList};
use crate::processing::experience::round_to;
use anyhow::Context;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// A text embedding model. Implementations are loaded once and shared
/// read-only across concurrent submissions.
pub trait Embedder: Send + Sync {
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Model2Vec static embeddings
pub struct StaticEmbedder {
    model: StaticModel,
    model_name: String,
}

impl StaticEmbedder {
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model: {}", config.embedding_model);

        let model = StaticModel::from_pretrained(
            &config.embedding_model,
            None, // token
            config.normalize_embeddings,
            None, // subfolder
        )
        .with_context(|| format!("Failed to load embedding model {}", config.embedding_model))?;

        info!("Embedding model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: config.embedding_model.clone(),
        })
    }
}

impl Embedder for StaticEmbedder {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.encode_single(text);
        if embedding.is_empty() {
            return Err(MatchError::Embedding("model returned an empty vector".to_string()));
        }
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Cosine similarity, 0.0 when either vector is absent, empty, all-zero or
/// the dimensions differ
pub fn cosine_similarity(a: Option<&[f32]>, b: Option<&[f32]>) -> f64 {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => return 0.0,
    };

    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Percentage score rounded to two decimals. Negative similarity stays negative.
pub fn match_score(similarity: f64) -> f64 {
    round_to(similarity * 100.0, 2)
}

/// Builds the weighted profile summary and scores it against a posting
pub struct SimilarityScorer<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> SimilarityScorer<'a> {
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    /// `Role: ... Skills: ... Exp: ... Full: ...` summary of a profile
    pub fn build_summary(entities: &EntityList, total_years: f64, normalized_text: &str) -> String {
        let titles = entities.texts_with_labels(&[labels::JOB_TITLE]);
        let mut skill_labels = labels::FOCUSED_SKILL_LABELS.to_vec();
        skill_labels.push(labels::SKILL_DETECTED);
        let skills = entities.texts_with_labels(&skill_labels);

        format!(
            "Role: {}. Skills: {}. Exp: {:.1} years. Full: {}",
            titles.join(", "),
            skills.join(", "),
            total_years,
            normalized_text
        )
    }

    pub fn embed_profile(&self, entities: &EntityList, total_years: f64, normalized_text: &str) -> Result<Vec<f32>> {
        let summary = Self::build_summary(entities, total_years, normalized_text);
        debug!("Embedding profile summary ({} chars) with {}", summary.len(), self.embedder.model_name());
        self.encode(&summary)
    }

    pub fn embed_posting(&self, processed_text: &str) -> Result<Vec<f32>> {
        self.encode(processed_text)
    }

    /// Call the model, treating a panic inside it like any other failure
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let embedder = self.embedder;
        match panic::catch_unwind(AssertUnwindSafe(|| embedder.encode(text))) {
            Ok(result) => result,
            Err(_) => Err(MatchError::Embedding("embedding model panicked".to_string())),
        }
    }

    /// Score in percent, 0.0 unless both embeddings exist
    pub fn score(profile_embedding: Option<&[f32]>, posting_embedding: Option<&[f32]>) -> f64 {
        match_score(cosine_similarity(profile_embedding, posting_embedding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::entities::Entity;

    #[test]
    fn test_cosine_similarity_identity() {
        let v = vec![0.3f32, -1.2, 4.0, 0.5];
        let sim = cosine_similarity(Some(v.as_slice()), Some(v.as_slice()));
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let v = vec![1.0f32, 2.0, 3.0];
        let zero = vec![0.0f32; 3];
        assert_eq!(cosine_similarity(Some(v.as_slice()), Some(zero.as_slice())), 0.0);
        assert_eq!(cosine_similarity(Some(&[][..]), Some(v.as_slice())), 0.0);
        assert_eq!(cosine_similarity(None, Some(v.as_slice())), 0.0);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_and_opposite() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        let c = vec![-1.0f32, 0.0];
        assert_eq!(cosine_similarity(Some(a.as_slice()), Some(b.as_slice())), 0.0);
        assert!((cosine_similarity(Some(a.as_slice()), Some(c.as_slice())) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_is_not_clamped() {
        let a = vec![1.0f32, 0.0];
        let c = vec![-1.0f32, 0.0];
        assert_eq!(SimilarityScorer::score(Some(a.as_slice()), Some(c.as_slice())), -100.0);
        assert_eq!(SimilarityScorer::score(Some(a.as_slice()), None), 0.0);
    }

    #[test]
    fn test_match_score_rounding() {
        assert_eq!(match_score(0.876543), 87.65);
        assert_eq!(match_score(0.0), 0.0);
    }

    struct PanickingEmbedder;

    impl Embedder for PanickingEmbedder {
        fn encode(&self, _text: &str) -> Result<Vec<f32>> {
            panic!("tokenization failed")
        }
    }

    #[test]
    fn test_embedder_panic_becomes_error() {
        let scorer = SimilarityScorer::new(&PanickingEmbedder);
        let result = scorer.embed_posting("Rust engineer");
        assert!(matches!(result, Err(MatchError::Embedding(_))));
        assert!(scorer.embed_profile(&EntityList::new(), 1.0, "Rust").is_err());
    }

    #[test]
    fn test_build_summary() {
        let entities = EntityList::from(vec![
            Entity::new(labels::TOTAL_YEARS_CALC, "4.2"),
            Entity::new(labels::JOB_TITLE, "Backend Developer"),
            Entity::new(labels::FRAMEWORK, "Django"),
            Entity::new(labels::DEGREE, "BSc"),
            Entity::new(labels::SKILL_DETECTED, "Docker"),
        ]);

        let summary = SimilarityScorer::build_summary(&entities, 4.2, "full text");

        assert_eq!(
            summary,
            "Role: Backend Developer. Skills: Django, Docker. Exp: 4.2 years. Full: full text"
        );
    }
}
