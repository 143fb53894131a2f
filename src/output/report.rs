//! Report structures for match runs

use crate::processing::entities::EntityList;
use crate::processing::pipeline::{rank_runs, MatchEngine, Outcome, PostingRun, ProfileRun};
use crate::processing::skill_gap::GapReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One posting scored against one or more candidates, best first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub posting: PostingSummary,
    pub candidates: Vec<CandidateReport>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingSummary {
    pub id: String,
    pub outcome: Outcome,
    pub entities: EntityList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    /// 1-based position in the ranking
    pub rank: usize,
    pub id: String,
    pub score: f64,
    pub total_years: f64,
    pub outcome: Outcome,
    pub entities: EntityList,
    pub gap: GapReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub embedding_model: String,
    pub processing_time_ms: u64,
}

impl ReportMetadata {
    pub fn new(embedding_model: impl Into<String>, processing_time_ms: u64) -> Self {
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            embedding_model: embedding_model.into(),
            processing_time_ms,
        }
    }
}

impl MatchReport {
    /// Rank the runs and attach a skill-gap report to each candidate
    pub fn build(
        engine: &MatchEngine,
        posting_run: &PostingRun,
        runs: Vec<ProfileRun>,
        metadata: ReportMetadata,
    ) -> Self {
        let posting = &posting_run.posting;
        let candidates = rank_runs(runs)
            .into_iter()
            .enumerate()
            .map(|(idx, run)| CandidateReport {
                rank: idx + 1,
                gap: engine.compare(posting, &run.profile),
                id: run.profile.id,
                score: run.profile.score,
                total_years: run.profile.total_years,
                outcome: run.outcome,
                entities: run.profile.entities,
            })
            .collect();

        Self {
            posting: PostingSummary {
                id: posting.id.clone(),
                outcome: posting_run.outcome.clone(),
                entities: posting.entities.clone(),
            },
            candidates,
            metadata,
        }
    }

    pub fn best(&self) -> Option<&CandidateReport> {
        self.candidates.first()
    }
}

/// Verdict band for a percentage score
pub fn score_band(score: f64) -> &'static str {
    match score {
        s if s >= 80.0 => "STRONG",
        s if s >= 60.0 => "GOOD",
        s if s >= 40.0 => "FAIR",
        _ => "WEAK",
    }
}
