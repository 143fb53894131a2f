//! Dictionary-driven entity extraction backend
//!
//! A deterministic stand-in for a statistical entity model: every known term is
//! matched with Aho-Corasick and reported under its label, honoring the
//! requested label set and word boundaries. Among the hits that pass both
//! checks, the leftmost-longest non-overlapping ones are kept.

use crate::config::ExtraTerm;
use crate::error::{MatchError, Result};
use crate::processing::entities::labels;
use crate::processing::extraction::{EntityExtractor, RawEntity};
use aho_corasick::{AhoCorasick, MatchKind};
use std::collections::HashSet;

pub struct GazetteerExtractor {
    matcher: AhoCorasick,
    terms: Vec<(String, String)>,
}

impl GazetteerExtractor {
    /// Create with the built-in term dictionary
    pub fn new() -> Result<Self> {
        Self::with_extra_terms(&[])
    }

    /// Create with additional label/term pairs
    pub fn with_extra_terms(extra: &[ExtraTerm]) -> Result<Self> {
        let mut terms = Self::default_terms();
        terms.extend(extra.iter().map(|t| (t.label.clone(), t.term.clone())));

        terms.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        let mut seen = HashSet::new();
        terms.retain(|(_, term)| seen.insert(term.to_lowercase()));

        let patterns: Vec<&str> = terms.iter().map(|(_, term)| term.as_str()).collect();
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::Standard)
            .build(&patterns)
            .map_err(|e| MatchError::Extraction(format!("Failed to build gazetteer: {}", e)))?;

        Ok(Self { matcher, terms })
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    fn default_terms() -> Vec<(String, String)> {
        let groups: &[(&str, &[&str])] = &[
            (labels::PROGRAMMING_LANGUAGE, &[
                "Python", "Java", "JavaScript", "TypeScript", "Rust", "Golang", "C++", "C#",
                "Ruby", "PHP", "Swift", "Kotlin", "Scala",
            ]),
            (labels::FRAMEWORK, &[
                "Django", "Django REST Framework", "Flask", "FastAPI", "React", "ReactJS",
                "Angular", "Vue", "Next.js", "Node.js", "Spring", "Laravel", "Flutter",
                "PyTorch", "TensorFlow", "Keras", "scikit-learn",
            ]),
            (labels::DATABASE, &[
                "PostgreSQL", "Postgres", "MySQL", "MongoDB", "SQLite", "Redis",
                "Elasticsearch", "Oracle", "Firebase",
            ]),
            (labels::TECHNOLOGY, &[
                "Docker", "Kubernetes", "K8s", "AWS", "Azure", "GCP", "Git", "GitHub",
                "GitLab", "Linux", "Terraform", "Jenkins", "EC2", "RDS", "Lambda",
            ]),
            (labels::SKILL, &[
                "Machine Learning", "Deep Learning", "REST APIs", "Microservices",
                "CI/CD", "Data Analysis", "NLP",
            ]),
            (labels::JOB_TITLE, &[
                "Software Engineer", "Senior Software Engineer", "Backend Developer",
                "Frontend Developer", "Full Stack Developer", "Data Scientist",
                "DevOps Engineer", "ML Engineer", "Project Manager",
            ]),
            (labels::DEGREE, &[
                "Bachelor of Science", "Master of Science", "BSc", "MSc", "PhD",
            ]),
        ];

        groups
            .iter()
            .flat_map(|(label, terms)| {
                terms.iter().map(move |term| (label.to_string(), term.to_string()))
            })
            .collect()
    }

    fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
    }
}

impl EntityExtractor for GazetteerExtractor {
    fn predict(&self, text: &str, label_set: &[String], threshold: f32) -> Result<Vec<RawEntity>> {
        // exact dictionary hits carry full confidence
        const CONFIDENCE: f32 = 1.0;
        if CONFIDENCE < threshold {
            return Ok(Vec::new());
        }

        let wants = |label: &str| label_set.iter().any(|l| l == label);

        let mut hits = Vec::new();
        for mat in self.matcher.find_overlapping_iter(text) {
            let (term_label, _) = &self.terms[mat.pattern().as_usize()];
            // technical terms fall back to the coarse Skill label
            let label = if wants(term_label) {
                term_label.as_str()
            } else if labels::TECHNICAL_LABELS.contains(&term_label.as_str()) && wants(labels::SKILL) {
                labels::SKILL
            } else {
                continue;
            };
            if !Self::is_word_boundary(text, mat.start(), mat.end()) {
                continue;
            }
            hits.push((mat.start(), mat.end(), label));
        }

        // leftmost first, longest first at the same start
        hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut entities = Vec::new();
        let mut covered = 0;
        for (start, end, label) in hits {
            if start < covered {
                continue;
            }
            covered = end;
            entities.push(RawEntity {
                label: label.to_string(),
                text: text[start..end].to_string(),
                start: Some(text[..start].chars().count()),
            });
        }

        Ok(entities)
    }
}
