//! Entity extraction orchestration
//!
//! Wraps an injected [`EntityExtractor`] with deterministic corrections:
//! synthetic experience entities, section-aware relabeling, de-duplication and
//! a keyword safety net for hard skills the model misses in dense lists.

use crate::error::{MatchError, Result};
use crate::processing::entities::{labels, Entity, EntityList};
use crate::processing::text_processor::DocumentKind;
use log::{debug, error, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

/// Infrastructure terms that are always technologies unless the model saw a
/// title, project or experience phrase
const INFRA_TERMS: &[&str] = &[
    "AWS", "DOCKER", "KUBERNETES", "GIT", "GITHUB", "AZURE", "GCP", "EC2", "RDS", "LAMBDA", "LINUX",
];

const SECTION_HEADERS: &[&str] = &["EXPERIENCE", "EDUCATION", "SKILLS", "SUMMARY"];

/// Hard skills recovered by exact word match when the model misses them
pub const HARD_SKILLS: &[&str] = &[
    // languages
    "python", "java", "c++", "c#", "javascript", "typescript", "php", "ruby", "swift", "kotlin",
    "go", "rust",
    // web and frameworks
    "django", "flask", "fastapi", "react", "angular", "vue", "next.js", "node.js", "spring",
    "laravel", "asp.net", "rubyonrails", "flutter", "react native",
    // data and ai
    "numpy", "pandas", "pytorch", "tensorflow", "keras", "scikit-learn", "opencv", "matplotlib",
    "seaborn", "nltk", "spacy", "huggingface", "llm", "rag", "transformer", "yolo", "chromadb",
    "langchain", "ollama",
    // devops and tools
    "docker", "kubernetes", "aws", "azure", "gcp", "git", "github", "gitlab", "jenkins",
    "terraform", "linux", "redis",
    // databases
    "sql", "mysql", "postgresql", "mongodb", "sqlite", "oracle", "firebase", "elasticsearch",
];

/// Entity span as returned by an extraction model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    pub label: String,
    pub text: String,
    /// Character offset of the span in the input text
    pub start: Option<usize>,
}

/// A named-entity extraction model. Implementations are shared read-only
/// across concurrent submissions.
pub trait EntityExtractor: Send + Sync {
    fn predict(&self, text: &str, label_set: &[String], threshold: f32) -> Result<Vec<RawEntity>>;
}

/// Result of one extraction run
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Extracted(EntityList),
    Failed { reason: String },
}

impl ExtractionOutcome {
    pub fn entities(&self) -> EntityList {
        match self {
            ExtractionOutcome::Extracted(list) => list.clone(),
            ExtractionOutcome::Failed { .. } => EntityList::new(),
        }
    }

    pub fn into_entities(self) -> EntityList {
        match self {
            ExtractionOutcome::Extracted(list) => list,
            ExtractionOutcome::Failed { .. } => EntityList::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExtractionOutcome::Failed { .. })
    }
}

/// Character range between a PROJECTS header and the next known header
#[derive(Debug, Clone, Copy, PartialEq)]
struct ProjectsSection {
    start: usize,
    end: usize,
}

impl ProjectsSection {
    fn locate(text: &str) -> Option<Self> {
        let projects = projects_regex().find(text)?;
        let end_byte = header_regex()
            .find_at(text, projects.end())
            .map(|m| m.start())
            .unwrap_or(text.len());

        Some(Self {
            start: char_offset(text, projects.start()),
            end: char_offset(text, end_byte),
        })
    }

    fn contains(&self, offset: usize) -> bool {
        self.start < offset && offset < self.end
    }
}

fn char_offset(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}

fn projects_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)PROJECTS").expect("Invalid projects regex"))
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("(?i){}", SECTION_HEADERS.join("|"))).expect("Invalid header regex")
    })
}

fn years_required_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\d+\+?\s*-?\s*\d*\s+years?(\s+of\s+experience)?")
            .expect("Invalid years-required regex")
    })
}

fn hard_skill_regexes() -> &'static [(&'static str, Regex)] {
    static RES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    RES.get_or_init(|| {
        HARD_SKILLS
            .iter()
            .map(|skill| {
                let pattern = format!(r"\b{}\b", regex::escape(skill));
                (*skill, Regex::new(&pattern).expect("Invalid hard skill regex"))
            })
            .collect()
    })
}

/// Minimum years required by a posting, from phrases like `5+ years of experience`
pub fn find_min_years_required(text: &str) -> Option<u32> {
    let found = years_required_regex().find(text)?;
    let digits: String = found.as_str().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Title-case each alphabetic run: `node.js` becomes `Node.Js`
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

pub struct ExtractionOrchestrator {
    extractor: Arc<dyn EntityExtractor>,
    threshold: f32,
}

impl ExtractionOrchestrator {
    pub fn new(extractor: Arc<dyn EntityExtractor>) -> Self {
        Self { extractor, threshold: 0.3 }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Entities for a candidate profile, led by the computed experience years
    pub fn extract_profile(&self, text: &str, label_set: &[String], total_years: f64) -> ExtractionOutcome {
        let synthetic = vec![Entity::new(labels::TOTAL_YEARS_CALC, format!("{:.1}", total_years))];
        self.extract(text, label_set, DocumentKind::Profile, synthetic)
    }

    /// Entities for a job posting, led by the minimum years required if stated
    pub fn extract_posting(&self, text: &str, label_set: &[String]) -> ExtractionOutcome {
        let synthetic = find_min_years_required(text)
            .map(|years| vec![Entity::new(labels::MIN_YEARS_REQ, years.to_string())])
            .unwrap_or_default();
        self.extract(text, label_set, DocumentKind::Posting, synthetic)
    }

    fn extract(
        &self,
        text: &str,
        label_set: &[String],
        kind: DocumentKind,
        synthetic: Vec<Entity>,
    ) -> ExtractionOutcome {
        let raw = match self.predict(text, label_set) {
            Ok(raw) => raw,
            Err(e) => {
                error!("Extraction error: {}", e);
                return ExtractionOutcome::Failed { reason: e.to_string() };
            }
        };
        debug!("Model returned {} raw entities", raw.len());

        let mut entities = EntityList::new();
        for entity in synthetic {
            entities.push(entity);
        }

        let projects = ProjectsSection::locate(text);
        for raw_entity in raw {
            let span = raw_entity.text.trim();
            if span.is_empty() {
                continue;
            }
            let label = Self::relabel(&raw_entity.label, span, raw_entity.start, projects);
            entities.push(Entity::new(label, span));
        }

        if kind == DocumentKind::Profile {
            Self::recover_hard_skills(text, &mut entities);
        }

        debug!("Kept {} entities after corrections", entities.len());
        ExtractionOutcome::Extracted(entities)
    }

    /// Call the model, treating a panic inside it like any other failure
    fn predict(&self, text: &str, label_set: &[String]) -> Result<Vec<RawEntity>> {
        let extractor = &self.extractor;
        let threshold = self.threshold;
        match panic::catch_unwind(AssertUnwindSafe(|| extractor.predict(text, label_set, threshold))) {
            Ok(result) => result,
            Err(_) => Err(MatchError::Extraction("extraction model panicked".to_string())),
        }
    }

    fn relabel(label: &str, text: &str, start: Option<usize>, projects: Option<ProjectsSection>) -> String {
        let mut label = label.to_string();

        if label == labels::JOB_TITLE {
            if let (Some(section), Some(offset)) = (projects, start) {
                if section.contains(offset) {
                    label = labels::PROJECT.to_string();
                }
            }
        }

        let upper = text.to_uppercase();
        if INFRA_TERMS.contains(&upper.as_str())
            && ![labels::JOB_TITLE, labels::PROJECT, labels::EXPERIENCE].contains(&label.as_str())
        {
            label = labels::TECHNOLOGY.to_string();
        }

        if text.to_lowercase().contains("year") {
            label = labels::EXPERIENCE.to_string();
        }

        label
    }

    fn recover_hard_skills(text: &str, entities: &mut EntityList) {
        let mut existing: Vec<String> = entities
            .texts_with_labels(labels::FOCUSED_SKILL_LABELS)
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect();
        let text_lower = text.to_lowercase();

        for (skill, pattern) in hard_skill_regexes() {
            if existing.iter().any(|s| s == skill) {
                continue;
            }
            if pattern.is_match(&text_lower) {
                info!("Recovered missing skill via keyword match: {}", skill);
                entities.push(Entity::new(labels::SKILL_DETECTED, title_case(skill)));
                existing.push(skill.to_string());
            }
        }
    }
}
