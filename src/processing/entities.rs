//! Entity structures shared by extraction, scoring and gap reporting

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Label vocabulary
pub mod labels {
    pub const SKILL: &str = "Skill";
    pub const TECHNOLOGY: &str = "Technology";
    pub const FRAMEWORK: &str = "Framework";
    pub const PROGRAMMING_LANGUAGE: &str = "Programming Language";
    pub const JOB_TITLE: &str = "Job Title";
    pub const PROJECT: &str = "Project";
    pub const DEGREE: &str = "Degree";
    pub const UNIVERSITY: &str = "University";
    pub const DATABASE: &str = "Database";
    pub const TOOL: &str = "Tool";
    pub const PLATFORM: &str = "Platform";
    pub const CLOUD: &str = "Cloud";
    pub const SERVICE: &str = "Service";
    pub const EXPERIENCE: &str = "Experience";
    pub const MIN_YEARS_REQ: &str = "Min_Years_Req";
    pub const TOTAL_YEARS_CALC: &str = "Total_Years_Calc";
    pub const SKILL_DETECTED: &str = "Skill (Detected)";

    pub const PROFILE_LABELS: &[&str] = &[
        SKILL,
        TECHNOLOGY,
        FRAMEWORK,
        PROGRAMMING_LANGUAGE,
        JOB_TITLE,
        PROJECT,
        DEGREE,
        UNIVERSITY,
        DATABASE,
        TOOL,
        PLATFORM,
        CLOUD,
        SERVICE,
    ];

    pub const POSTING_LABELS: &[&str] = &[SKILL, EXPERIENCE, JOB_TITLE, DEGREE];

    /// Labels whose entities feed the scoring summary and the keyword safety net
    pub const FOCUSED_SKILL_LABELS: &[&str] = &[
        SKILL,
        TECHNOLOGY,
        FRAMEWORK,
        DATABASE,
        TOOL,
        PLATFORM,
        PROGRAMMING_LANGUAGE,
    ];

    /// Labels compared by the skill-gap report
    pub const TECHNICAL_LABELS: &[&str] = &[
        SKILL,
        TECHNOLOGY,
        FRAMEWORK,
        PROGRAMMING_LANGUAGE,
        DATABASE,
        TOOL,
        PLATFORM,
        CLOUD,
        SERVICE,
    ];
}

/// A labeled text span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub text: String,
}

impl Entity {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    fn key(&self) -> (String, String) {
        (self.label.clone(), self.text.to_lowercase())
    }

    pub fn has_label(&self, candidates: &[&str]) -> bool {
        candidates.contains(&self.label.as_str())
    }
}

/// Ordered entity sequence that never holds two entries with the same
/// `(label, lowercase text)`. The first occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Entity>", into = "Vec<Entity>")]
pub struct EntityList {
    entities: Vec<Entity>,
    #[serde(skip)]
    seen: HashSet<(String, String)>,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless an equal entity is already present. Returns whether it was added.
    pub fn push(&mut self, entity: Entity) -> bool {
        if self.seen.insert(entity.key()) {
            self.entities.push(entity);
            true
        } else {
            false
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    /// Texts of entities carrying any of the given labels, in order
    pub fn texts_with_labels(&self, wanted: &[&str]) -> Vec<String> {
        self.entities
            .iter()
            .filter(|e| e.has_label(wanted))
            .map(|e| e.text.clone())
            .collect()
    }

    /// Text of the first entity with this label
    pub fn first_text(&self, label: &str) -> Option<&str> {
        self.entities
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.text.as_str())
    }
}

impl From<Vec<Entity>> for EntityList {
    fn from(entities: Vec<Entity>) -> Self {
        let mut list = EntityList::new();
        for entity in entities {
            list.push(entity);
        }
        list
    }
}

impl From<EntityList> for Vec<Entity> {
    fn from(list: EntityList) -> Self {
        list.entities
    }
}

impl<'a> IntoIterator for &'a EntityList {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
