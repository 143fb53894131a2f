//! Skill-gap comparison between a posting and a candidate profile
//!
//! Required skills are checked against the candidate's skills by an ordered
//! list of [`SkillMatcher`] strategies; the first strategy that reports a
//! match wins. The result is a human-readable report, not a score.

use crate::processing::entities::{labels, EntityList};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lowercased skill text mapped to its original text, in first-seen order.
/// Re-inserting a key keeps its position and takes the latest text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillMap {
    entries: Vec<(String, String)>,
}

impl SkillMap {
    pub fn from_entities(entities: &EntityList) -> Self {
        let mut map = SkillMap::default();
        for entity in entities.iter().filter(|e| e.has_label(labels::TECHNICAL_LABELS)) {
            let text = entity.text.trim();
            map.insert(text.to_lowercase(), text.to_string());
        }
        map
    }

    pub fn insert(&mut self, key: String, text: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((key, text)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, text)| text.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, t)| (k.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchVerdict {
    /// Rendered match line for the report
    Matched(String),
    Unmatched,
}

/// One strategy in the matching cascade
pub trait SkillMatcher: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, required_key: &str, required_text: &str, candidates: &SkillMap) -> MatchVerdict;
}

/// Case-insensitive equality
pub struct ExactMatcher;

impl SkillMatcher for ExactMatcher {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn check(&self, required_key: &str, required_text: &str, candidates: &SkillMap) -> MatchVerdict {
        if candidates.contains_key(required_key) {
            MatchVerdict::Matched(required_text.to_string())
        } else {
            MatchVerdict::Unmatched
        }
    }
}

/// Either key contained in the other, for keys longer than `min_len` characters
pub struct SubstringMatcher {
    pub min_len: usize,
}

impl Default for SubstringMatcher {
    fn default() -> Self {
        Self { min_len: 2 }
    }
}

impl SkillMatcher for SubstringMatcher {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn check(&self, required_key: &str, required_text: &str, candidates: &SkillMap) -> MatchVerdict {
        if required_key.chars().count() <= self.min_len {
            return MatchVerdict::Unmatched;
        }

        for (cand_key, cand_text) in candidates.iter() {
            if cand_key.chars().count() <= self.min_len {
                continue;
            }
            if required_key.contains(cand_key) {
                return MatchVerdict::Matched(format!("{} (matches {})", cand_text, required_text));
            }
            if cand_key.contains(required_key) {
                return MatchVerdict::Matched(cand_text.to_string());
            }
        }

        MatchVerdict::Unmatched
    }
}

/// Alias normalization followed by equality or containment
pub struct SynonymMatcher {
    synonyms: HashMap<String, String>,
}

impl Default for SynonymMatcher {
    fn default() -> Self {
        let pairs = [
            ("drf", "django rest framework"),
            ("reactjs", "react"),
            ("js", "javascript"),
            ("aws", "amazon web services"),
            ("postgres", "postgresql"),
            ("k8s", "kubernetes"),
        ];
        Self::with_synonyms(pairs.iter().map(|(a, c)| (a.to_string(), c.to_string())))
    }
}

impl SynonymMatcher {
    pub fn with_synonyms(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            synonyms: pairs
                .into_iter()
                .map(|(alias, canonical)| (alias.to_lowercase(), canonical.to_lowercase()))
                .collect(),
        }
    }

    fn canonical<'a>(&'a self, key: &'a str) -> &'a str {
        self.synonyms.get(key).map(String::as_str).unwrap_or(key)
    }
}

impl SkillMatcher for SynonymMatcher {
    fn name(&self) -> &'static str {
        "synonym"
    }

    fn check(&self, required_key: &str, required_text: &str, candidates: &SkillMap) -> MatchVerdict {
        let std_required = self.canonical(required_key);

        for (cand_key, cand_text) in candidates.iter() {
            let std_cand = self.canonical(cand_key);
            if std_required == std_cand || std_required.contains(std_cand) {
                return MatchVerdict::Matched(format!("{} (matches {})", cand_text, required_text));
            }
        }

        MatchVerdict::Unmatched
    }
}

/// Candidate experience against the posting's minimum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExperienceVerdict {
    Sufficient { candidate_years: f64, required_years: u32 },
    Insufficient { candidate_years: f64, required_years: u32 },
    /// No requirement stated, candidate experience reported as extra
    Unrequired { candidate_years: f64 },
}

impl ExperienceVerdict {
    pub fn evaluate(required_years: u32, candidate_years: f64) -> Option<Self> {
        if required_years > 0 {
            if candidate_years >= required_years as f64 {
                Some(Self::Sufficient { candidate_years, required_years })
            } else {
                Some(Self::Insufficient { candidate_years, required_years })
            }
        } else if candidate_years > 0.0 {
            Some(Self::Unrequired { candidate_years })
        } else {
            None
        }
    }
}

/// Years as parsed, keeping one decimal for whole numbers ("6.0", "4.25")
struct Years(f64);

impl fmt::Display for Years {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() && self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for ExperienceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceVerdict::Sufficient { candidate_years, required_years } => write!(
                f,
                "{} Years Experience (Matches {}+ Req)",
                Years(*candidate_years),
                required_years
            ),
            ExperienceVerdict::Insufficient { candidate_years, required_years } => write!(
                f,
                "Requires {}+ Years (Has {})",
                required_years,
                Years(*candidate_years)
            ),
            ExperienceVerdict::Unrequired { candidate_years } => {
                write!(f, "{} Years Total Experience", Years(*candidate_years))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub matches: Vec<String>,
    pub misses: Vec<String>,
    pub extras: Vec<String>,
    pub experience: Option<ExperienceVerdict>,
}

pub struct SkillGapComparator {
    matchers: Vec<Box<dyn SkillMatcher>>,
}

impl Default for SkillGapComparator {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ExactMatcher),
            Box::new(SubstringMatcher::default()),
            Box::new(SynonymMatcher::default()),
        ])
    }
}

impl SkillGapComparator {
    /// Matchers are tried in the given order
    pub fn new(matchers: Vec<Box<dyn SkillMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }

    pub fn compare(&self, posting: &EntityList, profile: &EntityList) -> GapReport {
        let required = SkillMap::from_entities(posting);
        let candidate = SkillMap::from_entities(profile);

        let mut report = GapReport::default();

        let required_years = posting
            .first_text(labels::MIN_YEARS_REQ)
            .and_then(|t| t.trim().parse::<u32>().ok())
            .unwrap_or(0);
        let candidate_years = profile
            .first_text(labels::TOTAL_YEARS_CALC)
            .and_then(|t| t.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        report.experience = ExperienceVerdict::evaluate(required_years, candidate_years);
        match &report.experience {
            Some(verdict @ ExperienceVerdict::Sufficient { .. }) => report.matches.insert(0, verdict.to_string()),
            Some(verdict @ ExperienceVerdict::Insufficient { .. }) => report.misses.insert(0, verdict.to_string()),
            Some(verdict @ ExperienceVerdict::Unrequired { .. }) => report.extras.insert(0, verdict.to_string()),
            None => {}
        }

        for (req_key, req_text) in required.iter() {
            match self.first_match(req_key, req_text, &candidate) {
                Some(line) => report.matches.push(line),
                None => report.misses.push(req_text.to_string()),
            }
        }

        let match_strings = report.matches.join(" ").to_lowercase();
        for (cand_key, cand_text) in candidate.iter() {
            if !match_strings.contains(cand_key) && !required.contains_key(cand_key) {
                report.extras.push(cand_text.to_string());
            }
        }

        report
    }

    fn first_match(&self, req_key: &str, req_text: &str, candidates: &SkillMap) -> Option<String> {
        self.matchers
            .iter()
            .find_map(|matcher| match matcher.check(req_key, req_text, candidates) {
                MatchVerdict::Matched(line) => Some(line),
                MatchVerdict::Unmatched => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::entities::Entity;

    fn skills(texts: &[&str]) -> SkillMap {
        let mut map = SkillMap::default();
        for t in texts {
            map.insert(t.to_lowercase(), t.to_string());
        }
        map
    }

    #[test]
    fn test_exact_matcher() {
        let candidates = skills(&["Python"]);
        assert_eq!(
            ExactMatcher.check("python", "PYTHON", &candidates),
            MatchVerdict::Matched("PYTHON".to_string())
        );
        assert_eq!(ExactMatcher.check("rust", "Rust", &candidates), MatchVerdict::Unmatched);
    }

    #[test]
    fn test_substring_matcher_both_directions() {
        let matcher = SubstringMatcher::default();
        assert_eq!(
            matcher.check("react", "React", &skills(&["ReactJS"])),
            MatchVerdict::Matched("ReactJS".to_string())
        );
        assert_eq!(
            matcher.check("django rest framework", "Django REST Framework", &skills(&["Django"])),
            MatchVerdict::Matched("Django (matches Django REST Framework)".to_string())
        );
    }

    #[test]
    fn test_substring_matcher_ignores_short_keys() {
        let matcher = SubstringMatcher::default();
        assert_eq!(matcher.check("go", "Go", &skills(&["Golang"])), MatchVerdict::Unmatched);
        assert_eq!(matcher.check("golang", "Golang", &skills(&["Go"])), MatchVerdict::Unmatched);
    }

    #[test]
    fn test_synonym_matcher() {
        let matcher = SynonymMatcher::default();
        assert_eq!(
            matcher.check("k8s", "K8s", &skills(&["Kubernetes"])),
            MatchVerdict::Matched("Kubernetes (matches K8s)".to_string())
        );
        assert_eq!(
            matcher.check("postgresql", "PostgreSQL", &skills(&["Postgres"])),
            MatchVerdict::Matched("Postgres (matches PostgreSQL)".to_string())
        );
        assert_eq!(matcher.check("aws", "AWS", &skills(&["Azure"])), MatchVerdict::Unmatched);
    }

    #[test]
    fn test_cascade_order_is_respected() {
        let exact_only = SkillGapComparator::new(vec![Box::new(ExactMatcher)]);
        let posting = EntityList::from(vec![Entity::new("Skill", "React")]);
        let profile = EntityList::from(vec![Entity::new("Skill", "ReactJS")]);

        let report = exact_only.compare(&posting, &profile);
        assert_eq!(report.misses, vec!["React"]);

        let default = SkillGapComparator::default();
        assert_eq!(default.matcher_names(), vec!["exact", "substring", "synonym"]);
        assert_eq!(default.compare(&posting, &profile).matches, vec!["ReactJS"]);
    }

    #[test]
    fn test_react_aws_scenario() {
        let posting = EntityList::from(vec![
            Entity::new(labels::MIN_YEARS_REQ, "3"),
            Entity::new(labels::SKILL, "React"),
            Entity::new(labels::TECHNOLOGY, "AWS"),
        ]);
        let profile = EntityList::from(vec![
            Entity::new(labels::TOTAL_YEARS_CALC, "4.2"),
            Entity::new(labels::FRAMEWORK, "ReactJS"),
        ]);

        let report = SkillGapComparator::default().compare(&posting, &profile);

        assert_eq!(
            report.matches,
            vec!["4.2 Years Experience (Matches 3+ Req)".to_string(), "ReactJS".to_string()]
        );
        assert_eq!(report.misses, vec!["AWS"]);
        assert!(report.extras.is_empty());
    }

    #[test]
    fn test_insufficient_experience_leads_misses() {
        let posting = EntityList::from(vec![
            Entity::new(labels::SKILL, "Rust"),
            Entity::new(labels::MIN_YEARS_REQ, "5"),
        ]);
        let profile = EntityList::from(vec![Entity::new(labels::TOTAL_YEARS_CALC, "2.5")]);

        let report = SkillGapComparator::default().compare(&posting, &profile);

        assert_eq!(report.misses, vec!["Requires 5+ Years (Has 2.5)", "Rust"]);
    }

    #[test]
    fn test_extras_and_unrequired_experience() {
        let posting = EntityList::from(vec![Entity::new(labels::SKILL, "Python")]);
        let profile = EntityList::from(vec![
            Entity::new(labels::TOTAL_YEARS_CALC, "6.0"),
            Entity::new(labels::SKILL, "python"),
            Entity::new(labels::DATABASE, "Redis"),
            Entity::new(labels::SKILL_DETECTED, "Docker"),
        ]);

        let report = SkillGapComparator::default().compare(&posting, &profile);

        assert_eq!(report.matches, vec!["Python"]);
        // detected skills are not part of the technical label set
        assert_eq!(report.extras, vec!["6.0 Years Total Experience", "Redis"]);
        assert!(matches!(report.experience, Some(ExperienceVerdict::Unrequired { .. })));
    }

    #[test]
    fn test_stored_years_keep_their_precision() {
        let posting = EntityList::from(vec![Entity::new(labels::MIN_YEARS_REQ, "3")]);
        let profile = EntityList::from(vec![Entity::new(labels::TOTAL_YEARS_CALC, "4.25")]);

        let report = SkillGapComparator::default().compare(&posting, &profile);
        assert_eq!(report.matches, vec!["4.25 Years Experience (Matches 3+ Req)"]);

        let whole = ExperienceVerdict::Insufficient { candidate_years: 2.0, required_years: 5 };
        assert_eq!(whole.to_string(), "Requires 5+ Years (Has 2.0)");
    }

    #[test]
    fn test_unparseable_years_are_ignored() {
        let posting = EntityList::from(vec![Entity::new(labels::MIN_YEARS_REQ, "five")]);
        let profile = EntityList::from(vec![Entity::new(labels::TOTAL_YEARS_CALC, "n/a")]);

        let report = SkillGapComparator::default().compare(&posting, &profile);
        assert_eq!(report, GapReport::default());
    }

    #[test]
    fn test_skill_map_keeps_first_position() {
        let mut map = SkillMap::default();
        map.insert("python".into(), "Python".into());
        map.insert("rust".into(), "Rust".into());
        map.insert("python".into(), "PYTHON".into());

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("python", "PYTHON"), ("rust", "Rust")]);
    }
}
