//! Text normalization for extracted document text

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which side of a match a document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Posting,
    Profile,
}

const BULLET_GLYPHS: &[&str] = &["•", "●"];

pub struct TextProcessor {
    whitespace_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let whitespace_regex = Regex::new(r"\s+").expect("Invalid whitespace regex");
        Self { whitespace_regex }
    }

    /// Strip bullet glyphs and collapse all whitespace runs to single spaces
    pub fn normalize(&self, text: &str, kind: DocumentKind) -> String {
        let mut cleaned = text.to_string();

        for glyph in Self::strip_tokens(kind) {
            cleaned = cleaned.replace(glyph, "");
        }

        self.normalize_whitespace(&cleaned)
    }

    fn strip_tokens(kind: DocumentKind) -> Vec<&'static str> {
        let mut tokens = BULLET_GLYPHS.to_vec();
        match kind {
            DocumentKind::Posting => tokens.push("- "),
            // pipe-separated contact and skill rows
            DocumentKind::Profile => tokens.push("|"),
        }
        tokens
    }

    fn normalize_whitespace(&self, text: &str) -> String {
        self.whitespace_regex.replace_all(text, " ").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_normalization() {
        let processor = TextProcessor::new();
        let text = "  • Rust\n● Python | Go\n\n\tDocker  ";

        let cleaned = processor.normalize(text, DocumentKind::Profile);

        assert_eq!(cleaned, "Rust Python Go Docker");
    }

    #[test]
    fn test_posting_strips_dash_bullets() {
        let processor = TextProcessor::new();
        let text = "Requirements:\n- Python\n- Django\n• AWS";

        let cleaned = processor.normalize(text, DocumentKind::Posting);

        assert_eq!(cleaned, "Requirements: Python Django AWS");
    }

    #[test]
    fn test_posting_keeps_hyphenated_words() {
        let processor = TextProcessor::new();
        let cleaned = processor.normalize("full-stack role, 3-5 years", DocumentKind::Posting);
        assert_eq!(cleaned, "full-stack role, 3-5 years");
    }

    #[test]
    fn test_empty_input() {
        let processor = TextProcessor::new();
        assert_eq!(processor.normalize(" \n\t ", DocumentKind::Profile), "");
    }
}
