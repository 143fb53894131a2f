//! Configuration management for the talent matcher

use crate::error::{MatchError, Result};
use crate::processing::entities::labels;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// HuggingFace repo id or local directory of a Model2Vec model
    pub embedding_model: String,
    pub normalize_embeddings: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub threshold: f32,
    pub profile_labels: Vec<String>,
    pub posting_labels: Vec<String>,
    /// Additional dictionary terms for the gazetteer extractor
    #[serde(default)]
    pub extra_terms: Vec<ExtraTerm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraTerm {
    pub label: String,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelConfig {
                embedding_model: "minishlab/potion-base-8M".to_string(),
                normalize_embeddings: None,
            },
            extraction: ExtractionConfig {
                threshold: 0.3,
                profile_labels: labels::PROFILE_LABELS.iter().map(|s| s.to_string()).collect(),
                posting_labels: labels::POSTING_LABELS.iter().map(|s| s.to_string()).collect(),
                extra_terms: Vec::new(),
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| MatchError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MatchError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("talent-match")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.extraction.threshold) {
            return Err(MatchError::Configuration(format!(
                "extraction.threshold must be within [0, 1], got {}",
                self.extraction.threshold
            )));
        }
        if self.extraction.profile_labels.is_empty() || self.extraction.posting_labels.is_empty() {
            return Err(MatchError::Configuration(
                "extraction label sets must not be empty".to_string(),
            ));
        }
        if self.models.embedding_model.trim().is_empty() {
            return Err(MatchError::Configuration(
                "models.embedding_model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.threshold, 0.3);
        assert!(config.extraction.profile_labels.contains(&"Job Title".to_string()));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.output.format = OutputFormat::Json;
        config.extraction.extra_terms.push(ExtraTerm {
            label: "Tool".to_string(),
            term: "Bazel".to_string(),
        });
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = Config::default();
        config.extraction.threshold = 1.5;
        assert!(matches!(config.validate(), Err(MatchError::Configuration(_))));
    }
}
