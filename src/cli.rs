//! CLI interface for the talent matcher

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "talent-match")]
#[command(about = "Match candidate resumes against job postings")]
#[command(long_about = "Extract skills, titles and experience from resumes and postings, score candidates with embeddings and report skill gaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one resume against a job posting
    Score {
        /// Path to resume file (PDF, TXT)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job posting file (PDF, TXT)
        #[arg(short, long)]
        job: PathBuf,

        /// Show extracted entities
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Rank several resumes against a job posting
    Rank {
        /// Path to job posting file (PDF, TXT)
        #[arg(short, long)]
        job: PathBuf,

        /// Resume files (PDF, TXT)
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        /// Show extracted entities
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Extract entities from a document
    Extract {
        /// Path to a PDF or TXT file
        file: PathBuf,

        /// Treat the document as a job posting instead of a resume
        #[arg(long)]
        posting: bool,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Compute total years of experience from a resume's date ranges
    Experience {
        /// Path to a PDF or TXT file
        file: PathBuf,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("md"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF"), &["pdf", "txt"]).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &["pdf", "txt"]).is_err());
        assert!(validate_file_extension(Path::new("README"), &["pdf"]).is_err());
    }

    #[test]
    fn test_rank_accepts_many_resumes() {
        let cli = Cli::try_parse_from([
            "talent-match", "rank", "--job", "job.txt", "--resumes", "a.pdf", "b.pdf", "--output", "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Rank { resumes, output, .. } => {
                assert_eq!(resumes.len(), 2);
                assert_eq!(output.as_deref(), Some("json"));
            }
            _ => panic!("expected rank command"),
        }
    }
}
