//! talent-match: score and rank candidate resumes against job postings

use chrono::Local;
use clap::Parser;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;
use talent_match::cli::{self, Cli, Commands, ConfigAction};
use talent_match::input::manager::{InputManager, LoadedDocument};
use talent_match::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use talent_match::output::report::{MatchReport, ReportMetadata};
use talent_match::processing::embeddings::StaticEmbedder;
use talent_match::processing::experience::{calculate_experience_years_at, find_intervals, merge_intervals};
use talent_match::processing::extraction::ExtractionOrchestrator;
use talent_match::processing::gazetteer::GazetteerExtractor;
use talent_match::processing::pipeline::{MatchEngine, PostingSource};
use talent_match::processing::text_processor::{DocumentKind, TextProcessor};
use talent_match::{Config, MatchError, Result};

const INPUT_EXTENSIONS: &[&str] = &["pdf", "txt"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Score { resume, job, detailed, output, save } => {
            run_match(&config, &job, vec![resume], detailed, output, save).await
        }

        Commands::Rank { job, resumes, detailed, output, save } => {
            run_match(&config, &job, resumes, detailed, output, save).await
        }

        Commands::Extract { file, posting, output } => {
            validate_input(&file, "Input")?;
            let output_format = resolve_format(output, &config)?;

            let mut input_manager = InputManager::new();
            let text = input_manager.extract_text(&file).await?;

            let extractor = GazetteerExtractor::with_extra_terms(&config.extraction.extra_terms)?;
            let orchestrator =
                ExtractionOrchestrator::new(Arc::new(extractor)).with_threshold(config.extraction.threshold);
            let processor = TextProcessor::new();

            let outcome = if posting {
                let processed = processor.normalize(&text, DocumentKind::Posting);
                orchestrator.extract_posting(&processed, &config.extraction.posting_labels)
            } else {
                let processed = processor.normalize(&text, DocumentKind::Profile);
                let years = calculate_experience_years_at(&processed, Local::now().date_naive());
                orchestrator.extract_profile(&processed, &config.extraction.profile_labels, years)
            };
            if outcome.is_failed() {
                warn!("Extraction failed for {}, no entities reported", file.display());
            }

            let generator = ReportGenerator::with_options(config.output.color_output, true, true, true);
            let title = format!("Entities: {}", display_name(&file));
            println!("{}", generator.generate_entities(&title, &outcome.into_entities(), output_format)?);
            Ok(())
        }

        Commands::Experience { file } => {
            validate_input(&file, "Input")?;

            let mut input_manager = InputManager::new();
            let text = input_manager.extract_text(&file).await?;
            let processed = TextProcessor::new().normalize(&text, DocumentKind::Profile);

            let today = Local::now().date_naive();
            let intervals = find_intervals(&processed, today);
            println!("Date ranges found: {}", intervals.len());
            for interval in merge_intervals(intervals) {
                println!("  {} to {}", interval.start.format("%b %Y"), interval.end.format("%b %Y"));
            }
            println!(
                "Total experience: {:.1} years",
                calculate_experience_years_at(&processed, today)
            );
            Ok(())
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("Configuration: {}\n", path.display());
                    let content = toml::to_string_pretty(&config)
                        .map_err(|e| MatchError::Configuration(format!("Failed to serialize config: {}", e)))?;
                    println!("{}", content);
                }
                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset to defaults: {}", path.display());
                }
                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
            Ok(())
        }
    }
}

async fn run_match(
    config: &Config,
    job: &Path,
    resumes: Vec<PathBuf>,
    detailed: bool,
    output: Option<String>,
    save: Option<PathBuf>,
) -> Result<()> {
    let start_time = Instant::now();

    validate_input(job, "Job posting file")?;
    for resume in &resumes {
        validate_input(resume, "Resume file")?;
    }
    let output_format = resolve_format(output, config)?;

    let engine = build_engine(config)?;
    let input_manager = InputManager::new();

    info!("Processing job posting: {}", job.display());
    let source = match input_manager.load(job).await? {
        LoadedDocument::Pdf(bytes) => PostingSource::Document(bytes),
        LoadedDocument::Text(text) => PostingSource::Text(text),
    };
    let posting_run = engine.process_posting(display_name(job), source);

    let mut runs = Vec::with_capacity(resumes.len());
    for resume in &resumes {
        let id = display_name(resume);
        let run = match input_manager.load(resume).await? {
            LoadedDocument::Pdf(bytes) => engine.process_profile(id, &bytes, &posting_run.posting),
            LoadedDocument::Text(text) => engine.process_profile_text(id, &text, &posting_run.posting),
        };
        runs.push(run);
    }

    let metadata = ReportMetadata::new(engine.embedding_model(), start_time.elapsed().as_millis() as u64);
    let report = MatchReport::build(&engine, &posting_run, runs, metadata);

    let generator = ReportGenerator::with_options(
        config.output.color_output && save.is_none(),
        detailed || config.output.detailed,
        true,
        true,
    );
    let content = generator.generate_report(&report, output_format)?;

    match save {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(suggest_filename(output_format, &display_name(job), true))
            } else {
                path
            };
            save_report_to_file(&content, &path)?;
            println!("Report saved to {}", path.display());
        }
        None => println!("{}", content),
    }

    Ok(())
}

fn build_engine(config: &Config) -> Result<MatchEngine> {
    let extractor = GazetteerExtractor::with_extra_terms(&config.extraction.extra_terms)?;
    let embedder = StaticEmbedder::load(&config.models)?;
    Ok(MatchEngine::new(Arc::new(extractor), Arc::new(embedder), &config.extraction))
}

fn validate_input(path: &Path, what: &str) -> Result<()> {
    cli::validate_file_extension(path, INPUT_EXTENSIONS)
        .map_err(|e| MatchError::InvalidInput(format!("{}: {}", what, e)))
}

fn resolve_format(output: Option<String>, config: &Config) -> Result<talent_match::config::OutputFormat> {
    match output {
        Some(format) => cli::parse_output_format(&format).map_err(MatchError::InvalidInput),
        None => Ok(config.output.format),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
