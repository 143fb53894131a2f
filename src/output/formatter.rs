//! Output formatters for match reports

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{score_band, CandidateReport, MatchReport};
use crate::processing::entities::EntityList;
use crate::processing::pipeline::Outcome;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn format_entities(&self, title: &str, entities: &EntityList) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Dispatches to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn outcome_note(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Success => None,
        Outcome::ExtractionFailed(reason) => Some(format!("entity extraction failed: {}", reason)),
        Outcome::EmbeddingFailed(reason) => Some(format!("embedding failed, not scored: {}", reason)),
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let band = score_band(score);
        let color = match band {
            "STRONG" => Color::Green,
            "GOOD" => Color::BrightGreen,
            "FAIR" => Color::Yellow,
            _ => Color::Red,
        };

        if self.use_colors {
            format!("[{}]", band.color(color).bold())
        } else {
            format!("[{}]", band)
        }
    }

    fn format_list(&self, items: &[String], marker: &str, color: Color) -> String {
        if items.is_empty() {
            return "  (none)\n".to_string();
        }
        items
            .iter()
            .map(|item| format!("  {} {}\n", self.colorize(marker, color), item))
            .collect()
    }

    fn format_candidate(&self, candidate: &CandidateReport) -> String {
        let mut output = String::new();

        output.push_str(&self.format_header(
            &format!("#{} {}", candidate.rank, candidate.id),
            2,
        ));
        output.push_str(&format!(
            "Score: {:.2}% {}\n",
            candidate.score,
            self.format_score_badge(candidate.score)
        ));
        output.push_str(&format!("Experience: {:.1} years\n", candidate.total_years));
        if let Some(note) = outcome_note(&candidate.outcome) {
            output.push_str(&format!("{}\n", self.colorize(&format!("Warning: {}", note), Color::Yellow)));
        }

        output.push_str(&self.format_header("Matches", 3));
        output.push_str(&self.format_list(&candidate.gap.matches, "✓", Color::Green));
        output.push_str(&self.format_header("Missing", 3));
        output.push_str(&self.format_list(&candidate.gap.misses, "✗", Color::Red));
        output.push_str(&self.format_header("Extras", 3));
        output.push_str(&self.format_list(&candidate.gap.extras, "+", Color::Cyan));

        if self.detailed {
            output.push_str(&self.format_header("Extracted Entities", 3));
            output.push_str(&self.entity_lines(&candidate.entities));
        }

        output
    }

    fn entity_lines(&self, entities: &EntityList) -> String {
        if entities.is_empty() {
            return "  (none)\n".to_string();
        }
        entities
            .iter()
            .map(|e| format!("  {} {}\n", self.colorize(&format!("{:<22}", e.label), Color::Blue), e.text))
            .collect()
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("CANDIDATE MATCH REPORT", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms | Model: {}\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms,
            report.metadata.embedding_model
        ));
        output.push_str(&format!("Posting: {}\n", self.colorize(&report.posting.id, Color::Cyan)));
        if let Some(note) = outcome_note(&report.posting.outcome) {
            output.push_str(&format!("{}\n", self.colorize(&format!("Warning: {}", note), Color::Yellow)));
        }

        if self.detailed {
            output.push_str(&self.format_header("Posting Requirements", 2));
            output.push_str(&self.entity_lines(&report.posting.entities));
        }

        for candidate in &report.candidates {
            output.push_str(&self.format_candidate(candidate));
        }

        Ok(output)
    }

    fn format_entities(&self, title: &str, entities: &EntityList) -> Result<String> {
        let mut output = self.format_header(title, 1);
        output.push_str(&self.entity_lines(entities));
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_entities(&self, _title: &str, entities: &EntityList) -> Result<String> {
        self.to_json(entities)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_list(items: &[String]) -> String {
        if items.is_empty() {
            return "_None_\n\n".to_string();
        }
        let mut out: String = items.iter().map(|i| format!("- {}\n", i)).collect();
        out.push('\n');
        out
    }

    fn entity_table(entities: &EntityList) -> String {
        let mut out = String::from("| Label | Text |\n|-------|------|\n");
        for entity in entities {
            out.push_str(&format!("| {} | {} |\n", entity.label, entity.text.replace('|', "\\|")));
        }
        out.push('\n');
        out
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Candidate Match Report\n\n");
        output.push_str(&format!("**Posting:** `{}`\n\n", report.posting.id));

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms | **Model:** {}\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms,
                report.metadata.embedding_model
            ));
        }

        output.push_str("## Ranking\n\n");
        output.push_str("| Rank | Candidate | Score | Experience |\n");
        output.push_str("|------|-----------|-------|------------|\n");
        for c in &report.candidates {
            output.push_str(&format!(
                "| {} | {} | {:.2}% ({}) | {:.1} years |\n",
                c.rank,
                c.id,
                c.score,
                score_band(c.score),
                c.total_years
            ));
        }
        output.push('\n');

        for c in &report.candidates {
            output.push_str(&format!("## {}. {}\n\n", c.rank, c.id));
            if let Some(note) = outcome_note(&c.outcome) {
                output.push_str(&format!("> **Warning:** {}\n\n", note));
            }
            output.push_str("### Matches\n\n");
            output.push_str(&Self::markdown_list(&c.gap.matches));
            output.push_str("### Missing\n\n");
            output.push_str(&Self::markdown_list(&c.gap.misses));
            output.push_str("### Extras\n\n");
            output.push_str(&Self::markdown_list(&c.gap.extras));
        }

        Ok(output)
    }

    fn format_entities(&self, title: &str, entities: &EntityList) -> Result<String> {
        Ok(format!("# {}\n\n{}", title, Self::entity_table(entities)))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_report(report)
    }

    pub fn generate_entities(&self, title: &str, entities: &EntityList, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_entities(title, entities)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, posting_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(posting_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_match{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_match{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_match{}.md", base_name, timestamp_suffix),
    }
}
