//! Output formatters: console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::ScanReport;
use crate::processing::keywords::TermScore;
use crate::processing::matcher::{MatchFailure, MatchOutcome, MatchReport};
use colored::{Color, Colorize};
use std::path::Path;

/// Rows of the term table shown when detailed output is off
const SUMMARY_TERM_ROWS: usize = 10;

pub trait OutputFormatter {
    fn format_report(&self, report: &ScanReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
    detailed: bool,
}

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
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

    fn format_verdict(&self, pass: bool) -> String {
        let (label, color) = if pass {
            ("PASS", Color::Green)
        } else {
            ("FAIL", Color::Red)
        };

        if self.use_colors {
            format!("[{}]", label.color(color).bold())
        } else {
            format!("[{}]", label)
        }
    }

    fn format_success(&self, output: &mut String, report: &MatchReport) {
        let result = &report.result;

        output.push_str(&self.format_header("Match Score", 2));
        output.push_str(&format!(
            "Mode: {} | Score: {:.4} (threshold {:.2}) {}\n",
            result.mode,
            result.score,
            report.threshold,
            self.format_verdict(result.pass)
        ));
        if let Some(encoder) = &report.encoder {
            output.push_str(&format!(
                "Encoder: {} ({} dims)\n",
                encoder,
                report.embedding_dimension.unwrap_or(0)
            ));
        }
        if !result.pass {
            output.push_str(&format!(
                "{}\n",
                self.colorize("Below the threshold: work the missing keywords into your resume.", Color::Yellow)
            ));
        }

        output.push_str(&self.format_header("Critical Skills", 2));
        for keyword in &result.critical_keywords {
            let line = if result.critical_missing.contains(keyword) {
                format!("  ✗ {}", self.colorize(keyword, Color::Red))
            } else {
                format!("  ✓ {}", self.colorize(keyword, Color::Green))
            };
            output.push_str(&format!("{}\n", line));
        }

        output.push_str(&self.format_header("Missing Keywords", 2));
        if result.missing_keywords.is_empty() {
            output.push_str(&format!("  {}\n", self.colorize("None, every job keyword appears in the resume", Color::Green)));
        } else {
            let missing: Vec<&str> = result.missing_keywords.iter().map(String::as_str).collect();
            output.push_str(&format!("  {}\n", self.colorize(&missing.join(", "), Color::Yellow)));
        }

        let rows = if self.detailed {
            report.terms.len()
        } else {
            SUMMARY_TERM_ROWS
        };
        output.push_str(&self.format_header(
            &format!("Keyword Table ({} of {} terms)", rows.min(report.terms.len()), report.vocabulary_size),
            3,
        ));
        output.push_str(&format!("  {:>4}  {:<24} {:>6} {:>7}  {}\n", "rank", "term", "job", "resume", "note"));
        for term in report.terms.iter().take(rows) {
            output.push_str(&format!("  {}\n", self.format_term_row(term)));
        }
    }

    fn format_term_row(&self, term: &TermScore) -> String {
        let note = match (&term.near_match, term.missing) {
            (Some(near), true) => format!("missing (resume has \"{}\")", near),
            (None, true) => "missing".to_string(),
            _ => String::new(),
        };
        let marker = if term.critical { "*" } else { " " };

        format!(
            "{:>3}{} {:<24} {:>6.2} {:>7.2}  {}",
            term.rank,
            marker,
            term.term,
            term.job_weight,
            term.resume_weight,
            if term.missing {
                self.colorize(&note, Color::Red)
            } else {
                note
            }
        )
    }

    fn format_failure(&self, output: &mut String, failure: &MatchFailure) {
        output.push_str(&self.format_header("Analysis Failed", 2));
        output.push_str(&format!("Kind: {}\n", self.colorize(&failure.kind.to_string(), Color::Red)));
        output.push_str(&format!("{}\n", failure.message));
        if self.detailed {
            output.push_str(&format!("Detail: {}\n", failure.detail));
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScanReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("RESUME SCAN", 1));
        output.push_str(&format!(
            "Resume: {} ({} page{}) | Job: {}\n",
            report.metadata.resume_path,
            report.metadata.resume_pages,
            if report.metadata.resume_pages == 1 { "" } else { "s" },
            report.metadata.job_path
        ));
        output.push_str(&format!(
            "Generated: {}\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        match &report.outcome {
            MatchOutcome::Success(success) => self.format_success(&mut output, success),
            MatchOutcome::Failure(failure) => self.format_failure(&mut output, failure),
        }

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
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScanReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool, detailed: bool) -> Self {
        Self {
            include_metadata,
            detailed,
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ScanReport) -> Result<String> {
        let mut md = String::new();
        md.push_str("# Resume Scan Report\n\n");

        if self.include_metadata {
            let meta = &report.metadata;
            md.push_str(&format!("- **Resume:** `{}` ({} pages)\n", meta.resume_path, meta.resume_pages));
            md.push_str(&format!("- **Job description:** `{}`\n", meta.job_path));
            md.push_str(&format!("- **Generated:** {}\n", meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
            md.push_str(&format!("- **Version:** {}\n\n", meta.tool_version));
        }

        match &report.outcome {
            MatchOutcome::Success(success) => {
                let result = &success.result;
                md.push_str("## Score\n\n");
                md.push_str("| Mode | Score | Threshold | Result |\n");
                md.push_str("|------|-------|-----------|--------|\n");
                md.push_str(&format!(
                    "| {} | {:.4} | {:.2} | {} |\n\n",
                    result.mode,
                    result.score,
                    success.threshold,
                    if result.pass { "✅ PASS" } else { "❌ FAIL" }
                ));

                md.push_str("## Critical Skills\n\n");
                for keyword in &result.critical_keywords {
                    let checked = if result.critical_missing.contains(keyword) { " " } else { "x" };
                    md.push_str(&format!("- [{}] {}\n", checked, keyword));
                }

                md.push_str("\n## Missing Keywords\n\n");
                if result.missing_keywords.is_empty() {
                    md.push_str("_None_\n");
                } else {
                    for keyword in &result.missing_keywords {
                        md.push_str(&format!("- {}\n", keyword));
                    }
                }

                if self.detailed {
                    md.push_str("\n## Keyword Table\n\n");
                    md.push_str("| Rank | Term | Job weight | Resume weight | Critical | Missing |\n");
                    md.push_str("|------|------|------------|---------------|----------|---------|\n");
                    for term in &success.terms {
                        md.push_str(&format!(
                            "| {} | {} | {:.2} | {:.2} | {} | {} |\n",
                            term.rank,
                            term.term,
                            term.job_weight,
                            term.resume_weight,
                            if term.critical { "yes" } else { "" },
                            if term.missing { "yes" } else { "" }
                        ));
                    }
                }
            }
            MatchOutcome::Failure(failure) => {
                md.push_str("## Analysis Failed\n\n");
                md.push_str(&format!("**{}**: {}\n\n", failure.kind, failure.message));
                md.push_str(&format!("```\n{}\n```\n", failure.detail));
            }
        }

        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(true, detailed),
        }
    }

    pub fn generate_report(&self, report: &ScanReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("{}_scan{}.{}", base_name, timestamp_suffix, extension)
}
