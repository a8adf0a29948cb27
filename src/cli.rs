//! CLI interface for the resume scanner

use crate::config::OutputFormat;
use crate::processing::keywords::CriticalSelection;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-scanner")]
#[command(version)]
#[command(about = "Score a resume against a job description")]
#[command(long_about = "Score a resume against a job description with TF-IDF keyword matching (lexical) \
or sentence embeddings (semantic), and list the job keywords the resume is missing")]
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
    /// Scan a resume against a job description
    Scan {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (TXT, MD, PDF)
        #[arg(short, long)]
        job: PathBuf,

        /// Matching mode: lexical (strict) or semantic (flexible)
        #[arg(short, long)]
        mode: Option<String>,

        /// Encoder model for semantic mode (name, repo id or local path)
        #[arg(short, long)]
        encoder: Option<String>,

        /// Number of top-weighted job terms treated as critical skills
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// Comma-separated critical skills, overriding --top-n
        #[arg(long, value_delimiter = ',')]
        critical: Vec<String>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show the full keyword table
        #[arg(short, long)]
        detailed: bool,
    },

    /// Encoder model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available encoder models
    List,

    /// Download an encoder model
    Download {
        /// Model name or HuggingFace repo ID
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a downloaded model
    Remove {
        /// Model name to remove
        model: String,
    },

    /// Show model information
    Info {
        /// Model name
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
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

/// Explicit skills win over the top-N count; blank entries are ignored
pub fn critical_selection(critical: &[String], top_n: usize) -> CriticalSelection {
    let explicit: Vec<String> = critical
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if explicit.is_empty() {
        CriticalSelection::TopN(top_n)
    } else {
        CriticalSelection::Explicit(explicit)
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
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_scan_arguments() {
        let cli = Cli::parse_from([
            "resume-scanner", "scan", "-r", "cv.pdf", "-j", "job.txt", "--mode", "semantic",
            "--critical", "rust,kafka",
        ]);

        match cli.command {
            Commands::Scan { resume, mode, critical, .. } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert_eq!(mode.as_deref(), Some("semantic"));
                assert_eq!(critical, vec!["rust", "kafka"]);
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_parse_output_format() {
        assert!(matches!(parse_output_format("MD"), Ok(OutputFormat::Markdown)));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_critical_selection() {
        assert_eq!(critical_selection(&[], 3), CriticalSelection::TopN(3));
        assert_eq!(
            critical_selection(&[" SQL ".to_string(), String::new()], 3),
            CriticalSelection::Explicit(vec!["SQL".to_string()])
        );
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF"), &["pdf"]).is_ok());
        assert!(validate_file_extension(Path::new("cv"), &["pdf"]).is_err());
    }
}
