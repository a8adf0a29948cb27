//! Report envelope handed to the formatters

use crate::processing::matcher::MatchOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scan's outcome together with where its inputs came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub outcome: MatchOutcome,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub resume_path: String,
    pub job_path: String,
    pub resume_pages: usize,
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
}

impl ScanReport {
    pub fn new(outcome: MatchOutcome, resume_path: &str, job_path: &str, resume_pages: usize) -> Self {
        Self {
            outcome,
            metadata: ReportMetadata {
                resume_path: resume_path.to_string(),
                job_path: job_path.to_string(),
                resume_pages,
                generated_at: Utc::now(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }

    /// `Some(pass)` when the analysis ran, `None` when it failed
    pub fn passed(&self) -> Option<bool> {
        match &self.outcome {
            MatchOutcome::Success(report) => Some(report.result.pass),
            MatchOutcome::Failure(_) => None,
        }
    }
}
