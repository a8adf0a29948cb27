//! Resume scanner library
//!
//! Scores a resume against a job description in one of two modes:
//! lexical (TF-IDF cosine over the job's vocabulary) or semantic
//! (cosine of sentence embeddings), and reports which job keywords the
//! resume is missing.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{FailureKind, Result, ScanError};
pub use processing::keywords::CriticalSelection;
pub use processing::matcher::{
    MatchFailure, MatchMode, MatchOrchestrator, MatchOutcome, MatchReport, MatchRequest, MatchResult,
};
pub use processing::semantic::{EmbeddingVector, SentenceEncoder};
