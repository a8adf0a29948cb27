//! Match orchestration: picks a scorer, runs gap analysis, applies the pass threshold

use crate::config::{Config, EncoderConfig, ScoringConfig};
use crate::error::{FailureKind, Result, ScanError};
use crate::processing::document::Document;
use crate::processing::keywords::{CriticalSelection, KeywordGapAnalyzer, TermScore};
use crate::processing::lexical::LexicalScorer;
use crate::processing::semantic::{shared_encoder, SemanticScorer, SentenceEncoder};
use crate::processing::text_processor::TextProcessor;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Exact keyword overlap (TF-IDF cosine)
    Lexical,
    /// Meaning-level similarity (sentence embeddings)
    Semantic,
}

impl FromStr for MatchMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lexical" | "strict" => Ok(MatchMode::Lexical),
            "semantic" | "flexible" | "flexibel" => Ok(MatchMode::Semantic),
            other => Err(ScanError::InvalidInput(format!(
                "Invalid mode: {}. Supported: lexical (strict), semantic (flexible)",
                other
            ))),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Lexical => write!(f, "lexical"),
            MatchMode::Semantic => write!(f, "semantic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub job_description: String,
    pub resume: String,
    pub mode: MatchMode,
    pub critical: CriticalSelection,
}

impl MatchRequest {
    pub fn new(job_description: impl Into<String>, resume: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            job_description: job_description.into(),
            resume: resume.into(),
            mode,
            critical: CriticalSelection::default(),
        }
    }

    pub fn with_critical(mut self, critical: CriticalSelection) -> Self {
        self.critical = critical;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: f32,
    pub mode: MatchMode,
    pub pass: bool,
    pub missing_keywords: BTreeSet<String>,
    pub critical_keywords: Vec<String>,
    pub critical_missing: BTreeSet<String>,
}

/// The result record plus the per-term table behind it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub result: MatchResult,
    pub terms: Vec<TermScore>,
    pub vocabulary_size: usize,
    pub threshold: f32,
    pub encoder: Option<String>,
    pub embedding_dimension: Option<usize>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFailure {
    pub kind: FailureKind,
    pub message: String,
    pub detail: String,
}

impl From<&ScanError> for MatchFailure {
    fn from(err: &ScanError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
            detail: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum MatchOutcome {
    Success(MatchReport),
    Failure(MatchFailure),
}

/// Strictly greater: a score equal to the threshold fails
pub fn passes(score: f32, threshold: f32) -> bool {
    score > threshold
}

enum EncoderHandle<'e> {
    Shared(EncoderConfig),
    Borrowed(&'e dyn SentenceEncoder),
}

pub struct MatchOrchestrator<'e> {
    processor: TextProcessor,
    scoring: ScoringConfig,
    encoder: EncoderHandle<'e>,
    max_input_chars: usize,
}

impl MatchOrchestrator<'static> {
    /// Semantic mode uses the process-wide encoder, loaded on first use
    pub fn new(config: &Config) -> Self {
        Self {
            processor: TextProcessor::new(),
            scoring: config.scoring.clone(),
            encoder: EncoderHandle::Shared(config.encoder.clone()),
            max_input_chars: config.encoder.max_input_chars,
        }
    }
}

impl<'e> MatchOrchestrator<'e> {
    pub fn with_encoder(scoring: ScoringConfig, encoder: &'e dyn SentenceEncoder) -> Self {
        Self {
            processor: TextProcessor::new(),
            scoring,
            encoder: EncoderHandle::Borrowed(encoder),
            max_input_chars: EncoderConfig::default().max_input_chars,
        }
    }

    /// Per-document character budget for semantic encoding
    pub fn with_input_budget(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    fn encoder(&self) -> Result<&dyn SentenceEncoder> {
        match &self.encoder {
            EncoderHandle::Shared(config) => {
                let encoder: &dyn SentenceEncoder = shared_encoder(config)?;
                Ok(encoder)
            }
            EncoderHandle::Borrowed(encoder) => Ok(*encoder),
        }
    }

    /// Score the resume in the requested mode and attach the keyword gap report
    pub fn analyze(&self, request: &MatchRequest) -> Result<MatchReport> {
        let start_time = Instant::now();

        if request.job_description.trim().is_empty() {
            return Err(ScanError::InsufficientContent("job description is empty".to_string()));
        }
        if request.resume.trim().is_empty() {
            return Err(ScanError::InsufficientContent("resume is empty".to_string()));
        }

        let job = Document::job_description(request.job_description.as_str());
        let resume = Document::resume(request.resume.as_str());

        let lexical = LexicalScorer::new(&self.processor, self.scoring.term_weighting)
            .fit_and_score(&job, &resume)?;

        let (score, encoder, embedding_dimension) = match request.mode {
            MatchMode::Lexical => (lexical.score, None, None),
            MatchMode::Semantic => {
                let encoder = self.encoder()?;
                let semantic = SemanticScorer::new(encoder, self.max_input_chars).score(&job, &resume)?;
                (
                    semantic.score,
                    Some(encoder.model_id().to_string()),
                    Some(semantic.dimension),
                )
            }
        };

        let gap = KeywordGapAnalyzer::new(
            &self.processor,
            self.scoring.term_weighting,
            self.scoring.fuzzy_threshold,
        )
        .analyze_in_space(
            &lexical.space,
            &lexical.job_vector,
            &lexical.resume_vector,
            &resume,
            &request.critical,
        );

        let pass = passes(score, self.scoring.pass_threshold);
        debug!("{} score {:.4} -> pass = {}", request.mode, score, pass);

        Ok(MatchReport {
            result: MatchResult {
                score,
                mode: request.mode,
                pass,
                missing_keywords: gap.missing,
                critical_keywords: gap.critical,
                critical_missing: gap.critical_missing,
            },
            terms: gap.terms,
            vocabulary_size: lexical.space.len(),
            threshold: self.scoring.pass_threshold,
            encoder,
            embedding_dimension,
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// Like `analyze`, but every error becomes a structured failure
    pub fn run(&self, request: &MatchRequest) -> MatchOutcome {
        match self.analyze(request) {
            Ok(report) => MatchOutcome::Success(report),
            Err(e) => {
                let failure = MatchFailure::from(&e);
                match failure.kind {
                    FailureKind::DimensionMismatch | FailureKind::UnknownFailure => {
                        error!("Analysis failed ({}): {}", failure.kind, e)
                    }
                    _ => warn!("Analysis failed ({}): {}", failure.kind, e),
                }
                MatchOutcome::Failure(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::semantic::EmbeddingVector;

    const JOB: &str = "Python developer with SQL and AWS experience required";
    const RESUME: &str = "I am a Python developer skilled in Java and Azure.";

    /// Embeds text as letter frequencies
    struct LetterEncoder;

    impl SentenceEncoder for LetterEncoder {
        fn model_id(&self) -> &str {
            "letters"
        }

        fn encode(&self, text: &str) -> Result<EmbeddingVector> {
            let mut values = vec![0.0f32; 26];
            for c in text.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                values[(c - b'a') as usize] += 1.0;
            }
            Ok(EmbeddingVector::new(values))
        }
    }

    struct ExhaustedEncoder;

    impl SentenceEncoder for ExhaustedEncoder {
        fn model_id(&self) -> &str {
            "exhausted"
        }

        fn encode(&self, _text: &str) -> Result<EmbeddingVector> {
            Err(ScanError::ResourceExhausted("out of memory".to_string()))
        }
    }

    fn orchestrator(encoder: &dyn SentenceEncoder) -> MatchOrchestrator<'_> {
        MatchOrchestrator::with_encoder(ScoringConfig::default(), encoder)
    }

    #[test]
    fn test_mode_parsing_is_case_insensitive() {
        assert_eq!("Lexical".parse::<MatchMode>().unwrap(), MatchMode::Lexical);
        assert_eq!("STRICT".parse::<MatchMode>().unwrap(), MatchMode::Lexical);
        assert_eq!(" Semantic ".parse::<MatchMode>().unwrap(), MatchMode::Semantic);
        assert_eq!("Flexibel".parse::<MatchMode>().unwrap(), MatchMode::Semantic);
        assert!(matches!("fuzzy".parse::<MatchMode>(), Err(ScanError::InvalidInput(_))));
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(!passes(0.5, 0.5));
        assert!(passes(0.5000001, 0.5));
        assert!(!passes(0.4999, 0.5));
    }

    #[test]
    fn test_lexical_scenario() {
        let encoder = LetterEncoder;
        let report = orchestrator(&encoder)
            .analyze(&MatchRequest::new(JOB, RESUME, MatchMode::Lexical))
            .unwrap();

        let result = &report.result;
        assert!(result.score > 0.0 && result.score < 1.0);
        assert!(result.missing_keywords.contains("sql"));
        assert!(result.missing_keywords.contains("aws"));
        assert_eq!(report.vocabulary_size, 6);
        assert_eq!(result.pass, result.score > 0.5);
        assert!(report.encoder.is_none());
    }

    #[test]
    fn test_identical_content_passes() {
        let encoder = LetterEncoder;
        let report = orchestrator(&encoder)
            .analyze(&MatchRequest::new(JOB, JOB.to_uppercase(), MatchMode::Lexical))
            .unwrap();

        assert!((report.result.score - 1.0).abs() < 1e-6);
        assert!(report.result.pass);
        assert!(report.result.missing_keywords.is_empty());
        assert!(report.result.critical_missing.is_empty());
    }

    #[test]
    fn test_semantic_mode_uses_encoder_and_still_reports_gaps() {
        let encoder = LetterEncoder;
        let report = orchestrator(&encoder)
            .analyze(&MatchRequest::new(JOB, RESUME, MatchMode::Semantic))
            .unwrap();

        assert_eq!(report.result.mode, MatchMode::Semantic);
        assert_eq!(report.encoder.as_deref(), Some("letters"));
        assert_eq!(report.embedding_dimension, Some(26));
        assert!((-1.0..=1.0).contains(&report.result.score));
        assert!(report.result.missing_keywords.contains("sql"));
        assert_eq!(report.result.critical_keywords.len(), 5);
    }

    #[test]
    fn test_semantic_failure_does_not_fall_back() {
        let encoder = ExhaustedEncoder;
        let err = orchestrator(&encoder)
            .analyze(&MatchRequest::new(JOB, RESUME, MatchMode::Semantic))
            .unwrap_err();
        assert!(matches!(err, ScanError::ResourceExhausted(_)));

        // lexical mode never touches the encoder
        assert!(orchestrator(&encoder)
            .analyze(&MatchRequest::new(JOB, RESUME, MatchMode::Lexical))
            .is_ok());
    }

    struct PanickingEncoder;

    impl SentenceEncoder for PanickingEncoder {
        fn model_id(&self) -> &str {
            "panicking"
        }

        fn encode(&self, _text: &str) -> Result<EmbeddingVector> {
            panic!("allocation failed")
        }
    }

    fn failure_kind(outcome: MatchOutcome) -> FailureKind {
        match outcome {
            MatchOutcome::Failure(failure) => failure.kind,
            MatchOutcome::Success(report) => panic!("expected failure, got score {}", report.result.score),
        }
    }

    #[test]
    fn test_encoder_failure_is_resource_exhausted() {
        let encoder = PanickingEncoder;
        let outcome = orchestrator(&encoder).run(&MatchRequest::new(JOB, RESUME, MatchMode::Semantic));
        assert_eq!(failure_kind(outcome), FailureKind::ResourceExhausted);
    }

    #[test]
    fn test_input_budget_applies_to_any_encoder() {
        let encoder = LetterEncoder;
        let long_resume = RESUME.repeat(7_000);
        assert!(long_resume.chars().count() > EncoderConfig::default().max_input_chars);

        let request = MatchRequest::new(JOB, long_resume, MatchMode::Semantic);
        assert!(matches!(
            orchestrator(&encoder).analyze(&request),
            Err(ScanError::ResourceExhausted(_))
        ));
        assert_eq!(failure_kind(orchestrator(&encoder).run(&request)), FailureKind::ResourceExhausted);

        // the budget only guards the encoder
        let lexical = MatchRequest::new(JOB, RESUME.repeat(7_000), MatchMode::Lexical);
        assert!(orchestrator(&encoder).analyze(&lexical).is_ok());

        let tight = orchestrator(&encoder).with_input_budget(10);
        assert_eq!(
            failure_kind(tight.run(&MatchRequest::new(JOB, RESUME, MatchMode::Semantic))),
            FailureKind::ResourceExhausted
        );
    }

    #[test]
    fn test_run_converts_errors() {
        let encoder = LetterEncoder;
        let outcome = orchestrator(&encoder).run(&MatchRequest::new("the and or a", RESUME, MatchMode::Lexical));

        match outcome {
            MatchOutcome::Failure(failure) => {
                assert_eq!(failure.kind, FailureKind::InsufficientContent);
                assert!(failure.message.contains("longer"));
            }
            MatchOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_blank_inputs_are_insufficient() {
        let encoder = LetterEncoder;
        let orchestrator = orchestrator(&encoder);

        let err = orchestrator
            .analyze(&MatchRequest::new("   \n", RESUME, MatchMode::Lexical))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InsufficientContent);

        let err = orchestrator
            .analyze(&MatchRequest::new(JOB, "", MatchMode::Semantic))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InsufficientContent);
    }

    #[test]
    fn test_custom_threshold() {
        let encoder = LetterEncoder;
        let scoring = ScoringConfig {
            pass_threshold: 0.9,
            ..ScoringConfig::default()
        };
        let report = MatchOrchestrator::with_encoder(scoring, &encoder)
            .analyze(&MatchRequest::new(JOB, RESUME, MatchMode::Lexical))
            .unwrap();

        assert!(!report.result.pass);
        assert_eq!(report.threshold, 0.9);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let encoder = LetterEncoder;
        let outcome = orchestrator(&encoder).run(&MatchRequest::new(JOB, RESUME, MatchMode::Lexical));
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["result"]["mode"], "lexical");
    }
}
