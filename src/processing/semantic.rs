//! Sentence-embedding similarity using Model2Vec

use crate::config::EncoderConfig;
use crate::error::{Result, ScanError};
use crate::processing::document::Document;
use crate::processing::similarity::cosine_similarity;
use log::{debug, info, warn};
use model2vec_rs::model::StaticModel;
use once_cell::sync::OnceCell;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;

/// Dense embedding of one document
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// A pretrained, frozen text encoder
pub trait SentenceEncoder: Send + Sync {
    fn model_id(&self) -> &str;

    fn encode(&self, text: &str) -> Result<EmbeddingVector>;
}

pub struct Model2VecEncoder {
    model: StaticModel,
    model_id: String,
}

impl Model2VecEncoder {
    pub fn load(source: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec encoder from: {}", source);

        let model = StaticModel::from_pretrained(source, None, None, None)
            .map_err(|e| ScanError::ModelError(format!("Failed to load encoder '{}': {:#}", source, e)))?;

        info!("Encoder loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_id: source.to_string(),
        })
    }

    pub fn from_config(config: &EncoderConfig) -> Result<Self> {
        let source = resolve_model_source(config);
        Self::load(&source)
    }
}

impl SentenceEncoder for Model2VecEncoder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn encode(&self, text: &str) -> Result<EmbeddingVector> {
        let values = self.model.encode_single(text);
        if values.is_empty() {
            return Err(ScanError::Embedding(format!(
                "encoder '{}' produced an empty embedding",
                self.model_id
            )));
        }

        Ok(EmbeddingVector::new(values))
    }
}

/// Downloaded models live under `models_dir/<name>`; anything else is handed to the Hub
pub fn resolve_model_source(config: &EncoderConfig) -> String {
    let wanted = &config.default_model;

    if let Some(model) = config.available_models.iter().find(|m| &m.name == wanted) {
        let local = config.models_dir.join(&model.name);
        if local.join("model.safetensors").exists() {
            return local.to_string_lossy().into_owned();
        }
        return model.repo_id.clone();
    }

    let local = PathBuf::from(wanted);
    if local.exists() {
        return local.to_string_lossy().into_owned();
    }
    wanted.clone()
}

static SHARED_ENCODER: OnceCell<Model2VecEncoder> = OnceCell::new();

/// The process-wide encoder, loaded on first use.
///
/// A failed load is not cached. Once loaded, later calls reuse the same
/// instance even if they ask for a different model.
pub fn shared_encoder(config: &EncoderConfig) -> Result<&'static Model2VecEncoder> {
    let encoder = SHARED_ENCODER.get_or_try_init(|| Model2VecEncoder::from_config(config))?;

    let requested = resolve_model_source(config);
    if encoder.model_id() != requested {
        warn!(
            "Encoder '{}' already loaded; ignoring request for '{}'",
            encoder.model_id(),
            requested
        );
    }
    Ok(encoder)
}

#[derive(Debug, Clone)]
pub struct SemanticMatch {
    pub score: f32,
    pub dimension: usize,
}

pub struct SemanticScorer<'a, E: SentenceEncoder + ?Sized> {
    encoder: &'a E,
    max_input_chars: usize,
}

impl<'a, E: SentenceEncoder + ?Sized> SemanticScorer<'a, E> {
    /// `max_input_chars` caps each document before it reaches the encoder
    pub fn new(encoder: &'a E, max_input_chars: usize) -> Self {
        Self {
            encoder,
            max_input_chars,
        }
    }

    /// Encode both documents independently and compare the embeddings
    pub fn score(&self, job: &Document, resume: &Document) -> Result<SemanticMatch> {
        let job_embedding = self.encode(job)?;
        let resume_embedding = self.encode(resume)?;

        let score = cosine_similarity(job_embedding.as_slice(), resume_embedding.as_slice())?;
        debug!(
            "Semantic similarity {:.4} ({} dims, encoder {})",
            score,
            job_embedding.dimension(),
            self.encoder.model_id()
        );

        Ok(SemanticMatch {
            score,
            dimension: job_embedding.dimension(),
        })
    }

    fn encode(&self, document: &Document) -> Result<EmbeddingVector> {
        let chars = document.character_count();
        if chars > self.max_input_chars {
            return Err(ScanError::ResourceExhausted(format!(
                "{} of {} characters exceeds the encoding budget of {}",
                document.document_type(),
                chars,
                self.max_input_chars
            )));
        }

        // model2vec-rs panics on tokenizer and allocation failures instead of returning an error
        panic::catch_unwind(AssertUnwindSafe(|| self.encoder.encode(document.content()))).map_err(|_| {
            ScanError::ResourceExhausted(format!(
                "encoder '{}' aborted while encoding the {}",
                self.encoder.model_id(),
                document.document_type()
            ))
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::collections::HashMap;

    /// Maps known words onto shared concept axes; "not" flips the next concept.
    struct ConceptEncoder {
        concepts: HashMap<&'static str, usize>,
    }

    impl ConceptEncoder {
        fn new() -> Self {
            let concepts = [
                ("python", 0),
                ("programming", 1),
                ("coding", 1),
                ("developer", 1),
                ("cloud", 2),
                ("aws", 2),
                ("azure", 2),
            ]
            .into_iter()
            .collect();
            Self { concepts }
        }
    }

    impl SentenceEncoder for ConceptEncoder {
        fn model_id(&self) -> &str {
            "concept-test"
        }

        fn encode(&self, text: &str) -> Result<EmbeddingVector> {
            let mut values = vec![0.0f32; 4];
            let mut negate = false;
            for word in text.to_lowercase().split(|c: char| !c.is_alphanumeric()) {
                if word == "not" {
                    negate = true;
                    continue;
                }
                if let Some(&axis) = self.concepts.get(word) {
                    values[axis] += if negate { -1.0 } else { 1.0 };
                    negate = false;
                }
            }
            values[3] = 0.1;
            Ok(EmbeddingVector::new(values))
        }
    }

    const BUDGET: usize = 1_000;

    struct FixedEncoder(Vec<f32>, Vec<f32>);

    struct PanickingEncoder;

    impl SentenceEncoder for PanickingEncoder {
        fn model_id(&self) -> &str {
            "panicking"
        }

        fn encode(&self, _text: &str) -> Result<EmbeddingVector> {
            panic!("tokenizer blew up")
        }
    }

    impl SentenceEncoder for FixedEncoder {
        fn model_id(&self) -> &str {
            "fixed"
        }

        fn encode(&self, text: &str) -> Result<EmbeddingVector> {
            if text.starts_with("job") {
                Ok(EmbeddingVector::new(self.0.clone()))
            } else {
                Ok(EmbeddingVector::new(self.1.clone()))
            }
        }
    }

    #[test]
    fn test_paraphrase_scores_high() {
        let encoder = ConceptEncoder::new();
        let scorer = SemanticScorer::new(&encoder, BUDGET);

        let result = scorer
            .score(
                &Document::job_description("Python programming on AWS"),
                &Document::resume("Coding in Python, deploying to Azure cloud"),
            )
            .unwrap();

        assert!(result.score > 0.9);
        assert_eq!(result.dimension, 4);
    }

    #[test]
    fn test_negation_is_passed_through() {
        let encoder = ConceptEncoder::new();
        let scorer = SemanticScorer::new(&encoder, BUDGET);
        let job = Document::job_description("Python developer");

        let affirmative = scorer.score(&job, &Document::resume("Experienced Python developer")).unwrap();
        let negated = scorer.score(&job, &Document::resume("not Python, developer")).unwrap();

        assert!(negated.score < affirmative.score);
        assert!((-1.0..=1.0).contains(&negated.score));
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let encoder = FixedEncoder(vec![1.0, 0.0, 0.0], vec![1.0, 0.0]);
        let scorer = SemanticScorer::new(&encoder, BUDGET);

        let err = scorer
            .score(&Document::job_description("job"), &Document::resume("resume"))
            .unwrap_err();
        assert!(matches!(err, ScanError::DimensionMismatch { left: 3, right: 2 }));
    }

    #[test]
    fn test_oversized_input_exhausts_budget() {
        let encoder = ConceptEncoder::new();
        let scorer = SemanticScorer::new(&encoder, 20);

        let err = scorer
            .score(
                &Document::job_description("Python developer"),
                &Document::resume("Python developer ".repeat(10)),
            )
            .unwrap_err();
        assert!(matches!(err, ScanError::ResourceExhausted(_)));

        assert!(scorer
            .score(&Document::job_description("Python developer"), &Document::resume("Python"))
            .is_ok());
    }

    #[test]
    fn test_encoder_panic_becomes_resource_exhausted() {
        let encoder = PanickingEncoder;
        let err = SemanticScorer::new(&encoder, BUDGET)
            .score(&Document::job_description("Python"), &Document::resume("Python"))
            .unwrap_err();

        assert!(matches!(err, ScanError::ResourceExhausted(_)));
        assert!(err.to_string().contains("panicking"));
    }

    #[test]
    fn test_resolve_unknown_model_passes_through() {
        let mut config = Config::default().encoder;
        config.default_model = "someone/custom-m2v".to_string();
        assert_eq!(resolve_model_source(&config), "someone/custom-m2v");
    }

    #[test]
    fn test_resolve_known_model_uses_repo_until_downloaded() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default().encoder;
        config.models_dir = dir.path().to_path_buf();
        config.default_model = "potion-base-8M".to_string();

        assert_eq!(resolve_model_source(&config), "minishlab/potion-base-8M");

        let local = dir.path().join("potion-base-8M");
        std::fs::create_dir_all(&local).unwrap();
        std::fs::write(local.join("model.safetensors"), b"").unwrap();
        assert_eq!(resolve_model_source(&config), local.to_string_lossy());
    }
}
