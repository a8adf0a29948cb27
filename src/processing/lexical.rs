//! TF-IDF vector space fitted on a single job description

use crate::config::TermWeighting;
use crate::error::{Result, ScanError};
use crate::processing::document::Document;
use crate::processing::similarity::cosine_similarity;
use crate::processing::text_processor::TextProcessor;
use log::debug;
use std::collections::HashMap;

/// Vocabulary and per-term IDF learned from the fitting corpus.
///
/// The corpus is always exactly one job description, so every term has
/// document frequency 1 and the smoothed IDF collapses to 1.0.
#[derive(Debug, Clone)]
pub struct VocabularySpace {
    terms: Vec<String>,
    index: HashMap<String, usize>,
    idf: Vec<f32>,
    weighting: TermWeighting,
}

/// Per-term weights of one document, indexed by a `VocabularySpace`
#[derive(Debug, Clone, PartialEq)]
pub struct TermVector {
    weights: Vec<f32>,
    counts: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct LexicalMatch {
    pub score: f32,
    pub space: VocabularySpace,
    pub job_vector: TermVector,
    pub resume_vector: TermVector,
}

impl VocabularySpace {
    /// Fit the vocabulary from the job description's tokens, keeping first-occurrence order
    pub fn fit(job: &Document, processor: &TextProcessor, weighting: TermWeighting) -> Result<Self> {
        let tokens = job.tokens(processor);

        let mut terms = Vec::new();
        let mut index = HashMap::new();
        for token in tokens {
            if !index.contains_key(token) {
                index.insert(token.clone(), terms.len());
                terms.push(token.clone());
            }
        }

        if terms.is_empty() {
            return Err(ScanError::InsufficientContent(
                "job description has no meaningful terms after removing stop words".to_string(),
            ));
        }

        // Smoothed IDF: ln((1 + n) / (1 + df)) + 1 with n = df = 1.
        let corpus_size = 1.0f32;
        let idf = vec![((1.0 + corpus_size) / (1.0 + 1.0)).ln() + 1.0; terms.len()];

        debug!("Fitted vocabulary of {} terms from {} job tokens", terms.len(), tokens.len());

        Ok(Self {
            terms,
            index,
            idf,
            weighting,
        })
    }

    /// Project a document into this space. Tokens outside the vocabulary are dropped.
    pub fn transform(&self, doc: &Document, processor: &TextProcessor) -> TermVector {
        let mut counts = vec![0usize; self.terms.len()];
        for token in doc.tokens(processor) {
            if let Some(&idx) = self.index.get(token) {
                counts[idx] += 1;
            }
        }

        let weights = counts
            .iter()
            .zip(self.idf.iter())
            .map(|(&count, &idf)| self.term_frequency(count) * idf)
            .collect();

        TermVector { weights, counts }
    }

    fn term_frequency(&self, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        match self.weighting {
            TermWeighting::Raw => count as f32,
            TermWeighting::Sublinear => 1.0 + (count as f32).ln(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn idf(&self, idx: usize) -> f32 {
        self.idf[idx]
    }
}

impl TermVector {
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn weight(&self, idx: usize) -> f32 {
        self.weights[idx]
    }

    pub fn count(&self, idx: usize) -> usize {
        self.counts[idx]
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

pub struct LexicalScorer<'a> {
    processor: &'a TextProcessor,
    weighting: TermWeighting,
}

impl<'a> LexicalScorer<'a> {
    pub fn new(processor: &'a TextProcessor, weighting: TermWeighting) -> Self {
        Self { processor, weighting }
    }

    /// Fit on the job description, project both documents and compare them
    pub fn fit_and_score(&self, job: &Document, resume: &Document) -> Result<LexicalMatch> {
        let space = VocabularySpace::fit(job, self.processor, self.weighting)?;
        let job_vector = space.transform(job, self.processor);
        let resume_vector = space.transform(resume, self.processor);

        let score = cosine_similarity(job_vector.weights(), resume_vector.weights())?;
        debug!("Lexical similarity {:.4} over {} terms", score, space.len());

        Ok(LexicalMatch {
            score,
            space,
            job_vector,
            resume_vector,
        })
    }
}
