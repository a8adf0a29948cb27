//! Keyword gap analysis: missing terms and critical-skill coverage

use crate::config::TermWeighting;
use crate::error::Result;
use crate::processing::document::Document;
use crate::processing::lexical::{TermVector, VocabularySpace};
use crate::processing::text_processor::TextProcessor;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use strsim::jaro_winkler;

pub const DEFAULT_TOP_N: usize = 5;

/// How the critical-keyword shortlist is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CriticalSelection {
    /// The `n` highest-weighted job terms
    TopN(usize),
    /// Caller-supplied keywords, replacing the automatic shortlist
    Explicit(Vec<String>),
}

impl Default for CriticalSelection {
    fn default() -> Self {
        CriticalSelection::TopN(DEFAULT_TOP_N)
    }
}

/// One row of the per-term table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermScore {
    pub term: String,
    pub rank: usize,
    pub job_weight: f32,
    pub resume_weight: f32,
    pub job_count: usize,
    pub resume_count: usize,
    pub missing: bool,
    pub critical: bool,
    /// Closest resume word for a missing term; informational only
    pub near_match: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGap {
    pub missing: BTreeSet<String>,
    pub critical: Vec<String>,
    pub critical_missing: BTreeSet<String>,
    /// Vocabulary terms ordered by rank
    pub terms: Vec<TermScore>,
}

pub struct KeywordGapAnalyzer<'a> {
    processor: &'a TextProcessor,
    weighting: TermWeighting,
    fuzzy_threshold: f32,
}

impl<'a> KeywordGapAnalyzer<'a> {
    pub fn new(processor: &'a TextProcessor, weighting: TermWeighting, fuzzy_threshold: f32) -> Self {
        Self {
            processor,
            weighting,
            fuzzy_threshold: fuzzy_threshold.clamp(0.0, 1.0),
        }
    }

    /// Fit the job vocabulary and report which of its terms the resume lacks
    pub fn analyze(&self, job: &Document, resume: &Document, selection: &CriticalSelection) -> Result<KeywordGap> {
        let space = VocabularySpace::fit(job, self.processor, self.weighting)?;
        let job_vector = space.transform(job, self.processor);
        let resume_vector = space.transform(resume, self.processor);

        Ok(self.analyze_in_space(&space, &job_vector, &resume_vector, resume, selection))
    }

    /// Gap analysis over an already fitted space, shared with the lexical scorer
    pub fn analyze_in_space(
        &self,
        space: &VocabularySpace,
        job_vector: &TermVector,
        resume_vector: &TermVector,
        resume: &Document,
        selection: &CriticalSelection,
    ) -> KeywordGap {
        let ranking = Self::rank_terms(job_vector);
        let resume_tokens: HashSet<&str> = resume
            .tokens(self.processor)
            .iter()
            .map(String::as_str)
            .collect();

        let missing: BTreeSet<String> = (0..space.len())
            .filter(|&idx| resume_vector.weight(idx) == 0.0)
            .map(|idx| space.terms()[idx].clone())
            .collect();

        let critical = match selection {
            CriticalSelection::TopN(n) => ranking
                .iter()
                .take(*n)
                .map(|&idx| space.terms()[idx].clone())
                .collect(),
            CriticalSelection::Explicit(keywords) => self.normalize_explicit(keywords),
        };

        let critical_missing: BTreeSet<String> = critical
            .iter()
            .filter(|term| match space.index_of(term) {
                Some(_) => missing.contains(*term),
                None => !term.split(' ').all(|part| resume_tokens.contains(part)),
            })
            .cloned()
            .collect();

        let critical_set: HashSet<&str> = critical.iter().map(String::as_str).collect();
        let terms = ranking
            .iter()
            .enumerate()
            .map(|(position, &idx)| {
                let term = &space.terms()[idx];
                let is_missing = missing.contains(term);
                TermScore {
                    term: term.clone(),
                    rank: position + 1,
                    job_weight: job_vector.weight(idx),
                    resume_weight: resume_vector.weight(idx),
                    job_count: job_vector.count(idx),
                    resume_count: resume_vector.count(idx),
                    missing: is_missing,
                    critical: critical_set.contains(term.as_str()),
                    near_match: if is_missing {
                        self.nearest_token(term, &resume_tokens)
                    } else {
                        None
                    },
                }
            })
            .collect();

        debug!(
            "Keyword gap: {} of {} terms missing, {} of {} critical missing",
            missing.len(),
            space.len(),
            critical_missing.len(),
            critical.len()
        );

        KeywordGap {
            missing,
            critical,
            critical_missing,
            terms,
        }
    }

    /// Vocabulary indices by job weight, descending; ties keep vocabulary order
    fn rank_terms(job_vector: &TermVector) -> Vec<usize> {
        let mut order: Vec<usize> = (0..job_vector.len()).collect();
        order.sort_by(|&a, &b| job_vector.weight(b).total_cmp(&job_vector.weight(a)));
        order
    }

    fn normalize_explicit(&self, keywords: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        keywords
            .iter()
            .filter_map(|keyword| self.processor.normalize_keyword(keyword))
            .filter(|keyword| seen.insert(keyword.clone()))
            .collect()
    }

    fn nearest_token(&self, term: &str, resume_tokens: &HashSet<&str>) -> Option<String> {
        resume_tokens
            .iter()
            .map(|token| (*token, jaro_winkler(term, token) as f32))
            .filter(|(_, similarity)| *similarity >= self.fuzzy_threshold)
            .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(token, _)| token.to_string())
    }
}
