//! Matching engine: normalization, scoring and keyword gap analysis

pub mod document;
pub mod text_processor;
pub mod similarity;
pub mod lexical;
pub mod semantic;
pub mod keywords;
pub mod encoder_manager;
pub mod matcher;
