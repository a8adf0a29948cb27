//! Configuration management for the resume scanner

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub encoder: EncoderConfig,
    pub scoring: ScoringConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub models_dir: PathBuf,
    /// Model id from `available_models`, a HuggingFace repo id, or a local path
    pub default_model: String,
    /// Inputs longer than this are refused instead of encoded
    pub max_input_chars: usize,
    pub available_models: Vec<AvailableModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableModel {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub dimensions: usize,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub pass_threshold: f32,
    pub default_mode: String,
    pub top_n: usize,
    pub term_weighting: TermWeighting,
    pub fuzzy_threshold: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermWeighting {
    /// Raw in-document term counts
    Raw,
    /// `1 + ln(count)`
    Sublinear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 0.5,
            default_mode: "lexical".to_string(),
            top_n: 5,
            term_weighting: TermWeighting::Raw,
            fuzzy_threshold: 0.9,
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-scanner")
            .join("models");

        Self {
            models_dir,
            default_model: "potion-multilingual-128M".to_string(),
            max_input_chars: 100_000,
            available_models: vec![
                AvailableModel {
                    name: "potion-multilingual-128M".to_string(),
                    repo_id: "minishlab/potion-multilingual-128M".to_string(),
                    size_mb: 490,
                    dimensions: 256,
                    description: "Multilingual static embeddings distilled from a sentence transformer".to_string(),
                },
                AvailableModel {
                    name: "potion-base-8M".to_string(),
                    repo_id: "minishlab/potion-base-8M".to_string(),
                    size_mb: 33,
                    dimensions: 256,
                    description: "Small English Model2Vec model, fast to download".to_string(),
                },
                AvailableModel {
                    name: "m2v-base".to_string(),
                    repo_id: "minishlab/M2V_base_output".to_string(),
                    size_mb: 90,
                    dimensions: 256,
                    description: "Legacy Model2Vec base embeddings model".to_string(),
                },
            ],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoder: EncoderConfig::default(),
            scoring: ScoringConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load the user config, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ScanError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScanError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-scanner")
            .join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.scoring.pass_threshold) {
            return Err(ScanError::Configuration(format!(
                "scoring.pass_threshold must be within [0, 1], got {}",
                self.scoring.pass_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.scoring.fuzzy_threshold) {
            return Err(ScanError::Configuration(format!(
                "scoring.fuzzy_threshold must be within [0, 1], got {}",
                self.scoring.fuzzy_threshold
            )));
        }
        if self.encoder.max_input_chars == 0 {
            return Err(ScanError::Configuration(
                "encoder.max_input_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.encoder.models_dir
    }

    pub fn get_model_by_name(&self, name: &str) -> Option<&AvailableModel> {
        self.encoder.available_models.iter().find(|m| m.name == name)
    }
}
