//! Encoder model management: listing, downloading and resolving Model2Vec models

use crate::config::{AvailableModel, EncoderConfig};
use crate::error::{Result, ScanError};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files `model2vec-rs` needs to load a model from a local folder
const REQUIRED_FILES: [&str; 3] = ["model.safetensors", "tokenizer.json", "config.json"];
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

pub struct EncoderModelManager {
    models_dir: PathBuf,
    available_models: Vec<AvailableModel>,
    downloaded_models: HashSet<String>,
}

impl EncoderModelManager {
    pub async fn new(config: &EncoderConfig) -> Result<Self> {
        let models_dir = config.models_dir.clone();
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await.map_err(|e| {
                ScanError::ModelError(format!("Failed to create models directory: {}", e))
            })?;
        }

        let mut manager = Self {
            models_dir,
            available_models: config.available_models.clone(),
            downloaded_models: HashSet::new(),
        };
        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await.map_err(|e| {
            ScanError::ModelError(format!("Failed to scan models directory: {}", e))
        })?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && Self::is_valid_model_directory(&entry.path()).await {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    async fn is_valid_model_directory(path: &Path) -> bool {
        for file in REQUIRED_FILES {
            if fs::metadata(path.join(file)).await.is_err() {
                return false;
            }
        }
        true
    }

    /// Download a model from the Hugging Face Hub into `models_dir/<name>`
    pub async fn download_model(&mut self, model_id: &str, force: bool) -> Result<PathBuf> {
        let model = self
            .get_model_info(model_id)
            .cloned()
            .ok_or_else(|| ScanError::ModelError(format!("Unknown encoder model: {}", model_id)))?;

        let model_dir = self.models_dir.join(&model.name);
        if self.downloaded_models.contains(&model.name) && !force {
            info!("Encoder model {} already downloaded", model.name);
            return Ok(model_dir);
        }

        info!("Downloading encoder model {} ({} MB) from {}", model.name, model.size_mb, model.repo_id);

        fs::create_dir_all(&model_dir).await.map_err(|e| {
            ScanError::ModelError(format!("Failed to create model directory: {}", e))
        })?;

        let api = Api::new()
            .map_err(|e| ScanError::ModelError(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::model(model.repo_id.clone()));

        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                ScanError::ModelError(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file)).await?;
            info!("  downloaded {}", file);
        }

        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                }
                Err(e) => warn!("Optional file {} not found: {}", file, e),
            }
        }

        self.downloaded_models.insert(model.name.clone());
        info!("Encoder model {} downloaded to {}", model.name, model_dir.display());
        Ok(model_dir)
    }

    pub async fn remove_model(&mut self, model_id: &str) -> Result<()> {
        let name = self
            .resolve_model_id(model_id)
            .ok_or_else(|| ScanError::ModelError(format!("Unknown encoder model: {}", model_id)))?;

        if !self.downloaded_models.remove(&name) {
            return Err(ScanError::ModelError(format!("Model {} is not downloaded", name)));
        }
        fs::remove_dir_all(self.models_dir.join(&name)).await?;
        Ok(())
    }

    pub fn list_available_models(&self) -> &[AvailableModel] {
        &self.available_models
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.resolve_model_id(model_id)
            .map(|name| self.downloaded_models.contains(&name))
            .unwrap_or(false)
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&AvailableModel> {
        let name = self.resolve_model_id(model_id)?;
        self.available_models.iter().find(|m| m.name == name)
    }

    /// Resolve a model by name, repo id or case-insensitive name
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if let Some(model) = self.available_models.iter().find(|m| m.name == input) {
            return Some(model.name.clone());
        }

        if let Some(model) = self.available_models.iter().find(|m| m.repo_id == input) {
            return Some(model.name.clone());
        }

        let input_lower = input.to_lowercase();
        self.available_models
            .iter()
            .find(|m| m.name.to_lowercase() == input_lower)
            .map(|m| m.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> EncoderConfig {
        let mut config = Config::default().encoder;
        config.models_dir = dir.path().join("models");
        config
    }

    #[tokio::test]
    async fn test_manager_creates_models_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);

        let manager = EncoderModelManager::new(&config).await.unwrap();
        assert!(config.models_dir.exists());
        assert!(!manager.list_available_models().is_empty());
        assert!(!manager.is_model_downloaded("potion-base-8M"));
    }

    #[tokio::test]
    async fn test_detects_downloaded_models() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir);

        let complete = config.models_dir.join("potion-base-8M");
        let partial = config.models_dir.join("m2v-base");
        std::fs::create_dir_all(&complete).unwrap();
        std::fs::create_dir_all(&partial).unwrap();
        for file in REQUIRED_FILES {
            std::fs::write(complete.join(file), b"{}").unwrap();
        }
        std::fs::write(partial.join("tokenizer.json"), b"{}").unwrap();

        let mut manager = EncoderModelManager::new(&config).await.unwrap();
        assert!(manager.is_model_downloaded("potion-base-8M"));
        assert!(manager.is_model_downloaded("minishlab/potion-base-8M"));
        assert!(!manager.is_model_downloaded("m2v-base"));

        manager.remove_model("potion-base-8M").await.unwrap();
        assert!(!complete.exists());
        assert!(!manager.is_model_downloaded("potion-base-8M"));
    }

    #[tokio::test]
    async fn test_resolve_model_id() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EncoderModelManager::new(&config_in(&temp_dir)).await.unwrap();

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("minishlab/potion-base-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("POTION-BASE-8M"), Some("potion-base-8M".to_string()));
        assert_eq!(manager.resolve_model_id("unknown"), None);
    }

    #[tokio::test]
    async fn test_download_unknown_model_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = EncoderModelManager::new(&config_in(&temp_dir)).await.unwrap();

        let err = manager.download_model("not-a-model", false).await.unwrap_err();
        assert!(matches!(err, ScanError::ModelError(_)));
    }
}
