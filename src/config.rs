/// Configuration module for MediBot.
///
/// Handles loading, validating, and providing default configuration values.
/// Secrets are not part of the file; the API key comes from the environment.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::gemini::DEFAULT_BASE_URL;
use crate::llm::GenerationConfig;

/// Config file used when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

// ── Default value functions ──────────────────────────────────────────

fn default_persist_directory() -> String {
    "chroma_db".to_string()
}

fn default_collection_name() -> String {
    "my_collection".to_string()
}

fn default_search_top_k() -> usize {
    crate::chain::DEFAULT_TOP_K
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_embedding_model() -> String {
    "models/embedding-001".to_string()
}

fn default_dimensions() -> usize {
    768
}

fn default_chat_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_max_output_tokens() -> u32 {
    512
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_persist_directory")]
    pub persist_directory: String,

    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            persist_directory: default_persist_directory(),
            collection_name: default_collection_name(),
            search_top_k: default_search_top_k(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            embedding: EmbeddingConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimensions: default_dimensions(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and, for the
    /// default path only, writes a template file.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            DEFAULT_CONFIG_PATH
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == DEFAULT_CONFIG_PATH {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.persist_directory.trim().is_empty(),
            "persist_directory must not be empty"
        );
        anyhow::ensure!(
            !self.collection_name.trim().is_empty(),
            "collection_name must not be empty"
        );
        anyhow::ensure!(self.search_top_k > 0, "search_top_k must be positive");
        anyhow::ensure!(
            self.embedding.dimensions > 0,
            "embedding.dimensions must be positive"
        );
        anyhow::ensure!(
            (0.0..=2.0).contains(&self.chat.temperature),
            "chat.temperature must be within [0, 2]"
        );
        anyhow::ensure!(
            self.chat.max_output_tokens > 0,
            "chat.max_output_tokens must be positive"
        );
        anyhow::ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be positive"
        );
        Ok(())
    }

    #[must_use]
    pub fn persist_path(&self) -> PathBuf {
        PathBuf::from(&self.persist_directory)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.chat.temperature,
            max_output_tokens: self.chat.max_output_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.persist_directory, "chroma_db");
        assert_eq!(config.collection_name, "my_collection");
        assert_eq!(config.search_top_k, 3);
        assert_eq!(config.embedding.model, "models/embedding-001");
        assert_eq!(config.embedding.dimensions, 768);
        assert_eq!(config.chat.model, "gemini-2.0-flash");
        assert_eq!(config.generation(), GenerationConfig::default());
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"collection_name": "medical", "chat": {"temperature": 0.2}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.collection_name, "medical");
        assert!((config.chat.temperature - 0.2).abs() < f32::EPSILON);
        // Other fields should have defaults
        assert_eq!(config.chat.max_output_tokens, 512);
        assert_eq!(config.persist_directory, "chroma_db");
    }

    #[test]
    fn test_load_missing_custom_path_uses_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("absent.json");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.search_top_k, 3);
        assert!(!path.exists(), "template is only written for the default path");
    }

    #[test]
    fn test_load_invalid_json_falls_back() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.collection_name, "my_collection");
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.search_top_k = 5;
        config.save(path).unwrap();

        let loaded = Config::load(path).unwrap();
        assert_eq!(loaded.search_top_k, 5);
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.search_top_k = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.chat.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.collection_name = " ".into();
        assert!(config.validate().is_err());
    }
}
