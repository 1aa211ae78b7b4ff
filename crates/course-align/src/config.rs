//! Configuration for the course alignment service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV_VAR: &str = "COURSE_ALIGN_CONFIG";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding service configuration
    pub embeddings: EmbeddingConfig,
    /// Classification engine configuration
    pub classification: ClassifierConfig,
    /// Reference framework configuration
    pub framework: FrameworkConfig,
    /// Document and database storage
    pub storage: StorageConfig,
}

impl AlignConfig {
    /// Load from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration: explicit path, then `COURSE_ALIGN_CONFIG`, then defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.classification.similarity_floor) {
            return Err(Error::Config(
                "classification.similarity_floor must be within [0, 1]".to_string(),
            ));
        }
        if self.classification.min_text_chars == 0 {
            return Err(Error::Config(
                "classification.min_text_chars must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.framework.match_threshold) {
            return Err(Error::Config(
                "framework.match_threshold must be within [0, 1]".to_string(),
            ));
        }
        if self.framework.match_count == 0 {
            return Err(Error::Config("framework.match_count must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Maximum upload size in bytes
    pub max_upload_size: usize,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            max_upload_size: 50 * 1024 * 1024, // 50MB
            enable_cors: true,
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Feature-extraction endpoint base URL
    pub base_url: String,
    /// Model identifier appended to the base URL
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Input is truncated to this many characters before sending
    pub max_input_chars: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries after the first failed attempt
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api-inference.huggingface.co/pipeline/feature-extraction"
                .to_string(),
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            api_key_env: "HUGGINGFACE_API_KEY".to_string(),
            max_input_chars: 512,
            timeout_secs: 30,
            max_retries: 2,
        }
    }
}

impl EmbeddingConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    /// Wall-clock budget for one embedding call including every retry
    ///
    /// Each attempt may use the full request timeout, and attempt `n` is
    /// followed by a `2^n` second backoff before the next one.
    pub fn call_budget(&self) -> std::time::Duration {
        let attempts = u64::from(self.max_retries) + 1;
        let backoff: u64 = (0..self.max_retries).map(|n| 2u64.saturating_pow(n)).sum();
        std::time::Duration::from_secs(
            self.timeout_secs
                .saturating_mul(attempts)
                .saturating_add(backoff),
        )
    }
}

/// Classification engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Texts shorter than this (after trimming) are rejected as insufficient
    pub min_text_chars: usize,
    /// Distinct education keywords required to proceed past the domain gate
    pub min_keyword_matches: usize,
    /// Framework matches below this similarity are discarded
    pub similarity_floor: f32,
    /// Leading characters of a matched section quoted in the analysis
    pub snippet_chars: usize,
    /// Score of the fallback finding when nothing clears the floor
    pub limited_alignment_score: u8,
    /// Points per keyword match when no embedding is available
    pub keyword_fallback_weight: f64,
    /// Upper bound on the keyword-only estimate
    pub keyword_fallback_cap: u8,
    /// Education domain vocabulary (matched case-insensitively)
    pub keywords: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 50,
            min_keyword_matches: 3,
            similarity_floor: 0.3,
            snippet_chars: 200,
            limited_alignment_score: 15,
            keyword_fallback_weight: 10.0,
            keyword_fallback_cap: 90,
            keywords: crate::classification::keywords::default_vocabulary(),
        }
    }
}

/// Reference framework configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// JSON file holding framework chunks
    pub chunks_path: PathBuf,
    /// Maximum chunks returned by a framework search
    pub match_count: usize,
    /// Minimum similarity for a chunk to be returned by a search
    pub match_threshold: f32,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            chunks_path: PathBuf::from("./data/framework_chunks.json"),
            match_count: 8,
            match_threshold: 0.2,
        }
    }
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for uploaded course files
    pub documents_dir: PathBuf,
    /// SQLite database file
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("course-align");
        Self {
            documents_dir: base.join("course-files"),
            database_path: base.join("course_align.db"),
        }
    }
}
