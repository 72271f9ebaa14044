use std::path::PathBuf;

use serde::Deserialize;

use crate::services::{ArtifactPaths, MappingPolicy, DEFAULT_K};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the vocabulary, item matrix and metadata artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Recommendations returned when a request does not specify `k`
    #[serde(default = "default_k")]
    pub default_k: usize,

    /// Largest `k` a request may ask for
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Handling of catalog rows that fail output validation
    #[serde(default)]
    pub mapping_policy: MappingPolicy,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_max_k() -> usize {
    20
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if config.default_k > config.max_k {
            anyhow::bail!(
                "DEFAULT_K ({}) must not exceed MAX_K ({})",
                config.default_k,
                config.max_k
            );
        }

        Ok(config)
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.artifact_dir)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
