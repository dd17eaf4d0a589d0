//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.dilemma-lab.toml` files.

use crate::analyzer::GeminiConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".dilemma-lab.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// AI analysis settings.
    #[serde(default)]
    pub ai: AiConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Generative AI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key. Leave unset to run with the offline analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the Gemini API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Sampling temperature; the model default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_url: default_api_url(),
            temperature: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    GeminiConfig::default().model
}

fn default_api_url() -> String {
    GeminiConfig::default().api_url
}

fn default_timeout() -> u64 {
    GeminiConfig::default().timeout_seconds
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.dilemma-lab.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref key) = args.api_key {
            self.ai.api_key = Some(key.clone());
        }
        if let Some(ref model) = args.model {
            self.ai.model = model.clone();
        }
        if let Some(ref url) = args.api_url {
            self.ai.api_url = url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.ai.temperature = Some(temperature);
        }
        if let Some(timeout) = args.timeout {
            self.ai.timeout_seconds = timeout;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Analyzer settings derived from this configuration.
    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.ai.api_key.clone(),
            api_url: self.ai.api_url.clone(),
            model: self.ai.model.clone(),
            temperature: self.ai.temperature,
            timeout_seconds: self.ai.timeout_seconds,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
