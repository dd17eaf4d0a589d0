//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Dilemma Lab - AI ethics dilemmas in your terminal
///
/// Play through ethical dilemmas faced by AI developers, pick a side,
/// and read an AI-generated analysis of your decision. Without an API
/// key a built-in offline analysis is shown instead.
///
/// Examples:
///   dilemma-lab
///   GEMINI_API_KEY=... dilemma-lab --model gemini-2.5-flash
///   dilemma-lab --play s1:c1_1,s2:c2_2
///   dilemma-lab --list
///   dilemma-lab --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Gemini API key
    ///
    /// When absent, analyses use the offline fallback text.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model to use for analysis
    #[arg(short, long, env = "DILEMMA_LAB_MODEL")]
    pub model: Option<String>,

    /// Gemini API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .dilemma-lab.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// List the available scenarios and exit
    #[arg(long)]
    pub list: bool,

    /// Play a fixed sequence of decisions without prompting
    ///
    /// Example: --play s1:c1_1,s3:c3_2
    #[arg(long, value_name = "SCENARIO:CHOICE", value_delimiter = ',')]
    pub play: Option<Vec<String>>,

    /// Generate a default .dilemma-lab.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// One scripted decision from `--play`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayStep {
    pub scenario_id: String,
    pub choice_id: String,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 2.0".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.list && self.play.is_some() {
            return Err("Cannot use both --list and --play".to_string());
        }

        self.play_steps()?;

        Ok(())
    }

    /// Parsed `--play` steps, empty when not given.
    pub fn play_steps(&self) -> Result<Vec<PlayStep>, String> {
        let Some(ref pairs) = self.play else {
            return Ok(Vec::new());
        };

        pairs
            .iter()
            .map(|pair| match pair.trim().split_once(':') {
                Some((scenario, choice)) if !scenario.is_empty() && !choice.is_empty() => {
                    Ok(PlayStep {
                        scenario_id: scenario.to_string(),
                        choice_id: choice.to_string(),
                    })
                }
                _ => Err(format!(
                    "Invalid --play entry '{}', expected SCENARIO:CHOICE",
                    pair
                )),
            })
            .collect()
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
