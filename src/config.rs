use crate::matcher::{MatchPolicy, Matcher, DEFAULT_LEXICAL_THRESHOLD};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "oiebench.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
}

/// General run settings
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Matching policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MatcherConfig {
    #[serde(default)]
    pub policy: MatchPolicy,
    #[serde(default = "default_threshold")]
    pub lexical_threshold: f64,
    #[serde(default = "default_threshold")]
    pub argument_threshold: f64,
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            policy: MatchPolicy::default(),
            lexical_threshold: default_threshold(),
            argument_threshold: default_threshold(),
            extra_stopwords: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_LEXICAL_THRESHOLD
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) first.
    /// Looks for the config file in this order:
    /// 1. Path specified in OIEBENCH_CONFIG environment variable (must exist)
    /// 2. ./oiebench.toml in current directory
    ///
    /// Without either, built-in defaults are used.
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = match std::env::var("OIEBENCH_CONFIG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !local.exists() {
                    return Ok(Self::default());
                }
                local
            }
        };

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config = Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("matcher.lexical_threshold", self.matcher.lexical_threshold),
            ("matcher.argument_threshold", self.matcher.argument_threshold),
        ] {
            if !(0.0..1.0).contains(&value) {
                anyhow::bail!("{} must be in [0.0, 1.0), got {}", name, value);
            }
        }
        Ok(())
    }

    /// Build the configured matcher, with `policy` overriding the file's choice
    pub fn build_matcher(&self, policy: Option<MatchPolicy>) -> Box<dyn Matcher> {
        policy.unwrap_or(self.matcher.policy).build(
            self.matcher.lexical_threshold,
            self.matcher.argument_threshold,
            &self.matcher.extra_stopwords,
        )
    }
}
