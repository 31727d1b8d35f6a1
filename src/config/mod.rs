//! Configuration for explanation derivation.
//!
//! Configuration is loaded with precedence: CLI args > Env vars > Config file > Defaults
//!
//! # Example config file (resolve-why.toml)
//! ```toml
//! [relations]
//! link = "REL_LINK"
//! pointer = "REL_POINTER"
//! anchor = "REL_ANCHOR"
//!
//! [scoring]
//! name_feature_types = ["NAME"]
//!
//! [summary]
//! top_record_limit = 10
//! ```

mod defaults;

pub use defaults::*;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhyConfig {
    /// Feature types that drive relation direction inference
    pub relations: RelationVocabulary,
    /// Name scoring reduction
    pub scoring: ScoringConfig,
    /// Record summary bounds
    pub summary: SummaryConfig,
}

impl WhyConfig {
    /// Load configuration with precedence: CLI args > Env > File > Defaults
    ///
    /// # Arguments
    /// * `config_path` - Optional path to TOML config file
    /// * `overrides` - CLI overrides to apply on top
    pub fn load(
        config_path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(WhyConfig::default()));

        // Layer 1: Config file (if provided)
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 2: Environment variables with RESOLVE_WHY_ prefix
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        // Layer 3: CLI overrides
        figment = figment.merge(Serialized::defaults(overrides));

        let config: WhyConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment and optional config file only (no CLI overrides)
    pub fn from_env(config_path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load(config_path, ConfigOverrides::default())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let vocabulary = &self.relations;
        for (name, code) in [
            ("relations.link", &vocabulary.link),
            ("relations.pointer", &vocabulary.pointer),
            ("relations.anchor", &vocabulary.anchor),
        ] {
            if code.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        if vocabulary.link == vocabulary.pointer
            || vocabulary.link == vocabulary.anchor
            || vocabulary.pointer == vocabulary.anchor
        {
            return Err(ConfigError::Invalid(
                "relation feature types must be distinct".to_string(),
            ));
        }
        let limit = self.summary.top_record_limit;
        if !(1..=DEFAULT_TOP_RECORD_LIMIT).contains(&limit) {
            return Err(ConfigError::Invalid(format!(
                "summary.top_record_limit must be in 1..={DEFAULT_TOP_RECORD_LIMIT}, got {limit}"
            )));
        }
        Ok(())
    }
}

/// Engine feature-type codes for relationship features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationVocabulary {
    /// Relationship known from both sides
    pub link: String,
    /// First side points at the second
    pub pointer: String,
    /// First side is the target of a pointer
    pub anchor: String,
}

impl Default for RelationVocabulary {
    fn default() -> Self {
        Self {
            link: DEFAULT_LINK_FEATURE_TYPE.to_string(),
            pointer: DEFAULT_POINTER_FEATURE_TYPE.to_string(),
            anchor: DEFAULT_ANCHOR_FEATURE_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Feature types reduced to the best name score
    pub name_feature_types: Vec<String>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            name_feature_types: default_name_feature_types(),
        }
    }
}

impl ScoringConfig {
    pub fn is_name_feature(&self, feature_type: &str) -> bool {
        self.name_feature_types.iter().any(|t| t == feature_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Record IDs kept per data source
    pub top_record_limit: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            top_record_limit: DEFAULT_TOP_RECORD_LIMIT,
        }
    }
}

/// CLI overrides that take precedence over file and env config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryOverrides>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_record_limit: Option<usize>,
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] figment::Error),

    #[error("configuration error: {0}")]
    Invalid(String),
}
