//! # resolve-why
//!
//! Match-explanation derivation for entity-resolution engine telemetry.
//!
//! The engine reports why two entities matched as flat, code-keyed records:
//! a compact why-key, scored feature comparisons and related-feature pairs.
//! This library decodes the why-key grammar, groups disclosed relationship
//! evidence by domain, reduces name scores and summarizes matched records
//! into stable response shapes.

pub mod config;
pub mod error;
pub mod explain;
pub mod model;
pub mod relations;
pub mod scoring;
pub mod summary;
pub mod why_key;

// Re-export main types for convenience
pub use config::{RelationVocabulary, WhyConfig};
pub use error::ExplainError;
pub use explain::{explain_match, MatchInfo};
pub use model::{
    CandidateKey, DisclosedRelation, MatchLevel, RawMatchTelemetry, RelatedFeaturePair,
    RelationDirection, RoleSet, ScoredFeature, ScoringBucket,
};
pub use scoring::{best_name_score, FeatureScore, NameScoring};
pub use summary::{summarize_records, DataSourceRecordSummary, MatchedRecord};
pub use why_key::WhyKeyGrammar;

/// Main API for explanation derivation.
///
/// Holds no state besides its configuration; every call builds its result
/// from scratch, so one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct WhyExplainer {
    config: WhyConfig,
}

impl WhyExplainer {
    /// Create an explainer with the given configuration
    pub fn new(config: WhyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WhyConfig {
        &self.config
    }

    /// Explain one parsed telemetry record
    pub fn explain(&self, raw: &RawMatchTelemetry) -> Result<MatchInfo, ExplainError> {
        explain_match(raw, &self.config)
    }

    /// Parse engine JSON and explain it
    pub fn explain_json(&self, json: &str) -> anyhow::Result<MatchInfo> {
        let raw = RawMatchTelemetry::from_json(json)?;
        Ok(self.explain(&raw)?)
    }

    /// Summarize matched records per data source using the configured bound
    pub fn summarize_records(&self, records: &[MatchedRecord]) -> Vec<DataSourceRecordSummary> {
        summary::summarize_records(records, self.config.summary.top_record_limit)
    }
}
