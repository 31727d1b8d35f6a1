//! # Match Explanation
//!
//! Turns one raw telemetry record into a [`MatchInfo`]: match level,
//! candidate keys, feature scores, best name score and disclosed relations.

use crate::config::WhyConfig;
use crate::error::{ExplainError, Result};
use crate::model::{
    field_i64, field_str, CandidateKey, DisclosedRelation, MatchLevel, RawFeatureMap,
    RawMatchTelemetry,
};
use crate::relations::derive_disclosed_relations;
use crate::scoring::{best_name_score, parse_feature_scores, FeatureScore};
use crate::why_key::WhyKeyGrammar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{field, instrument};

/// Structured explanation of why two entities matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_key: Option<String>,
    pub match_level: MatchLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_rule_code: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub candidate_keys: BTreeMap<String, Vec<CandidateKey>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub feature_scores: BTreeMap<String, Vec<FeatureScore>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_name_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disclosed_relations: Vec<DisclosedRelation>,
}

fn parse_candidate_keys(raw: &RawFeatureMap) -> Result<BTreeMap<String, Vec<CandidateKey>>> {
    raw.iter()
        .map(|(feature_type, records)| {
            let keys = records
                .iter()
                .map(|record| {
                    let feature_value =
                        field_str(record, "FEAT_DESC")?.ok_or_else(|| ExplainError::MissingField {
                            section: format!("CANDIDATE_KEYS.{feature_type}"),
                            field: "FEAT_DESC".to_string(),
                        })?;
                    Ok(CandidateKey {
                        feature_id: field_i64(record, "FEAT_ID")?,
                        feature_type: feature_type.clone(),
                        feature_value,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((feature_type.clone(), keys))
        })
        .collect()
}

/// Derive the explanation for one match.
///
/// `MATCH_LEVEL_CODE`, `CANDIDATE_KEYS` and `FEATURE_SCORES` are required;
/// the why-key, resolution rule and disclosed relations may be absent.
#[instrument(skip_all, fields(match_level = field::Empty, why_key = field::Empty))]
pub fn explain_match(raw: &RawMatchTelemetry, config: &WhyConfig) -> Result<MatchInfo> {
    let level_code = raw
        .match_level_code
        .as_deref()
        .ok_or(ExplainError::MissingSection("MATCH_LEVEL_CODE"))?;
    let match_level = MatchLevel::from_code(level_code)?;
    let candidate_keys = raw
        .candidate_keys
        .as_ref()
        .ok_or(ExplainError::MissingSection("CANDIDATE_KEYS"))?;
    let feature_scores = raw
        .feature_scores
        .as_ref()
        .ok_or(ExplainError::MissingSection("FEATURE_SCORES"))?;

    let why_key = raw.why_key.clone().filter(|key| !key.trim().is_empty());
    let span = tracing::Span::current();
    span.record("match_level", match_level.code());
    if let Some(key) = &why_key {
        span.record("why_key", key.as_str());
    }

    let grammar = WhyKeyGrammar::parse(why_key.as_deref().unwrap_or_default());
    let feature_scores = parse_feature_scores(feature_scores)?;

    let best_name_score = best_name_score(
        feature_scores
            .iter()
            .filter(|(feature_type, _)| config.scoring.is_name_feature(feature_type))
            .flat_map(|(_, scores)| scores)
            .filter_map(|score| score.name_scoring_details.as_ref()),
    );

    let disclosed_relations = match &raw.disclosed_relations {
        Some(pairs) => derive_disclosed_relations(pairs, &grammar, &config.relations)?,
        None => Vec::new(),
    };

    Ok(MatchInfo {
        why_key,
        match_level,
        resolution_rule_code: raw.why_errule_code.clone().filter(|code| !code.is_empty()),
        candidate_keys: parse_candidate_keys(candidate_keys)?,
        feature_scores,
        best_name_score,
        disclosed_relations,
    })
}
