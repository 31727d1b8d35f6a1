//! # Feature Scoring
//!
//! Lifts scored features out of raw telemetry and reduces the engine's name
//! sub-scores to a single representative value.

use crate::error::{ExplainError, Result};
use crate::model::{field_i64, field_str, RawFeatureMap, RawFields, ScoredFeature, ScoringBucket};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Key prefix of the inbound side of a feature score.
pub const INBOUND_PREFIX: &str = "INBOUND_";
/// Key prefix of the candidate side of a feature score.
pub const CANDIDATE_PREFIX: &str = "CANDIDATE_";

/// Extract one scored feature whose keys share `prefix`.
///
/// Reads `<prefix>FEAT_ID`, `<prefix>FEAT_DESC` (required) and
/// `<prefix>FEAT_USAGE_TYPE`. A non-empty `<prefix>FEAT_TYPE` overrides
/// `feature_type`.
pub fn extract_scored_feature(
    raw: &RawFields,
    feature_type: &str,
    prefix: &str,
) -> Result<ScoredFeature> {
    let value_key = format!("{prefix}FEAT_DESC");
    let feature_value = field_str(raw, &value_key)?.ok_or_else(|| ExplainError::MissingField {
        section: feature_type.to_string(),
        field: value_key.clone(),
    })?;
    let own_type = field_str(raw, &format!("{prefix}FEAT_TYPE"))?.filter(|t| !t.is_empty());

    Ok(ScoredFeature::new(
        field_i64(raw, &format!("{prefix}FEAT_ID"))?,
        own_type.unwrap_or_else(|| feature_type.to_string()),
        feature_value,
        field_str(raw, &format!("{prefix}FEAT_USAGE_TYPE"))?,
    ))
}

fn non_negative(score: Option<i64>) -> Option<u32> {
    score
        .filter(|value| *value >= 0)
        .map(|value| u32::try_from(value).unwrap_or(u32::MAX))
}

/// Name comparison sub-scores.
///
/// Only exists when at least one sub-score is present; negative engine values
/// mean "not computed" and are dropped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameScoring {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name_score: Option<u32>,
}

impl NameScoring {
    /// Build from raw sub-scores, or `None` if none of them is usable.
    pub fn from_scores(
        full_name: Option<i64>,
        surname: Option<i64>,
        given_name: Option<i64>,
        generation: Option<i64>,
        org_name: Option<i64>,
    ) -> Option<Self> {
        let scoring = Self {
            full_name_score: non_negative(full_name),
            surname_score: non_negative(surname),
            given_name_score: non_negative(given_name),
            generation_score: non_negative(generation),
            org_name_score: non_negative(org_name),
        };
        let any = scoring.full_name_score.is_some()
            || scoring.surname_score.is_some()
            || scoring.given_name_score.is_some()
            || scoring.generation_score.is_some()
            || scoring.org_name_score.is_some();
        any.then_some(scoring)
    }

    /// Read the `GNR_*` sub-scores of a raw feature score record.
    pub fn from_raw(raw: &RawFields) -> Result<Option<Self>> {
        Ok(Self::from_scores(
            field_i64(raw, "GNR_FN")?,
            field_i64(raw, "GNR_SN")?,
            field_i64(raw, "GNR_GN")?,
            field_i64(raw, "GNR_GENERATION_MATCH")?,
            field_i64(raw, "GNR_ON")?,
        ))
    }

    /// The single score that best represents this comparison.
    ///
    /// Organization name, then full name, then surname, then given name.
    pub fn as_full_score(&self) -> Option<u32> {
        self.org_name_score
            .or(self.full_name_score)
            .or(self.surname_score)
            .or(self.given_name_score)
    }

    /// Candidate for [`best_name_score`]: the larger of the full and org
    /// name scores, accepted only when strictly positive.
    fn best_candidate(&self) -> Option<u32> {
        self.full_name_score
            .max(self.org_name_score)
            .filter(|score| *score > 0)
    }
}

/// Highest accepted full/org name score across `scorings`, if any.
pub fn best_name_score<'a, I>(scorings: I) -> Option<u32>
where
    I: IntoIterator<Item = &'a NameScoring>,
{
    scorings
        .into_iter()
        .filter_map(NameScoring::best_candidate)
        .max()
}

/// The engine's comparison of one inbound feature with one candidate feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureScore {
    pub feature_type: String,
    pub inbound_feature: ScoredFeature,
    pub candidate_feature: ScoredFeature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_scoring_details: Option<NameScoring>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_bucket: Option<ScoringBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_behavior: Option<String>,
}

impl FeatureScore {
    /// Parse one raw feature score record of the given feature type.
    pub fn parse(feature_type: &str, raw: &RawFields) -> Result<Self> {
        let inbound_feature = extract_scored_feature(raw, feature_type, INBOUND_PREFIX)?;
        let candidate_feature = extract_scored_feature(raw, feature_type, CANDIDATE_PREFIX)?;
        let full_score = non_negative(field_i64(raw, "FULL_SCORE")?);
        let name_scoring_details = NameScoring::from_raw(raw)?;

        let scoring_bucket = match field_str(raw, "SCORE_BUCKET")? {
            Some(code) if !code.is_empty() => {
                let bucket = ScoringBucket::from_code(&code);
                if bucket.is_none() {
                    warn!(feature_type, bucket = %code, "Unrecognized scoring bucket");
                }
                bucket
            }
            _ => None,
        };

        let score = name_scoring_details
            .as_ref()
            .and_then(NameScoring::as_full_score)
            .or(full_score);

        Ok(Self {
            feature_type: feature_type.to_string(),
            inbound_feature,
            candidate_feature,
            score,
            full_score,
            name_scoring_details,
            scoring_bucket,
            scoring_behavior: field_str(raw, "SCORE_BEHAVIOR")?.filter(|b| !b.is_empty()),
        })
    }
}

/// Parse every feature score record, keyed by feature type.
pub fn parse_feature_scores(raw: &RawFeatureMap) -> Result<BTreeMap<String, Vec<FeatureScore>>> {
    raw.iter()
        .map(|(feature_type, records)| {
            let scores = records
                .iter()
                .map(|record| FeatureScore::parse(feature_type, record))
                .collect::<Result<Vec<_>>>()?;
            Ok((feature_type.clone(), scores))
        })
        .collect()
}
