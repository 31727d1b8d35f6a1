//! # Data Model
//!
//! Raw telemetry as produced by the resolution engine, and the stable value
//! types the explanation layer builds from it.

use crate::error::{ExplainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single flat, code-keyed telemetry record (one feature score, one
/// candidate key, one related-feature pair). Key names depend on which side
/// of a comparison is being read, so the record stays untyped.
pub type RawFields = serde_json::Map<String, serde_json::Value>;

/// Raw telemetry records grouped by feature type.
pub type RawFeatureMap = BTreeMap<String, Vec<RawFields>>;

/// Match telemetry for one comparison, exactly as the engine emits it.
///
/// Every section is optional at the deserialization level; `explain` decides
/// which ones are structurally required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawMatchTelemetry {
    #[serde(default)]
    pub why_key: Option<String>,
    #[serde(default)]
    pub match_level_code: Option<String>,
    #[serde(default, rename = "WHY_ERRULE_CODE")]
    pub why_errule_code: Option<String>,
    #[serde(default)]
    pub candidate_keys: Option<RawFeatureMap>,
    #[serde(default)]
    pub feature_scores: Option<RawFeatureMap>,
    #[serde(default)]
    pub disclosed_relations: Option<RawFeatureMap>,
}

impl RawMatchTelemetry {
    /// Parse telemetry from engine JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read an optional integer field. Numeric strings are accepted.
pub(crate) fn field_i64(raw: &RawFields, key: &str) -> Result<Option<i64>> {
    match raw.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
            ExplainError::InvalidField {
                field: key.to_string(),
                reason: format!("{n} is not an integer"),
            }
        }),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => {
            s.trim()
                .parse()
                .map(Some)
                .map_err(|_| ExplainError::InvalidField {
                    field: key.to_string(),
                    reason: format!("{s:?} is not an integer"),
                })
        }
        Some(other) => Err(ExplainError::InvalidField {
            field: key.to_string(),
            reason: format!("expected integer, found {other}"),
        }),
    }
}

/// Read an optional string field.
pub(crate) fn field_str(raw: &RawFields, key: &str) -> Result<Option<String>> {
    match raw.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ExplainError::InvalidField {
            field: key.to_string(),
            reason: format!("expected string, found {other}"),
        }),
    }
}

/// How strongly two entities were found to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchLevel {
    NoMatch,
    Resolved,
    PossiblySame,
    PossiblyRelated,
    NameOnly,
    Disclosed,
}

impl MatchLevel {
    /// Map an engine `MATCH_LEVEL_CODE` onto a match level.
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim() {
            "NO_MATCH" => Ok(Self::NoMatch),
            "RESOLVED" => Ok(Self::Resolved),
            "POSSIBLY_SAME" => Ok(Self::PossiblySame),
            "POSSIBLY_RELATED" => Ok(Self::PossiblyRelated),
            "NAME_ONLY" => Ok(Self::NameOnly),
            "DISCLOSED" => Ok(Self::Disclosed),
            other => Err(ExplainError::UnknownMatchLevel(other.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NoMatch => "NO_MATCH",
            Self::Resolved => "RESOLVED",
            Self::PossiblySame => "POSSIBLY_SAME",
            Self::PossiblyRelated => "POSSIBLY_RELATED",
            Self::NameOnly => "NAME_ONLY",
            Self::Disclosed => "DISCLOSED",
        }
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The engine's coarse bucket for a feature comparison score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringBucket {
    Same,
    Close,
    Likely,
    Plausible,
    Unlikely,
    NoChance,
}

impl ScoringBucket {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "SAME" => Some(Self::Same),
            "CLOSE" => Some(Self::Close),
            "LIKELY" => Some(Self::Likely),
            "PLAUSIBLE" => Some(Self::Plausible),
            "UNLIKELY" => Some(Self::Unlikely),
            "NO_CHANCE" => Some(Self::NoChance),
            _ => None,
        }
    }
}

/// Direction of a disclosed relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationDirection {
    Inbound,
    Outbound,
    Bidirectional,
}

impl RelationDirection {
    /// Combine two observed directions.
    ///
    /// Commutative, associative and idempotent. `Inbound` and `Outbound`
    /// meet at `Bidirectional`, which absorbs everything.
    pub fn merge(self, other: RelationDirection) -> RelationDirection {
        if self == other {
            self
        } else {
            RelationDirection::Bidirectional
        }
    }

    /// Merge into an optional running direction.
    pub fn merge_into(self, existing: Option<RelationDirection>) -> RelationDirection {
        match existing {
            Some(current) => current.merge(self),
            None => self,
        }
    }
}

/// Insertion-ordered set of role names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(Vec<String>);

impl RoleSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a role, returning `false` if it was already present.
    pub fn insert(&mut self, role: impl Into<String>) -> bool {
        let role = role.into();
        if self.0.contains(&role) {
            return false;
        }
        self.0.push(role);
        true
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.iter().any(|r| r == role)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = RoleSet::new();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

/// One side of a feature comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<i64>,
    pub feature_type: String,
    pub feature_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_type: Option<String>,
}

impl ScoredFeature {
    pub fn new(
        feature_id: Option<i64>,
        feature_type: String,
        feature_value: String,
        usage_type: Option<String>,
    ) -> Self {
        Self {
            feature_id,
            feature_type,
            feature_value,
            usage_type,
        }
    }

    /// The usage type, treating an empty string as absent.
    pub fn usage(&self) -> Option<&str> {
        self.usage_type.as_deref().filter(|u| !u.is_empty())
    }
}

/// Two feature values, one per side of a relationship, that matched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedFeaturePair {
    pub feature1: ScoredFeature,
    pub feature2: ScoredFeature,
}

impl RelatedFeaturePair {
    pub fn new(feature1: ScoredFeature, feature2: ScoredFeature) -> Self {
        Self { feature1, feature2 }
    }
}

/// A relationship explicitly evidenced by matching feature pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosedRelation {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<RelationDirection>,
    #[serde(default, skip_serializing_if = "RoleSet::is_empty")]
    pub roles1: RoleSet,
    #[serde(default, skip_serializing_if = "RoleSet::is_empty")]
    pub roles2: RoleSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_features: Vec<RelatedFeaturePair>,
}

/// A feature value that caused the engine to consider a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<i64>,
    pub feature_type: String,
    pub feature_value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use RelationDirection::*;

    #[test]
    fn test_direction_merge_table() {
        assert_eq!(Inbound.merge(Inbound), Inbound);
        assert_eq!(Outbound.merge(Outbound), Outbound);
        assert_eq!(Inbound.merge(Outbound), Bidirectional);
        assert_eq!(Outbound.merge(Inbound), Bidirectional);
        assert_eq!(Bidirectional.merge(Inbound), Bidirectional);
        assert_eq!(Outbound.merge(Bidirectional), Bidirectional);
        assert_eq!(Inbound.merge_into(None), Inbound);
        assert_eq!(Inbound.merge_into(Some(Outbound)), Bidirectional);
    }

    #[test]
    fn test_role_set_dedupes_in_insertion_order() {
        let mut roles = RoleSet::new();
        assert!(roles.insert("EMPLOYER"));
        assert!(roles.insert("APPLICANT"));
        assert!(!roles.insert("EMPLOYER"));
        assert_eq!(roles.iter().collect::<Vec<_>>(), vec!["EMPLOYER", "APPLICANT"]);
    }

    #[test]
    fn test_match_level_codes() {
        assert_eq!(MatchLevel::from_code("RESOLVED").unwrap(), MatchLevel::Resolved);
        assert_eq!(MatchLevel::Disclosed.to_string(), "DISCLOSED");
        assert!(matches!(
            MatchLevel::from_code("MAYBE"),
            Err(ExplainError::UnknownMatchLevel(code)) if code == "MAYBE"
        ));
        let json = serde_json::to_string(&MatchLevel::PossiblyRelated).unwrap();
        assert_eq!(json, "\"POSSIBLY_RELATED\"");
    }

    #[test]
    fn test_raw_telemetry_from_json() {
        let raw = RawMatchTelemetry::from_json(
            r#"{"WHY_KEY":"+NAME","MATCH_LEVEL_CODE":"RESOLVED","WHY_ERRULE_CODE":"CNAME",
                "CANDIDATE_KEYS":{},"FEATURE_SCORES":{"NAME":[{"FULL_SCORE":90}]}}"#,
        )
        .unwrap();
        assert_eq!(raw.why_key.as_deref(), Some("+NAME"));
        assert_eq!(raw.why_errule_code.as_deref(), Some("CNAME"));
        assert!(raw.disclosed_relations.is_none());
        assert_eq!(raw.feature_scores.unwrap()["NAME"].len(), 1);
    }

    #[test]
    fn test_field_readers() {
        let raw: RawFields = serde_json::from_value(serde_json::json!({
            "ID": 7, "ID_STR": " 12 ", "NEG": -1, "BAD": 1.5, "DESC": "Smith", "NUM_DESC": 3
        }))
        .unwrap();
        assert_eq!(field_i64(&raw, "ID").unwrap(), Some(7));
        assert_eq!(field_i64(&raw, "ID_STR").unwrap(), Some(12));
        assert_eq!(field_i64(&raw, "NEG").unwrap(), Some(-1));
        assert_eq!(field_i64(&raw, "MISSING").unwrap(), None);
        assert!(field_i64(&raw, "BAD").is_err());
        assert_eq!(field_str(&raw, "DESC").unwrap().as_deref(), Some("Smith"));
        assert!(field_str(&raw, "NUM_DESC").is_err());
    }

    #[test]
    fn test_disclosed_relation_omits_empty_fields() {
        let json = serde_json::to_value(DisclosedRelation::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
