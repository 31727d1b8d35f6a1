//! # Disclosed Relations
//!
//! Groups the engine's related-feature pairs by relationship domain, infers
//! each domain's direction from the feature types involved, and merges in
//! the roles the why-key declares for the same domain.

use crate::config::RelationVocabulary;
use crate::error::Result;
use crate::model::{
    field_str, DisclosedRelation, RawFeatureMap, RelatedFeaturePair, RelationDirection,
};
use crate::scoring::extract_scored_feature;
use crate::why_key::WhyKeyGrammar;
use tracing::{debug, warn};

/// Key prefix of the second feature of a related-feature pair.
pub const LINKED_PREFIX: &str = "LINKED_";

/// What a relationship feature type says about direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Both sides point at each other.
    Link,
    /// The first side points at the second.
    Pointer,
    /// The first side is pointed at.
    Anchor,
}

impl RelationVocabulary {
    /// Classify a feature type code, or `None` if it carries no direction.
    pub fn kind_of(&self, feature_type: &str) -> Option<RelationKind> {
        if feature_type == self.link {
            Some(RelationKind::Link)
        } else if feature_type == self.pointer {
            Some(RelationKind::Pointer)
        } else if feature_type == self.anchor {
            Some(RelationKind::Anchor)
        } else {
            None
        }
    }
}

/// Find the domain a feature value belongs to.
///
/// `domains` must be ordered longest first; the first one that prefixes
/// `value` followed by a single space wins. No match yields `""`.
pub fn infer_domain<'a>(value: &str, domains: &[&'a str]) -> &'a str {
    domains
        .iter()
        .copied()
        .find(|domain| {
            value
                .strip_prefix(*domain)
                .is_some_and(|rest| rest.starts_with(' '))
        })
        .unwrap_or("")
}

/// Domains of `grammar` ordered for [`infer_domain`].
pub fn domains_longest_first(grammar: &WhyKeyGrammar) -> Vec<&str> {
    let mut domains: Vec<&str> = grammar.domains().collect();
    domains.sort_by(|a, b| b.len().cmp(&a.len()));
    domains
}

/// Group raw related-feature pairs by domain, in first-seen order.
///
/// Each group carries the direction and roles contributed by its own pairs;
/// why-key roles are not merged yet.
pub fn group_related_features(
    raw: &RawFeatureMap,
    grammar: &WhyKeyGrammar,
    vocabulary: &RelationVocabulary,
) -> Result<Vec<DisclosedRelation>> {
    let domains = domains_longest_first(grammar);
    let mut groups: Vec<DisclosedRelation> = Vec::new();

    for (feature_type, records) in raw {
        for record in records {
            let feature1 = extract_scored_feature(record, feature_type, "")?;
            let feature2 = extract_scored_feature(record, feature_type, LINKED_PREFIX)?;

            let domain = match field_str(record, "DOMAIN")?.filter(|d| !d.is_empty()) {
                Some(domain) => domain,
                None => {
                    let inferred = infer_domain(&feature1.feature_value, &domains);
                    if inferred.is_empty() {
                        debug!(
                            feature_type = %feature1.feature_type,
                            value = %feature1.feature_value,
                            "No known domain prefixes related feature; using empty domain"
                        );
                    }
                    inferred.to_string()
                }
            };

            let index = match groups.iter().position(|group| group.domain == domain) {
                Some(index) => index,
                None => {
                    groups.push(DisclosedRelation {
                        domain,
                        ..DisclosedRelation::default()
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];

            match vocabulary.kind_of(&feature1.feature_type) {
                Some(RelationKind::Link) => {
                    group.direction = Some(RelationDirection::Bidirectional);
                }
                Some(RelationKind::Pointer) => {
                    group.direction = Some(RelationDirection::Outbound.merge_into(group.direction));
                }
                Some(RelationKind::Anchor) => {
                    group.direction = Some(RelationDirection::Inbound.merge_into(group.direction));
                }
                None => {
                    warn!(
                        feature_type = %feature1.feature_type,
                        "Related feature type carries no relation direction"
                    );
                }
            }

            if let Some(usage) = feature1.usage() {
                group.roles1.insert(usage);
            }
            if let Some(usage) = feature2.usage() {
                group.roles2.insert(usage);
            }
            group
                .related_features
                .push(RelatedFeaturePair::new(feature1, feature2));
        }
    }

    Ok(groups)
}

/// Add the why-key's declared roles to each grouped relation.
///
/// Inbound roles go to `roles1`, outbound roles to `roles2`, union only.
/// Domains that only appear in the why-key are not emitted.
pub fn assemble_disclosed_relations(
    groups: Vec<DisclosedRelation>,
    grammar: &WhyKeyGrammar,
) -> Vec<DisclosedRelation> {
    groups
        .into_iter()
        .map(|mut relation| {
            if let Some(declared) = grammar.get(&relation.domain) {
                if let Some(inbound) = declared.get(&RelationDirection::Inbound) {
                    for role in inbound.iter() {
                        relation.roles1.insert(role);
                    }
                }
                if let Some(outbound) = declared.get(&RelationDirection::Outbound) {
                    for role in outbound.iter() {
                        relation.roles2.insert(role);
                    }
                }
            }
            relation
        })
        .collect()
}

/// Group raw pairs and merge why-key roles in one step.
pub fn derive_disclosed_relations(
    raw: &RawFeatureMap,
    grammar: &WhyKeyGrammar,
    vocabulary: &RelationVocabulary,
) -> Result<Vec<DisclosedRelation>> {
    let groups = group_related_features(raw, grammar, vocabulary)?;
    Ok(assemble_disclosed_relations(groups, grammar))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawFields;
    use serde_json::json;

    fn pair(value: serde_json::Value) -> RawFields {
        serde_json::from_value(value).unwrap()
    }

    fn relation_map(entries: Vec<(&str, Vec<RawFields>)>) -> RawFeatureMap {
        entries
            .into_iter()
            .map(|(feature_type, records)| (feature_type.to_string(), records))
            .collect()
    }

    fn roles(set: &crate::model::RoleSet) -> Vec<&str> {
        set.iter().collect()
    }

    #[test]
    fn test_infer_domain_prefers_exact_prefix_plus_space() {
        let grammar = WhyKeyGrammar::parse("NAME+NAME_ON");
        let domains = domains_longest_first(&grammar);
        assert_eq!(domains, vec!["NAME_ON", "NAME"]);
        assert_eq!(infer_domain("NAME John Smith", &domains), "NAME");
        assert_eq!(infer_domain("NAME_ON John Smith", &domains), "NAME_ON");
        assert_eq!(infer_domain("NAMEX John", &domains), "");
        assert_eq!(infer_domain("NAME", &domains), "");
    }

    #[test]
    fn test_infer_domain_longest_match_wins() {
        let grammar = WhyKeyGrammar::parse("EMP+EMP CO");
        let domains = domains_longest_first(&grammar);
        assert_eq!(infer_domain("EMP CO 1234", &domains), "EMP CO");
        assert_eq!(infer_domain("EMP 1234", &domains), "EMP");
    }

    #[test]
    fn test_vocabulary_classification() {
        let vocabulary = RelationVocabulary::default();
        assert_eq!(vocabulary.kind_of("REL_LINK"), Some(RelationKind::Link));
        assert_eq!(vocabulary.kind_of("REL_POINTER"), Some(RelationKind::Pointer));
        assert_eq!(vocabulary.kind_of("REL_ANCHOR"), Some(RelationKind::Anchor));
        assert_eq!(vocabulary.kind_of("NAME"), None);
    }

    #[test]
    fn test_pointer_and_anchor_merge_to_bidirectional() {
        let raw = relation_map(vec![
            (
                "REL_ANCHOR",
                vec![pair(json!({
                    "DOMAIN": "EMPLOYER", "FEAT_DESC": "EMPLOYER 1", "FEAT_USAGE_TYPE": "COMPANY",
                    "LINKED_FEAT_DESC": "EMPLOYER 1"
                }))],
            ),
            (
                "REL_POINTER",
                vec![pair(json!({
                    "DOMAIN": "EMPLOYER", "FEAT_DESC": "EMPLOYER 1", "FEAT_USAGE_TYPE": "STAFF",
                    "LINKED_FEAT_DESC": "EMPLOYER 1", "LINKED_FEAT_USAGE_TYPE": "COMPANY"
                }))],
            ),
        ]);
        let grammar = WhyKeyGrammar::default();
        let groups =
            group_related_features(&raw, &grammar, &RelationVocabulary::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].direction, Some(RelationDirection::Bidirectional));
        assert_eq!(roles(&groups[0].roles1), vec!["COMPANY", "STAFF"]);
        assert_eq!(roles(&groups[0].roles2), vec!["COMPANY"]);
        assert_eq!(groups[0].related_features.len(), 2);
    }

    #[test]
    fn test_single_pointer_is_outbound() {
        let raw = relation_map(vec![(
            "REL_POINTER",
            vec![
                pair(json!({ "FEAT_DESC": "HOUSEHOLD 7", "LINKED_FEAT_DESC": "HOUSEHOLD 7" })),
                pair(json!({ "FEAT_DESC": "HOUSEHOLD 8", "LINKED_FEAT_DESC": "HOUSEHOLD 8" })),
            ],
        )]);
        let grammar = WhyKeyGrammar::parse("+HOUSEHOLD");
        let groups =
            group_related_features(&raw, &grammar, &RelationVocabulary::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].domain, "HOUSEHOLD");
        assert_eq!(groups[0].direction, Some(RelationDirection::Outbound));
        assert!(groups[0].roles1.is_empty());
    }

    #[test]
    fn test_link_overrides_earlier_direction() {
        let vocabulary = RelationVocabulary {
            link: "Z_LINK".to_string(),
            ..RelationVocabulary::default()
        };
        let raw = relation_map(vec![
            (
                "REL_ANCHOR",
                vec![pair(json!({
                    "DOMAIN": "FAMILY", "FEAT_DESC": "F", "LINKED_FEAT_DESC": "F"
                }))],
            ),
            (
                "Z_LINK",
                vec![pair(json!({
                    "DOMAIN": "FAMILY", "FEAT_DESC": "F", "LINKED_FEAT_DESC": "F"
                }))],
            ),
        ]);
        let groups = group_related_features(&raw, &WhyKeyGrammar::default(), &vocabulary).unwrap();
        assert_eq!(groups[0].direction, Some(RelationDirection::Bidirectional));
        assert!(groups[0].roles1.is_empty());
        assert!(groups[0].roles2.is_empty());
    }

    #[test]
    fn test_unknown_type_and_unmatched_domain() {
        let raw = relation_map(vec![(
            "TRUSTEE",
            vec![pair(json!({ "FEAT_DESC": "T 1", "LINKED_FEAT_DESC": "T 2" }))],
        )]);
        let groups = group_related_features(
            &raw,
            &WhyKeyGrammar::parse("NAME"),
            &RelationVocabulary::default(),
        )
        .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].domain, "");
        assert_eq!(groups[0].direction, None);
    }

    #[test]
    fn test_assembler_unions_declared_roles() {
        let raw = relation_map(vec![(
            "REL_POINTER",
            vec![pair(json!({
                "FEAT_DESC": "EMPLOYER 1", "FEAT_USAGE_TYPE": "STAFF",
                "LINKED_FEAT_DESC": "EMPLOYER 1"
            }))],
        )]);
        let grammar = WhyKeyGrammar::parse("+EMPLOYER(STAFF,MANAGER:COMPANY)+HOUSEHOLD(SPOUSE)");
        let relations =
            derive_disclosed_relations(&raw, &grammar, &RelationVocabulary::default()).unwrap();
        assert_eq!(relations.len(), 1);
        let relation = &relations[0];
        assert_eq!(relation.domain, "EMPLOYER");
        assert_eq!(roles(&relation.roles1), vec!["STAFF", "MANAGER"]);
        assert_eq!(roles(&relation.roles2), vec!["COMPANY"]);
    }

    #[test]
    fn test_missing_linked_value_is_an_error() {
        let raw = relation_map(vec![("REL_LINK", vec![pair(json!({ "FEAT_DESC": "X 1" }))])]);
        let result =
            group_related_features(&raw, &WhyKeyGrammar::default(), &RelationVocabulary::default());
        assert!(result.is_err());
    }
}
