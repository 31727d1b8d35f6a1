use resolve_why::{MatchedRecord, RawMatchTelemetry};
use serde_json::{json, Value};

#[allow(dead_code)]
pub fn telemetry(value: Value) -> RawMatchTelemetry {
    serde_json::from_value(value).expect("valid telemetry fixture")
}

/// A disclosed-relationship match between an employee and their employer,
/// plus a household link and a name comparison.
#[allow(dead_code)]
pub fn employer_disclosure() -> Value {
    json!({
        "WHY_KEY": "+NAME+EMPLOYER(STAFF:COMPANY)+HOUSEHOLD(SPOUSE:SPOUSE)+OWNER(PARTNER)",
        "MATCH_LEVEL_CODE": "DISCLOSED",
        "WHY_ERRULE_CODE": "DISCLOSED_REL",
        "CANDIDATE_KEYS": {
            "REL_POINTER_KEY": [
                { "FEAT_ID": 501, "FEAT_DESC": "EMPLOYER ACME-77" }
            ]
        },
        "FEATURE_SCORES": {
            "NAME": [
                {
                    "INBOUND_FEAT_ID": 10, "INBOUND_FEAT_DESC": "ACME CORP",
                    "CANDIDATE_FEAT_ID": 20, "CANDIDATE_FEAT_DESC": "ACME CORPORATION",
                    "GNR_FN": -1, "GNR_SN": -1, "GNR_GN": -1, "GNR_GENERATION_MATCH": -1,
                    "GNR_ON": 91,
                    "SCORE_BUCKET": "CLOSE", "SCORE_BEHAVIOR": "NAME"
                },
                {
                    "INBOUND_FEAT_ID": 11, "INBOUND_FEAT_DESC": "JANE DOE",
                    "CANDIDATE_FEAT_ID": 20, "CANDIDATE_FEAT_DESC": "ACME CORPORATION",
                    "GNR_FN": 12, "GNR_ON": -1, "SCORE_BUCKET": "NO_CHANCE"
                }
            ]
        },
        "DISCLOSED_RELATIONS": {
            "REL_ANCHOR": [
                {
                    "FEAT_ID": 900, "FEAT_DESC": "EMPLOYER ACME-77", "FEAT_USAGE_TYPE": "COMPANY",
                    "LINKED_FEAT_ID": 901, "LINKED_FEAT_DESC": "EMPLOYER ACME-77",
                    "LINKED_FEAT_TYPE": "REL_POINTER"
                }
            ],
            "REL_LINK": [
                {
                    "DOMAIN": "HOUSEHOLD",
                    "FEAT_ID": 700, "FEAT_DESC": "HH-19",
                    "LINKED_FEAT_ID": 701, "LINKED_FEAT_DESC": "HH-19"
                }
            ],
            "REL_POINTER": [
                {
                    "FEAT_ID": 901, "FEAT_DESC": "EMPLOYER ACME-77", "FEAT_USAGE_TYPE": "STAFF",
                    "LINKED_FEAT_ID": 900, "LINKED_FEAT_DESC": "EMPLOYER ACME-77",
                    "LINKED_FEAT_TYPE": "REL_ANCHOR", "LINKED_FEAT_USAGE_TYPE": "COMPANY"
                }
            ]
        }
    })
}

#[allow(dead_code)]
pub fn records(entries: &[(Option<&str>, &str)]) -> Vec<MatchedRecord> {
    entries
        .iter()
        .map(|(data_source, id)| MatchedRecord::new(data_source.map(str::to_string), *id))
        .collect()
}
