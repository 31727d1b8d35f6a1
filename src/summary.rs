//! # Record Summaries
//!
//! Groups matched records by data source into bounded, deterministic
//! summaries.

use crate::config::DEFAULT_TOP_RECORD_LIMIT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A record that participated in a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRecord {
    #[serde(default, alias = "DATA_SOURCE", skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(alias = "RECORD_ID")]
    pub record_id: String,
}

impl MatchedRecord {
    pub fn new(data_source: Option<String>, record_id: impl Into<String>) -> Self {
        Self {
            data_source,
            record_id: record_id.into(),
        }
    }
}

/// Record counts and a sorted sample of record IDs for one data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceRecordSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    pub record_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_record_ids: Vec<String>,
}

/// Summarize records per data source.
///
/// A missing or empty data source forms its own group, ordered before all
/// named data sources. Named sources follow in ascending order. Each summary
/// keeps the full count but only the first `top_limit` record IDs in
/// ascending order. The limit is clamped to `1..=DEFAULT_TOP_RECORD_LIMIT`.
pub fn summarize_records(
    records: &[MatchedRecord],
    top_limit: usize,
) -> Vec<DataSourceRecordSummary> {
    let top_limit = top_limit.clamp(1, DEFAULT_TOP_RECORD_LIMIT);
    let mut groups: BTreeMap<Option<&str>, Vec<&str>> = BTreeMap::new();
    for record in records {
        let data_source = record.data_source.as_deref().filter(|ds| !ds.is_empty());
        groups
            .entry(data_source)
            .or_default()
            .push(record.record_id.as_str());
    }

    groups
        .into_iter()
        .map(|(data_source, mut record_ids)| {
            let record_count = record_ids.len();
            record_ids.sort_unstable();
            record_ids.truncate(top_limit);
            DataSourceRecordSummary {
                data_source: data_source.map(str::to_string),
                record_count,
                top_record_ids: record_ids.into_iter().map(str::to_string).collect(),
            }
        })
        .collect()
}
