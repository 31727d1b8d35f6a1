//! Default constants for explanation derivation.
//!
//! Engine vocabulary and limits are centralized here.

// =============================================================================
// Relation Vocabulary
// =============================================================================

/// Feature type of a relationship that points both ways.
pub const DEFAULT_LINK_FEATURE_TYPE: &str = "REL_LINK";

/// Feature type of a relationship pointing from the first side to the second.
pub const DEFAULT_POINTER_FEATURE_TYPE: &str = "REL_POINTER";

/// Feature type of the side a relationship points at.
pub const DEFAULT_ANCHOR_FEATURE_TYPE: &str = "REL_ANCHOR";

// =============================================================================
// Scoring
// =============================================================================

/// Feature types whose name sub-scores feed the best name score.
pub fn default_name_feature_types() -> Vec<String> {
    vec!["NAME".to_string()]
}

// =============================================================================
// Record Summaries
// =============================================================================

/// Maximum number of record IDs kept per data source summary.
pub const DEFAULT_TOP_RECORD_LIMIT: usize = 10;

// =============================================================================
// Environment
// =============================================================================

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "RESOLVE_WHY_";
