//! Enrichment configuration
//!
//! Every field has a default so a partial JSON object coming from JS is a
//! valid configuration.

use serde::{Deserialize, Serialize};

use super::error::EnrichError;
use crate::document::DocumentNode;

/// Block-level TEI tags: each is enriched on its own, never as part of an
/// inline run.
pub const DEFAULT_BLOCK_TAGS: &[&str] = &[
    "TEI", "teiHeader", "text", "front", "body", "back", "div", "p", "ab", "head", "list", "item",
    "table", "row", "cell", "figure", "figDesc", "note", "quote", "lg", "l", "sp", "listBibl",
    "biblStruct", "bibl", "abstract",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    /// Tags excluded from matching and kept verbatim
    pub stop_tags: Vec<String>,
    pub block_tags: Vec<String>,
    /// Groups whose terms match case-insensitively
    pub case_insensitive_groups: Vec<String>,
    /// Bound on transitive overlap synthesis
    pub max_overlap_rounds: usize,
    pub discover_overlaps: bool,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            stop_tags: vec!["formula".to_string()],
            block_tags: DEFAULT_BLOCK_TAGS.iter().map(|t| t.to_string()).collect(),
            case_insensitive_groups: vec!["teeft".to_string()],
            max_overlap_rounds: 8,
            discover_overlaps: true,
        }
    }
}

impl EnrichConfig {
    /// Full pipeline: containment nesting and overlap synthesis
    pub fn production() -> Self {
        Self::default()
    }

    /// Containment nesting only; overlapping terms stay independent and the
    /// leftmost one wins at match time.
    pub fn literal() -> Self {
        Self {
            discover_overlaps: false,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EnrichError> {
        let config: Self = serde_json::from_str(json).map_err(|e| EnrichError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EnrichError> {
        if self.discover_overlaps && self.max_overlap_rounds == 0 {
            return Err(EnrichError::InvalidConfig(
                "max_overlap_rounds must be at least 1 when discover_overlaps is set".into(),
            ));
        }
        if let Some(tag) = self.stop_tags.iter().find(|t| self.block_tags.contains(t)) {
            return Err(EnrichError::InvalidConfig(format!(
                "tag `{}` cannot be both a stop tag and a block tag",
                tag
            )));
        }
        Ok(())
    }

    /// Rounds handed to the overlap discoverer, 0 when disabled
    pub fn overlap_rounds(&self) -> usize {
        if self.discover_overlaps {
            self.max_overlap_rounds
        } else {
            0
        }
    }

    pub fn is_block_tag(&self, tag: &str) -> bool {
        self.block_tags.iter().any(|t| t == tag)
    }

    /// Default stop-tag predicate
    pub fn is_stop_tag(&self, node: &DocumentNode) -> bool {
        self.stop_tags.iter().any(|t| *t == node.tag)
    }

    pub fn is_case_insensitive_group(&self, group: &str) -> bool {
        self.case_insensitive_groups.iter().any(|g| g == group)
    }
}
