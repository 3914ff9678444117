//! Term records flowing through the enrichment pipeline
//!
//! | Stage              | Record           |
//! |--------------------|------------------|
//! | caller input       | `TermStatistic`  |
//! | Term Normalizer    | `NormalizedTerm` |
//! | Term Merger        | `GroupedTerm`    |
//! | Term Nester        | `NestedTerm`     |

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use super::boundary::slug;

/// Term texts keyed by group name (`persName`, `placeName`, `teeft`, ...)
pub type TermsByGroup = BTreeMap<String, Vec<String>>;

// =============================================================================
// Input
// =============================================================================

/// Raw term statistic produced by an enrichment-XML parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStatistic {
    pub term: String,
    #[serde(default)]
    pub displayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
}

/// One entry of a group's term list: either a bare string or a statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermEntry {
    Plain(String),
    Statistic(TermStatistic),
}

impl TermEntry {
    pub fn text(&self) -> &str {
        match self {
            TermEntry::Plain(term) => term,
            TermEntry::Statistic(stat) => &stat.term,
        }
    }

    /// Bare strings are always displayed
    pub fn is_displayed(&self) -> bool {
        match self {
            TermEntry::Plain(_) => true,
            TermEntry::Statistic(stat) => stat.displayed,
        }
    }
}

/// Keep only `displayed` terms, the filter the core expects callers to apply.
pub fn displayed_terms(statistics: &BTreeMap<String, Vec<TermEntry>>) -> TermsByGroup {
    statistics
        .iter()
        .map(|(group, entries)| {
            let terms = entries
                .iter()
                .filter(|e| e.is_displayed())
                .map(|e| e.text().to_string())
                .collect();
            (group.clone(), terms)
        })
        .collect()
}

// =============================================================================
// Pipeline records
// =============================================================================

/// A `(term, group)` pair; composite overlap terms are `artificial`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedTerm {
    pub term: String,
    pub group: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub artificial: bool,
}

impl NormalizedTerm {
    pub fn new(term: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            group: group.into(),
            artificial: false,
        }
    }
}

/// A distinct term text with every group that declared it (first-seen order)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedTerm {
    pub term: String,
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub artificial: bool,
}

/// Which declared term a segment belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SourceTerm {
    /// Root term: the anchor is the term's own text
    #[default]
    Own,
    /// Several declared terms disagree, no anchor
    Ambiguous,
    /// Exactly one declared term determined the segment
    Term(String),
}

impl SourceTerm {
    pub fn is_own(&self) -> bool {
        matches!(self, SourceTerm::Own)
    }

    pub fn from_parent(parent: Option<&str>) -> Self {
        parent.map_or(SourceTerm::Own, |t| SourceTerm::Term(t.to_string()))
    }
}

// `sourceTerm` is absent for roots, `null` when ambiguous, a string otherwise.
impl Serialize for SourceTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceTerm::Term(term) => serializer.serialize_some(term),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for SourceTerm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(term) => SourceTerm::Term(term),
            None => SourceTerm::Ambiguous,
        })
    }
}

/// A term with its segmentation into contained sub-terms.
///
/// When `sub_terms` is non-empty their texts concatenate to `term`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedTerm {
    pub term: String,
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_terms: Vec<NestedTerm>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub artificial: bool,
    #[serde(default, skip_serializing_if = "SourceTerm::is_own")]
    pub source_term: SourceTerm,
}

impl NestedTerm {
    pub fn leaf(term: impl Into<String>, groups: Vec<String>) -> Self {
        Self {
            term: term.into(),
            groups,
            sub_terms: Vec::new(),
            artificial: false,
            source_term: SourceTerm::Own,
        }
    }

    /// Length used for ordering terms (in characters)
    pub fn char_len(&self) -> usize {
        self.term.chars().count()
    }

    /// Anchor slug for the `term` attribute of the highlight
    pub fn anchor(&self) -> Option<String> {
        match &self.source_term {
            SourceTerm::Own => Some(slug(&self.term)),
            SourceTerm::Term(source) => Some(slug(source)),
            SourceTerm::Ambiguous => None,
        }
    }

    /// True if every level of sub-terms concatenates back to its parent
    pub fn is_partitioned(&self) -> bool {
        if self.sub_terms.is_empty() {
            return true;
        }
        let joined: String = self.sub_terms.iter().map(|s| s.term.as_str()).collect();
        joined == self.term && self.sub_terms.iter().all(NestedTerm::is_partitioned)
    }

    /// Byte offsets of the top-level sub-terms relative to `term`
    pub fn sub_term_spans(&self) -> Vec<(usize, usize)> {
        let mut cursor = 0;
        self.sub_terms
            .iter()
            .map(|s| {
                let span = (cursor, cursor + s.term.len());
                cursor = span.1;
                span
            })
            .collect()
    }

    /// Every sub-term text below the top level
    pub(crate) fn collect_nested_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        for sub in &self.sub_terms {
            out.push(&sub.term);
            sub.collect_nested_texts(out);
        }
    }
}

/// Union of two group lists, keeping first-seen order
pub fn union_groups(base: &[String], extra: &[String]) -> Vec<String> {
    let mut out = base.to_vec();
    for group in extra {
        if !out.contains(group) {
            out.push(group.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_term_serialization() {
        let mut term = NestedTerm::leaf("Charles", vec!["group1".into()]);
        assert_eq!(serde_json::to_value(&term).unwrap(), json!({ "term": "Charles", "groups": ["group1"] }));

        term.source_term = SourceTerm::Ambiguous;
        assert_eq!(serde_json::to_value(&term).unwrap()["sourceTerm"], json!(null));

        term.source_term = SourceTerm::Term("Prince Charles".into());
        let value = serde_json::to_value(&term).unwrap();
        assert_eq!(value["sourceTerm"], json!("Prince Charles"));

        let back: NestedTerm = serde_json::from_value(value).unwrap();
        assert_eq!(back, term);
    }

    #[test]
    fn test_displayed_terms_filter() {
        let input: BTreeMap<String, Vec<TermEntry>> = serde_json::from_value(json!({
            "persName": [
                { "term": "Marie Curie", "displayed": true, "frequency": 3 },
                { "term": "Pierre", "displayed": false }
            ],
            "teeft": ["unitex"]
        }))
        .unwrap();

        let terms = displayed_terms(&input);
        assert_eq!(terms["persName"], vec!["Marie Curie".to_string()]);
        assert_eq!(terms["teeft"], vec!["unitex".to_string()]);
    }

    #[test]
    fn test_union_groups_keeps_order() {
        let merged = union_groups(&["b".into(), "a".into()], &["a".into(), "c".into()]);
        assert_eq!(merged, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_anchor() {
        let mut term = NestedTerm::leaf("Marie Curie", vec![]);
        assert_eq!(term.anchor().as_deref(), Some("marie-curie"));
        term.source_term = SourceTerm::Ambiguous;
        assert_eq!(term.anchor(), None);
    }
}
