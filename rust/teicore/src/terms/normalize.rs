//! Term Normalizer and Term Merger
//!
//! The normalizer flattens the per-group lists into `(term, group)` pairs,
//! the merger folds identical texts back into one record per text.

use std::collections::HashMap;

use super::types::{GroupedTerm, NormalizedTerm, TermsByGroup};

/// Flatten every group's list into `(term, group)` pairs.
///
/// Blank terms are skipped: they would match everywhere.
pub fn normalize_terms(terms_by_group: &TermsByGroup) -> Vec<NormalizedTerm> {
    terms_by_group
        .iter()
        .flat_map(|(group, terms)| {
            terms
                .iter()
                .filter(|term| !term.trim().is_empty())
                .map(move |term| NormalizedTerm::new(term.clone(), group.clone()))
        })
        .collect()
}

/// Fold terms by exact text, accumulating groups in first-seen order.
///
/// A merged term is artificial only if every contributor was artificial.
pub fn merge_terms(terms: &[NormalizedTerm]) -> Vec<GroupedTerm> {
    let mut merged: Vec<GroupedTerm> = Vec::new();
    let mut index_by_text: HashMap<&str, usize> = HashMap::new();

    for term in terms {
        match index_by_text.get(term.term.as_str()) {
            Some(&idx) => {
                let existing = &mut merged[idx];
                if !existing.groups.contains(&term.group) {
                    existing.groups.push(term.group.clone());
                }
                existing.artificial &= term.artificial;
            }
            None => {
                index_by_text.insert(&term.term, merged.len());
                merged.push(GroupedTerm {
                    term: term.term.clone(),
                    groups: vec![term.group.clone()],
                    artificial: term.artificial,
                });
            }
        }
    }

    merged
}
