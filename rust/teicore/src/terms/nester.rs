//! Term Nester
//!
//! Folds terms from shortest to longest. Each term is segmented around the
//! already-folded terms it contains at word boundaries, which yields a forest
//! of `NestedTerm` trees. The forest comes back longest-first, the order the
//! regex builder needs.

use crate::enrich::EnrichWarning;

use super::boundary::contains_word_bounded;
use super::segment::{finish, split_segments};
use super::types::{GroupedTerm, NestedTerm, SourceTerm};

/// Build the nested term forest. Contained terms that segmentation drops
/// are reported in `warnings`.
pub fn nest_terms(terms: &[GroupedTerm], warnings: &mut Vec<EnrichWarning>) -> Vec<NestedTerm> {
    let mut sorted: Vec<&GroupedTerm> = terms.iter().collect();
    sorted.sort_by_key(|t| t.term.chars().count());

    let mut folded: Vec<NestedTerm> = Vec::with_capacity(sorted.len());
    for term in sorted {
        let contained: Vec<&NestedTerm> = folded
            .iter()
            .filter(|f| contains_word_bounded(&term.term, &f.term))
            .collect();

        let sub_terms = if contained.is_empty() {
            Vec::new()
        } else if term.artificial {
            finish(split_segments(&term.term, &contained, &[], None, warnings))
        } else {
            finish(split_segments(
                &term.term,
                &contained,
                &term.groups,
                Some(term.term.as_str()),
                warnings,
            ))
        };

        folded.push(NestedTerm {
            term: term.term.clone(),
            groups: term.groups.clone(),
            sub_terms,
            artificial: term.artificial,
            source_term: SourceTerm::Own,
        });
    }

    for term in folded.iter_mut() {
        dedupe_sub_terms(term);
    }
    folded.sort_by(|a, b| b.char_len().cmp(&a.char_len()));
    folded
}

/// Drop a sibling sub-term whose text already appears nested inside another
/// sibling. Fillers are kept.
///
/// The partition of the parent text takes precedence: a removal is applied
/// only if the kept siblings still join to the parent. Segments are never
/// empty, so segmenter output passes through unchanged.
pub fn dedupe_sub_terms(term: &mut NestedTerm) {
    for sub in term.sub_terms.iter_mut() {
        dedupe_sub_terms(sub);
    }
    if term.sub_terms.len() < 2 {
        return;
    }

    let nested: Vec<Vec<&str>> = term
        .sub_terms
        .iter()
        .map(|sub| {
            let mut texts = Vec::new();
            sub.collect_nested_texts(&mut texts);
            texts
        })
        .collect();

    let keep: Vec<bool> = term
        .sub_terms
        .iter()
        .enumerate()
        .map(|(i, sub)| {
            sub.artificial
                || !nested
                    .iter()
                    .enumerate()
                    .any(|(j, texts)| j != i && texts.contains(&sub.term.as_str()))
        })
        .collect();
    if keep.iter().all(|&k| k) {
        return;
    }

    let kept: Vec<NestedTerm> = term
        .sub_terms
        .iter()
        .zip(&keep)
        .filter(|(_, keep)| **keep)
        .map(|(sub, _)| sub.clone())
        .collect();
    let joined: String = kept.iter().map(|s| s.term.as_str()).collect();
    if joined == term.term {
        term.sub_terms = kept;
    }
}
