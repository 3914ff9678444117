//! Overlap Discoverer
//!
//! Finds pairs of terms from different groups whose word sequences partially
//! overlap ("Prince Charles" / "Charles The Bold") and synthesizes the union
//! span as an artificial term owned by the composite group `group1+group2`.
//!
//! Discovery is transitive: synthesized terms are paired again with the pool
//! until a round produces nothing new, so chains of three or more mutually
//! overlapping terms collapse into one union per adjacent pair.

use std::collections::{BTreeSet, HashSet};

use unicode_segmentation::UnicodeSegmentation;

use crate::enrich::EnrichWarning;

use super::boundary::{contains_word_bounded, is_boundary_after, is_boundary_before};
use super::types::NormalizedTerm;

/// Separator of composite group ids
pub const GROUP_SEPARATOR: char = '+';

/// Composite id of two (possibly composite) groups: components sorted,
/// deduplicated, joined by `+`.
pub fn composite_group(a: &str, b: &str) -> String {
    let parts: BTreeSet<&str> = a
        .split(GROUP_SEPARATOR)
        .chain(b.split(GROUP_SEPARATOR))
        .filter(|g| !g.is_empty())
        .collect();
    parts.into_iter().collect::<Vec<_>>().join("+")
}

/// Union of `head` and `tail` when a word-aligned suffix of `head` is a
/// proper prefix of `tail`. The longest overlap wins.
pub fn overlap_union(head: &str, tail: &str) -> Option<String> {
    for (start, _) in head.unicode_word_indices() {
        if start == 0 || !is_boundary_before(head, start) {
            continue;
        }
        let suffix = &head[start..];
        if suffix.len() < tail.len() && tail.starts_with(suffix) && is_boundary_after(tail, suffix.len()) {
            return Some(format!("{}{}", &head[..start], tail));
        }
    }
    None
}

/// Partial overlap between two terms, in either direction
fn pair_unions(a: &NormalizedTerm, b: &NormalizedTerm) -> Vec<String> {
    if a.group == b.group || a.term == b.term {
        return Vec::new();
    }
    if contains_word_bounded(&a.term, &b.term) || contains_word_bounded(&b.term, &a.term) {
        return Vec::new();
    }
    [overlap_union(&a.term, &b.term), overlap_union(&b.term, &a.term)]
        .into_iter()
        .flatten()
        .collect()
}

/// Synthesize the artificial union terms of `terms`.
///
/// Returns only the new terms. `max_rounds` bounds the transitive closure,
/// which could otherwise grow forever on cyclic sequences ("a b" / "b a").
/// Unions still pending after the last round are dropped with a warning.
pub fn discover_overlaps(
    terms: &[NormalizedTerm],
    max_rounds: usize,
    warnings: &mut Vec<EnrichWarning>,
) -> Vec<NormalizedTerm> {
    let mut pool: Vec<NormalizedTerm> = terms.to_vec();
    let mut seen: HashSet<(String, String)> = pool
        .iter()
        .map(|t| (t.term.clone(), t.group.clone()))
        .collect();
    let mut synthesized = Vec::new();
    // Pairs where both sides are older than `fresh_from` were already tested
    let mut fresh_from = 0;

    for round in 0..=max_rounds {
        let mut fresh = Vec::new();

        for j in fresh_from.max(1)..pool.len() {
            for i in 0..j {
                let (a, b) = (&pool[i], &pool[j]);
                for union in pair_unions(a, b) {
                    let group = composite_group(&a.group, &b.group);
                    if seen.insert((union.clone(), group.clone())) {
                        fresh.push(NormalizedTerm {
                            term: union,
                            group,
                            artificial: true,
                        });
                    }
                }
            }
        }

        if fresh.is_empty() {
            break;
        }
        if round == max_rounds {
            warnings.push(EnrichWarning::new(
                "terms",
                format!(
                    "overlap discovery stopped after {} rounds, {} unions dropped",
                    max_rounds,
                    fresh.len()
                ),
            ));
            break;
        }
        fresh_from = pool.len();
        synthesized.extend(fresh.iter().cloned());
        pool.extend(fresh);
    }

    synthesized
}
