//! Match Finder & Resolver
//!
//! Every matcher runs over the concatenated text of a run. Candidates are
//! ordered by start, longest first on ties, and accepted greedily: a
//! candidate survives only if it starts at or after the end of the last
//! accepted one.

use std::ops::Range;

use super::matcher::TermMatcher;

#[derive(Debug, Clone)]
pub struct MatchCandidate<'m> {
    pub index: usize,
    pub length: usize,
    pub matcher: &'m TermMatcher,
    /// Absolute spans of the term's top-level sub-terms
    pub segments: Vec<Range<usize>>,
}

impl MatchCandidate<'_> {
    pub fn end(&self) -> usize {
        self.index + self.length
    }

    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        &text[self.index..self.end()]
    }
}

/// All candidates of all matchers, in resolution order
pub fn find_candidates<'m>(text: &str, matchers: &'m [TermMatcher]) -> Vec<MatchCandidate<'m>> {
    let mut candidates: Vec<MatchCandidate<'m>> = matchers
        .iter()
        .flat_map(|matcher| {
            matcher.find_matches(text).into_iter().map(move |m| MatchCandidate {
                index: m.start,
                length: m.end - m.start,
                matcher,
                segments: m.segments,
            })
        })
        .collect();
    // Stable: equal candidates keep matcher order (longest term first)
    candidates.sort_by(|a, b| a.index.cmp(&b.index).then(b.length.cmp(&a.length)));
    candidates
}

/// Greedy left-to-right selection of non-overlapping candidates
pub fn resolve_matches(candidates: Vec<MatchCandidate<'_>>) -> Vec<MatchCandidate<'_>> {
    let mut accepted: Vec<MatchCandidate<'_>> = Vec::new();
    let mut last_end = 0;
    for candidate in candidates {
        if candidate.index >= last_end {
            last_end = candidate.end();
            accepted.push(candidate);
        }
    }
    accepted
}
