//! Segment splitter and boundary segmenter
//!
//! Partitions a container term's text into an ordered list of segments:
//! filler text between contained terms, contained terms processed as
//! standalone sub-trees, and, where contained terms overlap each other, one
//! segment per pair of consecutive boundaries. Group provenance flows down:
//! every segment carries the union of its ancestors' groups and of the
//! declared terms covering it.

use crate::enrich::EnrichWarning;

use super::boundary::{contains_word_bounded, find_all_word_bounded};
use super::types::{union_groups, NestedTerm, SourceTerm};

/// A contained term anchored inside the container text
#[derive(Debug, Clone, Copy)]
struct Located<'t> {
    term: &'t NestedTerm,
    start: usize,
    end: usize,
}

impl Located<'_> {
    fn covers(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }

    fn strictly_encloses(&self, other: &Located<'_>) -> bool {
        self.covers(other.start, other.end) && (self.start, self.end) != (other.start, other.end)
    }

    /// Absolute spans of the term's top-level sub-terms
    fn sub_term_spans(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.term
            .sub_term_spans()
            .into_iter()
            .map(move |(s, e)| (self.start + s, self.start + e))
    }
}

/// Every word-bounded occurrence of the terms, ordered by start then
/// longest first. Terms that cannot be found are dropped.
fn locate<'t>(container: &str, terms: &[&'t NestedTerm], include_artificial: bool) -> Vec<Located<'t>> {
    let mut located: Vec<Located<'t>> = terms
        .iter()
        .filter(|t| include_artificial || !t.artificial)
        .flat_map(|&term| {
            find_all_word_bounded(container, &term.term)
                .into_iter()
                .map(move |range| Located {
                    term,
                    start: range.start,
                    end: range.end,
                })
        })
        .collect();
    located.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
    located
}

/// Group spans (sorted by start) into chains of transitively intersecting spans
fn overlap_groups<'a, 't>(spans: &[&'a Located<'t>]) -> Vec<Vec<&'a Located<'t>>> {
    let mut groups: Vec<Vec<&'a Located<'t>>> = Vec::new();
    let mut group_end = 0;

    for &span in spans {
        match groups.last_mut() {
            Some(group) if span.start < group_end => {
                group.push(span);
                group_end = group_end.max(span.end);
            }
            _ => {
                groups.push(vec![span]);
                group_end = span.end;
            }
        }
    }
    groups
}

fn filler(text: &str, parent_groups: &[String], parent_source: Option<&str>) -> NestedTerm {
    NestedTerm {
        term: text.to_string(),
        groups: parent_groups.to_vec(),
        sub_terms: Vec::new(),
        artificial: true,
        source_term: SourceTerm::from_parent(parent_source),
    }
}

/// Copy sub-terms, adding `groups` to every level
pub(crate) fn propagate_groups(sub_terms: &[NestedTerm], groups: &[String]) -> Vec<NestedTerm> {
    sub_terms
        .iter()
        .map(|sub| {
            let combined = union_groups(groups, &sub.groups);
            NestedTerm {
                term: sub.term.clone(),
                sub_terms: propagate_groups(&sub.sub_terms, &combined),
                groups: combined,
                artificial: sub.artificial,
                source_term: sub.source_term.clone(),
            }
        })
        .collect()
}

/// A lone direct child becomes its own sub-tree
fn standalone(
    located: &Located<'_>,
    contained: &[&NestedTerm],
    parent_groups: &[String],
    warnings: &mut Vec<EnrichWarning>,
) -> NestedTerm {
    let term = located.term;
    let groups = union_groups(parent_groups, &term.groups);

    let sub_terms = if !term.sub_terms.is_empty() {
        propagate_groups(&term.sub_terms, &groups)
    } else {
        let inner: Vec<&NestedTerm> = contained
            .iter()
            .copied()
            .filter(|c| contains_word_bounded(&term.term, &c.term))
            .collect();
        if inner.is_empty() {
            Vec::new()
        } else {
            finish(split_segments(&term.term, &inner, &groups, Some(term.term.as_str()), warnings))
        }
    };

    NestedTerm {
        term: term.term.clone(),
        groups,
        sub_terms,
        artificial: false,
        source_term: SourceTerm::Term(term.term.clone()),
    }
}

/// Source of a segment: the text shared by every declared covering term
fn shared_source<'a, 't: 'a>(mut covering: impl Iterator<Item = &'a Located<'t>>) -> SourceTerm {
    let Some(first) = covering.next() else {
        return SourceTerm::Ambiguous;
    };
    if covering.all(|l| l.term.term == first.term.term) {
        SourceTerm::Term(first.term.term.clone())
    } else {
        SourceTerm::Ambiguous
    }
}

/// One segment per pair of consecutive boundaries of an overlapping group
fn boundary_segments(
    group: &[&Located<'_>],
    all_located: &[Located<'_>],
    container: &str,
    parent_groups: &[String],
) -> Vec<NestedTerm> {
    let mut cuts: Vec<usize> = Vec::new();
    for located in group {
        cuts.push(located.start);
        cuts.push(located.end);
        for (start, end) in located.sub_term_spans() {
            cuts.push(start);
            cuts.push(end);
        }
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut segments = Vec::with_capacity(cuts.len());
    for window in cuts.windows(2) {
        let (a, b) = (window[0], window[1]);
        let text = &container[a..b];

        let covering: Vec<&Located<'_>> = all_located.iter().filter(|l| l.covers(a, b)).collect();
        let declared_groups = covering
            .iter()
            .filter(|l| !l.term.artificial)
            .fold(Vec::new(), |acc, l| union_groups(&acc, &l.term.groups));
        let source_term = shared_source(group.iter().copied().filter(|l| l.covers(a, b)));

        // A covering term may already hold this exact segment as a sub-term
        let base = covering.iter().find_map(|l| {
            l.sub_term_spans()
                .position(|span| span == (a, b))
                .map(|idx| &l.term.sub_terms[idx])
        });

        let segment = match base {
            Some(sub) => {
                let groups = if sub.artificial {
                    declared_groups
                } else {
                    union_groups(&union_groups(parent_groups, &declared_groups), &sub.groups)
                };
                NestedTerm {
                    term: text.to_string(),
                    sub_terms: propagate_groups(&sub.sub_terms, &groups),
                    groups,
                    artificial: sub.artificial,
                    source_term,
                }
            }
            None => NestedTerm {
                term: text.to_string(),
                groups: union_groups(parent_groups, &declared_groups),
                sub_terms: Vec::new(),
                artificial: false,
                source_term,
            },
        };
        segments.push(segment);
    }
    segments
}

/// Partition `container` into segments around the contained terms.
///
/// `parent_groups` is empty and `parent_source` absent when the container is
/// an artificial term. A declared term missing from `container` is left out
/// of the segments and reported in `warnings`.
pub fn split_segments(
    container: &str,
    contained: &[&NestedTerm],
    parent_groups: &[String],
    parent_source: Option<&str>,
    warnings: &mut Vec<EnrichWarning>,
) -> Vec<NestedTerm> {
    let located = locate(container, contained, false);
    for missing in contained
        .iter()
        .filter(|t| !t.artificial && !located.iter().any(|l| std::ptr::eq(l.term, **t)))
    {
        warnings.push(EnrichWarning::new(
            "terms",
            format!("sub-term `{}` not found in `{}`", missing.term, container),
        ));
    }
    let direct: Vec<&Located<'_>> = located
        .iter()
        .filter(|l| !located.iter().any(|other| other.strictly_encloses(l)))
        .collect();
    let all_located = locate(container, contained, true);

    let mut segments = Vec::new();
    let mut cursor = 0;

    for group in overlap_groups(&direct) {
        let start = group[0].start;
        let end = group.iter().map(|l| l.end).max().unwrap_or(start);
        if start > cursor {
            segments.push(filler(&container[cursor..start], parent_groups, parent_source));
        }
        if let [single] = group.as_slice() {
            segments.push(standalone(single, contained, parent_groups, warnings));
        } else {
            segments.extend(boundary_segments(&group, &all_located, container, parent_groups));
        }
        cursor = end;
    }

    if cursor < container.len() {
        segments.push(filler(&container[cursor..], parent_groups, parent_source));
    }
    segments
}

/// A lone segment spanning the whole container carries no structure
pub(crate) fn finish(segments: Vec<NestedTerm>) -> Vec<NestedTerm> {
    if segments.len() <= 1 {
        Vec::new()
    } else {
        segments
    }
}
