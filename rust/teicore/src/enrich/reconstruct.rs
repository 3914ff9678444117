//! Tree Reconstructor
//!
//! Rebuilds an inline run around its accepted matches. Any byte span of the
//! concatenated text maps back to a list of pieces (text slices and inert
//! nodes, each with its path). Pieces that share a path prefix are grouped
//! under one clone of that ancestor, so inline markup survives being cut.
//!
//! Inert nodes (stop tags, empty elements) at offset `p` belong to:
//! - the gap `[a, b]` if `a <= p <= b`
//! - a match `[s, e)` if `s < p < e`

use std::ops::Range;

use super::counts::{CountValue, TermCountByGroup};
use super::matcher::{root_highlight, MatchValue};
use super::position::{LeafRef, TextPositions};
use super::resolver::MatchCandidate;
use crate::document::{merge_adjacent_text, DocumentNode};

struct Piece<'p> {
    path: &'p [usize],
    node: DocumentNode,
}

/// Slices of the run covering `[start, end)` plus the inert nodes accepted
/// by `keep_inert`, in document order.
fn pieces<'p>(
    positions: &'p TextPositions<'_>,
    start: usize,
    end: usize,
    keep_inert: impl Fn(usize) -> bool,
) -> Vec<Piece<'p>> {
    let mut out = Vec::new();
    for leaf in &positions.order {
        match *leaf {
            LeafRef::Text(i) => {
                let position = &positions.positions[i];
                let from = start.max(position.start_in_concat);
                let to = end.min(position.end_in_concat);
                if from >= to {
                    continue;
                }
                let node = if from == position.start_in_concat && to == position.end_in_concat {
                    position.node.clone()
                } else {
                    position.node.with_text(&positions.text[from..to])
                };
                out.push(Piece {
                    path: &position.path,
                    node,
                });
            }
            LeafRef::Inert(i) => {
                let inert = &positions.stop_tags[i];
                if keep_inert(inert.position_in_concat) {
                    out.push(Piece {
                        path: &inert.path,
                        node: inert.node.clone(),
                    });
                }
            }
        }
    }
    out
}

/// Regroup pieces under clones of their ancestors
fn assemble(pieces: Vec<Piece<'_>>, depth: usize, siblings: &[DocumentNode]) -> Vec<DocumentNode> {
    let mut out = Vec::with_capacity(pieces.len());
    let mut iter = pieces.into_iter().peekable();

    while let Some(piece) = iter.next() {
        let index = piece.path[depth];
        if piece.path.len() == depth + 1 {
            out.push(piece.node);
            continue;
        }

        let mut group = vec![piece];
        while let Some(next) = iter.next_if(|p| p.path.len() > depth + 1 && p.path[depth] == index) {
            group.push(next);
        }
        match siblings.get(index) {
            Some(ancestor) => {
                let children = assemble(group, depth + 1, ancestor.children());
                out.push(ancestor.with_children(children));
            }
            None => out.extend(group.into_iter().map(|p| p.node)),
        }
    }

    merge_adjacent_text(out)
}

/// Real nodes of a span
fn rebuild(
    run: &[DocumentNode],
    positions: &TextPositions<'_>,
    span: Range<usize>,
    keep_inert: impl Fn(usize) -> bool,
) -> Vec<DocumentNode> {
    assemble(pieces(positions, span.start, span.end, keep_inert), 0, run)
}

struct MatchContext<'r, 'p> {
    run: &'r [DocumentNode],
    positions: &'r TextPositions<'p>,
    match_start: usize,
}

impl MatchContext<'_, '_> {
    fn rebuild_fragment(&self, span: Range<usize>) -> Vec<DocumentNode> {
        let (from, to, skip) = (span.start, span.end, self.match_start);
        rebuild(self.run, self.positions, span, move |p| from <= p && p < to && p != skip)
    }

    /// Replace the text of each fragment with the real nodes under its span
    fn remap(&self, fragments: &[DocumentNode], spans: &[Range<usize>]) -> Vec<DocumentNode> {
        let mut out = Vec::with_capacity(fragments.len());
        for (fragment, span) in fragments.iter().zip(spans) {
            if fragment.is_highlight() {
                let value = self.remap_inner(fragment.children(), span.clone());
                out.push(fragment.with_children(value));
            } else {
                out.extend(self.rebuild_fragment(span.clone()));
            }
        }
        merge_adjacent_text(out)
    }

    fn remap_inner(&self, children: &[DocumentNode], span: Range<usize>) -> Vec<DocumentNode> {
        let nested = children.iter().any(DocumentNode::is_highlight);
        match split_span(&self.positions.text, children, span.clone()) {
            Some(spans) if nested => self.remap(children, &spans),
            _ => self.rebuild_fragment(span),
        }
    }
}

/// Cut `span` by the text lengths of `fragments`. `None` when the lengths
/// do not add up or a cut falls inside a character.
fn split_span(text: &str, fragments: &[DocumentNode], span: Range<usize>) -> Option<Vec<Range<usize>>> {
    let mut spans = Vec::with_capacity(fragments.len());
    let mut cursor = span.start;
    for fragment in fragments {
        let end = cursor + fragment.text_content().len();
        if end > span.end || !text.is_char_boundary(end) {
            return None;
        }
        spans.push(cursor..end);
        cursor = end;
    }
    (cursor == span.end).then_some(spans)
}

fn highlight_value(run: &[DocumentNode], positions: &TextPositions<'_>, candidate: &MatchCandidate<'_>) -> Vec<DocumentNode> {
    let (start, end) = (candidate.index, candidate.end());
    let matched = candidate.text(&positions.text);
    let flat = positions.is_flat_span(start, end);

    match candidate.matcher.value() {
        MatchValue::Fragments(fragments) if flat && matched == candidate.matcher.term().term => fragments.clone(),
        MatchValue::Fragments(fragments) => {
            let context = MatchContext {
                run,
                positions,
                match_start: start,
            };
            if candidate.segments.len() == fragments.len() {
                context.remap(fragments, &candidate.segments)
            } else {
                context.rebuild_fragment(start..end)
            }
        }
        MatchValue::Text(_) if flat => vec![DocumentNode::text(matched)],
        MatchValue::Text(_) => rebuild(run, positions, start..end, |p| start < p && p < end),
    }
}

/// Rebuild `run` with every accepted match wrapped in a highlight, and
/// record each match in `counts`.
pub fn reconstruct_run(
    run: &[DocumentNode],
    positions: &TextPositions<'_>,
    matches: &[MatchCandidate<'_>],
    counts: &mut TermCountByGroup,
) -> Vec<DocumentNode> {
    let mut out = Vec::with_capacity(matches.len() * 2 + 1);
    let mut last_end = 0;

    for candidate in matches {
        let (gap_start, gap_end) = (last_end, candidate.index);
        out.extend(rebuild(run, positions, gap_start..gap_end, |p| gap_start <= p && p <= gap_end));

        let value = highlight_value(run, positions, candidate);
        let matcher = candidate.matcher;
        match matcher.value() {
            MatchValue::Fragments(_) => counts.increment(
                &matcher.group_key(),
                CountValue::Composite {
                    term: &matcher.term().term,
                    groups: matcher.groups(),
                    nodes: &value,
                },
            ),
            MatchValue::Text(term) => counts.increment(&matcher.group_key(), CountValue::Term(term)),
        }
        out.push(root_highlight(matcher, value));
        last_end = candidate.end();
    }

    let tail_start = last_end;
    out.extend(rebuild(run, positions, tail_start..positions.text.len(), |p| p >= tail_start));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentNode as N;
    use crate::enrich::matcher::TermMatcher;
    use crate::enrich::position::extract_text_positions;
    use crate::enrich::resolver::{find_candidates, resolve_matches};
    use crate::terms::{NestedTerm, TermsByGroup};

    fn formula(node: &DocumentNode) -> bool {
        node.tag == "formula"
    }

    fn run_with(run: &[DocumentNode], matchers: &[TermMatcher]) -> Vec<DocumentNode> {
        let positions = extract_text_positions(run, &formula);
        let accepted = resolve_matches(find_candidates(&positions.text, matchers));
        reconstruct_run(run, &positions, &accepted, &mut TermCountByGroup::default())
    }

    fn plain(term: &str, group: &str) -> TermMatcher {
        TermMatcher::new(&NestedTerm::leaf(term, vec![group.into()]), vec![group.into()], false).unwrap()
    }

    fn hl(group: &str, term: &str, value: Vec<DocumentNode>) -> DocumentNode {
        N::highlight(vec![group.into()], Some(term.into()), false, value)
    }

    #[test]
    fn test_simple_match_in_text() {
        let run = vec![N::text("au Laboratoire X")];
        let out = run_with(&run, &[plain("Laboratoire", "orgName")]);

        assert_eq!(
            out,
            vec![
                N::text("au "),
                hl("orgName", "laboratoire", vec![N::text("Laboratoire")]),
                N::text(" X"),
            ]
        );
    }

    #[test]
    fn test_cross_tag_match_keeps_markup() {
        let run = vec![N::text("Prince "), N::element("hi", vec![N::text("Charles")]), N::text(".")];
        let out = run_with(&run, &[plain("Prince Charles", "group1")]);

        assert_eq!(
            out,
            vec![
                hl(
                    "group1",
                    "prince-charles",
                    vec![N::text("Prince "), N::element("hi", vec![N::text("Charles")])]
                ),
                N::text("."),
            ]
        );
    }

    #[test]
    fn test_partial_ancestor_is_split() {
        let run = vec![N::element("hi", vec![N::text("Prince Charles")])];
        let out = run_with(&run, &[plain("Charles", "group1")]);

        assert_eq!(
            out,
            vec![
                N::element("hi", vec![N::text("Prince ")]),
                hl("group1", "charles", vec![N::element("hi", vec![N::text("Charles")])]),
            ]
        );
    }

    #[test]
    fn test_inert_nodes_stay_in_place() {
        let run = vec![
            N::text("see "),
            N::element("formula", vec![N::text("E=mc2")]),
            N::text(" and "),
            N::element("hi", vec![N::text("Marie"), N::empty("lb"), N::text(" Curie")]),
        ];
        let out = run_with(&run, &[plain("Marie Curie", "persName")]);

        assert_eq!(
            out,
            vec![
                N::text("see "),
                N::element("formula", vec![N::text("E=mc2")]),
                N::text(" and "),
                hl(
                    "persName",
                    "marie-curie",
                    vec![N::element("hi", vec![N::text("Marie"), N::empty("lb"), N::text(" Curie")])]
                ),
            ]
        );
    }

    #[test]
    fn test_stop_tag_at_match_start_stays_outside() {
        let run = vec![N::text("x "), N::empty("formula"), N::text("Curie")];
        let out = run_with(&run, &[plain("Curie", "persName")]);

        assert_eq!(
            out,
            vec![
                N::text("x "),
                N::empty("formula"),
                hl("persName", "curie", vec![N::text("Curie")]),
            ]
        );
    }

    #[test]
    fn test_composite_cross_tag_remap() {
        let mut terms = TermsByGroup::new();
        terms.insert("orgName".into(), vec!["Laboratoire Marie Curie".into()]);
        terms.insert("persName".into(), vec!["Marie Curie".into()]);
        let (forest, _) = crate::terms::build_term_forest(&terms, 8);
        let (matchers, _) = crate::enrich::matcher::build_matchers(&forest, &Default::default());

        let run = vec![
            N::text("Laboratoire "),
            N::element("hi", vec![N::text("Marie")]),
            N::text(" Curie"),
        ];
        let out = run_with(&run, &matchers);

        assert_eq!(out.len(), 1);
        let segments = out[0].children();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].children(), [N::text("Laboratoire ")]);
        assert_eq!(segments[1].highlight_term(), Some("marie-curie"));
        assert_eq!(
            segments[1].children(),
            [N::element("hi", vec![N::text("Marie")]), N::text(" Curie")]
        );
    }

    #[test]
    fn test_split_span() {
        let fragments = vec![N::text("ab"), N::text("cd")];
        assert_eq!(split_span("xabcd", &fragments, 1..5), Some(vec![1..3, 3..5]));
        assert_eq!(split_span("xabcde", &fragments, 1..6), None);
    }
}
