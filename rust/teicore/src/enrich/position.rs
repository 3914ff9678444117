//! Text Position Extractor
//!
//! Flattens an inline run into one concatenated string while remembering,
//! for every `#text` leaf, which byte range of the concatenation it holds and
//! the chain of child indices leading to it. Stop tags and other text-less
//! nodes are recorded at the offset where they sit so they can be put back
//! in place.

use crate::document::DocumentNode;

/// A `#text` leaf mapped into the concatenated text
#[derive(Debug, Clone)]
pub struct TextPosition<'a> {
    /// Index in `TextPositions::flat_nodes`
    pub node_index: usize,
    pub node: &'a DocumentNode,
    pub start_in_concat: usize,
    pub end_in_concat: usize,
    /// Range of the leaf's own text covered by this position
    pub text_start: usize,
    pub text_end: usize,
    /// Child indices from the run to the leaf
    pub path: Vec<usize>,
}

impl TextPosition<'_> {
    pub fn intersects(&self, start: usize, end: usize) -> bool {
        self.start_in_concat < end && start < self.end_in_concat
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InertKind {
    /// Excluded by the stop-tag predicate
    StopTag,
    /// Carries no text (`<lb/>`, empty element)
    Empty,
}

/// A node that takes no part in matching and is reinserted verbatim
#[derive(Debug, Clone)]
pub struct StopTagPosition<'a> {
    pub node: &'a DocumentNode,
    pub position_in_concat: usize,
    /// Index of the enclosing top-level sibling
    pub child_index: usize,
    pub path: Vec<usize>,
    pub kind: InertKind,
}

/// Document-order entry of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafRef {
    Text(usize),
    Inert(usize),
}

#[derive(Debug, Clone, Default)]
pub struct TextPositions<'a> {
    pub text: String,
    pub positions: Vec<TextPosition<'a>>,
    pub stop_tags: Vec<StopTagPosition<'a>>,
    pub flat_nodes: Vec<&'a DocumentNode>,
    /// Text leaves and inert nodes in document order
    pub order: Vec<LeafRef>,
}

impl<'a> TextPositions<'a> {
    pub fn positions_in(&self, start: usize, end: usize) -> impl Iterator<Item = &TextPosition<'a>> {
        self.positions.iter().filter(move |p| p.intersects(start, end))
    }

    /// True if the span lies in a single top-level `#text` sibling with no
    /// inert node inside, so the matched text can stand for the tree.
    pub fn is_flat_span(&self, start: usize, end: usize) -> bool {
        let mut touched = self.positions_in(start, end);
        let single_top_level = match (touched.next(), touched.next()) {
            (Some(position), None) => position.path.len() == 1,
            _ => false,
        };
        single_top_level
            && !self
                .stop_tags
                .iter()
                .any(|s| start < s.position_in_concat && s.position_in_concat < end)
    }
}

/// Walk `nodes` depth-first and map every text leaf into the concatenation.
pub fn extract_text_positions<'a>(
    nodes: &'a [DocumentNode],
    is_stop_tag: &dyn Fn(&DocumentNode) -> bool,
) -> TextPositions<'a> {
    let mut out = TextPositions::default();
    let mut path = Vec::new();
    walk(nodes, &mut path, is_stop_tag, &mut out);
    out
}

fn walk<'a>(
    nodes: &'a [DocumentNode],
    path: &mut Vec<usize>,
    is_stop_tag: &dyn Fn(&DocumentNode) -> bool,
    out: &mut TextPositions<'a>,
) {
    for (index, node) in nodes.iter().enumerate() {
        path.push(index);
        let node_index = out.flat_nodes.len();
        out.flat_nodes.push(node);

        if is_stop_tag(node) {
            push_inert(node, path, InertKind::StopTag, out);
        } else if let Some(text) = node.text_value() {
            // Empty leaves vanish when the run is rebuilt
            if !text.is_empty() {
                let start = out.text.len();
                out.text.push_str(text);
                out.order.push(LeafRef::Text(out.positions.len()));
                out.positions.push(TextPosition {
                    node_index,
                    node,
                    start_in_concat: start,
                    end_in_concat: out.text.len(),
                    text_start: 0,
                    text_end: text.len(),
                    path: path.clone(),
                });
            }
        } else if !node.children().is_empty() {
            walk(node.children(), path, is_stop_tag, out);
        } else {
            push_inert(node, path, InertKind::Empty, out);
        }

        path.pop();
    }
}

fn push_inert<'a>(node: &'a DocumentNode, path: &[usize], kind: InertKind, out: &mut TextPositions<'a>) {
    out.order.push(LeafRef::Inert(out.stop_tags.len()));
    out.stop_tags.push(StopTagPosition {
        node,
        position_in_concat: out.text.len(),
        child_index: path[0],
        path: path.to_vec(),
        kind,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentNode as N;

    fn formula(node: &DocumentNode) -> bool {
        node.tag == "formula"
    }

    #[test]
    fn test_concatenation_and_paths() {
        let run = vec![
            N::text("Prince "),
            N::element("hi", vec![N::text("Charles")]),
            N::text(" The Bold"),
        ];
        let positions = extract_text_positions(&run, &formula);

        assert_eq!(positions.text, "Prince Charles The Bold");
        assert_eq!(positions.positions.len(), 3);
        assert_eq!(positions.positions[1].path, vec![1, 0]);
        assert_eq!(positions.positions[1].start_in_concat, 7);
        assert_eq!(positions.positions[1].end_in_concat, 14);
        assert_eq!(positions.flat_nodes.len(), 4);
    }

    #[test]
    fn test_stop_tags_contribute_no_text() {
        let run = vec![
            N::text("x = "),
            N::element("formula", vec![N::text("a+b")]),
            N::element("hi", vec![N::empty("lb"), N::text("done")]),
        ];
        let positions = extract_text_positions(&run, &formula);

        assert_eq!(positions.text, "x = done");
        assert_eq!(positions.stop_tags.len(), 2);

        let stop = &positions.stop_tags[0];
        assert_eq!(stop.kind, InertKind::StopTag);
        assert_eq!(stop.position_in_concat, 4);
        assert_eq!(stop.child_index, 1);

        let lb = &positions.stop_tags[1];
        assert_eq!(lb.kind, InertKind::Empty);
        assert_eq!(lb.path, vec![2, 0]);
        assert_eq!(lb.child_index, 2);

        assert_eq!(
            positions.order,
            vec![LeafRef::Text(0), LeafRef::Inert(0), LeafRef::Inert(1), LeafRef::Text(1)]
        );
    }

    #[test]
    fn test_flat_span() {
        let run = vec![
            N::text("Prince "),
            N::element("hi", vec![N::text("Charles")]),
            N::empty("lb"),
            N::text("of Wales"),
        ];
        let positions = extract_text_positions(&run, &formula);

        assert!(positions.is_flat_span(0, 6));
        assert!(!positions.is_flat_span(0, 14));
        assert!(!positions.is_flat_span(7, 14));
        assert!(positions.is_flat_span(14, 16));
    }
}
