//! DocumentNode: the parsed TEI tree
//!
//! Mirrors the JSON shape produced by the XML-to-object parser:
//! `{ tag, attributes?, value? }` where `value` is a text string (only for
//! `#text` leaves), a single child, or an ordered list of children.
//!
//! The tree is treated as immutable: every enrichment stage builds new nodes
//! and never mutates its input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Tag names
// =============================================================================

/// Tag of text leaves
pub const TEXT_TAG: &str = "#text";
/// Tag of a single term occurrence
pub const HIGHLIGHT_TAG: &str = "highlight";
/// Tag wrapping an inline run that produced at least one highlight
pub const HIGHLIGHTED_TEXT_TAG: &str = "highlightedText";

// =============================================================================
// Types
// =============================================================================

/// Attribute value. Parser attributes are plain strings; highlight
/// attributes also carry group lists, a nullable term and a flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    Null,
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

pub type Attributes = BTreeMap<String, AttributeValue>;

/// Content of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    Text(String),
    Nodes(Vec<DocumentNode>),
    Node(Box<DocumentNode>),
}

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<NodeValue>,
}

// =============================================================================
// Construction
// =============================================================================

impl DocumentNode {
    /// A `#text` leaf
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.to_string(),
            attributes: None,
            value: Some(NodeValue::Text(text.into())),
        }
    }

    /// An element with an ordered list of children
    pub fn element(tag: impl Into<String>, children: Vec<DocumentNode>) -> Self {
        Self {
            tag: tag.into(),
            attributes: None,
            value: Some(NodeValue::Nodes(children)),
        }
    }

    /// An element without any value (`<lb/>`)
    pub fn empty(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: None,
            value: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(name.into(), value.into());
        self
    }

    /// A `highlight` annotation.
    ///
    /// `term` is the anchor slug, `None` when provenance is ambiguous.
    pub fn highlight(
        groups: Vec<String>,
        term: Option<String>,
        no_anchor: bool,
        value: Vec<DocumentNode>,
    ) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert("groups".to_string(), AttributeValue::List(groups));
        attributes.insert(
            "term".to_string(),
            term.map(AttributeValue::Text).unwrap_or(AttributeValue::Null),
        );
        if no_anchor {
            attributes.insert("noAnchor".to_string(), AttributeValue::Flag(true));
        }
        Self {
            tag: HIGHLIGHT_TAG.to_string(),
            attributes: Some(attributes),
            value: Some(NodeValue::Nodes(value)),
        }
    }

    /// The `highlightedText` container around an enriched inline run
    pub fn highlighted_text(children: Vec<DocumentNode>) -> Self {
        Self::element(HIGHLIGHTED_TEXT_TAG, children)
    }

    /// Copy of this node (tag and attributes) holding `children` instead.
    ///
    /// A node whose value was a single child keeps that shape when exactly
    /// one child is given back.
    pub fn with_children(&self, mut children: Vec<DocumentNode>) -> Self {
        let value = match (&self.value, children.len()) {
            (Some(NodeValue::Node(_)), 1) => children.pop().map(|c| NodeValue::Node(Box::new(c))),
            _ => Some(NodeValue::Nodes(children)),
        };
        Self {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            value,
        }
    }

    /// Copy of this text leaf holding `text` instead.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            tag: self.tag.clone(),
            attributes: self.attributes.clone(),
            value: Some(NodeValue::Text(text.into())),
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

impl DocumentNode {
    pub fn is_text(&self) -> bool {
        self.tag == TEXT_TAG
    }

    pub fn is_highlight(&self) -> bool {
        self.tag == HIGHLIGHT_TAG
    }

    /// String value of a `#text` leaf
    pub fn text_value(&self) -> Option<&str> {
        match (&self.value, self.is_text()) {
            (Some(NodeValue::Text(s)), true) => Some(s),
            _ => None,
        }
    }

    /// Children of the node; a single-child value is seen as a one-element list.
    pub fn children(&self) -> &[DocumentNode] {
        match &self.value {
            Some(NodeValue::Nodes(nodes)) => nodes,
            Some(NodeValue::Node(node)) => std::slice::from_ref(node.as_ref()),
            _ => &[],
        }
    }

    /// True if the node holds child nodes (possibly an empty list)
    pub fn has_child_value(&self) -> bool {
        matches!(self.value, Some(NodeValue::Nodes(_)) | Some(NodeValue::Node(_)))
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.as_ref().and_then(|a| a.get(name))
    }

    /// Groups of a highlight node
    pub fn highlight_groups(&self) -> Vec<String> {
        match self.attribute("groups") {
            Some(AttributeValue::List(groups)) => groups.clone(),
            Some(AttributeValue::Text(group)) => vec![group.clone()],
            _ => Vec::new(),
        }
    }

    /// Term slug of a highlight node (`None` for ambiguous provenance)
    pub fn highlight_term(&self) -> Option<&str> {
        self.attribute("term").and_then(AttributeValue::as_str)
    }

    /// True if any `#text` leaf below (or at) this node is non-empty
    pub fn has_text_content(&self) -> bool {
        match self.text_value() {
            Some(text) => !text.is_empty(),
            None => self.children().iter().any(DocumentNode::has_text_content),
        }
    }

    /// Concatenation of every `#text` leaf in document order
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = self.text_value() {
            out.push_str(text);
            return;
        }
        for child in self.children() {
            child.collect_text(out);
        }
    }

    /// Number of highlight nodes in the subtree
    pub fn count_highlights(&self) -> usize {
        let own = usize::from(self.is_highlight());
        own + self.children().iter().map(DocumentNode::count_highlights).sum::<usize>()
    }
}

/// Merge adjacent attribute-less `#text` nodes and drop empty ones.
pub fn merge_adjacent_text(nodes: Vec<DocumentNode>) -> Vec<DocumentNode> {
    let mut out: Vec<DocumentNode> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let Some(text) = node.text_value() else {
            out.push(node);
            continue;
        };
        if text.is_empty() {
            continue;
        }
        if let Some(last) = out.last_mut() {
            if last.is_text() && last.attributes.is_none() && node.attributes.is_none() {
                if let Some(NodeValue::Text(prev)) = last.value.as_mut() {
                    prev.push_str(text);
                    continue;
                }
            }
        }
        out.push(node);
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
