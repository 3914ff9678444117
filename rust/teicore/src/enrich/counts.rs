//! Term Count Registry
//!
//! `group -> term slug -> occurrences`, seeded at zero with every declared
//! term so "no occurrence" and "unknown term" stay distinguishable. Only
//! seeded keys are ever incremented.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::document::DocumentNode;
use crate::terms::{slug, TermsByGroup, GROUP_SEPARATOR};

/// What a match contributes to the counts
#[derive(Debug, Clone, Copy)]
pub enum CountValue<'a> {
    /// A plain term: its slug counts in every group of the key
    Term(&'a str),
    /// A composite value: highlights count under their own groups, bare text
    /// under the groups of the key
    Nodes(&'a [DocumentNode]),
    /// A composite match of `term`: the term's own slug counts in its
    /// non-composite `groups`, then `nodes` count as with [`CountValue::Nodes`]
    Composite {
        term: &'a str,
        groups: &'a [String],
        nodes: &'a [DocumentNode],
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TermCountByGroup(BTreeMap<String, BTreeMap<String, u32>>);

impl TermCountByGroup {
    /// Registry with every `(group, slug(term))` pair at zero
    pub fn seeded(terms_by_group: &TermsByGroup) -> Self {
        let counts = terms_by_group
            .iter()
            .map(|(group, terms)| {
                let slugs = terms
                    .iter()
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| (slug(t), 0))
                    .collect();
                (group.clone(), slugs)
            })
            .collect();
        Self(counts)
    }

    pub fn get(&self, group: &str, term_slug: &str) -> Option<u32> {
        self.0.get(group).and_then(|terms| terms.get(term_slug)).copied()
    }

    pub fn group(&self, group: &str) -> Option<&BTreeMap<String, u32>> {
        self.0.get(group)
    }

    pub fn as_map(&self) -> &BTreeMap<String, BTreeMap<String, u32>> {
        &self.0
    }

    pub fn into_inner(self) -> BTreeMap<String, BTreeMap<String, u32>> {
        self.0
    }

    /// Record one match under the `+`-joined group `key`.
    ///
    /// Each `(group, term)` pair increments at most once per call, however
    /// many highlights or composite group ids lead to it.
    pub fn increment(&mut self, key: &str, value: CountValue<'_>) {
        let mut attributed: Vec<(String, Vec<String>)> = Vec::new();

        match value {
            CountValue::Term(text) => attributed.push((slug(text), vec![key.to_string()])),
            CountValue::Nodes(nodes) => attribute_nodes(key, nodes, &mut attributed),
            CountValue::Composite { term, groups, nodes } => {
                let declared = groups
                    .iter()
                    .filter(|g| !g.contains(GROUP_SEPARATOR))
                    .cloned()
                    .collect();
                attributed.push((slug(term), declared));
                attribute_nodes(key, nodes, &mut attributed);
            }
        }

        let hits: BTreeSet<(&str, &str)> = attributed
            .iter()
            .flat_map(|(term, groups)| {
                groups
                    .iter()
                    .flat_map(|g| split_groups(g))
                    .map(move |g| (g, term.as_str()))
            })
            .collect();

        for (group, term) in hits {
            if let Some(count) = self.0.get_mut(group).and_then(|terms| terms.get_mut(term)) {
                *count += 1;
            }
        }
    }
}

fn attribute_nodes(key: &str, nodes: &[DocumentNode], out: &mut Vec<(String, Vec<String>)>) {
    for node in nodes {
        if node.is_highlight() {
            collect_highlights(node, out);
        } else if let Some(text) = node.text_value() {
            out.push((slug(text), vec![key.to_string()]));
        }
    }
}

fn split_groups(key: &str) -> impl Iterator<Item = &str> {
    key.split(GROUP_SEPARATOR).filter(|g| !g.is_empty())
}

/// Anchored highlights at any depth, with their own groups
fn collect_highlights(node: &DocumentNode, out: &mut Vec<(String, Vec<String>)>) {
    if let Some(term) = node.highlight_term() {
        out.push((term.to_string(), node.highlight_groups()));
    }
    for child in node.children().iter().filter(|c| c.is_highlight()) {
        collect_highlights(child, out);
    }
}
