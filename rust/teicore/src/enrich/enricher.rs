//! Document Enricher
//!
//! Orchestrates the document side of the pipeline. Block-level children are
//! enriched on their own; consecutive inline children form a run, and each
//! run with text goes through position extraction, matching, resolution and
//! reconstruction. A run that produced highlights is wrapped in one
//! `highlightedText` node.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cache::content_hash;
use super::config::EnrichConfig;
use super::counts::TermCountByGroup;
use super::error::{EnrichError, EnrichWarning};
use super::matcher::{build_matchers, TermMatcher};
use super::position::extract_text_positions;
use super::reconstruct::reconstruct_run;
use super::resolver::{find_candidates, resolve_matches};
use crate::document::DocumentNode;
use crate::terms::{build_term_forest, displayed_terms, NestedTerm, TermEntry, TermsByGroup};

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichStats {
    pub terms_us: u64,
    pub matchers_us: u64,
    pub document_us: u64,
    pub total_us: u64,
    /// Size of the nested term forest
    pub term_count: usize,
    pub matcher_count: usize,
    pub highlight_count: usize,
    /// Inline runs scanned
    pub run_count: usize,
    pub was_cached: bool,
    /// Content hash as hex string (u64 would overflow JS Number.MAX_SAFE_INTEGER)
    pub content_hash: String,
    pub warnings: Vec<EnrichWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichResult {
    pub enriched_document: DocumentNode,
    pub term_count_by_group: TermCountByGroup,
    pub stats: EnrichStats,
}

// =============================================================================
// Enricher
// =============================================================================

/// Term forest and matchers built once, applied to any number of documents
pub struct Enricher {
    config: EnrichConfig,
    terms_by_group: TermsByGroup,
    forest: Vec<NestedTerm>,
    matchers: Vec<TermMatcher>,
    warnings: Vec<EnrichWarning>,
    terms_us: u64,
    matchers_us: u64,
}

impl Enricher {
    pub fn new(terms_by_group: &TermsByGroup, config: EnrichConfig) -> Self {
        let terms_start = instant::Instant::now();
        let (forest, mut warnings) = build_term_forest(terms_by_group, config.overlap_rounds());
        let terms_us = terms_start.elapsed().as_micros() as u64;

        let matchers_start = instant::Instant::now();
        let (matchers, matcher_warnings) = build_matchers(&forest, &config);
        let matchers_us = matchers_start.elapsed().as_micros() as u64;
        warnings.extend(matcher_warnings);

        Self {
            config,
            terms_by_group: terms_by_group.clone(),
            forest,
            matchers,
            warnings,
            terms_us,
            matchers_us,
        }
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// The nested term forest, longest term first
    pub fn nested_terms(&self) -> &[NestedTerm] {
        &self.forest
    }

    pub fn matchers(&self) -> &[TermMatcher] {
        &self.matchers
    }

    /// Enrich with the configured stop tags
    pub fn enrich_document(&self, document: &DocumentNode) -> EnrichResult {
        self.enrich_document_with(document, &|node: &DocumentNode| self.config.is_stop_tag(node))
    }

    pub fn enrich_document_with(
        &self,
        document: &DocumentNode,
        is_stop_tag: &dyn Fn(&DocumentNode) -> bool,
    ) -> EnrichResult {
        let started = instant::Instant::now();
        let mut pass = Pass {
            enricher: self,
            is_stop_tag,
            counts: TermCountByGroup::seeded(&self.terms_by_group),
            run_count: 0,
            highlight_count: 0,
        };
        let enriched_document = pass.enrich_node(document);
        let document_us = started.elapsed().as_micros() as u64;

        let stats = EnrichStats {
            terms_us: self.terms_us,
            matchers_us: self.matchers_us,
            document_us,
            total_us: self.terms_us + self.matchers_us + document_us,
            term_count: self.forest.len(),
            matcher_count: self.matchers.len(),
            highlight_count: pass.highlight_count,
            run_count: pass.run_count,
            was_cached: false,
            content_hash: format!("{:x}", content_hash(document, &self.terms_by_group, &self.config)),
            warnings: self.warnings.clone(),
        };

        EnrichResult {
            enriched_document,
            term_count_by_group: pass.counts,
            stats,
        }
    }
}

/// One enrichment pass: request-scoped counts and tallies
struct Pass<'e> {
    enricher: &'e Enricher,
    is_stop_tag: &'e dyn Fn(&DocumentNode) -> bool,
    counts: TermCountByGroup,
    run_count: usize,
    highlight_count: usize,
}

impl Pass<'_> {
    fn is_block(&self, node: &DocumentNode) -> bool {
        self.enricher.config.is_block_tag(&node.tag) && !(self.is_stop_tag)(node)
    }

    fn enrich_node(&mut self, node: &DocumentNode) -> DocumentNode {
        if node.is_text() || (self.is_stop_tag)(node) || !node.has_child_value() {
            return node.clone();
        }

        let children: Vec<DocumentNode> = node
            .children()
            .iter()
            .map(|child| {
                if self.is_block(child) {
                    self.enrich_node(child)
                } else {
                    child.clone()
                }
            })
            .collect();

        let mut out = Vec::with_capacity(children.len());
        let mut run_start = 0;
        for (index, child) in children.iter().enumerate() {
            if self.is_block(child) {
                out.extend(self.enrich_run(&children[run_start..index]));
                out.push(child.clone());
                run_start = index + 1;
            }
        }
        out.extend(self.enrich_run(&children[run_start..]));

        node.with_children(out)
    }

    fn enrich_run(&mut self, run: &[DocumentNode]) -> Vec<DocumentNode> {
        let scannable = match run {
            [] => false,
            [single] if (self.is_stop_tag)(single) => false,
            _ => run.iter().any(DocumentNode::has_text_content),
        };
        if !scannable {
            return run.to_vec();
        }

        self.run_count += 1;
        let positions = extract_text_positions(run, self.is_stop_tag);
        let accepted = resolve_matches(find_candidates(&positions.text, &self.enricher.matchers));
        if accepted.is_empty() {
            return run.to_vec();
        }

        self.highlight_count += accepted.len();
        let rebuilt = reconstruct_run(run, &positions, &accepted, &mut self.counts);
        vec![DocumentNode::highlighted_text(rebuilt)]
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Enrich `document` with the default configuration
pub fn enrich(document: &DocumentNode, terms_by_group: &TermsByGroup) -> EnrichResult {
    Enricher::new(terms_by_group, EnrichConfig::default()).enrich_document(document)
}

pub fn enrich_with(
    document: &DocumentNode,
    terms_by_group: &TermsByGroup,
    config: &EnrichConfig,
    is_stop_tag: &dyn Fn(&DocumentNode) -> bool,
) -> EnrichResult {
    Enricher::new(terms_by_group, config.clone()).enrich_document_with(document, is_stop_tag)
}

/// JSON in, JSON out.
///
/// `terms_json` maps each group to a list of plain strings or term
/// statistics; statistics not marked `displayed` are left out.
pub fn enrich_json(document_json: &str, terms_json: &str) -> Result<String, EnrichError> {
    let document: DocumentNode =
        serde_json::from_str(document_json).map_err(|e| EnrichError::InvalidDocument(e.to_string()))?;
    let statistics: BTreeMap<String, Vec<TermEntry>> =
        serde_json::from_str(terms_json).map_err(|e| EnrichError::InvalidTerms(e.to_string()))?;

    let result = enrich(&document, &displayed_terms(&statistics));
    serde_json::to_string(&result).map_err(|e| EnrichError::Serialization(e.to_string()))
}
