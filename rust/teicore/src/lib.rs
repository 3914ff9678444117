//! TeiCore: TEI Term Enrichment + Overlapping-Term Highlighting
//!
//! A Rust/WASM implementation of the TEI viewer's enrichment engine.
//!
//! # Architecture
//!
//! ## Term Pipeline (`terms`)
//! - `normalize.rs` - Term Normalizer / Term Merger: flat `(term, group)` pairs, folded by text
//! - `overlap.rs` - Overlap Discoverer: composite `group1+group2` union terms
//! - `nester.rs` - Term Nester: containment forest, sub-term deduplication
//! - `segment.rs` - Segment splitter / Boundary segmenter
//! - `boundary.rs` - Unicode word boundaries, anchor slugs
//!
//! ## Document Enrichment (`enrich`)
//! - `matcher.rs` - Term Data Builder: one regex + precomputed value per term
//! - `position.rs` - Text Position Extractor
//! - `resolver.rs` - Match Finder & Resolver
//! - `reconstruct.rs` - Tree Reconstructor
//! - `counts.rs` - Term Count Registry
//! - `enricher.rs` - Document Enricher
//! - `cache.rs` - EnrichmentCache: content-addressable skip detection
//! - `wasm.rs` - TermEnricher JS binding
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { TermEnricher } from 'teicore';
//!
//! await init();
//!
//! const enricher = new TermEnricher({ stop_tags: ['formula'] });
//!
//! const { enrichedDocument, termCountByGroup, stats } = enricher.enrich(
//!   { tag: 'p', value: [{ tag: '#text', value: 'Prince Charles The Bold' }] },
//!   {
//!     group1: [{ term: 'Prince Charles', displayed: true }],
//!     group2: [{ term: 'Charles The Bold', displayed: true }],
//!   }
//! );
//!
//! console.log(termCountByGroup.group1['prince-charles']); // 1
//! ```

pub mod document;
pub mod enrich;
pub mod terms;

pub use document::{AttributeValue, Attributes, DocumentNode, NodeValue};
pub use enrich::{
    enrich, enrich_json, enrich_with, EnrichConfig, EnrichError, EnrichResult, EnrichStats, EnrichWarning,
    Enricher, EnrichmentCache, TermCountByGroup, TermEnricher,
};
pub use terms::{displayed_terms, NestedTerm, TermEntry, TermStatistic, TermsByGroup};

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("teicore v{}", env!("CARGO_PKG_VERSION"))
}

/// `enrich_json` for JS callers holding JSON strings
#[wasm_bindgen(js_name = enrichJson)]
pub fn js_enrich_json(document_json: &str, terms_json: &str) -> Result<String, JsValue> {
    enrich_json(document_json, terms_json).map_err(|e| JsValue::from_str(&e.to_string()))
}
