//! Document side of the enrichment pipeline
//!
//! ```text
//! forest ─► matchers ─┐
//!                      ├─► runs ─► positions ─► candidates ─► resolve ─► rebuild + count
//! document ───────────┘
//! ```

pub mod cache;
pub mod config;
pub mod counts;
pub mod enricher;
pub mod error;
pub mod matcher;
pub mod position;
pub mod reconstruct;
pub mod resolver;
pub mod wasm;

pub use cache::{content_hash, CacheCheck, EnrichmentCache};
pub use config::EnrichConfig;
pub use counts::{CountValue, TermCountByGroup};
pub use enricher::{enrich, enrich_json, enrich_with, EnrichResult, EnrichStats, Enricher};
pub use error::{EnrichError, EnrichWarning};
pub use matcher::{build_matchers, MatchValue, TermMatch, TermMatcher};
pub use position::{extract_text_positions, StopTagPosition, TextPosition, TextPositions};
pub use resolver::{find_candidates, resolve_matches, MatchCandidate};
pub use wasm::TermEnricher;

#[cfg(test)]
mod tests;
