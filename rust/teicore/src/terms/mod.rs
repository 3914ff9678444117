//! Term pipeline
//!
//! Turns the per-group term lists into a forest of nested, segmented terms:
//!
//! ```text
//! TermsByGroup ─► normalize ─► discover overlaps ─► merge ─► nest ─► Vec<NestedTerm>
//! ```

pub mod boundary;
pub mod nester;
pub mod normalize;
pub mod overlap;
pub mod segment;
pub mod types;

pub use boundary::{contains_word_bounded, find_all_word_bounded, find_word_bounded, slug};
pub use nester::{dedupe_sub_terms, nest_terms};
pub use normalize::{merge_terms, normalize_terms};
pub use overlap::{composite_group, discover_overlaps, GROUP_SEPARATOR};
pub use segment::split_segments;
pub use types::*;

use crate::enrich::EnrichWarning;

/// Run the whole term pipeline.
///
/// `max_overlap_rounds == 0` skips overlap synthesis: only containment is
/// nested. Terms dropped along the way are reported as warnings.
pub fn build_term_forest(
    terms_by_group: &TermsByGroup,
    max_overlap_rounds: usize,
) -> (Vec<NestedTerm>, Vec<EnrichWarning>) {
    let mut warnings = Vec::new();
    let mut normalized = normalize_terms(terms_by_group);
    if max_overlap_rounds > 0 {
        let synthesized = discover_overlaps(&normalized, max_overlap_rounds, &mut warnings);
        normalized.extend(synthesized);
    }
    let forest = nest_terms(&merge_terms(&normalized), &mut warnings);
    (forest, warnings)
}
