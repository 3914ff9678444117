//! EnrichmentCache: content-addressable memoization
//!
//! Hashes the document, the term lists and the configuration. When none of
//! them changed since the last call, the previous result is handed back.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::config::EnrichConfig;
use super::enricher::EnrichResult;
use crate::document::DocumentNode;
use crate::terms::TermsByGroup;

/// Hash of everything an enrichment depends on
pub fn content_hash(document: &DocumentNode, terms_by_group: &TermsByGroup, config: &EnrichConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    document.hash(&mut hasher);
    terms_by_group.hash(&mut hasher);
    config.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheCheck {
    pub has_changed: bool,
    pub content_hash: u64,
}

#[derive(Debug, Default)]
pub struct EnrichmentCache {
    last_hash: Option<u64>,
    last_result: Option<EnrichResult>,
    check_count: u64,
    skip_count: u64,
}

impl EnrichmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the last stored hash
    pub fn check(&mut self, document: &DocumentNode, terms_by_group: &TermsByGroup, config: &EnrichConfig) -> CacheCheck {
        self.check_count += 1;
        let current = content_hash(document, terms_by_group, config);
        let has_changed = self.last_hash != Some(current) || self.last_result.is_none();
        if !has_changed {
            self.skip_count += 1;
        }
        CacheCheck {
            has_changed,
            content_hash: current,
        }
    }

    pub fn store(&mut self, hash: u64, result: EnrichResult) {
        self.last_hash = Some(hash);
        self.last_result = Some(result);
    }

    /// Cached result if nothing changed, else `enrich()` and remember it
    pub fn get_or_enrich(
        &mut self,
        document: &DocumentNode,
        terms_by_group: &TermsByGroup,
        config: &EnrichConfig,
        enrich: impl FnOnce() -> EnrichResult,
    ) -> EnrichResult {
        let started = instant::Instant::now();
        let check = self.check(document, terms_by_group, config);

        if !check.has_changed {
            if let Some(cached) = &self.last_result {
                let mut result = cached.clone();
                result.stats.was_cached = true;
                result.stats.total_us = started.elapsed().as_micros() as u64;
                return result;
            }
        }

        let result = enrich();
        self.store(check.content_hash, result.clone());
        result
    }

    /// Skip rate as a percentage
    pub fn skip_rate(&self) -> f64 {
        if self.check_count == 0 {
            return 0.0;
        }
        (self.skip_count as f64 / self.check_count as f64) * 100.0
    }

    pub fn check_count(&self) -> u64 {
        self.check_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
