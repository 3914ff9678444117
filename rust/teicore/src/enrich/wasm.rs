//! TermEnricher: WASM facade
//!
//! One cross-boundary call per enrichment. Results are serialized with the
//! JSON-compatible serializer so maps arrive in JS as plain objects.

use serde::Serialize;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

use super::cache::EnrichmentCache;
use super::config::EnrichConfig;
use super::enricher::{EnrichResult, Enricher};
use crate::document::DocumentNode;
use crate::terms::{displayed_terms, TermEntry};

#[wasm_bindgen]
pub struct TermEnricher {
    config: EnrichConfig,
    stop_tag_predicate: Option<js_sys::Function>,
    cache: EnrichmentCache,
}

#[wasm_bindgen]
impl TermEnricher {
    /// `config` is an optional partial `EnrichConfig` object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TermEnricher, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            EnrichConfig::default()
        } else {
            let config: EnrichConfig = serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?;
            config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
            config
        };

        Ok(Self {
            config,
            stop_tag_predicate: None,
            cache: EnrichmentCache::new(),
        })
    }

    /// Replace the configured stop tags with `predicate(tag) -> boolean`
    #[wasm_bindgen(js_name = setStopTagPredicate)]
    pub fn set_stop_tag_predicate(&mut self, predicate: js_sys::Function) {
        self.stop_tag_predicate = Some(predicate);
        self.cache.reset();
    }

    /// Enrich a parsed document with `{ group: (string | TermStatistic)[] }`
    #[wasm_bindgen(js_name = enrich)]
    pub fn js_enrich(&mut self, document: JsValue, term_statistics_by_group: JsValue) -> Result<JsValue, JsValue> {
        let document: DocumentNode = serde_wasm_bindgen::from_value(document)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse document: {}", e)))?;
        let statistics: BTreeMap<String, Vec<TermEntry>> = serde_wasm_bindgen::from_value(term_statistics_by_group)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse terms: {}", e)))?;
        let terms_by_group = displayed_terms(&statistics);

        let config = &self.config;
        let predicate = self.stop_tag_predicate.as_ref();
        let result = self.cache.get_or_enrich(&document, &terms_by_group, config, || {
            let enricher = Enricher::new(&terms_by_group, config.clone());
            match predicate {
                Some(predicate) => enricher.enrich_document_with(&document, &|node: &DocumentNode| {
                    predicate
                        .call1(&JsValue::NULL, &JsValue::from_str(&node.tag))
                        .map(|v| v.is_truthy())
                        .unwrap_or(false)
                }),
                None => enricher.enrich_document(&document),
            }
        });

        log_result(&result);

        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        result.serialize(&serializer).map_err(|e| {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::error_1(&format!("[TermEnricher] Serialization failed: {:?}", e).into());
            JsValue::from_str(&e.to_string())
        })
    }

    #[wasm_bindgen(js_name = skipRate)]
    pub fn skip_rate(&self) -> f64 {
        self.cache.skip_rate()
    }

    /// Drop the cached result
    #[wasm_bindgen(js_name = reset)]
    pub fn js_reset(&mut self) {
        self.cache.reset();
    }
}

#[cfg(target_arch = "wasm32")]
fn log_result(result: &EnrichResult) {
    let stats = &result.stats;
    web_sys::console::log_1(&JsValue::from_str(&format!(
        "[TermEnricher] {} highlights in {} runs, {} matchers, {}us{}",
        stats.highlight_count,
        stats.run_count,
        stats.matcher_count,
        stats.total_us,
        if stats.was_cached { " (cached)" } else { "" }
    )));
    for warning in &stats.warnings {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "[TermEnricher] {}: {}",
            warning.phase, warning.message
        )));
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn log_result(_result: &EnrichResult) {}
