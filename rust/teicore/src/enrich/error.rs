//! Enrichment errors
//!
//! The enrichment core itself never fails. Errors only exist where input is
//! decoded (JSON, JS values) or a configuration is rejected. Degradations
//! inside the core are reported as `EnrichWarning`s.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichError {
    InvalidDocument(String),
    InvalidTerms(String),
    InvalidConfig(String),
    Serialization(String),
}

impl std::fmt::Display for EnrichError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnrichError::InvalidDocument(msg) => write!(f, "Invalid document: {}", msg),
            EnrichError::InvalidTerms(msg) => write!(f, "Invalid term lists: {}", msg),
            EnrichError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            EnrichError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for EnrichError {}

/// Non-fatal problem met during a phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichWarning {
    pub phase: String,
    pub message: String,
}

impl EnrichWarning {
    pub fn new(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            message: message.into(),
        }
    }
}
