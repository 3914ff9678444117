//! Term Data Builder
//!
//! One `TermMatcher` per (term, case mode): a word-bounded regex over the
//! term's literal text plus the precomputed highlight value of the term.
//!
//! Composite terms get one capture group per top-level sub-term, so a match
//! also reports where each segment landed in the document text.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use super::config::EnrichConfig;
use super::error::EnrichWarning;
use crate::document::DocumentNode;
use crate::terms::boundary::{is_boundary_after, is_boundary_before, next_char_index};
use crate::terms::{slug, NestedTerm};

/// Replacement value of a matched term
#[derive(Debug, Clone, PartialEq)]
pub enum MatchValue {
    /// Plain term, highlighted as its matched text
    Text(String),
    /// Composite term, one fragment per sub-term
    Fragments(Vec<DocumentNode>),
}

/// A single regex match with its segment spans
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermMatch {
    pub start: usize,
    pub end: usize,
    /// Absolute spans of the top-level sub-terms; empty for plain terms
    pub segments: Vec<Range<usize>>,
}

#[derive(Debug, Clone)]
pub struct TermMatcher {
    regex: Regex,
    term: NestedTerm,
    groups: Vec<String>,
    value: MatchValue,
    case_insensitive: bool,
}

impl TermMatcher {
    pub fn new(term: &NestedTerm, groups: Vec<String>, case_insensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&term_pattern(term))
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self {
            regex,
            term: term.clone(),
            groups,
            value: match_value(term),
            case_insensitive,
        })
    }

    pub fn term(&self) -> &NestedTerm {
        &self.term
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Count-registry key: groups joined by `+`
    pub fn group_key(&self) -> String {
        self.groups.join("+")
    }

    pub fn value(&self) -> &MatchValue {
        &self.value
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Every word-bounded, non-overlapping match in `text`, left to right
    pub fn find_matches(&self, text: &str) -> Vec<TermMatch> {
        let mut found = Vec::new();
        let mut from = 0;

        while from <= text.len() {
            let Some(caps) = self.regex.captures_at(text, from) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let (start, end) = (whole.start(), whole.end());

            if start < end && is_boundary_before(text, start) && is_boundary_after(text, end) {
                let segments = caps.iter().skip(1).flatten().map(|m| m.range()).collect();
                found.push(TermMatch { start, end, segments });
                from = end;
            } else {
                from = next_char_index(text, start);
            }
        }
        found
    }
}

/// Regex source for a literal term text.
///
/// Whitespace runs match any whitespace run, `-` and `–` match each other.
pub fn literal_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() * 2);
    let mut in_whitespace = false;
    let mut buf = [0u8; 4];

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                pattern.push_str(r"\s+");
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        match c {
            '-' | '–' => pattern.push_str("[-–]"),
            _ => pattern.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    pattern
}

fn term_pattern(term: &NestedTerm) -> String {
    if term.sub_terms.is_empty() {
        return literal_pattern(&term.term);
    }
    term.sub_terms
        .iter()
        .map(|sub| format!("({})", literal_pattern(&sub.term)))
        .collect()
}

fn match_value(term: &NestedTerm) -> MatchValue {
    if term.sub_terms.is_empty() {
        MatchValue::Text(term.term.clone())
    } else {
        MatchValue::Fragments(term.sub_terms.iter().map(fragment).collect())
    }
}

/// Highlight fragment of a sub-term. Groupless fillers stay plain text.
fn fragment(sub: &NestedTerm) -> DocumentNode {
    if sub.groups.is_empty() && sub.sub_terms.is_empty() {
        return DocumentNode::text(sub.term.clone());
    }
    let value = if sub.sub_terms.is_empty() {
        vec![DocumentNode::text(sub.term.clone())]
    } else {
        sub.sub_terms.iter().map(fragment).collect()
    };
    let anchor = sub.anchor();
    let no_anchor = anchor.is_none();
    DocumentNode::highlight(sub.groups.clone(), anchor, no_anchor, value)
}

/// Root highlight of a match
pub fn root_highlight(matcher: &TermMatcher, value: Vec<DocumentNode>) -> DocumentNode {
    let term = matcher.term();
    DocumentNode::highlight(matcher.groups.clone(), Some(slug(&term.term)), term.artificial, value)
}

/// Build the matchers of a forest, longest term first.
///
/// Terms in a case-insensitive group get a case-insensitive matcher carrying
/// only those groups, plus a case-sensitive one for the remaining groups.
pub fn build_matchers(forest: &[NestedTerm], config: &EnrichConfig) -> (Vec<TermMatcher>, Vec<EnrichWarning>) {
    let mut matchers = Vec::with_capacity(forest.len());
    let mut warnings = Vec::new();

    for term in forest {
        let (insensitive, sensitive): (Vec<String>, Vec<String>) = term
            .groups
            .iter()
            .cloned()
            .partition(|g| config.is_case_insensitive_group(g));

        for (groups, case_insensitive) in [(insensitive, true), (sensitive, false)] {
            if groups.is_empty() {
                continue;
            }
            match TermMatcher::new(term, groups, case_insensitive) {
                Ok(matcher) => matchers.push(matcher),
                Err(e) => warnings.push(EnrichWarning::new(
                    "matchers",
                    format!("term `{}` skipped: {}", term.term, e),
                )),
            }
        }
    }

    (matchers, warnings)
}
