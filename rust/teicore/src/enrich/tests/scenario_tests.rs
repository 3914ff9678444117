//! End-to-end enrichment scenarios
//!
//! Documents and term lists as they come out of the TEI parser and the
//! enrichment-XML parsers, checked against the exact enriched tree and counts.

use serde_json::json;

use crate::document::{AttributeValue, DocumentNode};
use crate::enrich::{enrich, enrich_with, EnrichConfig};
use crate::terms::TermsByGroup;

fn terms(pairs: &[(&str, &[&str])]) -> TermsByGroup {
    pairs
        .iter()
        .map(|(group, list)| (group.to_string(), list.iter().map(|t| t.to_string()).collect()))
        .collect()
}

fn doc(value: serde_json::Value) -> DocumentNode {
    serde_json::from_value(value).unwrap()
}

fn paragraph(text: &str) -> DocumentNode {
    DocumentNode::element("p", vec![DocumentNode::text(text)])
}

/// Root highlight of the only inline run of a paragraph
fn only_highlight(enriched: &DocumentNode) -> &DocumentNode {
    let run = &enriched.children()[0];
    assert_eq!(run.tag, "highlightedText");
    let highlights: Vec<&DocumentNode> = run.children().iter().filter(|n| n.is_highlight()).collect();
    assert_eq!(highlights.len(), 1);
    highlights[0]
}

fn groups_of(node: &DocumentNode) -> Vec<String> {
    node.highlight_groups()
}

// ============================================================================
// Reconstruction without terms
// ============================================================================

#[test]
fn test_no_terms_returns_same_tree() {
    let tei = doc(json!({
        "tag": "TEI",
        "value": [
            { "tag": "teiHeader", "value": [{ "tag": "title", "value": { "tag": "#text", "value": "Radioactivité" } }] },
            { "tag": "text", "value": [{ "tag": "body", "value": [
                { "tag": "p", "attributes": { "@n": "1" }, "value": [
                    { "tag": "#text", "value": "Prince " },
                    { "tag": "hi", "attributes": { "@rend": "italic" }, "value": [{ "tag": "#text", "value": "Charles" }] },
                    { "tag": "lb" },
                    { "tag": "formula", "value": [{ "tag": "#text", "value": "E = mc^2" }] }
                ]}
            ]}]}
        ]
    }));

    let result = enrich(&tei, &TermsByGroup::new());
    assert_eq!(result.enriched_document, tei);
    assert_eq!(result.stats.highlight_count, 0);
    assert!(result.term_count_by_group.as_map().is_empty());
}

#[test]
fn test_unmatched_terms_return_same_tree() {
    let tei = doc(json!({
        "tag": "p",
        "value": [
            { "tag": "#text", "value": "overconfident " },
            { "tag": "hi", "value": { "tag": "#text", "value": "conference" } }
        ]
    }));

    let result = enrich(&tei, &terms(&[("teeft", &["conf"])]));
    assert_eq!(result.enriched_document, tei);
    assert_eq!(result.term_count_by_group.get("teeft", "conf"), Some(0));
}

// ============================================================================
// Containment
// ============================================================================

#[test]
fn test_containment_nests_highlights() {
    let result = enrich(
        &paragraph("United States of America"),
        &terms(&[
            ("group1", &["United States of America"]),
            ("group2", &["States of America"]),
            ("group3", &["America"]),
        ]),
    );

    let root = only_highlight(&result.enriched_document);
    assert_eq!(groups_of(root), vec!["group1"]);
    assert_eq!(root.highlight_term(), Some("united-states-of-america"));

    let states = &root.children()[1];
    assert_eq!(groups_of(states), vec!["group1", "group2"]);
    assert_eq!(states.text_content(), "States of America");

    let america = &states.children()[1];
    assert_eq!(groups_of(america), vec!["group1", "group2", "group3"]);
    assert_eq!(america.highlight_term(), Some("america"));

    let counts = &result.term_count_by_group;
    assert_eq!(counts.get("group1", "united-states-of-america"), Some(1));
    assert_eq!(counts.get("group2", "states-of-america"), Some(1));
    assert_eq!(counts.get("group3", "america"), Some(1));
}

// ============================================================================
// Overlap merge
// ============================================================================

#[test]
fn test_overlap_chain_becomes_one_composite() {
    let result = enrich(
        &paragraph("Prince Charles The Bold Font"),
        &terms(&[
            ("group1", &["Prince Charles"]),
            ("group2", &["Charles The Bold"]),
            ("group3", &["The Bold Font"]),
        ]),
    );

    let root = only_highlight(&result.enriched_document);
    assert_eq!(groups_of(root), vec!["group1+group2+group3"]);
    assert_eq!(root.attribute("noAnchor"), Some(&AttributeValue::Flag(true)));

    let segments: Vec<(String, Vec<String>, Option<&str>)> = root
        .children()
        .iter()
        .map(|s| (s.text_content(), groups_of(s), s.highlight_term()))
        .collect();
    let expected: Vec<(String, Vec<String>, Option<&str>)> = vec![
        ("Prince ".into(), vec!["group1".into()], Some("prince-charles")),
        ("Charles".into(), vec!["group1".into(), "group2".into()], None),
        (" ".into(), vec!["group2".into()], Some("charles-the-bold")),
        ("The Bold".into(), vec!["group2".into(), "group3".into()], None),
        (" Font".into(), vec!["group3".into()], Some("the-bold-font")),
    ];
    assert_eq!(segments, expected);

    let counts = &result.term_count_by_group;
    assert_eq!(counts.get("group1", "prince-charles"), Some(1));
    assert_eq!(counts.get("group2", "charles-the-bold"), Some(1));
    assert_eq!(counts.get("group3", "the-bold-font"), Some(1));
}

#[test]
fn test_literal_config_keeps_leftmost_term() {
    let config = EnrichConfig::literal();
    let result = enrich_with(
        &paragraph("Prince Charles The Bold"),
        &terms(&[("group1", &["Prince Charles"]), ("group2", &["Charles The Bold"])]),
        &config,
        &|node: &DocumentNode| config.is_stop_tag(node),
    );

    let root = only_highlight(&result.enriched_document);
    assert_eq!(groups_of(root), vec!["group1"]);
    assert_eq!(result.term_count_by_group.get("group2", "charles-the-bold"), Some(0));
}

// ============================================================================
// Cross-tag matches
// ============================================================================

#[test]
fn test_cross_tag_match_keeps_inline_markup() {
    let tei = doc(json!({
        "tag": "p",
        "value": [
            { "tag": "#text", "value": "Prince " },
            { "tag": "hi", "value": [{ "tag": "#text", "value": "Charles" }] }
        ]
    }));

    let result = enrich(&tei, &terms(&[("group1", &["Prince Charles"])]));

    assert_eq!(
        serde_json::to_value(&result.enriched_document).unwrap(),
        json!({
            "tag": "p",
            "value": [{
                "tag": "highlightedText",
                "value": [{
                    "tag": "highlight",
                    "attributes": { "groups": ["group1"], "term": "prince-charles" },
                    "value": [
                        { "tag": "#text", "value": "Prince " },
                        { "tag": "hi", "value": [{ "tag": "#text", "value": "Charles" }] }
                    ]
                }]
            }]
        })
    );
    assert_eq!(result.term_count_by_group.get("group1", "prince-charles"), Some(1));
}

#[test]
fn test_cross_tag_composite_keeps_markup_inside_segment() {
    let tei = doc(json!({
        "tag": "p",
        "value": [
            { "tag": "#text", "value": "Prince " },
            { "tag": "hi", "value": [{ "tag": "#text", "value": "Charles" }] },
            { "tag": "#text", "value": " The Bold Font" }
        ]
    }));

    let result = enrich(
        &tei,
        &terms(&[
            ("group1", &["Prince Charles"]),
            ("group2", &["Charles The Bold"]),
            ("group3", &["The Bold Font"]),
        ]),
    );

    let root = only_highlight(&result.enriched_document);
    let charles = &root.children()[1];
    assert_eq!(groups_of(charles), vec!["group1", "group2"]);
    assert_eq!(
        charles.children(),
        [DocumentNode::element("hi", vec![DocumentNode::text("Charles")])]
    );
    assert_eq!(root.text_content(), "Prince Charles The Bold Font");
}

// ============================================================================
// Stop tags
// ============================================================================

#[test]
fn test_formula_text_is_never_matched() {
    let formula = DocumentNode::element("formula", vec![DocumentNode::text("Marie Curie")]);
    let tei = DocumentNode::element(
        "p",
        vec![DocumentNode::text("Prize for "), formula.clone(), DocumentNode::text(" and Marie Curie")],
    );

    let result = enrich(&tei, &terms(&[("persName", &["Marie Curie"])]));

    let run = result.enriched_document.children()[0].children();
    assert_eq!(run[0], DocumentNode::text("Prize for "));
    assert_eq!(run[1], formula);
    assert_eq!(run[2], DocumentNode::text(" and "));
    assert!(run[3].is_highlight());
    assert_eq!(result.term_count_by_group.get("persName", "marie-curie"), Some(1));
}

#[test]
fn test_formula_inside_match_is_kept_verbatim() {
    let formula = DocumentNode::element("formula", vec![DocumentNode::text("x")]);
    let tei = DocumentNode::element(
        "p",
        vec![DocumentNode::text("Marie "), formula.clone(), DocumentNode::text("Curie")],
    );

    let result = enrich(&tei, &terms(&[("persName", &["Marie Curie"])]));
    let root = only_highlight(&result.enriched_document);

    assert_eq!(
        root.children(),
        [DocumentNode::text("Marie "), formula, DocumentNode::text("Curie")]
    );
}

#[test]
fn test_custom_stop_tag_predicate() {
    let tei = DocumentNode::element(
        "p",
        vec![
            DocumentNode::element("ref", vec![DocumentNode::text("Paris")]),
            DocumentNode::text(" Paris"),
        ],
    );
    let config = EnrichConfig::default();
    let result = enrich_with(&tei, &terms(&[("placeName", &["Paris"])]), &config, &|node: &DocumentNode| {
        node.tag == "ref"
    });

    assert_eq!(result.term_count_by_group.get("placeName", "paris"), Some(1));
    let run = result.enriched_document.children()[0].children();
    assert_eq!(run[0], tei.children()[0]);
}

// ============================================================================
// Counts
// ============================================================================

#[test]
fn test_counts_of_nested_term() {
    let result = enrich(
        &paragraph("Laboratoire Marie Curie de l'Université Saclay"),
        &terms(&[
            ("orgName", &["Laboratoire Marie Curie de l'Université Saclay"]),
            ("persName", &["Marie Curie"]),
        ]),
    );

    assert_eq!(
        serde_json::to_value(&result.term_count_by_group).unwrap(),
        json!({
            "orgName": { "laboratoire-marie-curie-de-l'université-saclay": 1 },
            "persName": { "marie-curie": 1 }
        })
    );

    let root = only_highlight(&result.enriched_document);
    assert_eq!(root.children().len(), 3);
    assert_eq!(root.children()[1].highlight_term(), Some("marie-curie"));
    assert_eq!(groups_of(&root.children()[1]), vec!["orgName", "persName"]);
}

#[test]
fn test_declared_term_equal_to_union_counts_once() {
    let result = enrich(
        &paragraph("Prince Charles The Bold"),
        &terms(&[
            ("orgName", &["Prince Charles The Bold"]),
            ("persName", &["Prince Charles"]),
            ("placeName", &["Charles The Bold"]),
        ]),
    );

    let root = only_highlight(&result.enriched_document);
    assert_eq!(groups_of(root), vec!["orgName", "persName+placeName"]);
    assert_eq!(root.highlight_term(), Some("prince-charles-the-bold"));
    assert_eq!(root.attribute("noAnchor"), None);

    assert_eq!(
        serde_json::to_value(&result.term_count_by_group).unwrap(),
        json!({
            "orgName": { "prince-charles-the-bold": 1 },
            "persName": { "prince-charles": 1 },
            "placeName": { "charles-the-bold": 1 }
        })
    );
}

#[test]
fn test_every_occurrence_is_counted() {
    let result = enrich(
        &DocumentNode::element(
            "div",
            vec![paragraph("Paris, Paris."), paragraph("Lyon et Paris")],
        ),
        &terms(&[("placeName", &["Paris", "Marseille"])]),
    );

    assert_eq!(result.term_count_by_group.get("placeName", "paris"), Some(3));
    assert_eq!(result.term_count_by_group.get("placeName", "marseille"), Some(0));
}

// ============================================================================
// Warnings
// ============================================================================

#[test]
fn test_clean_terms_leave_no_warnings() {
    let result = enrich(
        &paragraph("Prince Charles The Bold Font"),
        &terms(&[
            ("group1", &["Prince Charles"]),
            ("group2", &["Charles The Bold"]),
            ("group3", &["The Bold Font"]),
        ]),
    );
    assert!(result.stats.warnings.is_empty());
}

#[test]
fn test_overlap_round_limit_is_reported() {
    let config = EnrichConfig {
        max_overlap_rounds: 1,
        ..EnrichConfig::default()
    };
    let result = enrich_with(
        &paragraph("Prince Charles The Bold Font"),
        &terms(&[
            ("group1", &["Prince Charles"]),
            ("group2", &["Charles The Bold"]),
            ("group3", &["The Bold Font"]),
        ]),
        &config,
        &|node: &DocumentNode| config.is_stop_tag(node),
    );

    let root = only_highlight(&result.enriched_document);
    assert_eq!(root.text_content(), "Prince Charles The Bold");
    assert_eq!(groups_of(root), vec!["group1+group2"]);

    assert_eq!(result.stats.warnings.len(), 1);
    assert_eq!(result.stats.warnings[0].phase, "terms");
    assert!(result.stats.warnings[0].message.contains("after 1 rounds"));
}

// ============================================================================
// teeft case-insensitivity
// ============================================================================

#[test]
fn test_teeft_matches_case_insensitively_alone() {
    let result = enrich(&paragraph("UNITEX"), &terms(&[("teeft", &["Unitex"]), ("other", &["Unitex"])]));

    let root = only_highlight(&result.enriched_document);
    assert_eq!(groups_of(root), vec!["teeft"]);
    assert_eq!(root.highlight_term(), Some("unitex"));
    assert_eq!(result.term_count_by_group.get("teeft", "unitex"), Some(1));
    assert_eq!(result.term_count_by_group.get("other", "unitex"), Some(0));
}

#[test]
fn test_other_groups_stay_case_sensitive() {
    let result = enrich(&paragraph("UNITEX"), &terms(&[("orgName", &["Unitex"])]));
    assert_eq!(result.enriched_document, paragraph("UNITEX"));
}

#[test]
fn test_case_mismatch_on_composite_uses_document_text() {
    let result = enrich(
        &paragraph("LABORATOIRE UNITEX"),
        &terms(&[("teeft", &["laboratoire unitex", "unitex"])]),
    );

    let root = only_highlight(&result.enriched_document);
    assert_eq!(root.text_content(), "LABORATOIRE UNITEX");
    assert_eq!(root.children()[1].text_content(), "UNITEX");
}
