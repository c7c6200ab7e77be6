use super::*;
use std::collections::BTreeMap;

#[test]
fn code_summaries_are_ordered_and_rendered() {
    let info = MoreInfoResult {
        overall_summary: "S".to_owned(),
        concern_code_summaries: BTreeMap::from([
            ("B2".to_owned(), "drain 3 times".to_owned()),
            ("A1".to_owned(), "seal".to_owned()),
        ]),
        additional_results: serde_json::Value::Null,
    };

    let rows = code_summaries(&info);

    assert_eq!(rows[0].0, "Code A1:");
    assert_eq!(rows[0].1, "<p>seal</p>\n");
    assert_eq!(rows[1].0, "Code B2:");
    assert!(rows[1].1.contains("<strong class=\"numeric\">3</strong>"));
}

#[test]
fn is_error_text_matches_synthetic_errors_only() {
    assert!(is_error_text("Error: HTTP error! status: 500. Please try again."));
    assert!(!is_error_text("Errors were rare this quarter."));
    assert!(!is_error_text("42 units affected"));
}
