//! Unit tests for property filters

use proptest::prelude::*;
use std::collections::BTreeMap;
use svb_domain::{Error, Filter};

fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[test]
fn test_parse_equality() {
    let filter = Filter::parse("(region=eu-west)").expect("parse");
    assert_eq!(filter, Filter::equal("region", "eu-west"));
    assert!(filter.matches(&props(&[("region", "eu-west")])));
    assert!(!filter.matches(&props(&[("region", "us-east")])));
    assert!(!filter.matches(&props(&[])));
}

#[test]
fn test_parse_presence() {
    let filter = Filter::parse("(tier=*)").expect("parse");
    assert_eq!(filter, Filter::present("tier"));
    assert!(filter.matches(&props(&[("tier", "")])));
    assert!(!filter.matches(&props(&[("other", "x")])));
}

#[test]
fn test_parse_substring() {
    let filter = Filter::parse("(host=db-*.internal)").expect("parse");
    assert!(matches!(filter, Filter::Substring { .. }));
    assert!(filter.matches(&props(&[("host", "db-1.internal")])));
    assert!(filter.matches(&props(&[("host", "db-.internal")])));
    assert!(!filter.matches(&props(&[("host", "cache-1.internal")])));
    assert!(!filter.matches(&props(&[("host", "db-1.external")])));
}

#[test]
fn test_parse_composite() {
    let filter = Filter::parse("(&(region=eu-*)(|(tier=hot)(!(cold=*))))").expect("parse");
    assert!(filter.matches(&props(&[("region", "eu-1"), ("tier", "hot")])));
    assert!(filter.matches(&props(&[("region", "eu-1")])));
    assert!(!filter.matches(&props(&[("region", "eu-1"), ("cold", "yes")])));
    assert!(!filter.matches(&props(&[("region", "us-1"), ("tier", "hot")])));
}

#[test]
fn test_whitespace_between_operands() {
    let filter = Filter::parse(" (& (a=1) (b=2) ) ").expect("parse");
    assert_eq!(
        filter,
        Filter::and([Filter::equal("a", "1"), Filter::equal("b", "2")])
    );
}

#[test]
fn test_escaped_wildcard_is_literal() {
    let filter = Filter::parse(r"(name=a\*b)").expect("parse");
    assert_eq!(filter, Filter::equal("name", "a*b"));
    assert!(filter.matches(&props(&[("name", "a*b")])));
    assert!(!filter.matches(&props(&[("name", "axb")])));
}

#[test]
fn test_display_escapes_special_characters() {
    let filter = Filter::equal("name", "f(x)*");
    assert_eq!(filter.to_string(), r"(name=f\(x\)\*)");
}

#[test]
fn test_parse_errors_report_position() {
    for (input, expected_pos) in [("region=eu", 0), ("(region", 7), ("(=x)", 1), ("(&)", 2)] {
        match Filter::parse(input) {
            Err(Error::FilterParse { position, .. }) => {
                assert_eq!(position, expected_pos, "input {input}");
            }
            other => panic!("Expected FilterParse for {input}, got {other:?}"),
        }
    }
}

#[test]
fn test_trailing_input_rejected() {
    assert!(Filter::parse("(a=1)(b=2)").is_err());
}

#[test]
fn test_and_also_flattens() {
    let combined = Filter::and([Filter::equal("a", "1")])
        .and_also(Filter::and([Filter::equal("b", "2"), Filter::present("c")]));
    match combined {
        Filter::And(items) => assert_eq!(items.len(), 3),
        other => panic!("Expected And, got {other:?}"),
    }
}

#[test]
fn test_serde_uses_filter_string() {
    let filter = Filter::and([Filter::equal("a", "1"), Filter::not(Filter::present("b"))]);
    let json = serde_json::to_string(&filter).expect("serialize");
    assert_eq!(json, r#""(&(a=1)(!(b=*)))""#);
    let back: Filter = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, filter);
}

proptest! {
    #[test]
    fn test_rendered_equality_parses_back(key in "[a-z][a-z0-9.]{0,12}", value in "\\PC{1,24}") {
        let filter = Filter::equal(key.clone(), value.clone());
        let parsed = Filter::parse(&filter.to_string()).expect("rendered filter parses");
        prop_assert!(parsed.matches(&props(&[(key.as_str(), value.as_str())])));
    }
}
