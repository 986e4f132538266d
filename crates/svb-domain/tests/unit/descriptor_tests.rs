//! Unit tests for service descriptors and references

use svb_domain::constants::OBJECT_CLASS;
use svb_domain::{Filter, PropertyLookup, Reference, ReferenceId, ServiceDescriptor};

fn store(id: u64) -> Reference {
    Reference::new(ReferenceId::new(id), "com.acme.Store")
}

#[test]
fn test_descriptor_matches_class_name() {
    let descriptor = ServiceDescriptor::new("com.acme.Store");
    assert!(descriptor.matches(&store(1)));
    assert!(!descriptor.matches(&Reference::new(ReferenceId::new(2), "com.acme.Cache")));
}

#[test]
fn test_descriptor_matches_secondary_interface() {
    let descriptor = ServiceDescriptor::new("com.acme.Cache");
    let reference = store(1).with_interface("com.acme.Cache");
    assert!(descriptor.matches(&reference));
}

#[test]
fn test_descriptor_filter_applies_to_properties() {
    let descriptor = ServiceDescriptor::new("com.acme.Store")
        .with_filter_str("(region=eu)")
        .expect("valid filter");
    assert!(descriptor.matches(&store(1).with_property("region", "eu")));
    assert!(!descriptor.matches(&store(2).with_property("region", "us")));
    assert!(!descriptor.matches(&store(3)));
}

#[test]
fn test_with_filter_accumulates_constraints() {
    let descriptor = ServiceDescriptor::new("com.acme.Store")
        .with_filter(Filter::equal("region", "eu"))
        .with_filter(Filter::present("primary"));
    assert!(descriptor.matches(
        &store(1)
            .with_property("region", "eu")
            .with_property("primary", "true")
    ));
    assert!(!descriptor.matches(&store(2).with_property("region", "eu")));
}

#[test]
fn test_filter_string_includes_object_class() {
    let descriptor = ServiceDescriptor::new("com.acme.Store")
        .with_filter(Filter::equal("region", "eu"));
    assert_eq!(
        descriptor.to_filter_string(),
        "(&(objectClass=com.acme.Store)(region=eu))"
    );
    assert_eq!(
        ServiceDescriptor::new("com.acme.Store").to_filter_string(),
        "(objectClass=com.acme.Store)"
    );
}

#[test]
fn test_object_class_is_filterable() {
    let filter = Filter::parse("(objectClass=com.acme.*)").expect("parse");
    assert!(filter.matches(&store(1)));
}

#[test]
fn test_empty_class_name_rejected() {
    assert!(ServiceDescriptor::new("  ").validate().is_err());
    assert!(ServiceDescriptor::new("com.acme.Store").validate().is_ok());
}

#[test]
fn test_reference_identity_survives_property_change() {
    let original = store(7).with_property("region", "eu");
    let modified = original.clone().with_property("region", "us");
    assert_eq!(original.id(), modified.id());
    assert_ne!(original, modified);
    assert_eq!(modified.property("region"), Some("us"));
}

#[test]
fn test_reference_property_lookup() {
    let reference = store(4)
        .with_interface("com.acme.Cache")
        .with_property("region", "eu");
    assert_eq!(reference.values("region"), vec!["eu"]);
    assert!(reference.values("zone").is_empty());
    assert_eq!(
        reference.values(OBJECT_CLASS),
        vec!["com.acme.Store", "com.acme.Cache"]
    );
}
