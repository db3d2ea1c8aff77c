use oopish_model::{ModelType, Record, Validatable};
use oopish_types::TypeName;
use serde_json::json;
use std::sync::Arc;

fn book() -> Arc<ModelType> {
    Arc::new(ModelType::new(TypeName::new("Book").unwrap()))
}

#[test]
fn set_and_get() {
    let mut r = Record::new(book());
    assert_eq!(r.set("title", "Dune"), None);
    assert_eq!(r.get_str("title"), Some("Dune"));
    assert_eq!(r.set("title", "Emma"), Some(json!("Dune")));
}

#[test]
fn get_number() {
    let mut r = Record::new(book());
    r.set("pages", 412);
    assert_eq!(r.get_number("pages"), Some(412.0));
    assert_eq!(r.get_number("missing"), None);
}

#[test]
fn read_attribute_matches_get() {
    let mut r = Record::new(book());
    r.set("title", "Dune");
    let v: &dyn Validatable = &r;
    assert_eq!(v.read_attribute("title"), Some(&json!("Dune")));
    assert_eq!(v.model_type().name(), "Book");
}

#[test]
fn record_without_validations_is_valid() {
    let r = Record::new(book());
    assert!(r.valid());
    let v: &dyn Validatable = &r;
    assert!(v.valid());
}

#[test]
fn associated_defaults_to_empty() {
    let r = Record::new(book());
    assert!(r.associated("chapters").is_empty());
}

#[test]
fn clone_starts_with_empty_validator_cache() {
    let r = Record::new(book());
    r.validators().fetch("x", || Arc::new(1u8));
    assert!(r.validators().contains("x"));
    let copy = r.clone();
    assert!(copy.validators().is_empty());
    assert_eq!(r.validators().len(), 1);
}
