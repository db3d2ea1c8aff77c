use oopish_model::{
    AttributeRules, Errors, Format, Length, ModelError, ModelType, Numericality, Record, Rule,
    RuleOptions, Validatable,
};
use oopish_types::TypeName;
use oopish_validator::{Declaration, Validator, ValidatorError, ValidatorRegistry};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

#[derive(Default)]
struct SampleValidator;

impl Validator for SampleValidator {
    const NAME: &'static str = "Sample::Validator";
}

fn model_class() -> ModelType {
    ModelType::new(TypeName::new("ModelClass").unwrap())
}

fn attr_rules() -> AttributeRules {
    AttributeRules::new(
        ["attr"],
        [
            Rule::exclusion(["a", "b", "c"]),
            Rule::inclusion(["x", "y", "z"]),
            Length::default().minimum(1).maximum(10).into(),
            Numericality::default().only_integer().into(),
            Rule::Presence,
        ],
    )
}

fn errors_for(model_type: &Arc<ModelType>, value: serde_json::Value) -> Vec<String> {
    let mut record = Record::new(Arc::clone(model_type));
    record.set("attr", value);
    record.errors().messages_for("attr").into_iter().map(String::from).collect()
}

// ── monitor ──────────────────────────────────────────────────────

#[test]
fn monitor_without_declaration_fails() {
    let mut registry = ValidatorRegistry::new();
    let mut model = model_class();
    let err = registry.monitor::<SampleValidator>(&mut model).unwrap_err();
    assert!(matches!(err, ValidatorError::DeclarationNotFound { .. }));
    assert!(!registry.is_monitoring::<SampleValidator>(&model));
}

#[test]
fn monitor_applies_declared_validations() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new().validates(attr_rules()))
        .unwrap();

    let unmonitored = Arc::new(model_class());
    assert!(errors_for(&unmonitored, json!("a")).is_empty());

    let mut model = model_class();
    registry.monitor::<SampleValidator>(&mut model).unwrap();
    let model = Arc::new(model);

    assert!(errors_for(&model, json!("b")).contains(&"is reserved".to_string()));
    assert!(errors_for(&model, json!("q")).contains(&"is not included in the list".to_string()));
    assert!(
        errors_for(&model, json!("12345678901"))
            .contains(&"is too long (maximum is 10 characters)".to_string())
    );
    assert!(errors_for(&model, json!("1.5")).contains(&"must be an integer".to_string()));
    assert!(errors_for(&model, json!(null)).contains(&"can't be blank".to_string()));
}

#[test]
fn attached_validations_match_native_ones() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new().validates(attr_rules()))
        .unwrap();

    let mut attached = model_class();
    registry.monitor::<SampleValidator>(&mut attached).unwrap();
    let attached = Arc::new(attached);

    let mut native = model_class();
    native.validates(attr_rules()).unwrap();
    let native = Arc::new(native);

    for value in [json!("a"), json!("x"), json!(""), json!("7"), json!(3), json!(null)] {
        assert_eq!(errors_for(&attached, value.clone()), errors_for(&native, value));
    }
}

#[test]
fn monitor_twice_fails_but_keeps_monitoring() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new())
        .unwrap();

    let mut model = model_class();
    registry.monitor::<SampleValidator>(&mut model).unwrap();
    let err = registry.monitor::<SampleValidator>(&mut model).unwrap_err();

    match err {
        ValidatorError::AlreadyMonitored { validator, model } => {
            assert_eq!(validator, "Sample::Validator");
            assert_eq!(model, "ModelClass");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(registry.is_monitoring::<SampleValidator>(&model));
}

#[test]
fn monitor_same_name_in_other_model_type_instance_fails() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new())
        .unwrap();

    let mut first = model_class();
    registry.attach::<SampleValidator>(&mut first).unwrap();
    let mut again = model_class();
    assert!(matches!(
        registry.attach::<SampleValidator>(&mut again),
        Err(ValidatorError::AlreadyMonitored { .. })
    ));
}

#[test]
fn one_declaration_attaches_to_many_model_types() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(
            Declaration::<SampleValidator>::new()
                .validates(AttributeRules::new(["attr"], [Rule::Presence])),
        )
        .unwrap();

    let mut book = ModelType::new(TypeName::new("Book").unwrap());
    let mut magazine = ModelType::new(TypeName::new("Magazine").unwrap());
    registry.attach::<SampleValidator>(&mut book).unwrap();
    registry.attach::<SampleValidator>(&mut magazine).unwrap();

    assert_eq!(book.validation_count(), 1);
    assert_eq!(magazine.validation_count(), 1);
    assert_eq!(
        registry.monitored::<SampleValidator>(),
        vec![book.name(), magazine.name()]
    );
}

// ── monitoring? ──────────────────────────────────────────────────

#[test]
fn is_monitoring_accepts_type_and_instance() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new())
        .unwrap();

    let model = Arc::new(model_class());
    let record = Record::new(Arc::clone(&model));
    assert!(!registry.is_monitoring::<SampleValidator>(&*model));
    assert!(!registry.is_monitoring::<SampleValidator>(&record));

    let mut monitored = model_class();
    registry.monitor::<SampleValidator>(&mut monitored).unwrap();
    let monitored = Arc::new(monitored);
    let record = Record::new(Arc::clone(&monitored));
    let as_dyn: &dyn Validatable = &record;

    assert!(registry.is_monitoring::<SampleValidator>(&*monitored));
    assert!(registry.is_monitoring::<SampleValidator>(monitored.name()));
    assert!(registry.is_monitoring::<SampleValidator>(&record));
    assert!(registry.is_monitoring::<SampleValidator>(as_dyn));
}

#[test]
fn unknown_validator_monitors_nothing() {
    let registry = ValidatorRegistry::new();
    let model = model_class();
    assert!(!registry.is_monitoring::<SampleValidator>(&model));
    assert!(registry.monitored::<SampleValidator>().is_empty());
    assert!(!registry.is_declared::<SampleValidator>());
}

// ── declare ──────────────────────────────────────────────────────

#[test]
fn declare_twice_fails() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new())
        .unwrap();
    let err = registry
        .declare(Declaration::<SampleValidator>::new())
        .unwrap_err();
    assert!(matches!(err, ValidatorError::AlreadyDeclared { .. }));
    assert!(registry.is_declared::<SampleValidator>());
}

fn declaration_with_bad_pattern() -> Declaration<SampleValidator> {
    Declaration::<SampleValidator>::new()
        .validates(AttributeRules::new(["name"], [Rule::Presence]))
        .validates(AttributeRules::new(["code"], [Format::with("(").into()]))
}

#[test]
fn declare_rejects_invalid_pattern() {
    let mut registry = ValidatorRegistry::new();
    let err = registry.declare(declaration_with_bad_pattern()).unwrap_err();
    assert!(matches!(
        err,
        ValidatorError::Model(ModelError::InvalidPattern { .. })
    ));
    assert!(!registry.is_declared::<SampleValidator>());
}

#[test]
fn declare_rejects_invalid_pattern_inside_group() {
    let mut registry = ValidatorRegistry::new();
    let err = registry
        .declare(Declaration::<SampleValidator>::new().with_options(
            RuleOptions::default().allowing_blank(),
            |group| group.validates(AttributeRules::new(["code"], [Format::with("[").into()])),
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        ValidatorError::Model(ModelError::InvalidPattern { .. })
    ));
}

#[test]
fn rejected_declaration_leaves_model_type_untouched() {
    let mut registry = ValidatorRegistry::new();
    assert!(registry.declare(declaration_with_bad_pattern()).is_err());

    let mut model = model_class();
    for _ in 0..2 {
        let err = registry.attach::<SampleValidator>(&mut model).unwrap_err();
        assert!(matches!(err, ValidatorError::DeclarationNotFound { .. }));
        assert_eq!(model.validation_count(), 0);
        assert!(!registry.is_monitoring::<SampleValidator>(&model));
    }
}

#[test]
fn corrected_declaration_is_accepted_after_rejection() {
    let mut registry = ValidatorRegistry::new();
    assert!(registry.declare(declaration_with_bad_pattern()).is_err());
    registry
        .declare(
            Declaration::<SampleValidator>::new()
                .validates(AttributeRules::new(["code"], [Format::with("^[a-z]+$").into()])),
        )
        .unwrap();

    let mut model = model_class();
    registry.attach::<SampleValidator>(&mut model).unwrap();
    assert_eq!(model.validation_count(), 1);
    assert!(registry.is_monitoring::<SampleValidator>(&model));
}

#[derive(Default)]
struct ClashingValidator;

impl Validator for ClashingValidator {
    const NAME: &'static str = "Sample_Validator";
}

#[test]
fn injection_name_conflict_is_rejected() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new())
        .unwrap();
    let err = registry
        .declare(Declaration::<ClashingValidator>::new())
        .unwrap_err();
    match err {
        ValidatorError::InjectionNameConflict {
            name,
            existing,
            validator,
        } => {
            assert_eq!(name, "__validator_sample_validator");
            assert_eq!(existing, "Sample::Validator");
            assert_eq!(validator, "Sample_Validator");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ── injection_name ───────────────────────────────────────────────

#[test]
fn injection_name_is_derived_from_type_name() {
    let registry = ValidatorRegistry::new();
    assert_eq!(
        registry.injection_name::<SampleValidator>(),
        "__validator_sample_validator"
    );
    assert_eq!(SampleValidator::injection_name(), "__validator_sample_validator");
}

#[test]
fn monitor_defines_accessor() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new())
        .unwrap();
    let mut model = model_class();
    registry.monitor::<SampleValidator>(&mut model).unwrap();
    assert!(model.has_accessor("__validator_sample_validator"));
}

// ── Declaration forwarding ───────────────────────────────────────

#[test]
fn with_options_group_reaches_nested_validates() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(
            Declaration::<SampleValidator>::new().with_options(
                RuleOptions::default().allowing_nil(),
                |group| group.validates(AttributeRules::new(["attr"], [Rule::Presence])),
            ),
        )
        .unwrap();
    let mut model = model_class();
    registry.monitor::<SampleValidator>(&mut model).unwrap();
    let model = Arc::new(model);

    assert!(Record::new(Arc::clone(&model)).valid());
    assert_eq!(errors_for(&model, json!("")), vec!["can't be blank"]);
}

#[test]
fn validates_with_is_forwarded() {
    let mut registry = ValidatorRegistry::new();
    registry
        .declare(Declaration::<SampleValidator>::new().validates_with(
            |record: &dyn Validatable, errors: &mut Errors| {
                if record.read_attribute("attr").is_none() {
                    errors.add("base", "attr is missing");
                }
            },
        ))
        .unwrap();
    let mut model = model_class();
    registry.monitor::<SampleValidator>(&mut model).unwrap();
    let record = Record::new(Arc::new(model));
    assert_eq!(record.errors().full_messages(), vec!["attr is missing"]);
}

#[test]
fn error_messages() {
    let err = ValidatorError::DeclarationNotFound {
        validator: "Sample::Validator".into(),
    };
    assert_eq!(err.to_string(), "Sample::Validator has no declaration");
}
