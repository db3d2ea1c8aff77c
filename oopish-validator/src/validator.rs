use oopish_model::{Errors, Validatable};

/// A validator type: a reusable bundle of checks and conditions.
///
/// One instance is built per model instance, on first use, and reused for
/// every later validation pass of that model instance.
pub trait Validator: Default + Send + Sync + 'static {
    /// Type name, e.g. `"Admin::UserValidator"`.
    const NAME: &'static str;

    /// Accessor name on attached model types; also prefixes every proxy.
    fn injection_name() -> String {
        injection_name(Self::NAME)
    }
}

/// `"Admin::UserValidator"` -> `"__validator_admin_uservalidator"`.
pub fn injection_name(validator_name: &str) -> String {
    format!(
        "__validator_{}",
        validator_name.to_lowercase().replace("::", "_")
    )
}

/// A check method on `V`, invoked with the model instance under validation.
pub type CheckFn<V> = fn(&V, &dyn Validatable, &mut Errors);

/// A condition method on `V`, invoked with the model instance under validation.
pub type ConditionFn<V> = fn(&V, &dyn Validatable) -> bool;

/// A named check method.
pub struct Check<V> {
    name: String,
    run: CheckFn<V>,
}

impl<V> Check<V> {
    pub fn new(name: impl Into<String>, run: CheckFn<V>) -> Self {
        Self {
            name: name.into(),
            run,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn run(&self) -> CheckFn<V> {
        self.run
    }
}

impl<V> Clone for Check<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            run: self.run,
        }
    }
}

/// A named condition method.
pub struct Condition<V> {
    name: String,
    test: ConditionFn<V>,
}

impl<V> Condition<V> {
    pub fn new(name: impl Into<String>, test: ConditionFn<V>) -> Self {
        Self {
            name: name.into(),
            test,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn test(&self) -> ConditionFn<V> {
        self.test
    }
}

impl<V> Clone for Condition<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            test: self.test,
        }
    }
}

/// `if`/`unless` guards on a `validate` call.
pub struct Conditions<V> {
    pub(crate) if_: Option<Condition<V>>,
    pub(crate) unless: Option<Condition<V>>,
}

impl<V> Conditions<V> {
    /// No guards: the check always runs.
    pub fn new() -> Self {
        Self {
            if_: None,
            unless: None,
        }
    }

    /// Run the check only when `condition` holds.
    pub fn if_(mut self, condition: Condition<V>) -> Self {
        self.if_ = Some(condition);
        self
    }

    /// Skip the check when `condition` holds.
    pub fn unless(mut self, condition: Condition<V>) -> Self {
        self.unless = Some(condition);
        self
    }
}

impl<V> Default for Conditions<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for Conditions<V> {
    fn clone(&self) -> Self {
        Self {
            if_: self.if_.clone(),
            unless: self.unless.clone(),
        }
    }
}
