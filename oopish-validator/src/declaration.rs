//! Deferred validation declarations.
//!
//! A [`Declaration`] records directives in order and replays them onto a
//! model type with [`Declaration::apply`]. Built-in directives are forwarded
//! to the model type unchanged; `validate` directives are rewritten to proxies
//! that reach the validator instance through the model's accessor.

use crate::validator::{Check, Condition, Conditions, Validator};
use oopish_model::{
    AttributeRules, ModelResult, ModelType, Proxy, ProxyContext, RecordValidator, RuleOptions,
    ValidateOptions,
};
use std::sync::Arc;
use tracing::{debug, warn};

enum Directive<V> {
    Validates(AttributeRules),
    ValidatesWith(Arc<dyn RecordValidator>),
    ValidatesAssociated {
        fields: Vec<String>,
        options: RuleOptions,
    },
    WithOptions {
        options: RuleOptions,
        directives: Vec<Directive<V>>,
    },
    Validate {
        check: Check<V>,
        conditions: Conditions<V>,
    },
}

/// Ordered validation directives for validator type `V`.
pub struct Declaration<V> {
    directives: Vec<Directive<V>>,
}

impl<V: Validator> Declaration<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            directives: Vec::new(),
        }
    }

    /// Forwarded to [`ModelType::validates`].
    #[must_use]
    pub fn validates(mut self, rules: AttributeRules) -> Self {
        self.directives.push(Directive::Validates(rules));
        self
    }

    /// Forwarded to [`ModelType::validates_with`]. The validator is shared by
    /// every model type the declaration is applied to.
    #[must_use]
    pub fn validates_with(mut self, validator: impl RecordValidator + 'static) -> Self {
        self.directives
            .push(Directive::ValidatesWith(Arc::new(validator)));
        self
    }

    /// Forwarded to [`ModelType::validates_associated`].
    #[must_use]
    pub fn validates_associated<F, S>(mut self, fields: F, options: RuleOptions) -> Self
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directives.push(Directive::ValidatesAssociated {
            fields: fields.into_iter().map(Into::into).collect(),
            options,
        });
        self
    }

    /// Groups directives under shared rule options. Options reach `validates`
    /// and `validates_associated`; `validate` and `validates_with` inside the
    /// group are applied as if declared outside it.
    #[must_use]
    pub fn with_options(
        mut self,
        options: RuleOptions,
        group: impl FnOnce(Declaration<V>) -> Declaration<V>,
    ) -> Self {
        let nested = group(Declaration::new());
        self.directives.push(Directive::WithOptions {
            options,
            directives: nested.directives,
        });
        self
    }

    /// Registers a check on the validator, optionally guarded by `if`/`unless`
    /// conditions on the validator.
    #[must_use]
    pub fn validate(mut self, check: Check<V>, conditions: Conditions<V>) -> Self {
        self.directives
            .push(Directive::Validate { check, conditions });
        self
    }

    /// Number of top-level directives.
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Compiles every attribute rule, including those in `with_options`
    /// groups. A declaration that passes can only fail to apply on a proxy
    /// name clash with the model type's own proxies.
    pub(crate) fn compile_rules(&self) -> ModelResult<()> {
        compile_all(&self.directives)
    }

    /// Replays every directive onto `model_type`, in declaration order.
    ///
    /// Proxies are defined at most once per name, so replaying onto a model
    /// type that already has them only adds the registrations.
    pub fn apply(&self, model_type: &mut ModelType) -> ModelResult<()> {
        apply_all(&self.directives, model_type, &RuleOptions::default())
    }
}

impl<V: Validator> Default for Declaration<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn compile_all<V>(directives: &[Directive<V>]) -> ModelResult<()> {
    for directive in directives {
        match directive {
            Directive::Validates(rules) => {
                for rule in &rules.rules {
                    rule.clone().compile()?;
                }
            }
            Directive::WithOptions { directives, .. } => compile_all(directives)?,
            _ => {}
        }
    }
    Ok(())
}

fn apply_all<V: Validator>(
    directives: &[Directive<V>],
    model_type: &mut ModelType,
    scope: &RuleOptions,
) -> ModelResult<()> {
    for directive in directives {
        match directive {
            Directive::Validates(rules) => {
                model_type
                    .with_options(scope.clone())
                    .validates(rules.clone())?;
            }
            Directive::ValidatesWith(validator) => {
                model_type.validates_with_shared(Arc::clone(validator));
            }
            Directive::ValidatesAssociated { fields, options } => {
                model_type
                    .with_options(scope.clone())
                    .validates_associated(fields.iter().cloned(), options.clone());
            }
            Directive::WithOptions {
                options,
                directives,
            } => {
                apply_all(directives, model_type, &scope.merge(options))?;
            }
            Directive::Validate { check, conditions } => {
                apply_validate(check, conditions, model_type)?;
            }
        }
    }
    Ok(())
}

fn apply_validate<V: Validator>(
    check: &Check<V>,
    conditions: &Conditions<V>,
    model_type: &mut ModelType,
) -> ModelResult<()> {
    let accessor = V::injection_name();

    let check_proxy = format!("{accessor}_validate_{}", check.name());
    model_type.define_proxy(&check_proxy, check_proxy_for(check, accessor.clone()));

    let mut options = ValidateOptions::default();
    if let Some(condition) = &conditions.if_ {
        let name = format!("{accessor}_if_{}", condition.name());
        model_type.define_proxy(&name, condition_proxy_for(condition, accessor.clone()));
        options.if_ = Some(name);
    }
    if let Some(condition) = &conditions.unless {
        let name = format!("{accessor}_unless_{}", condition.name());
        model_type.define_proxy(&name, condition_proxy_for(condition, accessor.clone()));
        options.unless = Some(name);
    }

    debug!(
        model = %model_type.name(),
        validator = V::NAME,
        check = %check_proxy,
        "Registering validate"
    );
    model_type.validate(&check_proxy, options)
}

fn check_proxy_for<V: Validator>(check: &Check<V>, accessor: String) -> Proxy {
    let run = check.run();
    Proxy::check(move |ctx, errors| {
        if let Some(validator) = validator_instance::<V>(ctx, &accessor) {
            run(&validator, ctx.instance(), errors);
        }
    })
}

fn condition_proxy_for<V: Validator>(condition: &Condition<V>, accessor: String) -> Proxy {
    let test = condition.test();
    Proxy::condition(move |ctx| {
        validator_instance::<V>(ctx, &accessor)
            .is_some_and(|validator| test(&validator, ctx.instance()))
    })
}

fn validator_instance<V: Validator>(ctx: &ProxyContext<'_>, accessor: &str) -> Option<Arc<V>> {
    let Some(instance) = ctx.accessor(accessor) else {
        warn!(
            model = %ctx.model_type().name(),
            accessor,
            "Validator accessor missing"
        );
        return None;
    };
    match instance.downcast::<V>() {
        Ok(validator) => Some(validator),
        Err(_) => {
            warn!(
                model = %ctx.model_type().name(),
                accessor,
                validator = V::NAME,
                "Accessor holds a different validator type"
            );
            None
        }
    }
}
