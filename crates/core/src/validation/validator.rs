//! A rule descriptor bound to its predicate.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::descriptor::RuleDescriptor;
use crate::error::{require_non_blank, CoreError};
use crate::property::PropertyAccess;

/// Outcome of evaluating one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    /// The rule is broken; carries the human-readable description.
    Broken(String),
}

impl Verdict {
    pub fn broken(description: impl Into<String>) -> Self {
        Verdict::Broken(description.into())
    }

    /// `Passed` when `passed`, otherwise broken with the descriptor's
    /// default description.
    pub fn check(passed: bool, descriptor: &RuleDescriptor) -> Self {
        if passed {
            Verdict::Passed
        } else {
            Verdict::Broken(descriptor.default_broken_rule_description())
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed)
    }
}

/// Where a rule was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// Added programmatically to the per-type registry.
    Shared,
    /// Added to a single entity instance.
    Instance,
    /// Declared in the entity's validator attribute table.
    Attribute,
}

/// Predicate over a target entity.
pub type RuleHandler<T> =
    Arc<dyn Fn(&T, &RuleDescriptor) -> Result<Verdict, CoreError> + Send + Sync>;

/// Built-in predicate that only needs property access.
pub type BuiltinRule = fn(&dyn PropertyAccess, &RuleDescriptor) -> Result<Verdict, CoreError>;

/// A [`RuleDescriptor`] bound to a handler, with a unique rule name.
pub struct Validator<T> {
    handler_name: String,
    handler: RuleHandler<T>,
    descriptor: RuleDescriptor,
    rule_type: RuleType,
    rule_name: String,
}

impl<T: 'static> Validator<T> {
    pub fn new(
        handler_name: &str,
        handler: RuleHandler<T>,
        descriptor: RuleDescriptor,
        rule_type: RuleType,
    ) -> Result<Self, CoreError> {
        require_non_blank(handler_name, "handler_name")?;

        let rule_name = match rule_type {
            RuleType::Instance => format!(
                "rule://Instance-{handler_name}/{}-{}",
                descriptor.property_name(),
                Uuid::new_v4()
            ),
            RuleType::Shared | RuleType::Attribute => format!(
                "rule://{handler_name}/{}-{}",
                descriptor.property_name(),
                Uuid::new_v4()
            ),
        };

        Ok(Self {
            handler_name: handler_name.to_string(),
            handler,
            descriptor,
            rule_type,
            rule_name,
        })
    }

    /// Bind a closure as the handler.
    pub fn from_fn<F>(
        handler_name: &str,
        handler: F,
        descriptor: RuleDescriptor,
        rule_type: RuleType,
    ) -> Result<Self, CoreError>
    where
        F: Fn(&T, &RuleDescriptor) -> Result<Verdict, CoreError> + Send + Sync + 'static,
    {
        Self::new(handler_name, Arc::new(handler), descriptor, rule_type)
    }

    /// Bind one of the built-in property predicates.
    pub fn builtin(
        handler_name: &str,
        rule: BuiltinRule,
        descriptor: RuleDescriptor,
        rule_type: RuleType,
    ) -> Result<Self, CoreError>
    where
        T: PropertyAccess,
    {
        Self::from_fn(
            handler_name,
            move |target: &T, d: &RuleDescriptor| rule(target, d),
            descriptor,
            rule_type,
        )
    }

    /// Evaluate the rule against `target`.
    pub fn invoke(&self, target: &T) -> Result<Verdict, CoreError> {
        (self.handler)(target, &self.descriptor)
    }
}

impl<T> Validator<T> {
    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    }
}

impl<T> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            handler_name: self.handler_name.clone(),
            handler: Arc::clone(&self.handler),
            descriptor: self.descriptor.clone(),
            rule_type: self.rule_type,
            rule_name: self.rule_name.clone(),
        }
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rule_name", &self.rule_name)
            .field("rule_type", &self.rule_type)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Target {
        ok: bool,
    }

    fn validator(rule_type: RuleType) -> Validator<Target> {
        Validator::from_fn(
            "OkRule",
            |t: &Target, d: &RuleDescriptor| Ok(Verdict::check(t.ok, d)),
            RuleDescriptor::custom("Ok").unwrap(),
            rule_type,
        )
        .unwrap()
    }

    #[test]
    fn rule_names_are_prefixed_by_kind() {
        assert!(validator(RuleType::Shared)
            .rule_name()
            .starts_with("rule://OkRule/Ok-"));
        assert!(validator(RuleType::Attribute)
            .rule_name()
            .starts_with("rule://OkRule/Ok-"));
        assert!(validator(RuleType::Instance)
            .rule_name()
            .starts_with("rule://Instance-OkRule/Ok-"));
    }

    #[test]
    fn rule_names_are_unique() {
        assert_ne!(
            validator(RuleType::Shared).rule_name(),
            validator(RuleType::Shared).rule_name()
        );
    }

    #[test]
    fn invoke_runs_the_handler() {
        let v = validator(RuleType::Shared);
        assert_eq!(v.invoke(&Target { ok: true }).unwrap(), Verdict::Passed);
        assert_eq!(
            v.invoke(&Target { ok: false }).unwrap(),
            Verdict::Broken("Missing Broken Rule Description For Ok".to_string())
        );
    }

    #[test]
    fn blank_handler_name_is_rejected() {
        let result = Validator::<Target>::from_fn(
            " ",
            |_: &Target, _: &RuleDescriptor| Ok(Verdict::Passed),
            RuleDescriptor::custom("Ok").unwrap(),
            RuleType::Instance,
        );
        assert!(result.is_err());
    }
}
