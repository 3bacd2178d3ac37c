//! Property-keyed rule collections.

use std::fmt;

use indexmap::IndexMap;

use super::descriptor::RuleDescriptor;
use super::validator::{RuleHandler, RuleType, Validator};
use crate::error::{require_non_blank, CoreError};

/// Ordered collection of validators grouped by property name.
///
/// Used both for the per-type shared rules and for an entity's instance
/// rules. Properties and the rules within each property keep registration
/// order.
pub struct ValidationRulesManager<T> {
    rules: IndexMap<String, Vec<Validator<T>>>,
}

impl<T> fmt::Debug for ValidationRulesManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.rules.iter()).finish()
    }
}

impl<T> Default for ValidationRulesManager<T> {
    fn default() -> Self {
        Self {
            rules: IndexMap::new(),
        }
    }
}

impl<T> Clone for ValidationRulesManager<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<T: 'static> ValidationRulesManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `validator` under its descriptor's property.
    pub fn add_rule(&mut self, validator: Validator<T>) {
        self.rules
            .entry(validator.descriptor().property_name().to_string())
            .or_default()
            .push(validator);
    }

    /// Register `validator` under an explicit property name.
    pub fn add_rule_for_property(
        &mut self,
        property: &str,
        validator: Validator<T>,
    ) -> Result<(), CoreError> {
        self.rules_for_property_mut(property)?.push(validator);
        Ok(())
    }

    /// Bind `handler` to `descriptor` and register it.
    pub fn add_handler(
        &mut self,
        handler_name: &str,
        handler: RuleHandler<T>,
        descriptor: RuleDescriptor,
        rule_type: RuleType,
    ) -> Result<(), CoreError> {
        let validator = Validator::new(handler_name, handler, descriptor, rule_type)?;
        self.add_rule(validator);
        Ok(())
    }

    /// Rules declared for `property`; empty when none are.
    pub fn rules_for_property(&self, property: &str) -> Result<&[Validator<T>], CoreError> {
        require_non_blank(property, "property")?;
        Ok(self.rules.get(property).map(Vec::as_slice).unwrap_or_default())
    }

    /// Mutable rule list for `property`, created on first use.
    pub fn rules_for_property_mut(
        &mut self,
        property: &str,
    ) -> Result<&mut Vec<Validator<T>>, CoreError> {
        require_non_blank(property, "property")?;
        Ok(self.rules.entry(property.to_string()).or_default())
    }
}

impl<T> ValidationRulesManager<T> {
    /// Each property with its rules, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Validator<T>])> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every validator, grouped by property in registration order.
    pub fn validators(&self) -> impl Iterator<Item = &Validator<T>> {
        self.rules.values().flatten()
    }

    /// Total number of validators.
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn property_count(&self) -> usize {
        self.rules.len()
    }
}
