//! Business entities: rule evaluation, change tracking and notifications.
//!
//! An entity embeds an [`EntityState`] and implements [`BusinessEntity`].
//! Rules declared by the type (attribute tables and the shared hooks) are
//! built once per type into the [`SharedRules`](crate::validation::SharedRules)
//! registry; rules added with [`EntityState::add_instance_rule`] belong to one
//! instance.
//!
//! ```
//! use std::borrow::Cow;
//!
//! use ocean_core::entity::{BusinessEntity, EntityState};
//! use ocean_core::property::{PropertyAccess, PropertyMeta};
//! use ocean_core::validation::attributes::{NotNullValidator, StringLengthValidator};
//! use ocean_core::validation::ValidatorAttribute;
//! use ocean_core::value::FieldValue;
//!
//! const CONTACT_PROPERTIES: &[PropertyMeta] = &[PropertyMeta::new("Name")];
//!
//! struct Contact {
//!     name: Option<String>,
//!     state: EntityState<Contact>,
//! }
//!
//! impl PropertyAccess for Contact {
//!     fn properties(&self) -> Cow<'_, [PropertyMeta]> {
//!         Cow::Borrowed(CONTACT_PROPERTIES)
//!     }
//!
//!     fn property(&self, name: &str) -> Option<FieldValue> {
//!         (name == "Name").then(|| self.name.clone().into())
//!     }
//! }
//!
//! impl BusinessEntity for Contact {
//!     fn state(&self) -> &EntityState<Self> {
//!         &self.state
//!     }
//!
//!     fn state_mut(&mut self) -> &mut EntityState<Self> {
//!         &mut self.state
//!     }
//!
//!     fn validator_attributes() -> Vec<(&'static str, Vec<ValidatorAttribute>)> {
//!         vec![(
//!             "Name",
//!             vec![NotNullValidator::new().into(), StringLengthValidator::max(30).into()],
//!         )]
//!     }
//! }
//!
//! let mut contact = Contact { name: None, state: EntityState::new()? };
//! contact.check_all_rules()?;
//! assert!(contact.state().error()?.starts_with("Name is null."));
//!
//! contact.set_text_property("Name", Some("Ada".to_string()), |c| &mut c.name)?;
//! assert!(contact.state().is_valid()?);
//! # Ok::<(), ocean_core::error::CoreError>(())
//! ```

pub mod dynamic;
pub mod notify;
pub mod state;

pub use dynamic::DynamicEntity;
pub use notify::{PropertyChanged, PropertyChangedBus};
pub use state::{AddPropertyNamesToIndexerErrorMessage, EntityState};

use std::sync::Arc;

use indexmap::IndexMap;

use crate::audit::{self, SortByPropertyName};
use crate::error::CoreError;
use crate::formatting::casing::{CasingChecks, CharacterFormat};
use crate::formatting::rules::CharacterFormattingRulesManager;
use crate::property::PropertyAccess;
use crate::types::DELETE_RULE;
use crate::validation::attributes::ValidatorAttribute;
use crate::validation::broken::BrokenRule;
use crate::validation::descriptor::RuleDescriptor;
use crate::validation::manager::ValidationRulesManager;
use crate::validation::rule_set::rule_set_matches;
use crate::validation::shared::TypeRules;
use crate::validation::validator::{RuleHandler, Validator, Verdict};
use notify::{indexer_property, ERROR_PROPERTY, IS_NOT_VALID_PROPERTY, IS_VALID_PROPERTY};
use state::Outcome;

// ---------------------------------------------------------------------------
// Text values
// ---------------------------------------------------------------------------

/// Field types that character formatting can be applied to.
pub trait TextValue: PartialEq {
    fn format_with(self, format: &CharacterFormat, checks: &CasingChecks) -> Self;
}

impl TextValue for String {
    fn format_with(self, format: &CharacterFormat, checks: &CasingChecks) -> Self {
        format.apply_with(&self, checks)
    }
}

impl TextValue for Option<String> {
    fn format_with(self, format: &CharacterFormat, checks: &CasingChecks) -> Self {
        self.map(|text| format.apply_with(&text, checks))
    }
}

// ---------------------------------------------------------------------------
// BusinessEntity
// ---------------------------------------------------------------------------

/// An entity validated by declared and programmatic rules.
///
/// Implementors provide access to their embedded [`EntityState`] and may
/// override the declaration hooks, which run once per type when its shared
/// rules are first built.
pub trait BusinessEntity: PropertyAccess + Sized + 'static {
    fn state(&self) -> &EntityState<Self>;

    fn state_mut(&mut self) -> &mut EntityState<Self>;

    /// Validator attributes per property.
    fn validator_attributes() -> Vec<(&'static str, Vec<ValidatorAttribute>)> {
        Vec::new()
    }

    /// Character formatting per text property.
    fn character_formatting() -> Vec<(&'static str, CharacterFormat)> {
        Vec::new()
    }

    /// Add shared rules that cannot be expressed as attributes.
    fn add_shared_business_rules(
        _rules: &mut ValidationRulesManager<Self>,
    ) -> Result<(), CoreError> {
        Ok(())
    }

    fn add_shared_formatting_rules(
        _rules: &mut CharacterFormattingRulesManager,
    ) -> Result<(), CoreError> {
        Ok(())
    }

    /// Runs before a changed value is assigned.
    fn before_property_changed(&mut self, _property: &str) {}

    /// Runs after every raised change notification, including while loading.
    fn after_property_changed(&mut self, _property: &str) {}

    // -- Rule evaluation ----------------------------------------------------

    /// Evaluate every shared and instance rule whose rule set matches the
    /// active rule set.
    fn check_all_rules(&mut self) -> Result<(), CoreError> {
        let state = self.state();
        state.ensure_loaded()?;

        let shared = Arc::clone(state.shared());
        let mut outcomes = evaluate(&*self, shared.validation().validators())?;
        if let Some(instance) = self.state().instance_rules_unchecked() {
            outcomes.extend(evaluate(&*self, instance.validators())?);
        }

        let mut notifications = Vec::new();
        for outcome in &outcomes {
            if let Outcome::Broken(rule) = outcome {
                notifications.push(rule.property_name.clone());
            }
            notifications.push(indexer_property(outcome.property()));
        }

        let clear_first = self.state().active_rule_set() == DELETE_RULE;
        let state = self.state_mut();
        let mut changed = clear_first && state.clear_broken_rules();
        changed |= state.apply(outcomes);

        if changed {
            notifications.extend(
                [ERROR_PROPERTY, IS_VALID_PROPERTY, IS_NOT_VALID_PROPERTY].map(String::from),
            );
        }
        for property in &notifications {
            self.raise_property_changed(property);
        }
        Ok(())
    }

    /// Evaluate the rules declared for one property.
    fn check_rules_for_property(&mut self, property: &str) -> Result<(), CoreError> {
        self.state().ensure_loaded()?;

        let shared = Arc::clone(self.state().shared());
        let mut outcomes = evaluate(&*self, shared.validation().rules_for_property(property)?)?;
        if let Some(instance) = self.state().instance_rules_unchecked() {
            outcomes.extend(evaluate(&*self, instance.rules_for_property(property)?)?);
        }

        if self.state_mut().apply(outcomes) {
            for name in [ERROR_PROPERTY, IS_VALID_PROPERTY, IS_NOT_VALID_PROPERTY] {
                self.raise_property_changed(name);
            }
            self.raise_property_changed(&indexer_property(property));
        }
        Ok(())
    }

    /// Bind `handler` to `descriptor` as a rule of this instance only.
    fn add_instance_rule(
        &mut self,
        handler_name: &str,
        handler: RuleHandler<Self>,
        descriptor: RuleDescriptor,
    ) -> Result<(), CoreError> {
        self.state_mut()
            .add_instance_rule(handler_name, handler, descriptor)
    }

    // -- Property assignment ------------------------------------------------

    /// Publish `property` (unless loading), then run the after hook.
    fn raise_property_changed(&mut self, property: &str) {
        self.state().notify(property);
        self.after_property_changed(property);
    }

    /// Assign a field through `field`.
    ///
    /// Unchanged values are ignored. While loading the value is assigned
    /// without any side effects. Otherwise the entity is marked dirty, the
    /// hooks run around the assignment, the property's rules are checked and
    /// a change notification is raised. Returns whether the value changed.
    fn set_property<V, F>(&mut self, property: &str, value: V, field: F) -> Result<bool, CoreError>
    where
        V: PartialEq,
        F: Fn(&mut Self) -> &mut V,
    {
        if *field(&mut *self) == value {
            return Ok(false);
        }

        if self.state().is_loading() {
            *field(&mut *self) = value;
            return Ok(true);
        }

        self.state_mut().set_dirty();
        self.before_property_changed(property);
        *field(&mut *self) = value;
        self.check_rules_for_property(property)?;
        self.raise_property_changed(property);
        Ok(true)
    }

    /// Like [`set_property`](Self::set_property), applying the property's
    /// declared character formatting first with the registry's current
    /// casing checks. Formatting is skipped while loading.
    fn set_text_property<V, F>(
        &mut self,
        property: &str,
        value: V,
        field: F,
    ) -> Result<bool, CoreError>
    where
        V: TextValue,
        F: Fn(&mut Self) -> &mut V,
    {
        if *field(&mut *self) == value {
            return Ok(false);
        }

        if self.state().is_loading() {
            *field(&mut *self) = value;
            return Ok(true);
        }

        let format = self
            .state()
            .shared()
            .formatting()
            .rule_for_property(property)?
            .copied();
        let value = match format {
            Some(format) => value.format_with(&format, &self.state().casing_checks()),
            None => value,
        };
        self.set_property(property, value, field)
    }

    // -- Audit --------------------------------------------------------------

    fn audit_to_map(&self, default_value: &str) -> IndexMap<String, String> {
        audit::audit_to_map(self, default_value)
    }

    fn audit_to_string(&self, default_value: &str, delimiter: &str, include_all: bool) -> String {
        audit::audit_to_string(self, default_value, delimiter, include_all)
    }

    fn class_to_map(
        &self,
        default_value: &str,
        sort_by: SortByPropertyName,
    ) -> IndexMap<String, String> {
        audit::class_to_map(self, default_value, sort_by)
    }

    fn class_to_string(&self, delimiter: &str, sort_by: SortByPropertyName) -> String {
        audit::class_to_string(self, delimiter, sort_by)
    }
}

/// Build the shared rules for `T` from its declaration hooks.
pub(crate) fn build_type_rules<T: BusinessEntity>() -> Result<TypeRules<T>, CoreError> {
    let mut validation = ValidationRulesManager::new();
    for (property, attributes) in T::validator_attributes() {
        for attribute in attributes {
            validation.add_rule(attribute.create::<T>(property)?);
        }
    }

    let mut formatting = CharacterFormattingRulesManager::new();
    for (property, format) in T::character_formatting() {
        formatting.add_rule(property, format.casing, format.remove_space)?;
    }

    T::add_shared_business_rules(&mut validation)?;
    T::add_shared_formatting_rules(&mut formatting)?;

    Ok(TypeRules::new(validation, formatting))
}

/// Run `validators` against `entity` without touching its state.
fn evaluate<'a, E: BusinessEntity>(
    entity: &E,
    validators: impl IntoIterator<Item = &'a Validator<E>>,
) -> Result<Vec<Outcome>, CoreError> {
    let active = entity.state().active_rule_set();

    validators
        .into_iter()
        .map(|validator| {
            let descriptor = validator.descriptor();
            let property = descriptor.property_name().to_string();

            if !rule_set_matches(active, descriptor.rule_set()) {
                return Ok(Outcome::Skipped { property });
            }

            let verdict = validator.invoke(entity)?;
            tracing::trace!(
                rule = validator.rule_name(),
                passed = verdict.is_passed(),
                "Evaluated rule",
            );

            Ok(match verdict {
                Verdict::Passed => Outcome::Passed {
                    rule_name: validator.rule_name().to_string(),
                    property,
                },
                Verdict::Broken(description) => Outcome::Broken(BrokenRule::new(
                    validator.rule_name(),
                    descriptor,
                    description,
                )),
            })
        })
        .collect()
}
