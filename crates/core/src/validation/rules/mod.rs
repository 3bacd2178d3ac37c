//! Built-in rule predicates.
//!
//! Every predicate has the [`BuiltinRule`](super::validator::BuiltinRule)
//! signature: it reads the target through [`PropertyAccess`], checks the
//! descriptor kind it expects, and returns a [`Verdict`]. A descriptor of the
//! wrong kind or a missing property is a programmer error and is returned as
//! `Err`.

pub mod comparison;
pub mod domain;
pub mod states;
pub mod text;

pub use comparison::{
    compare_password_rule, compare_property_rule, compare_value_rule, in_range_rule,
    not_null_rule,
};
pub use domain::domain_rule;
pub use states::{is_valid_state_abbreviation, state_abbreviation_rule, state_name};
pub use text::{
    bank_routing_number_rule, credit_card_number_rule, postal_code_rule,
    regular_expression_rule, string_length_rule,
};

use super::descriptor::{RequiredEntry, RuleDescriptor, ValidateUnitedStatesOnly};
use super::validator::Verdict;
use crate::error::CoreError;
use crate::property::PropertyAccess;
use crate::types::{COUNTRY_PROPERTY, DEFAULT_COUNTRY_NAME};
use crate::value::FieldValue;

fn wrong_descriptor(rule: &'static str, descriptor: &RuleDescriptor) -> CoreError {
    CoreError::WrongDescriptor {
        rule,
        found: descriptor.kind().name(),
    }
}

fn required_broken(descriptor: &RuleDescriptor) -> Verdict {
    Verdict::Broken(format!(
        "{} was null or empty but is a required field.",
        descriptor.friendly_name()
    ))
}

/// Required-entry message of the text rules, which carries no period.
fn required_text_broken(descriptor: &RuleDescriptor) -> Verdict {
    Verdict::Broken(format!(
        "{} was null or empty but is a required field",
        descriptor.friendly_name()
    ))
}

/// Presence check shared by the comparison rules.
///
/// Returns `Some` when the verdict is already decided: a required value that
/// is null or blank is broken, an optional null value passes.
fn presence(
    value: &FieldValue,
    required: RequiredEntry,
    descriptor: &RuleDescriptor,
) -> Option<Verdict> {
    if required.is_required() && value.is_blank() {
        return Some(required_broken(descriptor));
    }
    if value.is_null() {
        return Some(Verdict::Passed);
    }
    None
}

/// Text content of a property for the text-only rules; `None` for null.
fn text_value(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
    rule: &str,
) -> Result<Option<String>, CoreError> {
    match target.require_property(descriptor.property_name())? {
        FieldValue::Null => Ok(None),
        FieldValue::Text(s) => Ok(Some(s)),
        other => Err(CoreError::Unsupported(format!(
            "{rule} validation rule can only be applied to text properties, {} is {}",
            descriptor.property_name(),
            other.kind()
        ))),
    }
}

/// `false` when a United States only rule should be skipped for this record.
///
/// Records without a `Country` property are skipped.
fn applies_to_country(target: &dyn PropertyAccess, us_only: ValidateUnitedStatesOnly) -> bool {
    if us_only != ValidateUnitedStatesOnly::Yes {
        return true;
    }
    match target.property(COUNTRY_PROPERTY) {
        None => false,
        Some(country) => country.as_text().as_deref() == Some(DEFAULT_COUNTRY_NAME),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::borrow::Cow;

    use indexmap::IndexMap;

    use crate::property::{PropertyAccess, PropertyMeta};
    use crate::value::FieldValue;

    /// Property bag used by the predicate tests.
    #[derive(Debug, Default)]
    pub struct Record {
        values: IndexMap<String, FieldValue>,
    }

    impl Record {
        pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
            self.values.insert(name.to_string(), value.into());
            self
        }
    }

    impl PropertyAccess for Record {
        fn properties(&self) -> Cow<'_, [PropertyMeta]> {
            Cow::Owned(
                self.values
                    .keys()
                    .map(|k| PropertyMeta::owned(k.clone(), None))
                    .collect(),
            )
        }

        fn property(&self, name: &str) -> Option<FieldValue> {
            self.values.get(name).cloned()
        }
    }
}
