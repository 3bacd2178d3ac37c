//! Presence, range and comparison predicates.

use super::{presence, wrong_descriptor};
use crate::error::CoreError;
use crate::formatting::words::camel_case_words;
use crate::property::PropertyAccess;
use crate::validation::descriptor::{ComparisonType, RangeBoundaryType, RuleDescriptor, RuleKind};
use crate::validation::validator::Verdict;
use crate::value::FieldValue;

fn compare_with(
    source: &FieldValue,
    against: &FieldValue,
    comparison: ComparisonType,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let ordering = source.compare(against)?;
    if comparison.is_satisfied_by(ordering) {
        return Ok(Verdict::Passed);
    }
    Ok(Verdict::Broken(format!(
        "{} {} {}.",
        descriptor.friendly_name(),
        comparison.phrase(),
        against
    )))
}

pub fn not_null_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::NotNull = descriptor.kind() else {
        return Err(wrong_descriptor("NotNullRule", descriptor));
    };

    if target.require_property(descriptor.property_name())?.is_null() {
        return Ok(Verdict::Broken(format!(
            "{} is null.",
            descriptor.friendly_name()
        )));
    }
    Ok(Verdict::Passed)
}

pub fn in_range_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::Range {
        lower,
        lower_boundary,
        upper,
        upper_boundary,
        required,
    } = descriptor.kind()
    else {
        return Err(wrong_descriptor("InRangeRule", descriptor));
    };

    let source = target.require_property(descriptor.property_name())?;
    if let Some(verdict) = presence(&source, *required, descriptor) {
        return Ok(verdict);
    }

    let friendly = descriptor.friendly_name();

    let lower_ordering = source.compare(lower)?;
    match lower_boundary {
        RangeBoundaryType::Inclusive if lower_ordering.is_lt() => {
            return Ok(Verdict::Broken(format!(
                "{friendly} must be greater than or equal to {lower}"
            )));
        }
        RangeBoundaryType::Exclusive if lower_ordering.is_le() => {
            return Ok(Verdict::Broken(format!(
                "{friendly} must be greater than {lower}"
            )));
        }
        _ => {}
    }

    let upper_ordering = source.compare(upper)?;
    match upper_boundary {
        RangeBoundaryType::Inclusive if upper_ordering.is_gt() => Ok(Verdict::Broken(format!(
            "{friendly} must be less than or equal to {upper}"
        ))),
        RangeBoundaryType::Exclusive if upper_ordering.is_ge() => Ok(Verdict::Broken(format!(
            "{friendly} must be less than {upper}"
        ))),
        _ => Ok(Verdict::Passed),
    }
}

pub fn compare_value_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::CompareValue {
        comparison,
        value,
        required,
    } = descriptor.kind()
    else {
        return Err(wrong_descriptor("CompareValueRule", descriptor));
    };

    let source = target.require_property(descriptor.property_name())?;
    if let Some(verdict) = presence(&source, *required, descriptor) {
        return Ok(verdict);
    }

    compare_with(&source, value, *comparison, descriptor)
}

pub fn compare_property_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::CompareProperty {
        comparison,
        compare_to,
        required,
    } = descriptor.kind()
    else {
        return Err(wrong_descriptor("ComparePropertyRule", descriptor));
    };

    let source = target.require_property(descriptor.property_name())?;
    if let Some(verdict) = presence(&source, *required, descriptor) {
        return Ok(verdict);
    }

    let against = target.require_property(compare_to)?;
    if against.is_null() {
        return Ok(Verdict::Passed);
    }

    compare_with(&source, &against, *comparison, descriptor)
}

pub fn compare_password_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::ComparePassword { compare_to } = descriptor.kind() else {
        return Err(wrong_descriptor("ComparePasswordRule", descriptor));
    };

    let source = target.require_property(descriptor.property_name())?;
    if source.is_null() {
        return Ok(Verdict::Passed);
    }
    let against = target.require_property(compare_to)?;
    if against.is_null() {
        return Ok(Verdict::Passed);
    }

    if source.compare(&against)?.is_eq() {
        return Ok(Verdict::Passed);
    }
    Ok(Verdict::Broken(format!(
        "{} must be equal to {}.",
        descriptor.friendly_name(),
        camel_case_words(compare_to)
    )))
}
