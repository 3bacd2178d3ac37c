//! Membership in a fixed list of acceptable values.

use super::wrong_descriptor;
use crate::error::CoreError;
use crate::property::PropertyAccess;
use crate::validation::descriptor::{RuleDescriptor, RuleKind};
use crate::validation::validator::Verdict;

pub fn domain_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::Domain { values, required } = descriptor.kind() else {
        return Err(wrong_descriptor("DomainRule", descriptor));
    };

    let value = target
        .require_property(descriptor.property_name())?
        .as_text()
        .unwrap_or_default();

    if !required.is_required() && value.is_empty() {
        return Ok(Verdict::Passed);
    }

    let lowered = value.to_lowercase();
    if values.iter().any(|v| v.to_lowercase() == lowered) {
        return Ok(Verdict::Passed);
    }

    let mut description = format!(
        "The {} did not match any of the following acceptable values.",
        descriptor.friendly_name()
    );
    for v in values {
        description.push_str(", ");
        description.push_str(v);
    }
    Ok(Verdict::Broken(description))
}
