//! United States state, territory and military mail code lookups.

use super::{applies_to_country, required_text_broken, text_value, wrong_descriptor};
use crate::error::CoreError;
use crate::formatting::casing::{apply_character_casing, CharacterCasing};
use crate::property::PropertyAccess;
use crate::validation::descriptor::{RuleDescriptor, RuleKind};
use crate::validation::validator::Verdict;

const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AS", "American Samoa"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FM", "Federated States of Micronesia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("GU", "Guam"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MH", "Marshall Islands"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("MP", "Northern Mariana Islands"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PW", "Palau"),
    ("PA", "Pennsylvania"),
    ("PR", "Puerto Rico"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VI", "Virgin Islands"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("AA", "Armed Forces Americas"),
    ("AE", "Armed Forces Europe"),
    ("AP", "Armed Forces Pacific"),
];

fn lookup(abbreviation: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(abbr, _)| abbr.eq_ignore_ascii_case(abbreviation))
        .map(|(_, name)| *name)
}

/// Whether `abbreviation` is a known two-letter code (case-insensitive).
pub fn is_valid_state_abbreviation(abbreviation: &str) -> bool {
    lookup(abbreviation).is_some()
}

/// Proper-cased name for a known abbreviation.
pub fn state_name(abbreviation: &str) -> Option<String> {
    lookup(abbreviation).map(|name| apply_character_casing(name, CharacterCasing::ProperName))
}

pub fn state_abbreviation_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::StateAbbreviation { us_only, required } = descriptor.kind() else {
        return Err(wrong_descriptor("StateAbbreviationRule", descriptor));
    };

    if !applies_to_country(target, *us_only) {
        return Ok(Verdict::Passed);
    }

    let state = text_value(target, descriptor, "State abbreviation")?.unwrap_or_default();
    if state.is_empty() {
        return Ok(if required.is_required() {
            required_text_broken(descriptor)
        } else {
            Verdict::Passed
        });
    }

    if is_valid_state_abbreviation(&state) {
        return Ok(Verdict::Passed);
    }
    Ok(Verdict::Broken(format!(
        "The entered value {state} is not a valid state abbreviation"
    )))
}
