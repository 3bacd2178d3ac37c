//! Rule-set selection.

use crate::error::CoreError;
use crate::types::{DELETE_RULE, RULE_SET_DELIMITER};

/// Whether a rule tagged `rule_set` fires while `active` is the entity's
/// active rule set.
///
/// Untagged rules fire under every rule set except `Delete`; tagged rules
/// fire when no rule set is active or when one of their `|`-separated tags
/// names the active set (case-insensitive).
pub fn rule_set_matches(active: &str, rule_set: &str) -> bool {
    let tag_blank = rule_set.trim().is_empty();

    if tag_blank && active.eq_ignore_ascii_case(DELETE_RULE) {
        return false;
    }
    if tag_blank || active.trim().is_empty() {
        return true;
    }

    rule_set
        .split(RULE_SET_DELIMITER)
        .any(|tag| tag.trim().eq_ignore_ascii_case(active))
}

/// An active rule set names exactly one set.
pub fn validate_active_rule_set(rule_set: &str) -> Result<(), CoreError> {
    if rule_set.contains(RULE_SET_DELIMITER) {
        return Err(CoreError::InvalidOperation(
            "Only one rule set can be active; the active rule set cannot contain a '|'."
                .to_string(),
        ));
    }
    Ok(())
}
