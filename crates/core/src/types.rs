//! Shared constants for rule sets and message formatting.

/// Rule set active while inserting a new record.
pub const INSERT_RULE: &str = "Insert";

/// Rule set active while updating an existing record.
pub const UPDATE_RULE: &str = "Update";

/// Rule set active while deleting a record.
///
/// Under this rule set only rules explicitly tagged `Delete` are evaluated.
pub const DELETE_RULE: &str = "Delete";

/// Tag for rules that apply to inserts and updates.
pub const INSERT_UPDATE_RULE: &str = "Insert|Update";

/// Tag for rules that apply to updates and deletes.
pub const UPDATE_DELETE_RULE: &str = "Update|Delete";

/// Separator between tags in a multi-rule-set tag.
pub const RULE_SET_DELIMITER: char = '|';

/// Delimiter used when joining audit and class listings.
pub const DEFAULT_DELIMITER: &str = ", ";

/// Country value that activates United States only rules.
pub const DEFAULT_COUNTRY_NAME: &str = "United States";

/// Property probed by United States only rules.
pub const COUNTRY_PROPERTY: &str = "Country";

/// Sentinel for "no bound" on string length rules.
pub const UNBOUNDED: i32 = -1;
