//! Rule declaration, registration and evaluation.

pub mod attributes;
pub mod broken;
pub mod descriptor;
pub mod manager;
pub mod rule_set;
pub mod rules;
pub mod shared;
pub mod spec;
pub mod validator;

pub use attributes::{ValidatorAttribute, ValidatorOptions};
pub use broken::BrokenRule;
pub use descriptor::{
    AllowNullString, ComparisonType, RangeBoundaryType, RegularExpressionPatternType,
    RequiredEntry, RuleDescriptor, RuleKind, ValidateUnitedStatesOnly,
};
pub use manager::ValidationRulesManager;
pub use rule_set::rule_set_matches;
pub use shared::{SharedRules, TypeRules};
pub use spec::RuleSpec;
pub use validator::{RuleHandler, RuleType, Validator, Verdict};
