//! Rule descriptors: the metadata a rule predicate is evaluated against.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{require_non_blank, CoreError};
use crate::formatting::words::camel_case_words;
use crate::value::FieldValue;

// ---------------------------------------------------------------------------
// Option enums
// ---------------------------------------------------------------------------

/// Whether a null or empty value breaks the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredEntry {
    Yes,
    #[default]
    No,
}

impl RequiredEntry {
    pub fn is_required(self) -> bool {
        self == RequiredEntry::Yes
    }
}

/// Relation a value must satisfy against its comparand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonType {
    Equal,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    NotEqual,
}

impl ComparisonType {
    /// Phrase used in broken rule descriptions, e.g. `must be less than`.
    pub fn phrase(self) -> &'static str {
        match self {
            ComparisonType::Equal => "must be equal to",
            ComparisonType::GreaterThan => "must be greater than",
            ComparisonType::GreaterThanEqual => "must be greater than or equal to",
            ComparisonType::LessThan => "must be less than",
            ComparisonType::LessThanEqual => "must be less than or equal to",
            ComparisonType::NotEqual => "must not equal",
        }
    }

    pub fn is_satisfied_by(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::{Equal, Greater, Less};
        match self {
            ComparisonType::Equal => ordering == Equal,
            ComparisonType::GreaterThan => ordering == Greater,
            ComparisonType::GreaterThanEqual => ordering != Less,
            ComparisonType::LessThan => ordering == Less,
            ComparisonType::LessThanEqual => ordering != Greater,
            ComparisonType::NotEqual => ordering != Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeBoundaryType {
    #[default]
    Inclusive,
    Exclusive,
}

/// Built-in pattern families for the regular expression rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegularExpressionPatternType {
    #[default]
    Custom,
    Email,
    IpAddress,
    Ssn,
    Url,
    ZipCode,
}

/// Whether a blank value passes a string length rule outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowNullString {
    Yes,
    #[default]
    No,
}

/// Restrict postal code and state rules to records whose `Country`
/// property is `United States`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidateUnitedStatesOnly {
    Yes,
    #[default]
    No,
}

// ---------------------------------------------------------------------------
// RuleKind
// ---------------------------------------------------------------------------

/// Kind-specific payload of a [`RuleDescriptor`].
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Programmatic rule; the handler carries all logic.
    Custom,
    NotNull,
    Range {
        lower: FieldValue,
        lower_boundary: RangeBoundaryType,
        upper: FieldValue,
        upper_boundary: RangeBoundaryType,
        required: RequiredEntry,
    },
    CompareValue {
        comparison: ComparisonType,
        value: FieldValue,
        required: RequiredEntry,
    },
    CompareProperty {
        comparison: ComparisonType,
        compare_to: String,
        required: RequiredEntry,
    },
    ComparePassword {
        compare_to: String,
    },
    RegularExpression {
        pattern_type: RegularExpressionPatternType,
        /// Compiled custom pattern; `Some` exactly when `pattern_type` is
        /// `Custom`.
        custom: Option<Regex>,
        required: RequiredEntry,
    },
    Domain {
        values: Vec<String>,
        required: RequiredEntry,
    },
    StringLength {
        min: i32,
        max: i32,
        allow_null: AllowNullString,
    },
    CreditCardNumber {
        required: RequiredEntry,
    },
    BankRoutingNumber {
        required: RequiredEntry,
    },
    PostalCode {
        us_only: ValidateUnitedStatesOnly,
        required: RequiredEntry,
    },
    StateAbbreviation {
        us_only: ValidateUnitedStatesOnly,
        required: RequiredEntry,
    },
}

impl RuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Custom => "CustomRuleDescriptor",
            RuleKind::NotNull => "NotNullRuleDescriptor",
            RuleKind::Range { .. } => "RangeRuleDescriptor",
            RuleKind::CompareValue { .. } => "CompareValueRuleDescriptor",
            RuleKind::CompareProperty { .. } => "ComparePropertyRuleDescriptor",
            RuleKind::ComparePassword { .. } => "ComparePasswordRuleDescriptor",
            RuleKind::RegularExpression { .. } => "RegularExpressionRuleDescriptor",
            RuleKind::Domain { .. } => "DomainRuleDescriptor",
            RuleKind::StringLength { .. } => "StringLengthRuleDescriptor",
            RuleKind::CreditCardNumber { .. } => "CreditCardNumberRuleDescriptor",
            RuleKind::BankRoutingNumber { .. } => "BankRoutingNumberRuleDescriptor",
            RuleKind::PostalCode { .. } => "PostalCodeRuleDescriptor",
            RuleKind::StateAbbreviation { .. } => "StateAbbreviationRuleDescriptor",
        }
    }
}

// ---------------------------------------------------------------------------
// RuleDescriptor
// ---------------------------------------------------------------------------

/// Metadata for one declared rule on one property.
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    property_name: String,
    friendly_name: String,
    rule_set: String,
    custom_message: String,
    override_message: String,
    kind: RuleKind,
}

impl RuleDescriptor {
    /// Create a descriptor for `property_name`, which must not be blank.
    pub fn new(property_name: &str, kind: RuleKind) -> Result<Self, CoreError> {
        require_non_blank(property_name, "property_name")?;
        Ok(Self {
            property_name: property_name.to_string(),
            friendly_name: String::new(),
            rule_set: String::new(),
            custom_message: String::new(),
            override_message: String::new(),
            kind,
        })
    }

    /// Descriptor for a programmatic rule.
    pub fn custom(property_name: &str) -> Result<Self, CoreError> {
        Self::new(property_name, RuleKind::Custom)
    }

    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = friendly_name.into();
        self
    }

    /// Restrict the rule to one or more `|`-separated rule sets.
    pub fn with_rule_set(mut self, rule_set: impl Into<String>) -> Self {
        self.rule_set = rule_set.into();
        self
    }

    /// Message prefixed to the broken rule description.
    pub fn with_custom_message(mut self, message: impl Into<String>) -> Self {
        self.custom_message = message.into();
        self
    }

    /// Message that replaces the broken rule description entirely.
    pub fn with_override_message(mut self, message: impl Into<String>) -> Self {
        self.override_message = message.into();
        self
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn rule_set(&self) -> &str {
        &self.rule_set
    }

    pub fn custom_message(&self) -> &str {
        &self.custom_message
    }

    pub fn override_message(&self) -> &str {
        &self.override_message
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Explicit friendly name, or the property name split into words.
    pub fn friendly_name(&self) -> String {
        if self.friendly_name.is_empty() {
            camel_case_words(&self.property_name)
        } else {
            self.friendly_name.clone()
        }
    }

    /// Description used when a handler reports a failure without one.
    pub fn default_broken_rule_description(&self) -> String {
        format!(
            "Missing Broken Rule Description For {}",
            self.property_name
        )
    }
}
