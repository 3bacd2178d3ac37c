//! Declarative validator builders.
//!
//! Entities list these per property in
//! [`BusinessEntity::validator_attributes`](crate::entity::BusinessEntity::validator_attributes);
//! the shared rule registry turns each into a [`Validator`] bound to the
//! matching built-in predicate.
//!
//! ```
//! use ocean_core::validation::attributes::{StringLengthValidator, ValidatorAttribute, ValidatorOptions};
//!
//! let attribute: ValidatorAttribute = StringLengthValidator::min_max(1, 30)
//!     .friendly_name("Last name")
//!     .into();
//! assert_eq!(attribute.handler_name(), "StringLengthRule");
//! ```

use super::descriptor::{
    AllowNullString, ComparisonType, RangeBoundaryType, RegularExpressionPatternType,
    RequiredEntry, RuleDescriptor, RuleKind, ValidateUnitedStatesOnly,
};
use super::rules::{self, text::compile_custom_pattern};
use super::validator::{BuiltinRule, RuleType, Validator};
use crate::error::{require_non_blank, CoreError};
use crate::property::PropertyAccess;
use crate::types::UNBOUNDED;
use crate::value::{ConvertToType, FieldValue};

// ---------------------------------------------------------------------------
// Common options
// ---------------------------------------------------------------------------

/// Message and rule-set options shared by every builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeOptions {
    pub custom_message: String,
    pub override_message: String,
    pub friendly_name: String,
    pub rule_set: String,
}

impl AttributeOptions {
    fn apply(&self, descriptor: RuleDescriptor) -> RuleDescriptor {
        descriptor
            .with_custom_message(self.custom_message.clone())
            .with_override_message(self.override_message.clone())
            .with_friendly_name(self.friendly_name.clone())
            .with_rule_set(self.rule_set.clone())
    }
}

/// Chainable setters for [`AttributeOptions`].
pub trait ValidatorOptions: Sized {
    fn options_mut(&mut self) -> &mut AttributeOptions;

    fn custom_message(mut self, message: impl Into<String>) -> Self {
        self.options_mut().custom_message = message.into();
        self
    }

    fn override_message(mut self, message: impl Into<String>) -> Self {
        self.options_mut().override_message = message.into();
        self
    }

    fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.options_mut().friendly_name = name.into();
        self
    }

    fn rule_set(mut self, rule_set: impl Into<String>) -> Self {
        self.options_mut().rule_set = rule_set.into();
        self
    }
}

fn build<T: PropertyAccess + 'static>(
    options: &AttributeOptions,
    kind: Result<RuleKind, CoreError>,
    property: &str,
    handler_name: &str,
    rule: BuiltinRule,
    rule_type: RuleType,
) -> Result<Validator<T>, CoreError> {
    require_non_blank(property, "property_name")?;
    let descriptor = options.apply(RuleDescriptor::new(property, kind?)?);
    Validator::builtin(handler_name, rule, descriptor, rule_type)
}

fn convert(value: &FieldValue, convert_to: Option<ConvertToType>) -> Result<FieldValue, CoreError> {
    match (convert_to, value) {
        (Some(target), FieldValue::Text(text)) => FieldValue::parse_as(text, target),
        _ => Ok(value.clone()),
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Breaks when the property is null.
#[derive(Debug, Clone, Default)]
pub struct NotNullValidator {
    options: AttributeOptions,
}

impl NotNullValidator {
    pub fn new() -> Self {
        Self::default()
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        Ok(RuleKind::NotNull)
    }
}

/// Requires the value to fall between two bounds.
#[derive(Debug, Clone)]
pub struct RangeValidator {
    options: AttributeOptions,
    lower: FieldValue,
    lower_boundary: RangeBoundaryType,
    upper: FieldValue,
    upper_boundary: RangeBoundaryType,
    required: RequiredEntry,
    convert_to: Option<ConvertToType>,
}

impl RangeValidator {
    pub fn new(
        lower_boundary: RangeBoundaryType,
        lower: impl Into<FieldValue>,
        upper_boundary: RangeBoundaryType,
        upper: impl Into<FieldValue>,
        required: RequiredEntry,
    ) -> Self {
        Self {
            options: AttributeOptions::default(),
            lower: lower.into(),
            lower_boundary,
            upper: upper.into(),
            upper_boundary,
            required,
            convert_to: None,
        }
    }

    /// Bounds written as text and converted to decimals or dates when the
    /// validator is created.
    pub fn converted(
        lower_boundary: RangeBoundaryType,
        lower: &str,
        upper_boundary: RangeBoundaryType,
        upper: &str,
        required: RequiredEntry,
        convert_to: ConvertToType,
    ) -> Self {
        Self {
            convert_to: Some(convert_to),
            ..Self::new(lower_boundary, lower, upper_boundary, upper, required)
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        Ok(RuleKind::Range {
            lower: convert(&self.lower, self.convert_to)?,
            lower_boundary: self.lower_boundary,
            upper: convert(&self.upper, self.convert_to)?,
            upper_boundary: self.upper_boundary,
            required: self.required,
        })
    }
}

/// Compares the value against a constant.
#[derive(Debug, Clone)]
pub struct CompareValueValidator {
    options: AttributeOptions,
    comparison: ComparisonType,
    value: FieldValue,
    required: RequiredEntry,
    convert_to: Option<ConvertToType>,
}

impl CompareValueValidator {
    pub fn new(
        comparison: ComparisonType,
        value: impl Into<FieldValue>,
        required: RequiredEntry,
    ) -> Self {
        Self {
            options: AttributeOptions::default(),
            comparison,
            value: value.into(),
            required,
            convert_to: None,
        }
    }

    /// Comparand written as text and converted when the validator is created.
    pub fn converted(
        comparison: ComparisonType,
        value: &str,
        convert_to: ConvertToType,
        required: RequiredEntry,
    ) -> Self {
        Self {
            convert_to: Some(convert_to),
            ..Self::new(comparison, value, required)
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        Ok(RuleKind::CompareValue {
            comparison: self.comparison,
            value: convert(&self.value, self.convert_to)?,
            required: self.required,
        })
    }
}

/// Compares the value against another property of the same entity.
#[derive(Debug, Clone)]
pub struct ComparePropertyValidator {
    options: AttributeOptions,
    comparison: ComparisonType,
    compare_to: String,
    required: RequiredEntry,
}

impl ComparePropertyValidator {
    pub fn new(comparison: ComparisonType, compare_to: &str, required: RequiredEntry) -> Self {
        Self {
            options: AttributeOptions::default(),
            comparison,
            compare_to: compare_to.to_string(),
            required,
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        require_non_blank(&self.compare_to, "compare_to")?;
        Ok(RuleKind::CompareProperty {
            comparison: self.comparison,
            compare_to: self.compare_to.clone(),
            required: self.required,
        })
    }
}

/// Requires a confirmation property to equal the original.
#[derive(Debug, Clone)]
pub struct ComparePasswordValidator {
    options: AttributeOptions,
    compare_to: String,
}

impl ComparePasswordValidator {
    pub fn new(compare_to: &str) -> Self {
        Self {
            options: AttributeOptions::default(),
            compare_to: compare_to.to_string(),
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        require_non_blank(&self.compare_to, "compare_to")?;
        Ok(RuleKind::ComparePassword {
            compare_to: self.compare_to.clone(),
        })
    }
}

/// Matches the value against a built-in or custom pattern.
#[derive(Debug, Clone)]
pub struct RegularExpressionValidator {
    options: AttributeOptions,
    pattern_type: RegularExpressionPatternType,
    custom_pattern: String,
    required: RequiredEntry,
}

impl RegularExpressionValidator {
    pub fn new(pattern_type: RegularExpressionPatternType, required: RequiredEntry) -> Self {
        Self {
            options: AttributeOptions::default(),
            pattern_type,
            custom_pattern: String::new(),
            required,
        }
    }

    pub fn custom(pattern: &str, required: RequiredEntry) -> Self {
        Self {
            custom_pattern: pattern.to_string(),
            ..Self::new(RegularExpressionPatternType::Custom, required)
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        let custom = match self.pattern_type {
            RegularExpressionPatternType::Custom => {
                Some(compile_custom_pattern(&self.custom_pattern)?)
            }
            _ => None,
        };
        Ok(RuleKind::RegularExpression {
            pattern_type: self.pattern_type,
            custom,
            required: self.required,
        })
    }
}

/// Restricts the value to a list of acceptable values.
#[derive(Debug, Clone)]
pub struct DomainValidator {
    options: AttributeOptions,
    values: Vec<String>,
    required: RequiredEntry,
}

impl DomainValidator {
    pub fn new<I, S>(required: RequiredEntry, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: AttributeOptions::default(),
            values: values.into_iter().map(Into::into).collect(),
            required,
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        Ok(RuleKind::Domain {
            values: self.values.clone(),
            required: self.required,
        })
    }
}

/// Bounds the character count of a text value. A bound of
/// [`UNBOUNDED`] (or any value below one) is not checked.
#[derive(Debug, Clone)]
pub struct StringLengthValidator {
    options: AttributeOptions,
    min: i32,
    max: i32,
    allow_null: AllowNullString,
}

impl StringLengthValidator {
    pub fn new(min: i32, max: i32, allow_null: AllowNullString) -> Self {
        Self {
            options: AttributeOptions::default(),
            min,
            max,
            allow_null,
        }
    }

    pub fn max(max: i32) -> Self {
        Self::new(UNBOUNDED, max, AllowNullString::No)
    }

    pub fn min_max(min: i32, max: i32) -> Self {
        Self::new(min, max, AllowNullString::No)
    }

    pub fn max_allow_null(max: i32, allow_null: AllowNullString) -> Self {
        Self::new(UNBOUNDED, max, allow_null)
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        if self.max < self.min {
            return Err(CoreError::InvalidArgument {
                name: "max",
                reason: "must be greater than or equal to the minimum length".to_string(),
            });
        }
        Ok(RuleKind::StringLength {
            min: self.min,
            max: self.max,
            allow_null: self.allow_null,
        })
    }
}

/// Digits-only value with a valid Luhn checksum.
#[derive(Debug, Clone)]
pub struct CreditCardNumberValidator {
    options: AttributeOptions,
    required: RequiredEntry,
}

impl CreditCardNumberValidator {
    pub fn new(required: RequiredEntry) -> Self {
        Self {
            options: AttributeOptions::default(),
            required,
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        Ok(RuleKind::CreditCardNumber {
            required: self.required,
        })
    }
}

/// Nine-digit ABA routing number with a valid checksum.
#[derive(Debug, Clone)]
pub struct BankRoutingNumberValidator {
    options: AttributeOptions,
    required: RequiredEntry,
}

impl BankRoutingNumberValidator {
    pub fn new(required: RequiredEntry) -> Self {
        Self {
            options: AttributeOptions::default(),
            required,
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        Ok(RuleKind::BankRoutingNumber {
            required: self.required,
        })
    }
}

/// Five or nine digit ZIP code.
#[derive(Debug, Clone)]
pub struct PostalCodeValidator {
    options: AttributeOptions,
    us_only: ValidateUnitedStatesOnly,
    required: RequiredEntry,
}

impl PostalCodeValidator {
    pub fn new(us_only: ValidateUnitedStatesOnly, required: RequiredEntry) -> Self {
        Self {
            options: AttributeOptions::default(),
            us_only,
            required,
        }
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        Ok(RuleKind::PostalCode {
            us_only: self.us_only,
            required: self.required,
        })
    }
}

/// Two-letter state, territory or military mail code.
#[derive(Debug, Clone)]
pub struct StateAbbreviationValidator {
    options: AttributeOptions,
    us_only: ValidateUnitedStatesOnly,
    required: RequiredEntry,
}

impl StateAbbreviationValidator {
    pub fn new(required: RequiredEntry) -> Self {
        Self {
            options: AttributeOptions::default(),
            us_only: ValidateUnitedStatesOnly::No,
            required,
        }
    }

    pub fn us_only(mut self, us_only: ValidateUnitedStatesOnly) -> Self {
        self.us_only = us_only;
        self
    }

    fn kind(&self) -> Result<RuleKind, CoreError> {
        Ok(RuleKind::StateAbbreviation {
            us_only: self.us_only,
            required: self.required,
        })
    }
}

// ---------------------------------------------------------------------------
// ValidatorAttribute
// ---------------------------------------------------------------------------

macro_rules! validator_attributes {
    ($($variant:ident($builder:ident) => $handler:literal, $rule:path;)*) => {
        /// Any declarative validator, as listed in an entity's property table.
        #[derive(Debug, Clone)]
        pub enum ValidatorAttribute {
            $($variant($builder),)*
        }

        impl ValidatorAttribute {
            /// Name of the predicate the attribute binds to.
            pub fn handler_name(&self) -> &'static str {
                match self {
                    $(ValidatorAttribute::$variant(_) => $handler,)*
                }
            }

            /// Build a validator for `property` with the given rule type.
            pub fn create_as<T: PropertyAccess + 'static>(
                &self,
                property: &str,
                rule_type: RuleType,
            ) -> Result<Validator<T>, CoreError> {
                match self {
                    $(ValidatorAttribute::$variant(b) => {
                        build(&b.options, b.kind(), property, $handler, $rule, rule_type)
                    })*
                }
            }

            /// Build an attribute validator for `property`.
            pub fn create<T: PropertyAccess + 'static>(
                &self,
                property: &str,
            ) -> Result<Validator<T>, CoreError> {
                self.create_as(property, RuleType::Attribute)
            }
        }

        $(
            impl ValidatorOptions for $builder {
                fn options_mut(&mut self) -> &mut AttributeOptions {
                    &mut self.options
                }
            }

            impl $builder {
                /// Build an attribute validator for `property`.
                pub fn create<T: PropertyAccess + 'static>(
                    &self,
                    property: &str,
                ) -> Result<Validator<T>, CoreError> {
                    build(&self.options, self.kind(), property, $handler, $rule, RuleType::Attribute)
                }
            }

            impl From<$builder> for ValidatorAttribute {
                fn from(builder: $builder) -> Self {
                    ValidatorAttribute::$variant(builder)
                }
            }
        )*
    };
}

validator_attributes! {
    NotNull(NotNullValidator) => "NotNullRule", rules::not_null_rule;
    Range(RangeValidator) => "InRangeRule", rules::in_range_rule;
    CompareValue(CompareValueValidator) => "CompareValueRule", rules::compare_value_rule;
    CompareProperty(ComparePropertyValidator) => "ComparePropertyRule", rules::compare_property_rule;
    ComparePassword(ComparePasswordValidator) => "ComparePasswordRule", rules::compare_password_rule;
    RegularExpression(RegularExpressionValidator) => "RegularExpressionRule", rules::regular_expression_rule;
    Domain(DomainValidator) => "DomainRule", rules::domain_rule;
    StringLength(StringLengthValidator) => "StringLengthRule", rules::string_length_rule;
    CreditCardNumber(CreditCardNumberValidator) => "CreditCardNumberRule", rules::credit_card_number_rule;
    BankRoutingNumber(BankRoutingNumberValidator) => "BankRoutingNumberRule", rules::bank_routing_number_rule;
    PostalCode(PostalCodeValidator) => "PostalCodeRule", rules::postal_code_rule;
    StateAbbreviation(StateAbbreviationValidator) => "StateAbbreviationRule", rules::state_abbreviation_rule;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::test_support::Record;
    use crate::validation::validator::Verdict;
    use assert_matches::assert_matches;
    use rust_decimal::Decimal;

    #[test]
    fn options_flow_into_descriptor() {
        let v: Validator<Record> = StringLengthValidator::max(5)
            .custom_message("Too long")
            .override_message("Shorten it")
            .friendly_name("Handle")
            .rule_set("Insert")
            .create("UserName")
            .unwrap();

        let d = v.descriptor();
        assert_eq!(d.custom_message(), "Too long");
        assert_eq!(d.override_message(), "Shorten it");
        assert_eq!(d.friendly_name(), "Handle");
        assert_eq!(d.rule_set(), "Insert");
        assert_eq!(v.rule_type(), RuleType::Attribute);
        assert!(v.rule_name().starts_with("rule://StringLengthRule/UserName-"));
    }

    #[test]
    fn attribute_validators_evaluate_their_rule() {
        let attribute: ValidatorAttribute = NotNullValidator::new().into();
        let v: Validator<Record> = attribute.create("Name").unwrap();

        let r = Record::default().with("Name", FieldValue::Null);
        assert_eq!(v.invoke(&r).unwrap(), Verdict::broken("Name is null."));
    }

    #[test]
    fn instance_rule_type_changes_rule_name() {
        let attribute: ValidatorAttribute =
            DomainValidator::new(RequiredEntry::Yes, ["A", "B"]).into();
        let v: Validator<Record> = attribute.create_as("Grade", RuleType::Instance).unwrap();
        assert!(v.rule_name().starts_with("rule://Instance-DomainRule/Grade-"));
    }

    #[test]
    fn converted_bounds_are_parsed() {
        let v: Validator<Record> = RangeValidator::converted(
            RangeBoundaryType::Inclusive,
            "0.5",
            RangeBoundaryType::Exclusive,
            "10.25",
            RequiredEntry::Yes,
            ConvertToType::Decimal,
        )
        .create("Rate")
        .unwrap();

        assert_matches!(
            v.descriptor().kind(),
            RuleKind::Range { lower: FieldValue::Decimal(d), .. } if *d == Decimal::new(5, 1)
        );

        let r = Record::default().with("Rate", 10.25);
        assert_eq!(
            v.invoke(&r).unwrap(),
            Verdict::broken("Rate must be less than 10.25")
        );
    }

    #[test]
    fn invalid_declarations_fail_at_creation() {
        assert_matches!(
            StringLengthValidator::min_max(10, 5).create::<Record>("Name"),
            Err(CoreError::InvalidArgument { name: "max", .. })
        );
        assert_matches!(
            RegularExpressionValidator::custom("([", RequiredEntry::No).create::<Record>("Name"),
            Err(CoreError::InvalidPattern { .. })
        );
        assert_matches!(
            RegularExpressionValidator::new(RegularExpressionPatternType::Custom, RequiredEntry::No)
                .create::<Record>("Name"),
            Err(CoreError::InvalidOperation(_))
        );
        assert_matches!(
            CompareValueValidator::converted(
                ComparisonType::Equal,
                "not a date",
                ConvertToType::Date,
                RequiredEntry::No
            )
            .create::<Record>("When"),
            Err(CoreError::InvalidArgument { .. })
        );
        assert_matches!(
            NotNullValidator::new().create::<Record>(" "),
            Err(CoreError::InvalidArgument { name: "property_name", .. })
        );
    }

    #[test]
    fn state_builder_us_only() {
        let v: Validator<Record> = StateAbbreviationValidator::new(RequiredEntry::Yes)
            .us_only(ValidateUnitedStatesOnly::Yes)
            .create("State")
            .unwrap();
        assert_matches!(
            v.descriptor().kind(),
            RuleKind::StateAbbreviation {
                us_only: ValidateUnitedStatesOnly::Yes,
                ..
            }
        );
    }
}
