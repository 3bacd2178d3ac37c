//! JSON rule declarations.
//!
//! A [`RuleSpec`] describes one validator attribute in configuration form,
//! so rule tables can be loaded from files instead of compiled in:
//!
//! ```json
//! { "property": "Email", "rule_type": "regular_expression",
//!   "pattern_type": "email", "required": "yes", "rule_set": "Insert|Update" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::attributes::{
    BankRoutingNumberValidator, ComparePasswordValidator, ComparePropertyValidator,
    CompareValueValidator, CreditCardNumberValidator, DomainValidator, NotNullValidator,
    PostalCodeValidator, RangeValidator, RegularExpressionValidator,
    StateAbbreviationValidator, StringLengthValidator, ValidatorAttribute, ValidatorOptions,
};
use super::descriptor::{
    AllowNullString, ComparisonType, RangeBoundaryType, RegularExpressionPatternType,
    RequiredEntry, ValidateUnitedStatesOnly,
};
use crate::error::{require_non_blank, CoreError};
use crate::types::UNBOUNDED;
use crate::value::{ConvertToType, FieldValue};

fn unbounded() -> i32 {
    UNBOUNDED
}

/// Kind-specific settings, tagged by `rule_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum RuleSpecKind {
    NotNull,
    Range {
        lower: Value,
        upper: Value,
        #[serde(default)]
        lower_boundary: RangeBoundaryType,
        #[serde(default)]
        upper_boundary: RangeBoundaryType,
        #[serde(default)]
        required: RequiredEntry,
        #[serde(default)]
        convert_to: Option<ConvertToType>,
    },
    CompareValue {
        comparison: ComparisonType,
        value: Value,
        #[serde(default)]
        required: RequiredEntry,
        #[serde(default)]
        convert_to: Option<ConvertToType>,
    },
    CompareProperty {
        comparison: ComparisonType,
        compare_to: String,
        #[serde(default)]
        required: RequiredEntry,
    },
    ComparePassword {
        compare_to: String,
    },
    RegularExpression {
        #[serde(default)]
        pattern_type: RegularExpressionPatternType,
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        required: RequiredEntry,
    },
    Domain {
        values: Vec<String>,
        #[serde(default)]
        required: RequiredEntry,
    },
    StringLength {
        #[serde(default = "unbounded")]
        min: i32,
        #[serde(default = "unbounded")]
        max: i32,
        #[serde(default)]
        allow_null: AllowNullString,
    },
    CreditCardNumber {
        #[serde(default)]
        required: RequiredEntry,
    },
    BankRoutingNumber {
        #[serde(default)]
        required: RequiredEntry,
    },
    PostalCode {
        #[serde(default)]
        us_only: ValidateUnitedStatesOnly,
        #[serde(default)]
        required: RequiredEntry,
    },
    StateAbbreviation {
        #[serde(default)]
        us_only: ValidateUnitedStatesOnly,
        #[serde(default)]
        required: RequiredEntry,
    },
}

/// One rule on one property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub property: String,
    #[serde(flatten)]
    pub kind: RuleSpecKind,
    #[serde(default)]
    pub rule_set: String,
    #[serde(default)]
    pub custom_message: String,
    #[serde(default)]
    pub override_message: String,
    #[serde(default)]
    pub friendly_name: String,
}

fn bound(value: &Value, convert_to: Option<ConvertToType>) -> Result<FieldValue, CoreError> {
    match (convert_to, value) {
        (Some(target), Value::String(text)) => FieldValue::parse_as(text, target),
        _ => Ok(FieldValue::from_json(value)),
    }
}

impl RuleSpec {
    /// Parse a JSON array of rule declarations.
    pub fn list_from_json(json: &str) -> Result<Vec<RuleSpec>, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("invalid rule declarations: {e}")))
    }

    /// The validator attribute this declaration describes.
    pub fn to_attribute(&self) -> Result<ValidatorAttribute, CoreError> {
        require_non_blank(&self.property, "property")?;

        let attribute: ValidatorAttribute = match &self.kind {
            RuleSpecKind::NotNull => self.options(NotNullValidator::new()).into(),
            RuleSpecKind::Range {
                lower,
                upper,
                lower_boundary,
                upper_boundary,
                required,
                convert_to,
            } => self
                .options(RangeValidator::new(
                    *lower_boundary,
                    bound(lower, *convert_to)?,
                    *upper_boundary,
                    bound(upper, *convert_to)?,
                    *required,
                ))
                .into(),
            RuleSpecKind::CompareValue {
                comparison,
                value,
                required,
                convert_to,
            } => self
                .options(CompareValueValidator::new(
                    *comparison,
                    bound(value, *convert_to)?,
                    *required,
                ))
                .into(),
            RuleSpecKind::CompareProperty {
                comparison,
                compare_to,
                required,
            } => self
                .options(ComparePropertyValidator::new(*comparison, compare_to, *required))
                .into(),
            RuleSpecKind::ComparePassword { compare_to } => {
                self.options(ComparePasswordValidator::new(compare_to)).into()
            }
            RuleSpecKind::RegularExpression {
                pattern_type,
                pattern,
                required,
            } => {
                let builder = match (pattern_type, pattern) {
                    (RegularExpressionPatternType::Custom, Some(p)) => {
                        RegularExpressionValidator::custom(p, *required)
                    }
                    _ => RegularExpressionValidator::new(*pattern_type, *required),
                };
                self.options(builder).into()
            }
            RuleSpecKind::Domain { values, required } => self
                .options(DomainValidator::new(*required, values.iter().cloned()))
                .into(),
            RuleSpecKind::StringLength {
                min,
                max,
                allow_null,
            } => self
                .options(StringLengthValidator::new(*min, *max, *allow_null))
                .into(),
            RuleSpecKind::CreditCardNumber { required } => {
                self.options(CreditCardNumberValidator::new(*required)).into()
            }
            RuleSpecKind::BankRoutingNumber { required } => {
                self.options(BankRoutingNumberValidator::new(*required)).into()
            }
            RuleSpecKind::PostalCode { us_only, required } => self
                .options(PostalCodeValidator::new(*us_only, *required))
                .into(),
            RuleSpecKind::StateAbbreviation { us_only, required } => self
                .options(StateAbbreviationValidator::new(*required).us_only(*us_only))
                .into(),
        };

        Ok(attribute)
    }

    /// Every property the rule reads: its own and any comparison target.
    pub fn referenced_properties(&self) -> Vec<&str> {
        let mut names = vec![self.property.as_str()];
        match &self.kind {
            RuleSpecKind::CompareProperty { compare_to, .. }
            | RuleSpecKind::ComparePassword { compare_to } => names.push(compare_to),
            _ => {}
        }
        names
    }

    /// Type the rule's bounds were converted to, if any.
    pub fn convert_to(&self) -> Option<ConvertToType> {
        match &self.kind {
            RuleSpecKind::Range { convert_to, .. } | RuleSpecKind::CompareValue { convert_to, .. } => {
                *convert_to
            }
            _ => None,
        }
    }

    fn options<B: ValidatorOptions>(&self, builder: B) -> B {
        builder
            .custom_message(self.custom_message.clone())
            .override_message(self.override_message.clone())
            .friendly_name(self.friendly_name.clone())
            .rule_set(self.rule_set.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::descriptor::RuleKind;
    use crate::validation::rules::test_support::Record;
    use crate::validation::validator::Validator;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use serde_json::json;

    fn spec(value: serde_json::Value) -> RuleSpec {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_tagged_declarations() {
        let specs = RuleSpec::list_from_json(
            r#"[
                {"property": "Email", "rule_type": "regular_expression",
                 "pattern_type": "email", "required": "yes", "rule_set": "Insert|Update"},
                {"property": "UserName", "rule_type": "string_length", "min": 1, "max": 25},
                {"property": "Age", "rule_type": "range", "lower": 18, "upper": 65}
            ]"#,
        )
        .unwrap();

        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].rule_set, "Insert|Update");
        assert_matches!(
            specs[1].kind,
            RuleSpecKind::StringLength {
                min: 1,
                max: 25,
                allow_null: AllowNullString::No
            }
        );
        assert_matches!(
            specs[2].kind,
            RuleSpecKind::Range {
                lower_boundary: RangeBoundaryType::Inclusive,
                required: RequiredEntry::No,
                ..
            }
        );
    }

    #[test]
    fn string_length_defaults_to_unbounded() {
        let s = spec(json!({"property": "Notes", "rule_type": "string_length", "max": 200}));
        assert_matches!(s.kind, RuleSpecKind::StringLength { min: UNBOUNDED, max: 200, .. });
    }

    #[test]
    fn converts_date_bounds() {
        let s = spec(json!({
            "property": "StartDate",
            "rule_type": "compare_value",
            "comparison": "greater_than_equal",
            "value": "2024-01-01",
            "convert_to": "date"
        }));
        let v: Validator<Record> = s.to_attribute().unwrap().create("StartDate").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_matches!(
            v.descriptor().kind(),
            RuleKind::CompareValue { value: FieldValue::Date(d), .. } if *d == expected
        );
    }

    #[test]
    fn carries_messages() {
        let s = spec(json!({
            "property": "State",
            "rule_type": "state_abbreviation",
            "required": "yes",
            "override_message": "Pick a state",
            "friendly_name": "Home state"
        }));
        let v: Validator<Record> = s.to_attribute().unwrap().create("State").unwrap();
        assert_eq!(v.descriptor().override_message(), "Pick a state");
        assert_eq!(v.descriptor().friendly_name(), "Home state");
    }

    #[test]
    fn rejects_unknown_rule_types_and_blank_properties() {
        assert!(RuleSpec::list_from_json(r#"[{"property": "A", "rule_type": "mystery"}]"#).is_err());

        let s = spec(json!({"property": " ", "rule_type": "not_null"}));
        assert_matches!(s.to_attribute(), Err(CoreError::InvalidArgument { .. }));
    }
}
