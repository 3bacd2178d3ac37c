//! End-to-end behaviour of a declared business entity.

use std::borrow::Cow;
use std::sync::Arc;

use assert_matches::assert_matches;
use ocean_core::audit::SortByPropertyName;
use ocean_core::entity::notify::PropertyChanged;
use ocean_core::entity::{AddPropertyNamesToIndexerErrorMessage, BusinessEntity, EntityState};
use ocean_core::error::CoreError;
use ocean_core::formatting::{CharacterCasing, CharacterFormat, RemoveSpace};
use ocean_core::property::{PropertyAccess, PropertyMeta};
use ocean_core::types::{DELETE_RULE, INSERT_RULE, INSERT_UPDATE_RULE, UPDATE_RULE};
use ocean_core::validation::attributes::{
    ComparePasswordValidator, CompareValueValidator, NotNullValidator, RangeValidator,
    RegularExpressionValidator, StateAbbreviationValidator, StringLengthValidator,
};
use ocean_core::validation::{
    AllowNullString, ComparisonType, RangeBoundaryType, RegularExpressionPatternType,
    RequiredEntry, RuleDescriptor, RuleType, ValidationRulesManager, ValidatorAttribute,
    ValidatorOptions, Verdict,
};
use ocean_core::value::FieldValue;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

const CUSTOMER_PROPERTIES: &[PropertyMeta] = &[
    PropertyMeta::new("Id"),
    PropertyMeta::audited("FirstName", 1),
    PropertyMeta::audited("Email", 2),
    PropertyMeta::new("Age"),
    PropertyMeta::new("State"),
    PropertyMeta::new("Password"),
    PropertyMeta::new("ConfirmPassword"),
];

struct Customer {
    id: i64,
    first_name: Option<String>,
    email: String,
    age: Option<i32>,
    state_code: String,
    password: String,
    confirm_password: String,
    changes: Vec<String>,
    entity: EntityState<Customer>,
}

impl Customer {
    fn valid() -> Self {
        Self {
            id: 7,
            first_name: Some("Ann".to_string()),
            email: "ann@example.com".to_string(),
            age: Some(34),
            state_code: "WA".to_string(),
            password: "s3cret".to_string(),
            confirm_password: "s3cret".to_string(),
            changes: Vec::new(),
            entity: EntityState::new().unwrap(),
        }
    }

    fn invalid() -> Self {
        Self {
            first_name: None,
            email: "not-an-email".to_string(),
            age: Some(12),
            state_code: "ZZ".to_string(),
            confirm_password: "other".to_string(),
            ..Self::valid()
        }
    }

    fn messages(&self) -> Vec<String> {
        self.state()
            .validation_errors()
            .unwrap()
            .values()
            .map(|rule| rule.message())
            .collect()
    }
}

impl PropertyAccess for Customer {
    fn properties(&self) -> Cow<'_, [PropertyMeta]> {
        Cow::Borrowed(CUSTOMER_PROPERTIES)
    }

    fn property(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "Id" => self.id.into(),
            "FirstName" => self.first_name.clone().into(),
            "Email" => self.email.as_str().into(),
            "Age" => self.age.into(),
            "State" => self.state_code.as_str().into(),
            "Password" => self.password.as_str().into(),
            "ConfirmPassword" => self.confirm_password.as_str().into(),
            _ => return None,
        };
        Some(value)
    }
}

impl BusinessEntity for Customer {
    fn state(&self) -> &EntityState<Self> {
        &self.entity
    }

    fn state_mut(&mut self) -> &mut EntityState<Self> {
        &mut self.entity
    }

    fn validator_attributes() -> Vec<(&'static str, Vec<ValidatorAttribute>)> {
        vec![
            (
                "Id",
                vec![
                    CompareValueValidator::new(ComparisonType::GreaterThan, 0, RequiredEntry::Yes)
                        .rule_set(DELETE_RULE)
                        .into(),
                ],
            ),
            (
                "FirstName",
                vec![
                    NotNullValidator::new().into(),
                    StringLengthValidator::max_allow_null(30, AllowNullString::Yes).into(),
                ],
            ),
            (
                "Email",
                vec![RegularExpressionValidator::new(
                    RegularExpressionPatternType::Email,
                    RequiredEntry::Yes,
                )
                .rule_set(INSERT_UPDATE_RULE)
                .into()],
            ),
            (
                "Age",
                vec![RangeValidator::new(
                    RangeBoundaryType::Inclusive,
                    18,
                    RangeBoundaryType::Inclusive,
                    120,
                    RequiredEntry::No,
                )
                .into()],
            ),
            (
                "State",
                vec![StateAbbreviationValidator::new(RequiredEntry::No).into()],
            ),
            (
                "ConfirmPassword",
                vec![ComparePasswordValidator::new("Password")
                    .override_message("Passwords do not match")
                    .into()],
            ),
        ]
    }

    fn character_formatting() -> Vec<(&'static str, CharacterFormat)> {
        vec![(
            "FirstName",
            CharacterFormat::new(CharacterCasing::ProperName, RemoveSpace::MultipleSpaces),
        )]
    }

    fn add_shared_business_rules(
        rules: &mut ValidationRulesManager<Self>,
    ) -> Result<(), CoreError> {
        let descriptor = RuleDescriptor::custom("Email")?.with_rule_set(INSERT_UPDATE_RULE);
        rules.add_handler(
            "BlockedDomainRule",
            Arc::new(|customer: &Customer, d: &RuleDescriptor| {
                Ok(if customer.email.ends_with("@blocked.test") {
                    Verdict::broken(format!("{} uses a blocked domain.", d.friendly_name()))
                } else {
                    Verdict::Passed
                })
            }),
            descriptor,
            RuleType::Shared,
        )
    }

    fn after_property_changed(&mut self, property: &str) {
        self.changes.push(property.to_string());
    }
}

fn drain(rx: &mut broadcast::Receiver<PropertyChanged>) -> Vec<String> {
    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(event.property);
    }
    names
}

// ---------------------------------------------------------------------------
// Rule evaluation
// ---------------------------------------------------------------------------

#[test]
fn valid_customer_has_no_broken_rules() {
    let mut customer = Customer::valid();
    customer.check_all_rules().unwrap();

    assert!(customer.state().is_valid().unwrap());
    assert!(!customer.state().is_not_valid().unwrap());
    assert_eq!(customer.state().error().unwrap(), "");
}

#[test]
fn invalid_customer_collects_every_message() {
    let mut customer = Customer::invalid();
    customer.check_all_rules().unwrap();

    assert_eq!(
        customer.messages(),
        vec![
            "First Name is null.",
            "Email did not match the required email pattern",
            "Age must be greater than or equal to 18",
            "The entered value ZZ is not a valid state abbreviation",
            "Passwords do not match",
        ]
    );
    assert!(customer.state().is_not_valid().unwrap());
}

#[test]
fn checking_twice_yields_the_same_broken_rules() {
    let mut customer = Customer::invalid();
    customer.check_all_rules().unwrap();
    let first: Vec<String> = customer
        .state()
        .validation_errors()
        .unwrap()
        .keys()
        .cloned()
        .collect();

    customer.check_all_rules().unwrap();
    let second: Vec<String> = customer
        .state()
        .validation_errors()
        .unwrap()
        .keys()
        .cloned()
        .collect();

    assert_eq!(first, second);
}

#[test]
fn validity_matches_validation_errors() {
    for mut customer in [Customer::valid(), Customer::invalid()] {
        customer.check_all_rules().unwrap();
        assert_eq!(
            customer.state().is_valid().unwrap(),
            customer.state().validation_errors().unwrap().is_empty()
        );
    }
}

#[test]
fn shared_handler_rules_run_with_attribute_rules() {
    let mut customer = Customer::valid();
    customer.email = "ann@blocked.test".to_string();
    customer.check_all_rules().unwrap();
    assert_eq!(customer.messages(), vec!["Email uses a blocked domain."]);
}

#[test]
fn rule_sets_select_rules() {
    let mut customer = Customer::invalid();
    customer.id = 0;
    customer.first_name = Some("Ann".to_string());
    customer.age = Some(40);
    customer.state_code = "WA".to_string();
    customer.confirm_password = customer.password.clone();

    for active in [INSERT_RULE, UPDATE_RULE] {
        customer.state_mut().set_active_rule_set(active).unwrap();
        customer.check_all_rules().unwrap();
        assert_eq!(
            customer.messages(),
            vec!["Email did not match the required email pattern"]
        );
    }

    customer.state_mut().set_active_rule_set(DELETE_RULE).unwrap();
    customer.check_all_rules().unwrap();
    assert_eq!(customer.messages(), vec!["Id must be greater than 0."]);
}

#[test]
fn multi_tag_active_rule_set_is_rejected() {
    let mut customer = Customer::valid();
    assert_matches!(
        customer.state_mut().set_active_rule_set(INSERT_UPDATE_RULE),
        Err(CoreError::InvalidOperation(_))
    );
}

#[test]
fn instance_rules_belong_to_one_entity() {
    let mut flagged = Customer::valid();
    flagged
        .add_instance_rule(
            "VipAgeRule",
            Arc::new(|c: &Customer, d: &RuleDescriptor| {
                Ok(Verdict::check(c.age.unwrap_or_default() >= 50, d))
            }),
            RuleDescriptor::custom("Age").unwrap(),
        )
        .unwrap();
    flagged.check_all_rules().unwrap();
    assert_eq!(
        flagged.messages(),
        vec!["Missing Broken Rule Description For Age"]
    );

    let mut other = Customer::valid();
    other.check_all_rules().unwrap();
    assert!(other.state().is_valid().unwrap());
}

// ---------------------------------------------------------------------------
// Property assignment
// ---------------------------------------------------------------------------

#[test]
fn text_properties_are_formatted_and_checked() {
    let mut customer = Customer::valid();
    customer.check_all_rules().unwrap();

    let changed = customer
        .set_text_property("FirstName", Some("ronald mcdonald".to_string()), |c| {
            &mut c.first_name
        })
        .unwrap();

    assert!(changed);
    assert_eq!(customer.first_name.as_deref(), Some("Ronald McDonald"));
    assert!(customer.state().is_dirty().unwrap());

    customer
        .set_text_property("FirstName", None, |c| &mut c.first_name)
        .unwrap();
    assert_eq!(customer.messages(), vec!["First Name is null."]);
}

#[test]
fn unchanged_values_are_ignored() {
    let mut customer = Customer::valid();
    let changed = customer.set_property("Age", Some(34), |c| &mut c.age).unwrap();
    assert!(!changed);
    assert!(!customer.state().is_dirty().unwrap());
}

#[test]
fn property_changes_notify_in_order() {
    let mut customer = Customer::valid();
    customer.check_all_rules().unwrap();
    customer.changes.clear();
    let mut rx = customer.state().subscribe();

    customer.set_property("Age", Some(12), |c| &mut c.age).unwrap();

    assert_eq!(
        drain(&mut rx),
        vec!["IsDirty", "Error", "IsValid", "IsNotValid", "Item[Age]", "Age"]
    );
    assert_eq!(
        customer.changes,
        vec!["Error", "IsValid", "IsNotValid", "Item[Age]", "Age"]
    );
}

#[test]
fn loading_suspends_rules_and_formatting() {
    let mut customer = Customer::valid();
    let mut rx = customer.state().subscribe();

    customer.state_mut().begin_loading();
    customer
        .set_text_property("FirstName", Some("lower case".to_string()), |c| {
            &mut c.first_name
        })
        .unwrap();
    customer.set_property("Age", Some(3), |c| &mut c.age).unwrap();

    assert_eq!(customer.first_name.as_deref(), Some("lower case"));
    assert_matches!(customer.check_all_rules(), Err(CoreError::Loading));
    assert_matches!(customer.state().is_valid(), Err(CoreError::Loading));
    assert!(drain(&mut rx).is_empty());

    customer.state_mut().end_loading();
    assert!(!customer.state().is_dirty().unwrap());
    assert_eq!(drain(&mut rx), vec!["IsDirty"]);

    customer.check_all_rules().unwrap();
    assert_eq!(
        customer.messages(),
        vec!["Age must be greater than or equal to 18"]
    );
}

// ---------------------------------------------------------------------------
// Indexer and audit
// ---------------------------------------------------------------------------

#[test]
fn indexer_hides_errors_until_the_second_query() {
    let mut customer = Customer::invalid();
    customer.check_all_rules().unwrap();

    assert_eq!(customer.state_mut().property_error("Age").unwrap(), "");
    assert_eq!(
        customer.state_mut().property_error("Age").unwrap(),
        "Age must be greater than or equal to 18"
    );

    customer
        .state_mut()
        .set_indexer_messages(AddPropertyNamesToIndexerErrorMessage::No);
    assert_eq!(
        customer.state_mut().property_error("Age").unwrap(),
        " must be greater than or equal to 18"
    );
}

#[test]
fn audit_listing_uses_declared_sequence() {
    let customer = Customer::valid();
    assert_eq!(
        customer.audit_to_string("none", ", ", false),
        "First Name ( FirstName ) = Ann, Email ( Email ) = ann@example.com"
    );
    let map = customer.class_to_map("none", SortByPropertyName::Yes);
    assert_eq!(map.get("Email").map(String::as_str), Some("ann@example.com"));
}
