//! Per-instance validation state embedded in every business entity.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::notify::{
    PropertyChanged, PropertyChangedBus, ACTIVE_RULE_SET_PROPERTY, IS_DIRTY_PROPERTY,
};
use super::{build_type_rules, BusinessEntity};
use crate::error::CoreError;
use crate::formatting::casing::{CasingChecks, CasingChecksSource};
use crate::formatting::words::camel_case_words;
use crate::validation::broken::BrokenRule;
use crate::validation::descriptor::RuleDescriptor;
use crate::validation::manager::ValidationRulesManager;
use crate::validation::rule_set::validate_active_rule_set;
use crate::validation::shared::{SharedRules, TypeRules};
use crate::validation::validator::{RuleHandler, RuleType, Validator};

/// How [`EntityState::property_error`] renders messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddPropertyNamesToIndexerErrorMessage {
    /// Every message for the property, with the property name.
    #[default]
    Yes,
    /// The first message only, with the leading property name removed.
    No,
}

/// Result of evaluating one rule during a check.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// The rule's rule set does not match the active one.
    Skipped { property: String },
    Passed { rule_name: String, property: String },
    Broken(BrokenRule),
}

impl Outcome {
    pub(crate) fn property(&self) -> &str {
        match self {
            Outcome::Skipped { property } | Outcome::Passed { property, .. } => property,
            Outcome::Broken(rule) => &rule.property_name,
        }
    }
}

// ---------------------------------------------------------------------------
// EntityState
// ---------------------------------------------------------------------------

/// Validation and change-tracking state owned by one entity.
pub struct EntityState<T> {
    active_rule_set: String,
    indexer_messages: AddPropertyNamesToIndexerErrorMessage,
    is_dirty: bool,
    is_loading: bool,
    is_duplicate_row: bool,
    marked_for_deletion: bool,
    row_number: i32,
    shared: Arc<TypeRules<T>>,
    casing_checks: CasingChecksSource,
    instance: Option<ValidationRulesManager<T>>,
    broken_rules: IndexMap<String, BrokenRule>,
    seen_properties: HashSet<String>,
    notifier: PropertyChangedBus,
}

impl<T: BusinessEntity> EntityState<T> {
    /// State backed by the process-wide shared rule registry.
    pub fn new() -> Result<Self, CoreError> {
        Self::with_registry(SharedRules::global())
    }

    /// State backed by `registry`; rules for `T` are built on first use.
    pub fn with_registry(registry: &SharedRules) -> Result<Self, CoreError> {
        let shared = registry.get_or_build(build_type_rules::<T>)?;
        Ok(Self::from_shared(shared, registry.casing_checks().clone()))
    }
}

impl<T: 'static> EntityState<T> {
    /// State over an already built set of shared rules.
    pub fn from_shared(shared: Arc<TypeRules<T>>, casing_checks: CasingChecksSource) -> Self {
        Self {
            active_rule_set: String::new(),
            indexer_messages: AddPropertyNamesToIndexerErrorMessage::default(),
            is_dirty: false,
            is_loading: false,
            is_duplicate_row: false,
            marked_for_deletion: false,
            row_number: 0,
            shared,
            casing_checks,
            instance: None,
            broken_rules: IndexMap::new(),
            seen_properties: HashSet::new(),
            notifier: PropertyChangedBus::default(),
        }
    }

    /// Bind `handler` to `descriptor` as a rule of this instance only.
    pub fn add_instance_rule(
        &mut self,
        handler_name: &str,
        handler: RuleHandler<T>,
        descriptor: RuleDescriptor,
    ) -> Result<(), CoreError> {
        let validator = Validator::new(handler_name, handler, descriptor, RuleType::Instance)?;
        self.add_instance_validator(validator)
    }

    /// Register an already built validator as an instance rule.
    pub fn add_instance_validator(&mut self, validator: Validator<T>) -> Result<(), CoreError> {
        self.ensure_loaded()?;
        tracing::debug!(
            rule = validator.rule_name(),
            property = validator.descriptor().property_name(),
            "Added instance rule",
        );
        self.instance
            .get_or_insert_with(ValidationRulesManager::new)
            .add_rule(validator);
        Ok(())
    }
}

impl<T> EntityState<T> {
    pub(crate) fn ensure_loaded(&self) -> Result<(), CoreError> {
        if self.is_loading {
            return Err(CoreError::Loading);
        }
        Ok(())
    }

    /// Publish a change notification unless the entity is loading.
    pub(crate) fn notify(&self, property: &str) {
        if !self.is_loading {
            self.notifier.publish(property);
        }
    }

    pub fn shared(&self) -> &Arc<TypeRules<T>> {
        &self.shared
    }

    /// Casing checks currently applied to formatted text properties.
    pub fn casing_checks(&self) -> Arc<CasingChecks> {
        self.casing_checks.get()
    }

    /// Rules added to this instance, if any have been.
    pub fn instance_rules(&self) -> Result<Option<&ValidationRulesManager<T>>, CoreError> {
        self.ensure_loaded()?;
        Ok(self.instance.as_ref())
    }

    pub(crate) fn instance_rules_unchecked(&self) -> Option<&ValidationRulesManager<T>> {
        self.instance.as_ref()
    }

    // -- Rule set -----------------------------------------------------------

    pub fn active_rule_set(&self) -> &str {
        &self.active_rule_set
    }

    /// Switch the active rule set. Clears every broken rule.
    ///
    /// A multi-rule-set tag such as `Insert|Update` is rejected.
    pub fn set_active_rule_set(&mut self, rule_set: impl Into<String>) -> Result<(), CoreError> {
        let rule_set = rule_set.into();
        validate_active_rule_set(&rule_set)?;
        self.ensure_loaded()?;
        self.active_rule_set = rule_set;
        self.broken_rules.clear();
        self.notify(ACTIVE_RULE_SET_PROPERTY);
        Ok(())
    }

    // -- Broken rules -------------------------------------------------------

    /// Every broken rule message, separated by a blank line.
    pub fn error(&self) -> Result<String, CoreError> {
        self.ensure_loaded()?;
        Ok(self
            .broken_rules
            .values()
            .map(BrokenRule::message)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    pub fn is_valid(&self) -> Result<bool, CoreError> {
        self.ensure_loaded()?;
        Ok(self.broken_rules.is_empty())
    }

    pub fn is_not_valid(&self) -> Result<bool, CoreError> {
        self.is_valid().map(|valid| !valid)
    }

    /// Broken rules keyed by rule name, in the order they first broke.
    pub fn validation_errors(&self) -> Result<&IndexMap<String, BrokenRule>, CoreError> {
        self.ensure_loaded()?;
        Ok(&self.broken_rules)
    }

    /// Broken rules for `property`, matched case-insensitively.
    pub fn broken_rules_for_property(&self, property: &str) -> Result<Vec<&BrokenRule>, CoreError> {
        self.ensure_loaded()?;
        Ok(self
            .broken_rules
            .values()
            .filter(|rule| rule.property_name.eq_ignore_ascii_case(property))
            .collect())
    }

    pub fn indexer_messages(&self) -> AddPropertyNamesToIndexerErrorMessage {
        self.indexer_messages
    }

    pub fn set_indexer_messages(&mut self, mode: AddPropertyNamesToIndexerErrorMessage) {
        self.indexer_messages = mode;
    }

    /// Error text shown next to `property`.
    ///
    /// The first query for a property returns an empty string so a freshly
    /// displayed form does not light up before the user touches it.
    pub fn property_error(&mut self, property: &str) -> Result<String, CoreError> {
        if self.seen_properties.insert(property.to_string()) {
            return Ok(String::new());
        }

        let rules = self.broken_rules_for_property(property)?;
        let text = match self.indexer_messages {
            AddPropertyNamesToIndexerErrorMessage::Yes => rules
                .iter()
                .map(|rule| rule.message())
                .collect::<Vec<_>>()
                .join("\n\n")
                .trim()
                .to_string(),
            AddPropertyNamesToIndexerErrorMessage::No => rules
                .first()
                .map(|rule| message_without_name(rule, property))
                .unwrap_or_default(),
        };
        Ok(text)
    }

    pub(crate) fn clear_broken_rules(&mut self) -> bool {
        let had_any = !self.broken_rules.is_empty();
        self.broken_rules.clear();
        had_any
    }

    /// Record evaluation results. Returns `true` when any broken rule was
    /// added, removed or re-broken.
    pub(crate) fn apply(&mut self, outcomes: Vec<Outcome>) -> bool {
        let mut changed = false;
        for outcome in outcomes {
            match outcome {
                Outcome::Skipped { .. } => {}
                Outcome::Passed { rule_name, .. } => {
                    changed |= self.broken_rules.shift_remove(&rule_name).is_some();
                }
                Outcome::Broken(rule) => {
                    changed = true;
                    self.broken_rules.insert(rule.rule_name.clone(), rule);
                }
            }
        }
        changed
    }

    // -- Loading and dirty tracking ------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Suspend rule checks, formatting and notifications while the entity is
    /// populated from storage.
    pub fn begin_loading(&mut self) {
        self.is_loading = true;
    }

    /// Finish loading: the entity is clean and the indexer starts over.
    pub fn end_loading(&mut self) {
        self.seen_properties.clear();
        self.is_loading = false;
        self.is_dirty = false;
        self.notify(IS_DIRTY_PROPERTY);
    }

    pub fn is_dirty(&self) -> Result<bool, CoreError> {
        self.ensure_loaded()?;
        Ok(self.is_dirty)
    }

    pub fn set_dirty(&mut self) {
        self.is_dirty = true;
        self.notify(IS_DIRTY_PROPERTY);
    }

    /// Mark the entity as persisted.
    pub fn updated(&mut self) {
        self.is_dirty = false;
        self.notify(IS_DIRTY_PROPERTY);
    }

    // -- Flags ---------------------------------------------------------------

    pub fn is_duplicate_row(&self) -> bool {
        self.is_duplicate_row
    }

    pub fn set_duplicate_row(&mut self, value: bool) {
        self.is_duplicate_row = value;
        self.notify("IsDuplicateRow");
    }

    pub fn marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    pub fn set_marked_for_deletion(&mut self, value: bool) {
        self.marked_for_deletion = value;
        self.notify("MarkedForDeletion");
    }

    pub fn row_number(&self) -> i32 {
        self.row_number
    }

    pub fn set_row_number(&mut self, row_number: i32) {
        self.row_number = row_number;
    }

    // -- Notifications --------------------------------------------------------

    pub fn subscribe(&self) -> broadcast::Receiver<PropertyChanged> {
        self.notifier.subscribe()
    }
}

impl<T> std::fmt::Debug for EntityState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityState")
            .field("active_rule_set", &self.active_rule_set)
            .field("is_dirty", &self.is_dirty)
            .field("is_loading", &self.is_loading)
            .field("row_number", &self.row_number)
            .field("broken_rules", &self.broken_rules.len())
            .finish_non_exhaustive()
    }
}

fn message_without_name(rule: &BrokenRule, property: &str) -> String {
    if !rule.override_message.is_empty() {
        return rule.override_message.clone();
    }

    let words = camel_case_words(property);
    if !rule.custom_message.trim().is_empty() {
        return format!(
            "{} : {}",
            rule.custom_message,
            rule.description.replace(&words, "")
        );
    }

    rule.description
        .strip_prefix(&words)
        .unwrap_or(rule.description.as_str())
        .to_string()
}
