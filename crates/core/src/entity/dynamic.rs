//! Entity backed by a JSON object, for records whose shape is only known at
//! runtime.
//!
//! Rules come from [`RuleSpec`] declarations and are registered as instance
//! rules, since every record shares the one `DynamicEntity` type.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::{Map, Value};

use super::state::EntityState;
use super::BusinessEntity;
use crate::error::CoreError;
use crate::property::{PropertyAccess, PropertyMeta};
use crate::validation::shared::SharedRules;
use crate::validation::spec::RuleSpec;
use crate::validation::validator::RuleType;
use crate::value::{ConvertToType, FieldValue};

pub struct DynamicEntity {
    values: Map<String, Value>,
    properties: Vec<PropertyMeta>,
    conversions: HashMap<String, ConvertToType>,
    state: EntityState<DynamicEntity>,
}

impl DynamicEntity {
    /// Entity over `values`. Properties are declared in key order.
    pub fn new(values: Map<String, Value>) -> Result<Self, CoreError> {
        Self::with_registry(values, SharedRules::global())
    }

    pub fn with_registry(
        values: Map<String, Value>,
        registry: &SharedRules,
    ) -> Result<Self, CoreError> {
        let properties = values
            .keys()
            .map(|name| PropertyMeta::owned(name.clone(), None))
            .collect();
        Ok(Self {
            values,
            properties,
            conversions: HashMap::new(),
            state: EntityState::with_registry(registry)?,
        })
    }

    /// Entity over a JSON object; any other JSON value is rejected.
    pub fn from_json(value: Value) -> Result<Self, CoreError> {
        match value {
            Value::Object(values) => Self::new(values),
            other => Err(CoreError::Validation(format!(
                "record must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Register `specs` as instance rules.
    ///
    /// Properties a rule reads but the record lacks are declared as null, and
    /// text values of properties with converted bounds are parsed the same
    /// way the bounds were.
    pub fn with_rules(mut self, specs: &[RuleSpec]) -> Result<Self, CoreError> {
        for spec in specs {
            for name in spec.referenced_properties() {
                self.declare(name);
            }
            if let Some(target) = spec.convert_to() {
                self.conversions.insert(spec.property.clone(), target);
            }

            let validator = spec
                .to_attribute()?
                .create_as::<DynamicEntity>(&spec.property, RuleType::Instance)?;
            self.state.add_instance_validator(validator)?;
        }
        Ok(self)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }

    /// Assign `property` with the usual change tracking and rule checks.
    pub fn set_value(&mut self, property: &str, value: impl Into<Value>) -> Result<bool, CoreError> {
        self.declare(property);
        let key = property.to_string();
        let value: Value = value.into();
        self.set_property(property, value, |entity| {
            entity.values.entry(key.clone()).or_insert(Value::Null)
        })
    }

    fn declare(&mut self, name: &str) {
        if !self.values.contains_key(name) {
            self.values.insert(name.to_string(), Value::Null);
            self.properties.push(PropertyMeta::owned(name, None));
        }
    }
}

impl PropertyAccess for DynamicEntity {
    fn properties(&self) -> Cow<'_, [PropertyMeta]> {
        Cow::Borrowed(&self.properties)
    }

    fn property(&self, name: &str) -> Option<FieldValue> {
        let value = self.values.get(name)?;
        match (value, self.conversions.get(name)) {
            (Value::String(text), Some(target)) if !text.trim().is_empty() => Some(
                FieldValue::parse_as(text, *target).unwrap_or_else(|_| FieldValue::from_json(value)),
            ),
            _ => Some(FieldValue::from_json(value)),
        }
    }
}

impl BusinessEntity for DynamicEntity {
    fn state(&self) -> &EntityState<Self> {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState<Self> {
        &mut self.state
    }
}

impl std::fmt::Debug for DynamicEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicEntity")
            .field("values", &self.values)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
