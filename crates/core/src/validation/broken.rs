//! Broken rule records.

use serde::{Deserialize, Serialize};

use super::descriptor::RuleDescriptor;

/// A rule that failed its last evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenRule {
    pub rule_name: String,
    pub property_name: String,
    pub description: String,
    pub custom_message: String,
    pub override_message: String,
}

impl BrokenRule {
    pub fn new(rule_name: &str, descriptor: &RuleDescriptor, description: String) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            property_name: descriptor.property_name().to_string(),
            description,
            custom_message: descriptor.custom_message().to_string(),
            override_message: descriptor.override_message().to_string(),
        }
    }

    /// Text shown to the user: the override message, else the custom
    /// message followed by the description, else the description.
    pub fn message(&self) -> String {
        if !self.override_message.trim().is_empty() {
            self.override_message.clone()
        } else if !self.custom_message.trim().is_empty() {
            format!("{} : {}", self.custom_message, self.description)
        } else {
            self.description.clone()
        }
    }
}
