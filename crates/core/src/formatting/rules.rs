//! Per-type registry of property formatting declarations.

use indexmap::IndexMap;

use super::casing::{CharacterCasing, CharacterFormat, RemoveSpace};
use crate::error::{require_non_blank, CoreError};

/// Maps property names to the [`CharacterFormat`] applied when the property
/// is assigned.
#[derive(Debug, Clone, Default)]
pub struct CharacterFormattingRulesManager {
    rules: IndexMap<String, CharacterFormat>,
}

impl CharacterFormattingRulesManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the formatting for `property`. A property may only be
    /// declared once.
    pub fn add_rule(
        &mut self,
        property: &str,
        casing: CharacterCasing,
        remove_space: RemoveSpace,
    ) -> Result<(), CoreError> {
        require_non_blank(property, "property")?;
        if self.rules.contains_key(property) {
            return Err(CoreError::InvalidArgument {
                name: "property",
                reason: format!("formatting already declared for {property}"),
            });
        }
        self.rules
            .insert(property.to_string(), CharacterFormat::new(casing, remove_space));
        Ok(())
    }

    pub fn rule_for_property(&self, property: &str) -> Result<Option<&CharacterFormat>, CoreError> {
        require_non_blank(property, "property")?;
        Ok(self.rules.get(property))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn add_and_lookup() {
        let mut mgr = CharacterFormattingRulesManager::new();
        mgr.add_rule("LastName", CharacterCasing::ProperName, RemoveSpace::MultipleSpaces)
            .unwrap();

        let format = mgr.rule_for_property("LastName").unwrap().unwrap();
        assert_eq!(format.casing, CharacterCasing::ProperName);
        assert!(mgr.rule_for_property("FirstName").unwrap().is_none());
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut mgr = CharacterFormattingRulesManager::new();
        mgr.add_rule("Code", CharacterCasing::UpperCase, RemoveSpace::None)
            .unwrap();
        assert_matches!(
            mgr.add_rule("Code", CharacterCasing::LowerCase, RemoveSpace::None),
            Err(CoreError::InvalidArgument { name: "property", .. })
        );
    }

    #[test]
    fn blank_property_is_rejected() {
        let mgr = CharacterFormattingRulesManager::new();
        assert_matches!(
            mgr.rule_for_property(" "),
            Err(CoreError::InvalidArgument { .. })
        );
    }
}
