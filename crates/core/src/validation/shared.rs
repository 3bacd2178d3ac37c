//! Per-type shared rule registry.
//!
//! Declared (attribute) rules, programmatic shared rules and formatting
//! declarations are identical for every instance of an entity type, so they
//! are built once per type and handed out as an `Arc`.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use super::manager::ValidationRulesManager;
use crate::error::CoreError;
use crate::formatting::casing::{CasingChecks, CasingChecksSource};
use crate::formatting::rules::CharacterFormattingRulesManager;

static GLOBAL: LazyLock<SharedRules> = LazyLock::new(SharedRules::new);

type TypeMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

fn downcast<T: 'static>(rules: Arc<dyn Any + Send + Sync>) -> Result<Arc<TypeRules<T>>, CoreError> {
    rules
        .downcast::<TypeRules<T>>()
        .map_err(|_| CoreError::Internal(format!("rules mismatch for {}", type_name::<T>())))
}

/// Rules shared by every instance of `T`.
#[derive(Debug)]
pub struct TypeRules<T> {
    validation: ValidationRulesManager<T>,
    formatting: CharacterFormattingRulesManager,
}

impl<T> TypeRules<T> {
    pub fn new(
        validation: ValidationRulesManager<T>,
        formatting: CharacterFormattingRulesManager,
    ) -> Self {
        Self {
            validation,
            formatting,
        }
    }

    pub fn validation(&self) -> &ValidationRulesManager<T> {
        &self.validation
    }

    pub fn formatting(&self) -> &CharacterFormattingRulesManager {
        &self.formatting
    }
}

/// Registry of [`TypeRules`] keyed by entity type.
///
/// Entries are created on first request and never evicted. The registry also
/// owns the casing checks that entities built from it apply to formatted
/// text properties.
#[derive(Default)]
pub struct SharedRules {
    types: Mutex<TypeMap>,
    casing_checks: CasingChecksSource,
}

impl SharedRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static SharedRules {
        &GLOBAL
    }

    /// Rules for `T`, running `build` if this is the first request.
    ///
    /// `build` runs without the registry lock held, so declaration hooks may
    /// construct entities of other types. When two callers build the same
    /// type concurrently the first insert wins and the other result is
    /// dropped. A failed build leaves no entry behind.
    pub fn get_or_build<T, F>(&self, build: F) -> Result<Arc<TypeRules<T>>, CoreError>
    where
        T: 'static,
        F: FnOnce() -> Result<TypeRules<T>, CoreError>,
    {
        if let Some(existing) = self.lock()?.get(&TypeId::of::<T>()) {
            return downcast(Arc::clone(existing));
        }

        let rules = Arc::new(build()?);

        let mut types = self.lock()?;
        if let Some(existing) = types.get(&TypeId::of::<T>()) {
            return downcast(Arc::clone(existing));
        }
        tracing::debug!(
            entity = type_name::<T>(),
            rules = rules.validation.len(),
            formatting = rules.formatting.len(),
            "Built shared rules",
        );
        types.insert(TypeId::of::<T>(), rules.clone());
        Ok(rules)
    }

    fn lock(&self) -> Result<MutexGuard<'_, TypeMap>, CoreError> {
        self.types
            .lock()
            .map_err(|_| CoreError::Internal("shared rules lock poisoned".to_string()))
    }

    pub fn casing_checks(&self) -> &CasingChecksSource {
        &self.casing_checks
    }

    /// Replace the casing checks for every entity using this registry,
    /// including ones already constructed.
    pub fn set_casing_checks(&self, checks: CasingChecks) {
        self.casing_checks.replace(checks);
    }

    /// Whether rules for `T` have been built.
    pub fn rules_exist_for<T: 'static>(&self) -> bool {
        self.types
            .lock()
            .map(|types| types.contains_key(&TypeId::of::<T>()))
            .unwrap_or(false)
    }

    /// Number of entity types with built rules.
    pub fn len(&self) -> usize {
        self.types.lock().map(|types| types.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SharedRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRules")
            .field("types", &self.len())
            .finish()
    }
}
