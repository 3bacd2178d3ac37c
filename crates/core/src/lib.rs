//! Ocean business-entity validation engine.
//!
//! This crate provides the building blocks for validating business entities:
//!
//! - [`validation`]: rule descriptors, built-in predicates, validator
//!   builders and the per-type shared rule registry.
//! - [`entity`]: the [`BusinessEntity`] trait and the [`EntityState`] every
//!   entity embeds (broken rules, rule sets, dirty tracking, notifications).
//! - [`formatting`]: character casing and whitespace rules applied when text
//!   properties are assigned.
//! - [`audit`]: audit and class listings built from property metadata.

pub mod audit;
pub mod entity;
pub mod error;
pub mod formatting;
pub mod property;
pub mod types;
pub mod validation;
pub mod value;

pub use entity::{BusinessEntity, DynamicEntity, EntityState};
pub use error::CoreError;
pub use property::{PropertyAccess, PropertyMeta};
pub use validation::{BrokenRule, RuleDescriptor, RuleSpec, ValidatorAttribute};
pub use value::FieldValue;
