//! Text formatting applied to entity properties: friendly names, casing
//! and whitespace normalization.

pub mod casing;
pub mod rules;
pub mod words;

pub use casing::{
    apply_character_casing, apply_character_casing_with, CasingCheck, CasingChecks,
    CasingChecksSource, CharacterCasing, CharacterFormat, RemoveSpace,
};
pub use rules::CharacterFormattingRulesManager;
pub use words::camel_case_words;
