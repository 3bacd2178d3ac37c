//! Character casing and whitespace normalization for text properties.
//!
//! Applied to text properties as they are assigned (never while an entity
//! is loading), so user input such as `"  jOHN  o'neil "` is stored as
//! `"John O'Neil"`.

use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

static MULTIPLE_SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static STANDARD_CHECKS: LazyLock<CasingChecks> = LazyLock::new(CasingChecks::standard);

/// Minimum character index at which the phone number/extension separator
/// is searched for.
const PHONE_SEPARATOR_START: usize = 8;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Casing applied to a text property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterCasing {
    #[default]
    None,
    LowerCase,
    UpperCase,
    ProperName,
    OutlookPhoneProperName,
    OutlookPhoneNoProperName,
    OutlookPhoneUpper,
}

/// Whitespace removal applied after casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveSpace {
    MultipleSpaces,
    AllSpaces,
    #[default]
    None,
}

/// Formatting declared for one text property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacterFormat {
    pub casing: CharacterCasing,
    pub remove_space: RemoveSpace,
}

impl CharacterFormat {
    pub fn new(casing: CharacterCasing, remove_space: RemoveSpace) -> Self {
        Self {
            casing,
            remove_space,
        }
    }

    /// Apply casing, then whitespace removal, using the standard casing checks.
    pub fn apply(&self, value: &str) -> String {
        self.apply_with(value, &STANDARD_CHECKS)
    }

    /// Apply casing with `checks`, then whitespace removal.
    pub fn apply_with(&self, value: &str, checks: &CasingChecks) -> String {
        let cased = if self.casing == CharacterCasing::None {
            value.to_string()
        } else {
            apply_character_casing_with(value, self.casing, checks)
        };

        if cased.trim().is_empty() {
            return cased;
        }

        match self.remove_space {
            RemoveSpace::MultipleSpaces => MULTIPLE_SPACES_RE.replace_all(&cased, " ").into_owned(),
            RemoveSpace::AllSpaces => cased.replace(' ', "").trim().to_string(),
            RemoveSpace::None => cased,
        }
    }
}

// ---------------------------------------------------------------------------
// Casing checks
// ---------------------------------------------------------------------------

/// A literal fix-up applied after proper-name casing, e.g. `"Po Box"` to
/// `"PO Box"`. Both sides must have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasingCheck {
    look_for: String,
    replace_with: String,
}

impl CasingCheck {
    pub fn new(look_for: &str, replace_with: &str) -> Result<Self, CoreError> {
        if look_for.is_empty() {
            return Err(CoreError::blank("look_for"));
        }
        if look_for.chars().count() != replace_with.chars().count() {
            return Err(CoreError::InvalidArgument {
                name: "replace_with",
                reason: "LookFor and ReplaceWith strings must be the same length".to_string(),
            });
        }
        Ok(Self {
            look_for: look_for.to_string(),
            replace_with: replace_with.to_string(),
        })
    }

    pub fn look_for(&self) -> &str {
        &self.look_for
    }

    pub fn replace_with(&self) -> &str {
        &self.replace_with
    }
}

/// Ordered list of casing fix-ups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasingChecks {
    checks: Vec<CasingCheck>,
}

impl CasingChecks {
    pub fn new(checks: Vec<CasingCheck>) -> Self {
        Self { checks }
    }

    /// The built-in list of business abbreviations and directionals.
    pub fn standard() -> Self {
        const PAIRS: &[(&str, &str)] = &[
            ("Po Box", "PO Box"),
            ("C/o ", "c/o "),
            ("C/O ", "c/o "),
            ("Vpn ", "VPN "),
            ("Xp ", "XP "),
            (" Or ", " or "),
            (" And ", " and "),
            (" Nw ", " NW "),
            (" Ne ", " NE "),
            (" Sw ", " SW "),
            (" Se ", " SE "),
            (" Llc. ", " LLC. "),
            (" Llc ", " LLC "),
            (" Lc ", " LC "),
            (" Lc. ", " LC. "),
            ("Wpf", "WPF"),
        ];

        let checks = PAIRS
            .iter()
            .map(|(look_for, replace_with)| CasingCheck {
                look_for: (*look_for).to_string(),
                replace_with: (*replace_with).to_string(),
            })
            .collect();
        Self { checks }
    }

    pub fn push(&mut self, check: CasingCheck) {
        self.checks.push(check);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CasingCheck> {
        self.checks.iter()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Replaceable handle to the casing checks used when text properties are
/// assigned.
///
/// Clones share the same slot, so [`replace`](Self::replace) is seen by
/// every entity holding the handle. Starts with [`CasingChecks::standard`].
#[derive(Debug, Clone)]
pub struct CasingChecksSource {
    checks: Arc<RwLock<Arc<CasingChecks>>>,
}

impl CasingChecksSource {
    pub fn new(checks: CasingChecks) -> Self {
        Self {
            checks: Arc::new(RwLock::new(Arc::new(checks))),
        }
    }

    /// Current checks.
    pub fn get(&self) -> Arc<CasingChecks> {
        match self.checks.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn replace(&self, checks: CasingChecks) {
        let checks = Arc::new(checks);
        match self.checks.write() {
            Ok(mut guard) => *guard = checks,
            Err(poisoned) => *poisoned.into_inner() = checks,
        }
    }
}

impl Default for CasingChecksSource {
    fn default() -> Self {
        Self::new(CasingChecks::standard())
    }
}

// ---------------------------------------------------------------------------
// Casing
// ---------------------------------------------------------------------------

/// Apply `casing` to `input` using the standard casing checks.
pub fn apply_character_casing(input: &str, casing: CharacterCasing) -> String {
    apply_character_casing_with(input, casing, &STANDARD_CHECKS)
}

/// Apply `casing` to `input` with a caller-supplied list of casing checks.
///
/// The input is trimmed first. Proper-name casing capitalizes the first
/// letter of each word (after a space, `.`, `-` or `/`), after `O'` and
/// after `Mc`, then applies `checks`.
pub fn apply_character_casing_with(
    input: &str,
    casing: CharacterCasing,
    checks: &CasingChecks,
) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }

    match casing {
        CharacterCasing::None => return input.to_string(),
        CharacterCasing::LowerCase => return input.to_lowercase(),
        CharacterCasing::UpperCase => return input.to_uppercase(),
        CharacterCasing::OutlookPhoneNoProperName => {
            return format_outlook_phone(input).trim().to_string()
        }
        CharacterCasing::OutlookPhoneUpper => {
            return format_outlook_phone(input).trim().to_uppercase()
        }
        CharacterCasing::ProperName | CharacterCasing::OutlookPhoneProperName => {}
    }

    let mut text = proper_name(input);
    text.push(' ');
    for check in checks.iter() {
        if text.contains(check.look_for()) {
            text = text.replacen(check.look_for(), check.replace_with(), 1);
        }
    }

    if casing == CharacterCasing::OutlookPhoneProperName {
        text = format_outlook_phone(&text);
    }

    text.trim().to_string()
}

fn upper(c: char) -> char {
    let mut it = c.to_uppercase();
    match (it.next(), it.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn proper_name(input: &str) -> String {
    let mut chars: Vec<char> = input.to_lowercase().chars().collect();

    let mut previous = ' ';
    let mut previous_two = [' ', ' '];
    let mut previous_three = [' ', ' ', ' '];

    for c in chars.iter_mut() {
        if c.is_alphabetic() && c.is_lowercase() {
            let capitalize = matches!(previous, ' ' | '.' | '-' | '/')
                || previous_three == [' ', 'O', '\'']
                || previous_two == ['M', 'c'];
            if capitalize {
                *c = upper(*c);
            }
        }
        previous = *c;
        previous_two = [previous_two[1], previous];
        previous_three = [previous_three[1], previous_three[2], previous];
    }

    // D'Angelo at the start of the value.
    if chars.iter().position(|&c| c == '\'') == Some(1) && chars.len() > 2 {
        chars[2] = upper(chars[2]);
    }

    // ... and after a leading initial later in the value ("Mary D'Angelo").
    if chars.len() > 3 {
        if let Some(offset) = chars[3..].iter().position(|&c| c == '\'') {
            let pos = offset + 3;
            if pos > 3 && chars[pos - 2] == ' ' && pos + 1 < chars.len() {
                chars[pos + 1] = upper(chars[pos + 1]);
            }
        }
    }

    chars.into_iter().collect()
}

/// Format a leading ten-digit phone number as `(###) ###-####`, keeping any
/// text after the first space at or beyond the eighth character as an
/// extension separated by two spaces.
fn format_outlook_phone(input: &str) -> String {
    if input.trim().is_empty() {
        return input.to_string();
    }

    let padded: Vec<char> = input.chars().chain(std::iter::once(' ')).collect();
    let Some(split) = (PHONE_SEPARATOR_START..padded.len()).find(|&i| padded[i] == ' ') else {
        return padded.into_iter().collect();
    };

    let digits: String = padded[..split]
        .iter()
        .filter(|c| !matches!(c, '(' | ')' | ' ' | '-'))
        .collect();

    if digits.len() == 10 && digits.chars().all(|c| c.is_ascii_digit()) {
        let rest: String = padded[split..].iter().collect();
        return format!(
            "({}) {}-{}  {}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..10],
            rest.trim()
        );
    }

    padded.into_iter().collect()
}
