//! Friendly-name generation from property identifiers.

/// Split a PascalCase identifier into space-separated words.
///
/// Characters before the first upper-case letter are dropped, as is any
/// character that is not a letter or digit.
///
/// ```
/// use ocean_core::formatting::words::camel_case_words;
///
/// assert_eq!(camel_case_words("FirstName"), "First Name");
/// assert_eq!(camel_case_words("_zipCode"), "Code");
/// ```
pub fn camel_case_words(identifier: &str) -> String {
    if identifier.trim().is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(identifier.len() + 4);
    let mut found_upper = false;

    for c in identifier.chars() {
        if found_upper {
            if c.is_uppercase() {
                out.push(' ');
                out.push(c);
            } else if c.is_alphanumeric() {
                out.push(c);
            }
        } else if c.is_uppercase() {
            found_upper = true;
            out.push(c);
        }
    }

    out
}
