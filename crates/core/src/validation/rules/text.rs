//! Text-format predicates: length, patterns and checksummed numbers.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::{applies_to_country, required_text_broken, text_value, wrong_descriptor};
use crate::error::CoreError;
use crate::property::PropertyAccess;
use crate::validation::descriptor::{
    AllowNullString, RegularExpressionPatternType, RuleDescriptor, RuleKind,
};
use crate::validation::validator::Verdict;

const EMAIL_PATTERN: &str = r"^\w+([-+.]\w+)*@\w+([-.]\w+)*\.\w+([-.]\w+)*$";

const IP_ADDRESS_PATTERN: &str = r"^((25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])$";

const SSN_PATTERN: &str = r"^\d{3}-\d{2}-\d{4}$";

const ZIP_CODE_PATTERN: &str = r"^\d{5}(-\d{4})?$";

// Optional protocol, one or more host names or dotted IPv4 addresses with an
// optional port, then optional path, extension and query string. Not
// anchored, so a URL anywhere in the value matches.
const URL_PATTERN: &str = concat!(
    r"(((news|nntp|telnet|http|ftp|https|ftps|sftp)://)?",
    r"(([a-zA-Z0-9]+\.*[a-zA-Z0-9-]+(\.[a-zA-Z]+){1,2})",
    r"|((25[0-5]|2[0-4][0-9]|[0-1][0-9]{2}|[1-9][0-9]|[1-9])",
    r"\.(25[0-5]|2[0-4][0-9]|[0-1][0-9]{2}|[1-9][0-9]|[1-9]|0)",
    r"\.(25[0-5]|2[0-4][0-9]|[0-1][0-9]{2}|[1-9][0-9]|[1-9]|0)",
    r"\.(25[0-5]|2[0-4][0-9]|[0-1][0-9]{2}|[1-9][0-9]|[0-9])))+",
    r"(:[1-9][0-9]*)?)+",
    r"((/([a-zA-Z0-9 %~+-]+)?)*)?",
    r"(\.([a-zA-Z0-9 ]+))?",
    r"(\?([a-zA-Z0-9 -]+=[a-zA-Z0-9 %~+-]+)?(&([a-zA-Z0-9 -]+=[a-zA-Z0-9 %~+-]+)?)*)?",
);

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("valid regex")
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| case_insensitive(EMAIL_PATTERN));
static IP_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| case_insensitive(IP_ADDRESS_PATTERN));
static SSN_RE: LazyLock<Regex> = LazyLock::new(|| case_insensitive(SSN_PATTERN));
static URL_RE: LazyLock<Regex> = LazyLock::new(|| case_insensitive(URL_PATTERN));
static ZIP_CODE_RE: LazyLock<Regex> = LazyLock::new(|| case_insensitive(ZIP_CODE_PATTERN));

/// Compile a user-supplied pattern the way the regular expression rule
/// evaluates it.
pub fn compile_custom_pattern(pattern: &str) -> Result<Regex, CoreError> {
    if pattern.is_empty() {
        return Err(CoreError::InvalidOperation(
            "CustomRegularExpressionPattern not supplied".to_string(),
        ));
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

pub fn string_length_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::StringLength {
        min,
        max,
        allow_null,
    } = descriptor.kind()
    else {
        return Err(wrong_descriptor("StringLengthRule", descriptor));
    };

    let value = target.require_property(descriptor.property_name())?;
    let friendly = descriptor.friendly_name();

    match allow_null {
        AllowNullString::No if value.is_null() => {
            return Ok(Verdict::Broken(format!("{friendly} can not be null")));
        }
        AllowNullString::Yes if value.is_blank() => return Ok(Verdict::Passed),
        _ => {}
    }

    let length = value.as_text().map_or(0, |s| s.chars().count());

    if *min > 0 && length < *min as usize {
        return Ok(Verdict::Broken(format!(
            "{friendly} can not be less than {min} character's long"
        )));
    }
    if *max > 0 && length > *max as usize {
        return Ok(Verdict::Broken(format!(
            "{friendly} can not be greater than {max} character's long"
        )));
    }
    Ok(Verdict::Passed)
}

pub fn regular_expression_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::RegularExpression {
        pattern_type,
        custom,
        required,
    } = descriptor.kind()
    else {
        return Err(wrong_descriptor("RegularExpressionRule", descriptor));
    };

    let text = target
        .require_property(descriptor.property_name())?
        .as_text()
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Ok(if required.is_required() {
            required_text_broken(descriptor)
        } else {
            Verdict::Passed
        });
    }

    let friendly = descriptor.friendly_name();
    let (regex, label): (&Regex, String) = match pattern_type {
        RegularExpressionPatternType::Custom => {
            let regex = custom.as_ref().ok_or_else(|| {
                CoreError::InvalidOperation("CustomRegularExpressionPattern not supplied".to_string())
            })?;
            (regex, regex.as_str().to_string())
        }
        RegularExpressionPatternType::Email => (&*EMAIL_RE, "email".to_string()),
        RegularExpressionPatternType::IpAddress => (&*IP_ADDRESS_RE, "IP Address".to_string()),
        RegularExpressionPatternType::Ssn => (&*SSN_RE, "SSN".to_string()),
        RegularExpressionPatternType::Url => (&*URL_RE, "URL".to_string()),
        RegularExpressionPatternType::ZipCode => (&*ZIP_CODE_RE, "Zip Code".to_string()),
    };

    if regex.is_match(&text) {
        return Ok(Verdict::Passed);
    }
    Ok(Verdict::Broken(format!(
        "{friendly} did not match the required {label} pattern"
    )))
}

/// Luhn checksum over a string of ASCII digits.
fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

pub fn credit_card_number_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::CreditCardNumber { required } = descriptor.kind() else {
        return Err(wrong_descriptor("CreditCardNumberRule", descriptor));
    };

    let card = text_value(target, descriptor, "Credit card number")?.unwrap_or_default();
    if card.is_empty() {
        return Ok(if required.is_required() {
            required_text_broken(descriptor)
        } else {
            Verdict::Passed
        });
    }

    if !card.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(Verdict::Broken(format!(
            "The entered value {card} is not a valid credit card number. Only numeric input is allowed"
        )));
    }
    if !luhn_valid(&card) {
        return Ok(Verdict::Broken(format!(
            "The entered value {card} is not a valid credit card number"
        )));
    }
    Ok(Verdict::Passed)
}

pub fn bank_routing_number_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::BankRoutingNumber { required } = descriptor.kind() else {
        return Err(wrong_descriptor("BankRoutingNumberRule", descriptor));
    };

    let routing = text_value(target, descriptor, "Bank routing number")?.unwrap_or_default();
    if routing.is_empty() {
        return Ok(if required.is_required() {
            Verdict::Broken(format!(
                "{} null or empty but is a required field",
                descriptor.friendly_name()
            ))
        } else {
            Verdict::Passed
        });
    }

    let invalid = "is not a valid bank routing number";
    if routing.chars().count() != 9 {
        return Ok(Verdict::Broken(format!(
            "The entered value {routing} {invalid}.  All bank routing numbers are 9 digit in length"
        )));
    }
    if !routing.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(Verdict::Broken(format!(
            "The entered value {routing} {invalid}. Only numeric input is allowed"
        )));
    }

    let digits: Vec<u32> = routing.bytes().map(|b| u32::from(b - b'0')).collect();
    if digits[0] > 1 {
        return Ok(Verdict::Broken(format!(
            "The entered value {routing} {invalid}. The first digit must be a 0 or a 1"
        )));
    }

    let sum: u32 = digits
        .chunks(3)
        .map(|c| c[0] * 3 + c[1] * 7 + c[2])
        .sum();
    if sum % 10 != 0 {
        return Ok(Verdict::Broken(format!(
            "The entered value {routing} {invalid}"
        )));
    }
    Ok(Verdict::Passed)
}

pub fn postal_code_rule(
    target: &dyn PropertyAccess,
    descriptor: &RuleDescriptor,
) -> Result<Verdict, CoreError> {
    let RuleKind::PostalCode { us_only, required } = descriptor.kind() else {
        return Err(wrong_descriptor("PostalCodeRule", descriptor));
    };

    if !applies_to_country(target, *us_only) {
        return Ok(Verdict::Passed);
    }

    let postal = text_value(target, descriptor, "Postal code")?.unwrap_or_default();
    let postal = postal.trim();
    if postal.is_empty() {
        return Ok(if required.is_required() {
            Verdict::Broken(format!(
                "Postal code was null or empty but is a required field: {}",
                descriptor.friendly_name()
            ))
        } else {
            Verdict::Passed
        });
    }

    if ZIP_CODE_RE.is_match(postal) {
        return Ok(Verdict::Passed);
    }
    Ok(Verdict::Broken(format!(
        "{} did not match the required Zip Code pattern",
        descriptor.friendly_name()
    )))
}
