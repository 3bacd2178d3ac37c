//! Checker configuration loaded from environment variables.

/// Configuration errors reported before any file is read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be a boolean, got `{value}`")]
    InvalidBool { name: &'static str, value: String },
}

/// Settings for one checker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// JSON array of rule declarations.
    pub rules_file: String,
    /// JSON array of record objects.
    pub records_file: String,
    /// Active rule set applied to every record (default: empty, all rules).
    pub rule_set: String,
    /// Exit non-zero when any record is invalid (default: `true`).
    pub fail_on_invalid: bool,
}

impl CheckConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                 | Default    |
    /// |-------------------------|------------|
    /// | `OCEAN_RULES_FILE`      | required   |
    /// | `OCEAN_RECORDS_FILE`    | required   |
    /// | `OCEAN_RULE_SET`        | empty      |
    /// | `OCEAN_FAIL_ON_INVALID` | `true`     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let rules_file = required("OCEAN_RULES_FILE")?;
        let records_file = required("OCEAN_RECORDS_FILE")?;
        let rule_set = lookup("OCEAN_RULE_SET")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        let fail_on_invalid = match lookup("OCEAN_FAIL_ON_INVALID") {
            Some(value) => parse_bool("OCEAN_FAIL_ON_INVALID", &value)?,
            None => true,
        };

        Ok(Self {
            rules_file,
            records_file,
            rule_set,
            fail_on_invalid,
        })
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<CheckConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CheckConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[
            ("OCEAN_RULES_FILE", "rules.json"),
            ("OCEAN_RECORDS_FILE", "records.json"),
        ])
        .unwrap();
        assert_eq!(config.rule_set, "");
        assert!(config.fail_on_invalid);
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("OCEAN_RULES_FILE", "rules.json"),
            ("OCEAN_RECORDS_FILE", "records.json"),
            ("OCEAN_RULE_SET", " Update "),
            ("OCEAN_FAIL_ON_INVALID", "No"),
        ])
        .unwrap();
        assert_eq!(config.rule_set, "Update");
        assert!(!config.fail_on_invalid);
    }

    #[test]
    fn missing_and_invalid_values() {
        assert_matches!(
            load(&[("OCEAN_RECORDS_FILE", "records.json")]),
            Err(ConfigError::Missing("OCEAN_RULES_FILE"))
        );
        assert_matches!(
            load(&[
                ("OCEAN_RULES_FILE", "rules.json"),
                ("OCEAN_RECORDS_FILE", "records.json"),
                ("OCEAN_FAIL_ON_INVALID", "maybe"),
            ]),
            Err(ConfigError::InvalidBool { .. })
        );
    }
}
