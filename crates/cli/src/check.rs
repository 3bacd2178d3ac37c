//! Validate a batch of JSON records against declared rules.

use std::path::Path;

use anyhow::Context;
use ocean_core::entity::{BusinessEntity, DynamicEntity};
use ocean_core::error::CoreError;
use ocean_core::validation::{BrokenRule, RuleSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::CheckConfig;

/// Result of checking one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordReport {
    /// One-based position in the records file.
    pub row_number: i32,
    pub is_valid: bool,
    /// Combined error text, one message per paragraph.
    pub error: String,
    pub broken_rules: Vec<BrokenRule>,
}

/// Result of checking every record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub rule_set: String,
    pub rule_count: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub records: Vec<RecordReport>,
}

impl CheckReport {
    pub fn all_valid(&self) -> bool {
        self.invalid_count == 0
    }
}

/// Read the configured files and check every record.
pub fn run(config: &CheckConfig) -> anyhow::Result<CheckReport> {
    let specs = load_rules(Path::new(&config.rules_file))?;
    let records = load_records(Path::new(&config.records_file))?;

    tracing::info!(
        rules = specs.len(),
        records = records.len(),
        rule_set = %config.rule_set,
        "Checking records",
    );

    let report = check_records(&specs, records, &config.rule_set)?;

    tracing::info!(
        valid = report.valid_count,
        invalid = report.invalid_count,
        "Check complete",
    );
    Ok(report)
}

pub fn load_rules(path: &Path) -> anyhow::Result<Vec<RuleSpec>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading rules file {}", path.display()))?;
    RuleSpec::list_from_json(&text).with_context(|| format!("parsing rules file {}", path.display()))
}

pub fn load_records(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading records file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("records file {} must hold a JSON array", path.display()))
}

/// Check `records` against `specs` under `rule_set`.
pub fn check_records(
    specs: &[RuleSpec],
    records: Vec<Value>,
    rule_set: &str,
) -> Result<CheckReport, CoreError> {
    let mut reports = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let row_number = i32::try_from(index + 1)
            .map_err(|_| CoreError::Validation("too many records".to_string()))?;
        let report = check_record(specs, record, rule_set, row_number)?;
        tracing::debug!(row_number, is_valid = report.is_valid, "Checked record");
        reports.push(report);
    }

    let valid_count = reports.iter().filter(|r| r.is_valid).count();
    Ok(CheckReport {
        rule_set: rule_set.to_string(),
        rule_count: specs.len(),
        valid_count,
        invalid_count: reports.len() - valid_count,
        records: reports,
    })
}

fn check_record(
    specs: &[RuleSpec],
    record: Value,
    rule_set: &str,
    row_number: i32,
) -> Result<RecordReport, CoreError> {
    let mut entity = DynamicEntity::from_json(record)?.with_rules(specs)?;
    let state = entity.state_mut();
    state.set_row_number(row_number);
    state.set_active_rule_set(rule_set)?;

    entity.check_all_rules()?;

    let state = entity.state();
    Ok(RecordReport {
        row_number: state.row_number(),
        is_valid: state.is_valid()?,
        error: state.error()?,
        broken_rules: state.validation_errors()?.values().cloned().collect(),
    })
}
