//! Integration tests for file-based checking.

use std::io::Write;

use ocean_check::{run, CheckConfig};
use tempfile::NamedTempFile;

fn write_json(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

fn config(rules: &NamedTempFile, records: &NamedTempFile, rule_set: &str) -> CheckConfig {
    CheckConfig {
        rules_file: rules.path().display().to_string(),
        records_file: records.path().display().to_string(),
        rule_set: rule_set.to_string(),
        fail_on_invalid: true,
    }
}

const RULES: &str = r#"[
    {"property": "Email", "rule_type": "regular_expression", "pattern_type": "email",
     "required": "yes", "rule_set": "Insert|Update"},
    {"property": "Age", "rule_type": "range", "lower": 18, "upper": 120},
    {"property": "State", "rule_type": "state_abbreviation", "us_only": "yes"},
    {"property": "Card", "rule_type": "credit_card_number"},
    {"property": "Id", "rule_type": "compare_value", "comparison": "greater_than",
     "value": 0, "required": "yes", "rule_set": "Delete"}
]"#;

#[test]
fn reports_each_record() {
    let rules = write_json(RULES);
    let records = write_json(
        r#"[
            {"Id": 1, "Email": "ann@example.com", "Age": 30, "Country": "United States",
             "State": "WA", "Card": "4111111111111111"},
            {"Id": 2, "Email": "bob", "Age": 30, "Country": "Canada", "State": "ON",
             "Card": "4111111111111112"}
        ]"#,
    );

    let report = run(&config(&rules, &records, "Insert")).expect("run should succeed");

    assert_eq!(report.rule_count, 5);
    assert_eq!(report.valid_count, 1);
    assert_eq!(report.invalid_count, 1);

    let second = &report.records[1];
    assert_eq!(second.row_number, 2);
    assert!(!second.is_valid);
    let properties: Vec<&str> = second
        .broken_rules
        .iter()
        .map(|rule| rule.property_name.as_str())
        .collect();
    assert_eq!(properties, vec!["Email", "Card"]);
    assert!(second.broken_rules[0].rule_name.starts_with("rule://Instance-RegularExpressionRule/Email-"));
}

#[test]
fn delete_rule_set_checks_only_delete_rules() {
    let rules = write_json(RULES);
    let records = write_json(r#"[{"Id": 0, "Email": "bob"}]"#);

    let report = run(&config(&rules, &records, "Delete")).expect("run should succeed");

    assert_eq!(report.records[0].error, "Id must be greater than 0.");
}

#[test]
fn report_serializes_to_json() {
    let rules = write_json(RULES);
    let records = write_json(r#"[{"Id": 3, "Email": "ann@example.com"}]"#);

    let report = run(&config(&rules, &records, "")).expect("run should succeed");
    let json = serde_json::to_value(&report).expect("serialize report");

    assert_eq!(json["valid_count"], 1);
    assert_eq!(json["records"][0]["is_valid"], true);
    assert_eq!(json["records"][0]["broken_rules"], serde_json::json!([]));
}

#[test]
fn missing_files_are_reported() {
    let rules = write_json(RULES);
    let cfg = CheckConfig {
        records_file: "/nonexistent/records.json".to_string(),
        ..config(&rules, &rules, "")
    };

    let err = run(&cfg).expect_err("missing records file should fail");
    assert!(format!("{err:#}").contains("reading records file"));
}

#[test]
fn malformed_rules_are_reported() {
    let rules = write_json(r#"[{"property": "A", "rule_type": "unknown"}]"#);
    let records = write_json("[]");

    let err = run(&config(&rules, &records, "")).expect_err("bad rules should fail");
    assert!(format!("{err:#}").contains("parsing rules file"));
}
