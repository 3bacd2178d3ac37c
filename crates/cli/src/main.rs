//! `ocean-check` -- validate JSON records against declared business rules.
//!
//! Prints a JSON report of every record's broken rules to stdout. Logs go
//! to stderr.
//!
//! # Environment variables
//!
//! | Variable                | Required | Default | Description                              |
//! |-------------------------|----------|---------|------------------------------------------|
//! | `OCEAN_RULES_FILE`      | yes      | --      | JSON array of rule declarations          |
//! | `OCEAN_RECORDS_FILE`    | yes      | --      | JSON array of record objects             |
//! | `OCEAN_RULE_SET`        | no       | empty   | Active rule set, e.g. `Insert`           |
//! | `OCEAN_FAIL_ON_INVALID` | no       | `true`  | Exit with status 1 when a record fails   |

use std::process::ExitCode;

use ocean_check::{run, CheckConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocean_check=info,ocean_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match CheckConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    let report = match run(&config) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Check failed");
            return ExitCode::from(2);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize report");
            return ExitCode::from(2);
        }
    }

    if config.fail_on_invalid && !report.all_valid() {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
