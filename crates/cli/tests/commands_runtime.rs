use margin_cli::commands::reprice::RepriceSource;
use margin_cli::commands::{
    doctor, migrate, quarantine, recalc_costs, recalc_profitability, reprice, seed,
};
use margin_core::config::{ConfigOverrides, LoadOptions};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;

fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("margin.db").display())
}

fn options_for(url: &str) -> LoadOptions {
    LoadOptions {
        overrides: ConfigOverrides {
            database_url: Some(url.to_string()),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

#[test]
fn migrate_then_doctor_reports_ready() {
    let dir = TempDir::new().expect("tempdir");
    let url = database_url(&dir);

    let result = migrate::run(options_for(&url));
    assert_eq!(result.exit_code, 0, "expected successful migrate run: {}", result.output);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "migrate");
    assert_eq!(payload["status"], "ok");

    let report = doctor::run(options_for(&url), false);
    assert!(
        report.contains("all readiness checks passed"),
        "doctor should pass after migrate: {report}"
    );
}

#[test]
fn invalid_database_url_fails_config_validation() {
    let result = migrate::run(options_for("postgres://nope"));
    assert_eq!(result.exit_code, 2, "expected config validation failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "config_validation");
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = TempDir::new().expect("tempdir");
    let url = database_url(&dir);

    let first = seed::run(options_for(&url));
    assert_eq!(first.exit_code, 0, "expected first seed success: {}", first.output);

    let second = seed::run(options_for(&url));
    assert_eq!(second.exit_code, 0, "expected second seed success: {}", second.output);

    let payload = parse_payload(&second.output);
    let message = payload["message"].as_str().unwrap_or("");
    assert!(
        message.contains("0 receipts"),
        "re-seed must not append receipt history again: {message}"
    );
}

#[test]
fn full_batch_pipeline_over_seeded_catalog() {
    let dir = TempDir::new().expect("tempdir");
    let url = database_url(&dir);

    assert_eq!(seed::run(options_for(&url)).exit_code, 0);

    let costs = recalc_costs::run(options_for(&url));
    assert_eq!(costs.exit_code, 0, "recalc-costs failed: {}", costs.output);
    let payload = parse_payload(&costs.output);
    assert_eq!(payload["details"]["updated"], 3);
    assert_eq!(payload["details"]["skipped"].as_array().map(Vec::len), Some(0));

    let profitability = recalc_profitability::run(options_for(&url), None, None);
    assert_eq!(profitability.exit_code, 0, "recalc failed: {}", profitability.output);
    let payload = parse_payload(&profitability.output);
    assert_eq!(payload["details"]["updated"], 3);
    assert_eq!(payload["details"]["mode"], "fbs");
    assert_eq!(payload["details"]["distribution"].as_object().map(|d| d.len()), Some(6));

    let repriced = reprice::run(
        options_for(&url),
        None,
        RepriceSource::TargetProfitability(Decimal::from(35)),
    );
    assert_eq!(repriced.exit_code, 0, "reprice failed: {}", repriced.output);
    let payload = parse_payload(&repriced.output);
    let recomputed = payload["details"]["repriced"].as_u64().unwrap_or(0);
    let held = payload["details"]["held"].as_u64().unwrap_or(0);
    assert_eq!(recomputed + held, 3, "every listing gets an outcome: {}", repriced.output);

    let campaigns = reprice::run(options_for(&url), None, RepriceSource::Campaigns);
    assert_eq!(campaigns.exit_code, 0, "campaign reprice failed: {}", campaigns.output);
    let payload = parse_payload(&campaigns.output);
    assert_eq!(payload["details"]["applied"], 1);

    // A 1% corridor flags both lamp listings with a reference price; the
    // listing without an RRC can never be flagged.
    let report = quarantine::run(options_for(&url), Some(Decimal::ONE));
    assert_eq!(report.exit_code, 0, "quarantine failed: {}", report.output);
    let payload = parse_payload(&report.output);
    assert_eq!(payload["details"]["evaluated"], 3);
    assert_eq!(payload["details"]["flagged"].as_array().map(Vec::len), Some(2));
}
