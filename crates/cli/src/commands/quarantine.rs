use margin_core::batch;
use margin_core::config::LoadOptions;
use margin_db::{
    connect_with_settings, load_catalog_snapshot, SqlCatalogRepository, SqlListingRepository,
};
use rust_decimal::Decimal;
use serde_json::json;

use super::{build_runtime, load_config, CommandResult};

pub fn run(options: LoadOptions, threshold_pct: Option<Decimal>) -> CommandResult {
    let config = match load_config("quarantine", options) {
        Ok(config) => config,
        Err(result) => return *result,
    };

    let runtime = match build_runtime("quarantine") {
        Ok(runtime) => runtime,
        Err(result) => return *result,
    };

    let threshold_pct = threshold_pct.unwrap_or(config.engine.quarantine_threshold_pct);

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        let catalog = SqlCatalogRepository::new(pool.clone());
        let channel = SqlListingRepository::new(pool.clone());
        let snapshot = load_catalog_snapshot(&catalog, &channel)
            .await
            .map_err(|error| ("snapshot_load", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<batch::QuarantineReport, (&'static str, String, u8)>(batch::quarantine_report(
            &snapshot,
            threshold_pct,
        ))
    });

    match result {
        Ok(report) => CommandResult::success_with_details(
            "quarantine",
            format!(
                "evaluated {} listings at threshold {threshold_pct}%: {} flagged for review",
                report.evaluated,
                report.flagged.len()
            ),
            Some(json!({
                "run_id": report.run_id,
                "threshold_pct": threshold_pct,
                "evaluated": report.evaluated,
                "flagged": report.flagged,
            })),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("quarantine", error_class, message, exit_code)
        }
    }
}
