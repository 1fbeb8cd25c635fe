use margin_core::batch;
use margin_core::config::LoadOptions;
use margin_db::{
    connect_with_settings, load_catalog_snapshot, persist_cost_outcome, SqlCatalogRepository,
    SqlListingRepository,
};
use serde_json::json;

use super::{build_runtime, load_config, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config("recalc-costs", options) {
        Ok(config) => config,
        Err(result) => return *result,
    };

    let runtime = match build_runtime("recalc-costs") {
        Ok(runtime) => runtime,
        Err(result) => return *result,
    };

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

        let outcome = batch::recalc_costs(&snapshot);

        persist_cost_outcome(&catalog, &outcome)
            .await
            .map_err(|error| ("persist", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<batch::CostRunOutcome, (&'static str, String, u8)>(outcome)
    });

    match result {
        Ok(outcome) => CommandResult::success_with_details(
            "recalc-costs",
            format!(
                "recalculated receipt cost basis for {} products ({} skipped)",
                outcome.updates.len(),
                outcome.skipped.len()
            ),
            Some(json!({
                "run_id": outcome.run_id,
                "updated": outcome.updates.len(),
                "skipped": outcome.skipped,
            })),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recalc-costs", error_class, message, exit_code)
        }
    }
}
