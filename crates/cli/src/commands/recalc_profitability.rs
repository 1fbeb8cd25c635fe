use margin_core::batch::{self, BatchConfig};
use margin_core::config::LoadOptions;
use margin_core::domain::listing::FulfillmentMode;
use margin_core::pricing::distribution::ProfitabilityBand;
use margin_db::{
    connect_with_settings, load_catalog_snapshot, persist_profitability_outcome,
    SqlCatalogRepository, SqlListingRepository,
};
use serde_json::json;

use super::{build_runtime, load_config, CommandResult};

pub fn run(
    options: LoadOptions,
    mode: Option<FulfillmentMode>,
    band: Option<ProfitabilityBand>,
) -> CommandResult {
    let config = match load_config("recalc-profitability", options) {
        Ok(config) => config,
        Err(result) => return *result,
    };

    let runtime = match build_runtime("recalc-profitability") {
        Ok(runtime) => runtime,
        Err(result) => return *result,
    };

    let batch_config = BatchConfig {
        mode: mode.unwrap_or(config.engine.default_mode),
        overheads_pct: config.engine.overheads_pct,
        quarantine_threshold_pct: config.engine.quarantine_threshold_pct,
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

        let outcome = batch::recalc_profitability(&snapshot, &batch_config);

        persist_profitability_outcome(&channel, &outcome)
            .await
            .map_err(|error| ("persist", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<batch::ProfitabilityRunOutcome, (&'static str, String, u8)>(outcome)
    });

    match result {
        Ok(outcome) => {
            let mut details = json!({
                "run_id": outcome.run_id,
                "mode": batch_config.mode.as_str(),
                "updated": outcome.updates.len(),
                "skipped": outcome.skipped,
                "distribution": outcome.distribution,
            });
            if let Some(band) = band {
                let listings: Vec<&str> = outcome
                    .updates_in_band(band)
                    .iter()
                    .map(|update| update.listing_id.0.as_str())
                    .collect();
                details["band"] = json!(band.as_str());
                details["band_listings"] = json!(listings);
            }

            CommandResult::success_with_details(
                "recalc-profitability",
                format!(
                    "recomputed profitability for {} listings ({} skipped)",
                    outcome.updates.len(),
                    outcome.skipped.len()
                ),
                Some(details),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recalc-profitability", error_class, message, exit_code)
        }
    }
}
