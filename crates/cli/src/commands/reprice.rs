use margin_core::batch::{self, BatchConfig};
use margin_core::config::LoadOptions;
use margin_core::domain::listing::FulfillmentMode;
use margin_db::{
    connect_with_settings, load_catalog_snapshot, persist_campaign_outcome,
    persist_reprice_outcome, SqlCatalogRepository, SqlListingRepository,
};
use rust_decimal::Decimal;
use serde_json::json;

use super::{build_runtime, load_config, CommandResult};

/// What drives the new prices: an incoming profitability floor, or prices
/// fixed by marketplace campaigns.
#[derive(Clone, Copy, Debug)]
pub enum RepriceSource {
    TargetProfitability(Decimal),
    Campaigns,
}

pub fn run(
    options: LoadOptions,
    mode: Option<FulfillmentMode>,
    source: RepriceSource,
) -> CommandResult {
    let config = match load_config("reprice", options) {
        Ok(config) => config,
        Err(result) => return *result,
    };

    let runtime = match build_runtime("reprice") {
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

        let details = match source {
            RepriceSource::TargetProfitability(target_pct) => {
                let outcome = batch::reprice_to_target(&snapshot, &batch_config, target_pct);
                persist_reprice_outcome(&channel, &outcome)
                    .await
                    .map_err(|error| ("persist", error.to_string(), 5u8))?;

                let repriced =
                    outcome.updates.iter().filter(|update| update.recomputed).count();
                let quarantined =
                    outcome.updates.iter().filter(|update| update.quarantined).count();
                (
                    format!(
                        "applied profitability floor {target_pct}%: {repriced} listings repriced, {} held, {} skipped, {quarantined} quarantined",
                        outcome.updates.len() - repriced,
                        outcome.skipped.len()
                    ),
                    json!({
                        "run_id": outcome.run_id,
                        "mode": batch_config.mode.as_str(),
                        "target_profitability_pct": target_pct,
                        "repriced": repriced,
                        "held": outcome.updates.len() - repriced,
                        "quarantined": quarantined,
                        "skipped": outcome.skipped,
                    }),
                )
            }
            RepriceSource::Campaigns => {
                let outcome = batch::reprice_campaigns(&snapshot, &batch_config);
                persist_campaign_outcome(&channel, &outcome)
                    .await
                    .map_err(|error| ("persist", error.to_string(), 5u8))?;

                (
                    format!(
                        "applied {} campaign prices ({} skipped)",
                        outcome.updates.len(),
                        outcome.skipped.len()
                    ),
                    json!({
                        "run_id": outcome.run_id,
                        "mode": batch_config.mode.as_str(),
                        "applied": outcome.updates.len(),
                        "skipped": outcome.skipped,
                    }),
                )
            }
        };

        pool.close().await;
        Ok::<(String, serde_json::Value), (&'static str, String, u8)>(details)
    });

    match result {
        Ok((message, details)) => {
            CommandResult::success_with_details("reprice", message, Some(details))
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("reprice", error_class, message, exit_code)
        }
    }
}
