use margin_core::config::LoadOptions;
use margin_db::{
    connect_with_settings, migrations, seed_demo_dataset, SqlCatalogRepository,
    SqlListingRepository,
};

use super::{build_runtime, load_config, CommandResult};

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match load_config("seed", options) {
        Ok(config) => config,
        Err(result) => return *result,
    };

    let runtime = match build_runtime("seed") {
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

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let catalog = SqlCatalogRepository::new(pool.clone());
        let channel = SqlListingRepository::new(pool.clone());
        let summary = seed_demo_dataset(&catalog, &channel)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        pool.close().await;
        Ok::<margin_db::SeedSummary, (&'static str, String, u8)>(summary)
    });

    match result {
        Ok(summary) => CommandResult::success(
            "seed",
            format!(
                "seeded demo catalog: {} products, {} receipts, {} listings, {} rate cards, {} campaign prices",
                summary.products,
                summary.receipts,
                summary.listings,
                summary.rate_cards,
                summary.campaign_prices
            ),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
