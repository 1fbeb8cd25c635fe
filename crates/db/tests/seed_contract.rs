use rust_decimal::Decimal;

use margin_core::batch::{self, BatchConfig};
use margin_core::domain::listing::{FulfillmentMode, ListingId};
use margin_core::domain::product::ProductId;
use margin_db::{
    connect_with_settings, load_catalog_snapshot, migrations, persist_cost_outcome,
    persist_profitability_outcome, seed_demo_dataset, DbPool, ListingRepository,
    ProductRepository, SqlCatalogRepository, SqlListingRepository,
};

async fn seeded_pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrate");

    let catalog = SqlCatalogRepository::new(pool.clone());
    let channel = SqlListingRepository::new(pool.clone());
    seed_demo_dataset(&catalog, &channel).await.expect("seed");

    pool
}

#[tokio::test]
async fn seeded_sqlite_catalog_round_trips_through_the_engine() {
    let pool = seeded_pool().await;
    let catalog = SqlCatalogRepository::new(pool.clone());
    let channel = SqlListingRepository::new(pool.clone());

    let snapshot = load_catalog_snapshot(&catalog, &channel).await.expect("snapshot");
    let costs = batch::recalc_costs(&snapshot);
    assert!(costs.skipped.is_empty(), "demo catalog must compute cleanly");
    persist_cost_outcome(&catalog, &costs).await.expect("persist costs");

    // The FIFO crossing batch for LAMP-01 (stock 8) is May 2: 420 + 50/5.
    let lamp = catalog
        .find_by_id(&ProductId("LAMP-01".to_string()))
        .await
        .expect("find product")
        .expect("LAMP-01 present");
    assert_eq!(lamp.receipt_cost, Some(Decimal::new(430_00, 2)));

    // The bundle derives from freshly persisted component costs.
    let kit = catalog
        .find_by_id(&ProductId("KIT-LAMP-DUO".to_string()))
        .await
        .expect("find bundle")
        .expect("KIT-LAMP-DUO present");
    assert!(kit.receipt_cost.is_some());

    pool.close().await;
}

#[tokio::test]
async fn profitability_results_persist_and_are_stable_across_reruns() {
    let pool = seeded_pool().await;
    let catalog = SqlCatalogRepository::new(pool.clone());
    let channel = SqlListingRepository::new(pool.clone());

    let config = BatchConfig {
        mode: FulfillmentMode::Fbs,
        overheads_pct: Decimal::from(20),
        quarantine_threshold_pct: Decimal::from(20),
    };

    let snapshot = load_catalog_snapshot(&catalog, &channel).await.expect("snapshot");
    let costs = batch::recalc_costs(&snapshot);
    persist_cost_outcome(&catalog, &costs).await.expect("persist costs");

    let snapshot = load_catalog_snapshot(&catalog, &channel).await.expect("snapshot");
    let first = batch::recalc_profitability(&snapshot, &config);
    assert_eq!(first.updates.len(), 3);
    persist_profitability_outcome(&channel, &first).await.expect("persist profitability");

    let stored = channel
        .find_by_id(&ListingId("WB-LAMP-01".to_string()))
        .await
        .expect("find listing")
        .expect("WB-LAMP-01 present");
    let update = first
        .updates
        .iter()
        .find(|update| update.listing_id.0 == "WB-LAMP-01")
        .expect("WB update");
    assert_eq!(stored.profit, Some(update.profit));
    assert_eq!(stored.profitability_pct, Some(update.profitability_pct));

    // Re-running the whole pass over the persisted state changes nothing.
    let snapshot = load_catalog_snapshot(&catalog, &channel).await.expect("snapshot");
    let second = batch::recalc_profitability(&snapshot, &config);
    assert_eq!(first.updates, second.updates);
    assert_eq!(first.distribution, second.distribution);

    pool.close().await;
}
