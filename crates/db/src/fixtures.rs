//! Deterministic demo dataset for `margin seed` and tests: three warehouse
//! products (one of them a bundle), receipt history exercising the FIFO
//! cutoff, and one listing per platform with commission/logistics cards.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use margin_core::domain::bundle::BundleComponent;
use margin_core::domain::listing::{CampaignPrice, ListingId, MarketplaceListing, Platform};
use margin_core::domain::product::{Product, ProductId, ProductKind};
use margin_core::domain::rates::RateCard;
use margin_core::domain::receipt::{GoodsReceipt, StockLevel};

use crate::repositories::{
    BomRepository, CampaignPriceRepository, ListingRepository, ProductRepository,
    RateCardRepository, ReceiptRepository, RepositoryError, StockRepository,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products: usize,
    pub receipts: usize,
    pub listings: usize,
    pub rate_cards: usize,
    pub campaign_prices: usize,
}

pub async fn seed_demo_dataset<C, L>(
    catalog: &C,
    channel: &L,
) -> Result<SeedSummary, RepositoryError>
where
    C: ProductRepository + ReceiptRepository + StockRepository + BomRepository,
    L: ListingRepository + RateCardRepository + CampaignPriceRepository,
{
    let mut summary = SeedSummary::default();

    for product in demo_products() {
        ProductRepository::upsert(catalog, product).await?;
        summary.products += 1;
    }

    // Receipts are append-only, so re-seeding must not duplicate history.
    let receipts = demo_receipts();
    let mut with_history = std::collections::BTreeSet::new();
    for product_id in receipts.iter().map(|receipt| receipt.product_id.clone()) {
        if !catalog.list_for_product(&product_id).await?.is_empty() {
            with_history.insert(product_id);
        }
    }
    for receipt in receipts {
        if with_history.contains(&receipt.product_id) {
            continue;
        }
        catalog.append(receipt).await?;
        summary.receipts += 1;
    }

    for level in demo_stock() {
        catalog.set(level).await?;
    }

    catalog
        .replace(
            &ProductId("KIT-LAMP-DUO".to_string()),
            vec![
                BundleComponent {
                    component_id: ProductId("LAMP-01".to_string()),
                    quantity: 2,
                },
                BundleComponent {
                    component_id: ProductId("LAMP-02".to_string()),
                    quantity: 1,
                },
            ],
        )
        .await?;

    for listing in demo_listings() {
        ListingRepository::upsert(channel, listing).await?;
        summary.listings += 1;
    }

    for card in demo_rate_cards() {
        RateCardRepository::upsert(channel, card).await?;
        summary.rate_cards += 1;
    }

    CampaignPriceRepository::upsert(
        channel,
        CampaignPrice {
            listing_id: ListingId("OZ-LAMP-01".to_string()),
            price: Decimal::new(899_00, 2),
            campaign_name: Some("spring sale".to_string()),
        },
    )
    .await?;
    summary.campaign_prices += 1;

    Ok(summary)
}

fn demo_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId("LAMP-01".to_string()),
            name: "Desk lamp, walnut".to_string(),
            kind: ProductKind::Simple,
            catalog_cost: Some(Decimal::new(450_00, 2)),
            receipt_cost: None,
        },
        Product {
            id: ProductId("LAMP-02".to_string()),
            name: "Desk lamp, birch".to_string(),
            kind: ProductKind::Simple,
            catalog_cost: Some(Decimal::new(120_00, 2)),
            receipt_cost: None,
        },
        Product {
            id: ProductId("KIT-LAMP-DUO".to_string()),
            name: "Lamp duo kit".to_string(),
            kind: ProductKind::Bundle,
            catalog_cost: None,
            receipt_cost: None,
        },
    ]
}

fn demo_receipts() -> Vec<GoodsReceipt> {
    let receipt = |day: u32, product: &str, quantity: i64, unit_price: i64, overhead: i64| {
        GoodsReceipt {
            product_id: ProductId(product.to_string()),
            received_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
            quantity,
            unit_price: Decimal::new(unit_price * 100, 2),
            overhead: Decimal::new(overhead * 100, 2),
            sequence: 0,
        }
    };

    vec![
        receipt(1, "LAMP-01", 5, 440, 0),
        receipt(2, "LAMP-01", 5, 420, 50),
        receipt(3, "LAMP-01", 5, 400, 0),
        receipt(2, "LAMP-02", 3, 110, 0),
        receipt(4, "LAMP-02", 4, 115, 20),
    ]
}

fn demo_stock() -> Vec<StockLevel> {
    vec![
        StockLevel { product_id: ProductId("LAMP-01".to_string()), on_hand: 8 },
        StockLevel { product_id: ProductId("LAMP-02".to_string()), on_hand: 5 },
    ]
}

fn demo_listings() -> Vec<MarketplaceListing> {
    let listing = |id: &str, product: &str, platform: Platform, price: i64, rrc: Option<i64>| {
        MarketplaceListing {
            id: ListingId(id.to_string()),
            product_id: ProductId(product.to_string()),
            platform,
            sku: format!("{}-{}", platform.as_str(), product.to_ascii_lowercase()),
            seller_article: product.to_ascii_lowercase(),
            modes: platform.supported_modes().to_vec(),
            price: Decimal::new(price * 100, 2),
            profit: None,
            profitability_pct: None,
            overheads_pct: None,
            rrc: rrc.map(|value| Decimal::new(value * 100, 2)),
            catalog_price: None,
            receipt_price: None,
        }
    };

    vec![
        listing("WB-LAMP-01", "LAMP-01", Platform::Wildberries, 1_090, Some(1_050)),
        listing("OZ-LAMP-01", "LAMP-01", Platform::Ozon, 990, Some(1_050)),
        listing("YM-LAMP-02", "LAMP-02", Platform::YandexMarket, 310, None),
    ]
}

fn demo_rate_cards() -> Vec<RateCard> {
    vec![
        RateCard {
            listing_id: ListingId("WB-LAMP-01".to_string()),
            fbo_commission_pct: Some(Decimal::new(16_50, 2)),
            fbs_commission_pct: Some(Decimal::new(14_00, 2)),
            dbs_commission_pct: Some(Decimal::new(12_00, 2)),
            shared_logistics: Some(Decimal::new(72_00, 2)),
            ..RateCard::empty(ListingId("WB-LAMP-01".to_string()))
        },
        RateCard {
            listing_id: ListingId("OZ-LAMP-01".to_string()),
            fbo_commission_pct: Some(Decimal::new(17_00, 2)),
            fbs_commission_pct: Some(Decimal::new(15_50, 2)),
            dbs_commission_pct: Some(Decimal::new(13_00, 2)),
            express_commission_pct: Some(Decimal::new(22_00, 2)),
            fbo_logistics: Some(Decimal::new(84_00, 2)),
            fbs_logistics: Some(Decimal::new(66_00, 2)),
            dbs_logistics: Some(Decimal::new(30_00, 2)),
            express_logistics: Some(Decimal::new(140_00, 2)),
            ..RateCard::empty(ListingId("OZ-LAMP-01".to_string()))
        },
        RateCard {
            listing_id: ListingId("YM-LAMP-02".to_string()),
            fbo_commission_pct: Some(Decimal::new(15_00, 2)),
            fbs_commission_pct: Some(Decimal::new(13_50, 2)),
            express_commission_pct: Some(Decimal::new(19_00, 2)),
            shared_logistics: Some(Decimal::new(58_00, 2)),
            ..RateCard::empty(ListingId("YM-LAMP-02".to_string()))
        },
    ]
}

#[cfg(test)]
mod tests {
    use margin_core::batch::{self, BatchConfig};
    use margin_core::domain::listing::FulfillmentMode;
    use margin_core::domain::product::ProductId;
    use rust_decimal::Decimal;

    use crate::repositories::{InMemoryStore, ProductRepository, ReceiptRepository};
    use crate::snapshot::{load_catalog_snapshot, persist_cost_outcome};

    use super::seed_demo_dataset;

    #[tokio::test]
    async fn reseeding_does_not_duplicate_receipt_history() {
        let store = InMemoryStore::default();
        let first = seed_demo_dataset(&store, &store).await.expect("seed");
        let second = seed_demo_dataset(&store, &store).await.expect("reseed");

        assert_eq!(second.receipts, 0);
        assert_eq!(first.products, second.products);

        let receipts = ReceiptRepository::list(&store).await.expect("list receipts");
        assert_eq!(receipts.len(), first.receipts);
    }

    #[tokio::test]
    async fn seed_produces_a_computable_catalog() {
        let store = InMemoryStore::default();
        let summary = seed_demo_dataset(&store, &store).await.expect("seed");

        assert_eq!(summary.products, 3);
        assert_eq!(summary.receipts, 5);
        assert_eq!(summary.listings, 3);

        let snapshot = load_catalog_snapshot(&store, &store).await.expect("snapshot");
        let outcome = batch::recalc_costs(&snapshot);
        assert!(outcome.skipped.is_empty());
        persist_cost_outcome(&store, &outcome).await.expect("persist");

        // LAMP-01: stock 8 is covered by the two newest batches; the
        // crossing batch is May 2 at 420 + 50/5 overhead.
        let lamp = store
            .find_by_id(&ProductId("LAMP-01".to_string()))
            .await
            .expect("find")
            .expect("present");
        assert_eq!(lamp.receipt_cost, Some(Decimal::new(430_00, 2)));
    }

    #[tokio::test]
    async fn seeded_batch_runs_are_idempotent() {
        let store = InMemoryStore::default();
        seed_demo_dataset(&store, &store).await.expect("seed");

        let config = BatchConfig {
            mode: FulfillmentMode::Fbs,
            overheads_pct: Decimal::from(20),
            quarantine_threshold_pct: Decimal::from(20),
        };

        let snapshot = load_catalog_snapshot(&store, &store).await.expect("snapshot");
        let first_costs = batch::recalc_costs(&snapshot);
        persist_cost_outcome(&store, &first_costs).await.expect("persist");

        // Re-running on the persisted state must not move any figure.
        let snapshot = load_catalog_snapshot(&store, &store).await.expect("snapshot");
        let second_costs = batch::recalc_costs(&snapshot);
        assert_eq!(first_costs.updates, second_costs.updates);

        let first_profit = batch::recalc_profitability(&snapshot, &config);
        let second_profit = batch::recalc_profitability(&snapshot, &config);
        assert_eq!(first_profit.updates, second_profit.updates);
        assert_eq!(first_profit.distribution, second_profit.distribution);
    }
}
