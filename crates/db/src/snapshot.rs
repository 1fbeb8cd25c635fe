//! Bridges the repositories and the synchronous engine: materialize a
//! [`CatalogSnapshot`] before a run, write the outcome back after it.

use margin_core::batch::{
    CampaignRunOutcome, CatalogSnapshot, CostRunOutcome, ProfitabilityRunOutcome,
    RepriceRunOutcome,
};

use crate::repositories::{
    BomRepository, CampaignPriceRepository, ListingRepository, ProductRepository,
    RateCardRepository, ReceiptRepository, RepositoryError, StockRepository,
};

/// Load everything a batch run reads in one pass. The engine itself never
/// touches the database; partial failures here are systemic and abort the
/// run before any computation starts.
pub async fn load_catalog_snapshot<C, L>(
    catalog: &C,
    channel: &L,
) -> Result<CatalogSnapshot, RepositoryError>
where
    C: ProductRepository + ReceiptRepository + StockRepository + BomRepository,
    L: ListingRepository + RateCardRepository + CampaignPriceRepository,
{
    let products = ProductRepository::list(catalog).await?;
    let receipts = ReceiptRepository::list(catalog).await?;
    let stock = StockRepository::list(catalog).await?;
    let boms = BomRepository::list(catalog).await?;
    let listings = ListingRepository::list(channel).await?;
    let rate_cards = RateCardRepository::list(channel).await?;
    let campaigns = CampaignPriceRepository::list(channel).await?;

    tracing::debug!(
        products = products.len(),
        receipts = receipts.len(),
        listings = listings.len(),
        rate_cards = rate_cards.len(),
        "catalog snapshot materialized"
    );

    Ok(CatalogSnapshot::new(products, receipts, stock, listings, rate_cards, boms, campaigns))
}

/// Upsert the receipt cost basis computed for each product.
pub async fn persist_cost_outcome<R>(
    products: &R,
    outcome: &CostRunOutcome,
) -> Result<(), RepositoryError>
where
    R: ProductRepository + ?Sized,
{
    for update in &outcome.updates {
        products.save_receipt_cost(&update.product_id, update.receipt_cost).await?;
    }
    Ok(())
}

/// Overwrite each listing's profit/profitability with the forward result.
pub async fn persist_profitability_outcome<R>(
    listings: &R,
    outcome: &ProfitabilityRunOutcome,
) -> Result<(), RepositoryError>
where
    R: ListingRepository + ?Sized,
{
    for update in &outcome.updates {
        listings
            .save_profitability(&update.listing_id, update.profit, update.profitability_pct)
            .await?;
    }
    Ok(())
}

/// Persist the candidate prices produced by target repricing. Listings the
/// floor policy left untouched are not rewritten.
pub async fn persist_reprice_outcome<R>(
    listings: &R,
    outcome: &RepriceRunOutcome,
) -> Result<(), RepositoryError>
where
    R: ListingRepository + ?Sized,
{
    for update in outcome.updates.iter().filter(|update| update.recomputed) {
        listings
            .save_reprice(
                &update.listing_id,
                update.catalog_price,
                update.receipt_price,
                update.profitability_pct,
            )
            .await?;
    }
    Ok(())
}

/// Persist campaign prices and the profitability they imply.
pub async fn persist_campaign_outcome<R>(
    listings: &R,
    outcome: &CampaignRunOutcome,
) -> Result<(), RepositoryError>
where
    R: ListingRepository + ?Sized,
{
    for update in &outcome.updates {
        listings
            .save_campaign_result(
                &update.listing_id,
                update.price,
                update.profit,
                update.profitability_pct,
            )
            .await?;
    }
    Ok(())
}
