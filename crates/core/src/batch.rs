//! Single-pass batch computation over a materialized catalog.
//!
//! The snapshot holds everything a run reads; the engine performs no I/O and
//! no locking. Items are processed in ascending id order and all arithmetic
//! is decimal, so re-running on unchanged inputs yields identical outputs.
//! Per-item failures become skip records; they never abort the run.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::costing::{bundle::bundle_cost, fifo};
use crate::domain::bundle::BundleComponent;
use crate::domain::listing::{CampaignPrice, FulfillmentMode, ListingId, MarketplaceListing};
use crate::domain::product::{Product, ProductId, ProductKind};
use crate::domain::rates::{ChannelRates, RateCard};
use crate::domain::receipt::{GoodsReceipt, StockLevel};
use crate::errors::SkipReason;
use crate::pricing::distribution::{ProfitabilityBand, ProfitabilityDistribution};
use crate::pricing::quarantine::is_quarantined;
use crate::pricing::reconcile::{
    profitability_from_price, reconcile_target_profitability, CostBasisPair,
};

/// Per-run engine parameters. Passed explicitly into every operation; the
/// engine keeps no process-wide state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    pub mode: FulfillmentMode,
    pub overheads_pct: Decimal,
    pub quarantine_threshold_pct: Decimal,
}

/// Materialized inputs for one run: catalog, receipt ledger, stock snapshot,
/// listings, rate cards, bills of materials, and campaign prices.
#[derive(Clone, Debug, Default)]
pub struct CatalogSnapshot {
    products: BTreeMap<ProductId, Product>,
    receipts: BTreeMap<ProductId, Vec<GoodsReceipt>>,
    stock: BTreeMap<ProductId, i64>,
    listings: Vec<MarketplaceListing>,
    rate_cards: BTreeMap<ListingId, RateCard>,
    boms: BTreeMap<ProductId, Vec<BundleComponent>>,
    campaign_prices: Vec<CampaignPrice>,
}

impl CatalogSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        products: Vec<Product>,
        receipts: Vec<GoodsReceipt>,
        stock: Vec<StockLevel>,
        mut listings: Vec<MarketplaceListing>,
        rate_cards: Vec<RateCard>,
        boms: Vec<(ProductId, Vec<BundleComponent>)>,
        mut campaign_prices: Vec<CampaignPrice>,
    ) -> Self {
        let products: BTreeMap<_, _> =
            products.into_iter().map(|product| (product.id.clone(), product)).collect();

        let mut grouped_receipts: BTreeMap<ProductId, Vec<GoodsReceipt>> = BTreeMap::new();
        for receipt in receipts {
            grouped_receipts.entry(receipt.product_id.clone()).or_default().push(receipt);
        }

        let stock = stock.into_iter().map(|level| (level.product_id, level.on_hand)).collect();

        listings.sort_by(|a, b| a.id.cmp(&b.id));
        campaign_prices.sort_by(|a, b| a.listing_id.cmp(&b.listing_id));

        let rate_cards =
            rate_cards.into_iter().map(|card| (card.listing_id.clone(), card)).collect();

        Self {
            products,
            receipts: grouped_receipts,
            stock,
            listings,
            rate_cards,
            boms: boms.into_iter().collect(),
            campaign_prices,
        }
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    fn receipts_for(&self, id: &ProductId) -> &[GoodsReceipt] {
        self.receipts.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    fn on_hand(&self, id: &ProductId) -> i64 {
        self.stock.get(id).copied().unwrap_or(0)
    }

    fn rates_for(&self, listing: &MarketplaceListing, mode: FulfillmentMode) -> ChannelRates {
        match self.rate_cards.get(&listing.id) {
            Some(card) => card.resolve(listing.platform, mode),
            None => {
                warn!(
                    listing_id = %listing.id,
                    platform = listing.platform.as_str(),
                    mode = mode.as_str(),
                    "no commission/logistics entry for listing, using zero rates"
                );
                ChannelRates::default()
            }
        }
    }

    /// Unit cost for one simple component under the FIFO rule, for bundle
    /// aggregation. Structural problems surface as skip reasons.
    fn component_unit_cost(&self, component_id: &ProductId) -> Result<Decimal, SkipReason> {
        let component = self
            .product(component_id)
            .ok_or_else(|| SkipReason::UnknownComponent { component: component_id.clone() })?;
        if component.kind == ProductKind::Bundle {
            return Err(SkipReason::NestedBundle { component: component_id.clone() });
        }
        Ok(fifo::unit_cost(self.receipts_for(component_id), self.on_hand(component_id)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSkip {
    pub product_id: ProductId,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSkip {
    pub listing_id: ListingId,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostUpdate {
    pub product_id: ProductId,
    pub receipt_cost: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostRunOutcome {
    pub run_id: Uuid,
    pub updates: Vec<CostUpdate>,
    pub skipped: Vec<ProductSkip>,
}

/// Derive the receipt cost basis for every product: FIFO over receipts for
/// simple products, component aggregation for bundles.
pub fn recalc_costs(snapshot: &CatalogSnapshot) -> CostRunOutcome {
    let run_id = Uuid::new_v4();
    let mut updates = Vec::new();
    let mut skipped = Vec::new();

    for product in snapshot.products.values() {
        match product.kind {
            ProductKind::Simple => {
                let receipts = snapshot.receipts_for(&product.id);
                if receipts.is_empty() {
                    warn!(product_id = %product.id, "product has no goods receipts, cost basis degrades to zero");
                }
                let receipt_cost = fifo::unit_cost(receipts, snapshot.on_hand(&product.id));
                updates.push(CostUpdate { product_id: product.id.clone(), receipt_cost });
            }
            ProductKind::Bundle => {
                let components =
                    snapshot.boms.get(&product.id).map(Vec::as_slice).unwrap_or_default();
                match bundle_cost(components, |id| snapshot.component_unit_cost(id)) {
                    Ok(receipt_cost) => {
                        updates.push(CostUpdate { product_id: product.id.clone(), receipt_cost });
                    }
                    Err(reason) => {
                        warn!(product_id = %product.id, %reason, "skipping bundle cost");
                        skipped.push(ProductSkip { product_id: product.id.clone(), reason });
                    }
                }
            }
        }
    }

    info!(
        %run_id,
        updated = updates.len(),
        skipped = skipped.len(),
        "cost recalculation finished"
    );
    CostRunOutcome { run_id, updates, skipped }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityUpdate {
    pub listing_id: ListingId,
    pub profit: Decimal,
    pub profitability_pct: Decimal,
    pub band: ProfitabilityBand,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityRunOutcome {
    pub run_id: Uuid,
    pub updates: Vec<ProfitabilityUpdate>,
    pub skipped: Vec<ListingSkip>,
    pub distribution: ProfitabilityDistribution,
}

impl ProfitabilityRunOutcome {
    pub fn updates_in_band(&self, band: ProfitabilityBand) -> Vec<&ProfitabilityUpdate> {
        self.updates.iter().filter(|update| update.band == band).collect()
    }
}

/// Forward pass: recompute profit and profitability from each listing's
/// current price at the configured fulfillment mode.
pub fn recalc_profitability(
    snapshot: &CatalogSnapshot,
    config: &BatchConfig,
) -> ProfitabilityRunOutcome {
    let run_id = Uuid::new_v4();
    let mut updates = Vec::new();
    let mut skipped = Vec::new();
    let mut distribution = ProfitabilityDistribution::default();

    for listing in &snapshot.listings {
        let Some(product) = snapshot.product(&listing.product_id) else {
            let reason = SkipReason::UnknownProduct { product: listing.product_id.clone() };
            warn!(listing_id = %listing.id, %reason, "skipping listing");
            skipped.push(ListingSkip { listing_id: listing.id.clone(), reason });
            continue;
        };

        let cost = product.effective_cost().unwrap_or_else(|| {
            warn!(
                listing_id = %listing.id,
                product_id = %product.id,
                "product has no cost basis, profitability degrades to a zero-cost figure"
            );
            Decimal::ZERO
        });

        let rates = snapshot.rates_for(listing, config.mode);
        let overheads_pct = listing.overheads_or(config.overheads_pct);

        match profitability_from_price(listing.price, cost, &rates, overheads_pct) {
            Ok(computation) => {
                distribution.record(computation.profitability_pct);
                updates.push(ProfitabilityUpdate {
                    listing_id: listing.id.clone(),
                    profit: computation.profit,
                    profitability_pct: computation.profitability_pct,
                    band: ProfitabilityBand::classify(computation.profitability_pct),
                });
            }
            Err(reason) => {
                warn!(listing_id = %listing.id, %reason, "skipping listing");
                skipped.push(ListingSkip { listing_id: listing.id.clone(), reason });
            }
        }
    }

    info!(
        %run_id,
        mode = config.mode.as_str(),
        updated = updates.len(),
        skipped = skipped.len(),
        "profitability recalculation finished"
    );
    ProfitabilityRunOutcome { run_id, updates, skipped, distribution }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepriceUpdate {
    pub listing_id: ListingId,
    pub catalog_price: Option<Decimal>,
    pub receipt_price: Option<Decimal>,
    pub profitability_pct: Decimal,
    pub recomputed: bool,
    pub quarantined: bool,
}

impl RepriceUpdate {
    /// The price a push would use: the receipt-cost candidate when present,
    /// otherwise the catalog-cost candidate.
    pub fn proposed_price(&self) -> Option<Decimal> {
        self.receipt_price.or(self.catalog_price)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepriceRunOutcome {
    pub run_id: Uuid,
    pub updates: Vec<RepriceUpdate>,
    pub skipped: Vec<ListingSkip>,
}

/// Incoming-profitability reconciliation across the catalog: apply `target`
/// as a profitability floor and reprice the listings it raises. Newly
/// computed prices are checked against the quarantine guard before any
/// external push can pick them up.
pub fn reprice_to_target(
    snapshot: &CatalogSnapshot,
    config: &BatchConfig,
    target_pct: Decimal,
) -> RepriceRunOutcome {
    let run_id = Uuid::new_v4();
    let mut updates = Vec::new();
    let mut skipped = Vec::new();

    for listing in &snapshot.listings {
        let Some(product) = snapshot.product(&listing.product_id) else {
            let reason = SkipReason::UnknownProduct { product: listing.product_id.clone() };
            warn!(listing_id = %listing.id, %reason, "skipping listing");
            skipped.push(ListingSkip { listing_id: listing.id.clone(), reason });
            continue;
        };

        let rates = snapshot.rates_for(listing, config.mode);
        let overheads_pct = listing.overheads_or(config.overheads_pct);
        let costs = CostBasisPair::of(product);

        match reconcile_target_profitability(
            target_pct,
            listing.profitability_pct,
            listing.price,
            &costs,
            &rates,
            overheads_pct,
        ) {
            Ok(outcome) => {
                let quarantined = outcome.recomputed
                    && outcome
                        .receipt_price
                        .or(outcome.catalog_price)
                        .map(|price| {
                            is_quarantined(listing.rrc, price, config.quarantine_threshold_pct)
                        })
                        .unwrap_or(false);
                updates.push(RepriceUpdate {
                    listing_id: listing.id.clone(),
                    catalog_price: outcome.catalog_price,
                    receipt_price: outcome.receipt_price,
                    profitability_pct: outcome.profitability_pct,
                    recomputed: outcome.recomputed,
                    quarantined,
                });
            }
            Err(reason) => {
                warn!(listing_id = %listing.id, %reason, "skipping listing");
                skipped.push(ListingSkip { listing_id: listing.id.clone(), reason });
            }
        }
    }

    info!(
        %run_id,
        target = %target_pct,
        updated = updates.len(),
        skipped = skipped.len(),
        "target-profitability repricing finished"
    );
    RepriceRunOutcome { run_id, updates, skipped }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignUpdate {
    pub listing_id: ListingId,
    pub price: Decimal,
    pub profit: Decimal,
    pub profitability_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignRunOutcome {
    pub run_id: Uuid,
    pub updates: Vec<CampaignUpdate>,
    pub skipped: Vec<ListingSkip>,
}

/// Incoming-price reconciliation: a campaign price is externally fixed, so
/// the forward pass derives the profitability it implies. The floor policy
/// does not apply; an explicit price always wins.
pub fn reprice_campaigns(snapshot: &CatalogSnapshot, config: &BatchConfig) -> CampaignRunOutcome {
    let run_id = Uuid::new_v4();
    let mut updates = Vec::new();
    let mut skipped = Vec::new();

    for campaign in &snapshot.campaign_prices {
        let Some(listing) =
            snapshot.listings.iter().find(|listing| listing.id == campaign.listing_id)
        else {
            let reason = SkipReason::UnknownListing { listing: campaign.listing_id.clone() };
            warn!(listing_id = %campaign.listing_id, %reason, "skipping campaign price");
            skipped.push(ListingSkip { listing_id: campaign.listing_id.clone(), reason });
            continue;
        };

        let Some(product) = snapshot.product(&listing.product_id) else {
            let reason = SkipReason::UnknownProduct { product: listing.product_id.clone() };
            warn!(listing_id = %listing.id, %reason, "skipping campaign price");
            skipped.push(ListingSkip { listing_id: listing.id.clone(), reason });
            continue;
        };

        let cost = product.effective_cost().unwrap_or_else(|| {
            warn!(
                listing_id = %listing.id,
                product_id = %product.id,
                "product has no cost basis, campaign profitability degrades to a zero-cost figure"
            );
            Decimal::ZERO
        });
        let rates = snapshot.rates_for(listing, config.mode);
        let overheads_pct = listing.overheads_or(config.overheads_pct);

        match profitability_from_price(campaign.price, cost, &rates, overheads_pct) {
            Ok(computation) => updates.push(CampaignUpdate {
                listing_id: listing.id.clone(),
                price: campaign.price,
                profit: computation.profit,
                profitability_pct: computation.profitability_pct,
            }),
            Err(reason) => {
                warn!(listing_id = %listing.id, %reason, "skipping campaign price");
                skipped.push(ListingSkip { listing_id: listing.id.clone(), reason });
            }
        }
    }

    info!(
        %run_id,
        updated = updates.len(),
        skipped = skipped.len(),
        "campaign-price reconciliation finished"
    );
    CampaignRunOutcome { run_id, updates, skipped }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineReport {
    pub run_id: Uuid,
    pub evaluated: usize,
    pub flagged: Vec<ListingId>,
}

/// Evaluate every listing's current price against its reference retail
/// price. The report is derived state for manual-review tooling; nothing is
/// persisted.
pub fn quarantine_report(snapshot: &CatalogSnapshot, threshold_pct: Decimal) -> QuarantineReport {
    let run_id = Uuid::new_v4();
    let flagged = snapshot
        .listings
        .iter()
        .filter(|listing| is_quarantined(listing.rrc, listing.price, threshold_pct))
        .map(|listing| listing.id.clone())
        .collect::<Vec<_>>();

    info!(
        %run_id,
        evaluated = snapshot.listings.len(),
        flagged = flagged.len(),
        "quarantine evaluation finished"
    );
    QuarantineReport { run_id, evaluated: snapshot.listings.len(), flagged }
}
