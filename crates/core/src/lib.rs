//! Unit-economics engine: FIFO cost derivation and bidirectional
//! price/profitability reconciliation for multi-marketplace catalogs.
//!
//! Everything in this crate is synchronous and free of I/O. Batch runs
//! consume a [`batch::CatalogSnapshot`] of already-materialized data and
//! produce update/skip records; loading and persisting them is the caller's
//! concern.

pub mod batch;
pub mod config;
pub mod costing;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use batch::{
    recalc_costs, recalc_profitability, quarantine_report, reprice_campaigns, reprice_to_target,
    BatchConfig, CampaignRunOutcome, CatalogSnapshot, CostRunOutcome, ProfitabilityRunOutcome,
    QuarantineReport, RepriceRunOutcome,
};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::bundle::BundleComponent;
pub use domain::listing::{
    CampaignPrice, FulfillmentMode, ListingId, MarketplaceListing, Platform,
};
pub use domain::product::{Product, ProductId, ProductKind};
pub use domain::rates::{ChannelRates, RateCard};
pub use domain::receipt::{GoodsReceipt, StockLevel};
pub use errors::SkipReason;
pub use pricing::distribution::{ProfitabilityBand, ProfitabilityDistribution};
