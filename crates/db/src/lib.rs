pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;
pub mod snapshot;

pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{seed_demo_dataset, SeedSummary};
pub use repositories::{
    BomRepository, CampaignPriceRepository, InMemoryStore, ListingRepository, ProductRepository,
    RateCardRepository, ReceiptRepository, RepositoryError, SqlCatalogRepository,
    SqlListingRepository, StockRepository,
};
pub use snapshot::{
    load_catalog_snapshot, persist_campaign_outcome, persist_cost_outcome,
    persist_profitability_outcome, persist_reprice_outcome,
};
