use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use margin_core::domain::bundle::BundleComponent;
use margin_core::domain::listing::{CampaignPrice, ListingId, MarketplaceListing};
use margin_core::domain::product::{Product, ProductId};
use margin_core::domain::rates::RateCard;
use margin_core::domain::receipt::{GoodsReceipt, StockLevel};

pub mod catalog;
pub mod listing;
pub mod memory;

pub use catalog::SqlCatalogRepository;
pub use listing::SqlListingRepository;
pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn upsert(&self, product: Product) -> Result<(), RepositoryError>;
    async fn save_receipt_cost(
        &self,
        id: &ProductId,
        receipt_cost: Decimal,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<GoodsReceipt>, RepositoryError>;
    async fn list_for_product(
        &self,
        id: &ProductId,
    ) -> Result<Vec<GoodsReceipt>, RepositoryError>;

    /// Receipts are append-only; the warehouse sync never edits them.
    async fn append(&self, receipt: GoodsReceipt) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<StockLevel>, RepositoryError>;
    async fn set(&self, level: StockLevel) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait BomRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<(ProductId, Vec<BundleComponent>)>, RepositoryError>;
    async fn replace(
        &self,
        bundle_id: &ProductId,
        components: Vec<BundleComponent>,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<MarketplaceListing>, RepositoryError>;
    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<MarketplaceListing>, RepositoryError>;
    async fn upsert(&self, listing: MarketplaceListing) -> Result<(), RepositoryError>;
    async fn save_profitability(
        &self,
        id: &ListingId,
        profit: Decimal,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError>;
    async fn save_reprice(
        &self,
        id: &ListingId,
        catalog_price: Option<Decimal>,
        receipt_price: Option<Decimal>,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError>;
    async fn save_campaign_result(
        &self,
        id: &ListingId,
        price: Decimal,
        profit: Decimal,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait RateCardRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<RateCard>, RepositoryError>;
    async fn upsert(&self, card: RateCard) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CampaignPriceRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<CampaignPrice>, RepositoryError>;
    async fn upsert(&self, campaign: CampaignPrice) -> Result<(), RepositoryError>;
}

// Column codecs shared by the sqlite repositories. Amounts are stored as
// canonical decimal strings, timestamps as RFC 3339 text.

pub(crate) fn encode_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

pub(crate) fn encode_optional_decimal(value: Option<Decimal>) -> Option<String> {
    value.map(encode_decimal)
}

pub(crate) fn parse_decimal(column: &str, value: String) -> Result<Decimal, RepositoryError> {
    use std::str::FromStr;

    Decimal::from_str(&value).map_err(|_| {
        RepositoryError::Decode(format!("column `{column}` holds a malformed decimal `{value}`"))
    })
}

pub(crate) fn parse_optional_decimal(
    column: &str,
    value: Option<String>,
) -> Result<Option<Decimal>, RepositoryError> {
    value.map(|raw| parse_decimal(column, raw)).transpose()
}

pub(crate) fn parse_timestamp(
    column: &str,
    value: String,
) -> Result<chrono::DateTime<chrono::Utc>, RepositoryError> {
    chrono::DateTime::parse_from_rfc3339(&value)
        .map(|parsed| parsed.with_timezone(&chrono::Utc))
        .map_err(|_| {
            RepositoryError::Decode(format!(
                "column `{column}` holds a malformed timestamp `{value}`"
            ))
        })
}
