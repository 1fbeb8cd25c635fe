use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use margin_core::domain::bundle::BundleComponent;
use margin_core::domain::listing::{CampaignPrice, ListingId, MarketplaceListing};
use margin_core::domain::product::{Product, ProductId};
use margin_core::domain::rates::RateCard;
use margin_core::domain::receipt::{GoodsReceipt, StockLevel};

use super::{
    BomRepository, CampaignPriceRepository, ListingRepository, ProductRepository,
    RateCardRepository, ReceiptRepository, RepositoryError, StockRepository,
};

/// In-memory implementation of every repository trait, for tests and for
/// exercising the engine without a database file.
#[derive(Default)]
pub struct InMemoryStore {
    products: RwLock<BTreeMap<String, Product>>,
    receipts: RwLock<Vec<GoodsReceipt>>,
    stock: RwLock<BTreeMap<String, StockLevel>>,
    boms: RwLock<BTreeMap<String, Vec<BundleComponent>>>,
    listings: RwLock<BTreeMap<String, MarketplaceListing>>,
    rate_cards: RwLock<BTreeMap<String, RateCard>>,
    campaigns: RwLock<BTreeMap<String, CampaignPrice>>,
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn upsert(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products.insert(product.id.0.clone(), product);
        Ok(())
    }

    async fn save_receipt_cost(
        &self,
        id: &ProductId,
        receipt_cost: Decimal,
    ) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(&id.0) {
            product.receipt_cost = Some(receipt_cost);
        }
        Ok(())
    }
}

#[async_trait]
impl ReceiptRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<GoodsReceipt>, RepositoryError> {
        let receipts = self.receipts.read().await;
        Ok(receipts.clone())
    }

    async fn list_for_product(
        &self,
        id: &ProductId,
    ) -> Result<Vec<GoodsReceipt>, RepositoryError> {
        let receipts = self.receipts.read().await;
        Ok(receipts.iter().filter(|receipt| receipt.product_id == *id).cloned().collect())
    }

    async fn append(&self, mut receipt: GoodsReceipt) -> Result<(), RepositoryError> {
        let mut receipts = self.receipts.write().await;
        receipt.sequence = receipts.len() as i64 + 1;
        receipts.push(receipt);
        Ok(())
    }
}

#[async_trait]
impl StockRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<StockLevel>, RepositoryError> {
        let stock = self.stock.read().await;
        Ok(stock.values().cloned().collect())
    }

    async fn set(&self, level: StockLevel) -> Result<(), RepositoryError> {
        let mut stock = self.stock.write().await;
        stock.insert(level.product_id.0.clone(), level);
        Ok(())
    }
}

#[async_trait]
impl BomRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<(ProductId, Vec<BundleComponent>)>, RepositoryError> {
        let boms = self.boms.read().await;
        Ok(boms
            .iter()
            .map(|(bundle_id, components)| (ProductId(bundle_id.clone()), components.clone()))
            .collect())
    }

    async fn replace(
        &self,
        bundle_id: &ProductId,
        components: Vec<BundleComponent>,
    ) -> Result<(), RepositoryError> {
        let mut boms = self.boms.write().await;
        boms.insert(bundle_id.0.clone(), components);
        Ok(())
    }
}

#[async_trait]
impl ListingRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<MarketplaceListing>, RepositoryError> {
        let listings = self.listings.read().await;
        Ok(listings.values().cloned().collect())
    }

    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<MarketplaceListing>, RepositoryError> {
        let listings = self.listings.read().await;
        Ok(listings.get(&id.0).cloned())
    }

    async fn upsert(&self, listing: MarketplaceListing) -> Result<(), RepositoryError> {
        let mut listings = self.listings.write().await;
        listings.insert(listing.id.0.clone(), listing);
        Ok(())
    }

    async fn save_profitability(
        &self,
        id: &ListingId,
        profit: Decimal,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError> {
        let mut listings = self.listings.write().await;
        if let Some(listing) = listings.get_mut(&id.0) {
            listing.profit = Some(profit);
            listing.profitability_pct = Some(profitability_pct);
        }
        Ok(())
    }

    async fn save_reprice(
        &self,
        id: &ListingId,
        catalog_price: Option<Decimal>,
        receipt_price: Option<Decimal>,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError> {
        let mut listings = self.listings.write().await;
        if let Some(listing) = listings.get_mut(&id.0) {
            listing.catalog_price = catalog_price;
            listing.receipt_price = receipt_price;
            listing.profitability_pct = Some(profitability_pct);
        }
        Ok(())
    }

    async fn save_campaign_result(
        &self,
        id: &ListingId,
        price: Decimal,
        profit: Decimal,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError> {
        let mut listings = self.listings.write().await;
        if let Some(listing) = listings.get_mut(&id.0) {
            listing.price = price;
            listing.profit = Some(profit);
            listing.profitability_pct = Some(profitability_pct);
        }
        Ok(())
    }
}

#[async_trait]
impl RateCardRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<RateCard>, RepositoryError> {
        let rate_cards = self.rate_cards.read().await;
        Ok(rate_cards.values().cloned().collect())
    }

    async fn upsert(&self, card: RateCard) -> Result<(), RepositoryError> {
        let mut rate_cards = self.rate_cards.write().await;
        rate_cards.insert(card.listing_id.0.clone(), card);
        Ok(())
    }
}

#[async_trait]
impl CampaignPriceRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<CampaignPrice>, RepositoryError> {
        let campaigns = self.campaigns.read().await;
        Ok(campaigns.values().cloned().collect())
    }

    async fn upsert(&self, campaign: CampaignPrice) -> Result<(), RepositoryError> {
        let mut campaigns = self.campaigns.write().await;
        campaigns.insert(campaign.listing_id.0.clone(), campaign);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use margin_core::domain::product::{Product, ProductId, ProductKind};
    use margin_core::domain::receipt::GoodsReceipt;

    use crate::repositories::{ProductRepository, ReceiptRepository};

    use super::InMemoryStore;

    #[tokio::test]
    async fn product_round_trip_and_cost_update() {
        let store = InMemoryStore::default();
        let product = Product {
            id: ProductId("SKU-1".to_string()),
            name: "Desk lamp".to_string(),
            kind: ProductKind::Simple,
            catalog_cost: Some(Decimal::new(450_00, 2)),
            receipt_cost: None,
        };

        store.upsert(product.clone()).await.expect("upsert product");
        store
            .save_receipt_cost(&product.id, Decimal::new(410_00, 2))
            .await
            .expect("save cost");

        let found = store.find_by_id(&product.id).await.expect("find product").expect("present");
        assert_eq!(found.receipt_cost, Some(Decimal::new(410_00, 2)));
    }

    #[tokio::test]
    async fn receipts_get_monotonic_sequences() {
        let store = InMemoryStore::default();
        let receipt = GoodsReceipt {
            product_id: ProductId("SKU-1".to_string()),
            received_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            quantity: 5,
            unit_price: Decimal::new(10_00, 2),
            overhead: Decimal::ZERO,
            sequence: 0,
        };

        store.append(receipt.clone()).await.expect("append first");
        store.append(receipt).await.expect("append second");

        let receipts =
            store.list_for_product(&ProductId("SKU-1".to_string())).await.expect("list");
        let sequences: Vec<i64> = receipts.iter().map(|receipt| receipt.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
    }
}
