use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use margin_core::domain::listing::{
    CampaignPrice, FulfillmentMode, ListingId, MarketplaceListing, Platform,
};
use margin_core::domain::product::ProductId;
use margin_core::domain::rates::RateCard;

use super::{
    encode_decimal, encode_optional_decimal, parse_decimal, parse_optional_decimal,
    CampaignPriceRepository, ListingRepository, RateCardRepository, RepositoryError,
};
use crate::DbPool;

/// Sqlite access to the channel side of the catalog: listings, commission/
/// logistics cards, and campaign prices.
pub struct SqlListingRepository {
    pool: DbPool,
}

impl SqlListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const LISTING_COLUMNS: &str = "id, product_id, platform, sku, seller_article, modes, price, \
     profit, profitability_pct, overheads_pct, rrc, catalog_price, receipt_price";

#[async_trait]
impl ListingRepository for SqlListingRepository {
    async fn list(&self) -> Result<Vec<MarketplaceListing>, RepositoryError> {
        let rows =
            sqlx::query(&format!("SELECT {LISTING_COLUMNS} FROM listing ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(listing_from_row).collect()
    }

    async fn find_by_id(
        &self,
        id: &ListingId,
    ) -> Result<Option<MarketplaceListing>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {LISTING_COLUMNS} FROM listing WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(listing_from_row).transpose()
    }

    async fn upsert(&self, listing: MarketplaceListing) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO listing (
                id, product_id, platform, sku, seller_article, modes, price,
                profit, profitability_pct, overheads_pct, rrc, catalog_price, receipt_price
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                product_id = excluded.product_id,
                platform = excluded.platform,
                sku = excluded.sku,
                seller_article = excluded.seller_article,
                modes = excluded.modes,
                price = excluded.price,
                profit = excluded.profit,
                profitability_pct = excluded.profitability_pct,
                overheads_pct = excluded.overheads_pct,
                rrc = excluded.rrc,
                catalog_price = excluded.catalog_price,
                receipt_price = excluded.receipt_price",
        )
        .bind(&listing.id.0)
        .bind(&listing.product_id.0)
        .bind(listing.platform.as_str())
        .bind(&listing.sku)
        .bind(&listing.seller_article)
        .bind(encode_modes(&listing.modes))
        .bind(encode_decimal(listing.price))
        .bind(encode_optional_decimal(listing.profit))
        .bind(encode_optional_decimal(listing.profitability_pct))
        .bind(encode_optional_decimal(listing.overheads_pct))
        .bind(encode_optional_decimal(listing.rrc))
        .bind(encode_optional_decimal(listing.catalog_price))
        .bind(encode_optional_decimal(listing.receipt_price))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_profitability(
        &self,
        id: &ListingId,
        profit: Decimal,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE listing SET profit = ?, profitability_pct = ? WHERE id = ?")
            .bind(encode_decimal(profit))
            .bind(encode_decimal(profitability_pct))
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn save_reprice(
        &self,
        id: &ListingId,
        catalog_price: Option<Decimal>,
        receipt_price: Option<Decimal>,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE listing SET catalog_price = ?, receipt_price = ?, profitability_pct = ?
             WHERE id = ?",
        )
        .bind(encode_optional_decimal(catalog_price))
        .bind(encode_optional_decimal(receipt_price))
        .bind(encode_decimal(profitability_pct))
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_campaign_result(
        &self,
        id: &ListingId,
        price: Decimal,
        profit: Decimal,
        profitability_pct: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE listing SET price = ?, profit = ?, profitability_pct = ? WHERE id = ?",
        )
        .bind(encode_decimal(price))
        .bind(encode_decimal(profit))
        .bind(encode_decimal(profitability_pct))
        .bind(&id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RateCardRepository for SqlListingRepository {
    async fn list(&self) -> Result<Vec<RateCard>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT listing_id, fbo_commission_pct, fbs_commission_pct, dbs_commission_pct,
                    express_commission_pct, fbo_logistics, fbs_logistics, dbs_logistics,
                    express_logistics, shared_logistics
             FROM rate_card
             ORDER BY listing_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(rate_card_from_row).collect()
    }

    async fn upsert(&self, card: RateCard) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO rate_card (
                listing_id, fbo_commission_pct, fbs_commission_pct, dbs_commission_pct,
                express_commission_pct, fbo_logistics, fbs_logistics, dbs_logistics,
                express_logistics, shared_logistics
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(listing_id) DO UPDATE SET
                fbo_commission_pct = excluded.fbo_commission_pct,
                fbs_commission_pct = excluded.fbs_commission_pct,
                dbs_commission_pct = excluded.dbs_commission_pct,
                express_commission_pct = excluded.express_commission_pct,
                fbo_logistics = excluded.fbo_logistics,
                fbs_logistics = excluded.fbs_logistics,
                dbs_logistics = excluded.dbs_logistics,
                express_logistics = excluded.express_logistics,
                shared_logistics = excluded.shared_logistics",
        )
        .bind(&card.listing_id.0)
        .bind(encode_optional_decimal(card.fbo_commission_pct))
        .bind(encode_optional_decimal(card.fbs_commission_pct))
        .bind(encode_optional_decimal(card.dbs_commission_pct))
        .bind(encode_optional_decimal(card.express_commission_pct))
        .bind(encode_optional_decimal(card.fbo_logistics))
        .bind(encode_optional_decimal(card.fbs_logistics))
        .bind(encode_optional_decimal(card.dbs_logistics))
        .bind(encode_optional_decimal(card.express_logistics))
        .bind(encode_optional_decimal(card.shared_logistics))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CampaignPriceRepository for SqlListingRepository {
    async fn list(&self) -> Result<Vec<CampaignPrice>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT listing_id, price, campaign_name FROM campaign_price ORDER BY listing_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(CampaignPrice {
                    listing_id: ListingId(row.try_get("listing_id")?),
                    price: parse_decimal("price", row.try_get("price")?)?,
                    campaign_name: row.try_get("campaign_name")?,
                })
            })
            .collect()
    }

    async fn upsert(&self, campaign: CampaignPrice) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO campaign_price (listing_id, price, campaign_name)
             VALUES (?, ?, ?)
             ON CONFLICT(listing_id) DO UPDATE SET
                price = excluded.price,
                campaign_name = excluded.campaign_name",
        )
        .bind(&campaign.listing_id.0)
        .bind(encode_decimal(campaign.price))
        .bind(campaign.campaign_name.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn encode_modes(modes: &[FulfillmentMode]) -> String {
    modes.iter().map(FulfillmentMode::as_str).collect::<Vec<_>>().join(",")
}

fn parse_modes(raw: &str) -> Result<Vec<FulfillmentMode>, RepositoryError> {
    raw.split(',')
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            FulfillmentMode::parse(chunk).ok_or_else(|| {
                RepositoryError::Decode(format!("unknown fulfillment mode `{chunk}`"))
            })
        })
        .collect()
}

fn listing_from_row(row: SqliteRow) -> Result<MarketplaceListing, RepositoryError> {
    let platform_raw = row.try_get::<String, _>("platform")?;
    let platform = Platform::parse(&platform_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown platform `{platform_raw}`")))?;
    let modes_raw = row.try_get::<String, _>("modes")?;

    Ok(MarketplaceListing {
        id: ListingId(row.try_get("id")?),
        product_id: ProductId(row.try_get("product_id")?),
        platform,
        sku: row.try_get("sku")?,
        seller_article: row.try_get("seller_article")?,
        modes: parse_modes(&modes_raw)?,
        price: parse_decimal("price", row.try_get("price")?)?,
        profit: parse_optional_decimal("profit", row.try_get("profit")?)?,
        profitability_pct: parse_optional_decimal(
            "profitability_pct",
            row.try_get("profitability_pct")?,
        )?,
        overheads_pct: parse_optional_decimal("overheads_pct", row.try_get("overheads_pct")?)?,
        rrc: parse_optional_decimal("rrc", row.try_get("rrc")?)?,
        catalog_price: parse_optional_decimal("catalog_price", row.try_get("catalog_price")?)?,
        receipt_price: parse_optional_decimal("receipt_price", row.try_get("receipt_price")?)?,
    })
}

fn rate_card_from_row(row: SqliteRow) -> Result<RateCard, RepositoryError> {
    Ok(RateCard {
        listing_id: ListingId(row.try_get("listing_id")?),
        fbo_commission_pct: parse_optional_decimal(
            "fbo_commission_pct",
            row.try_get("fbo_commission_pct")?,
        )?,
        fbs_commission_pct: parse_optional_decimal(
            "fbs_commission_pct",
            row.try_get("fbs_commission_pct")?,
        )?,
        dbs_commission_pct: parse_optional_decimal(
            "dbs_commission_pct",
            row.try_get("dbs_commission_pct")?,
        )?,
        express_commission_pct: parse_optional_decimal(
            "express_commission_pct",
            row.try_get("express_commission_pct")?,
        )?,
        fbo_logistics: parse_optional_decimal("fbo_logistics", row.try_get("fbo_logistics")?)?,
        fbs_logistics: parse_optional_decimal("fbs_logistics", row.try_get("fbs_logistics")?)?,
        dbs_logistics: parse_optional_decimal("dbs_logistics", row.try_get("dbs_logistics")?)?,
        express_logistics: parse_optional_decimal(
            "express_logistics",
            row.try_get("express_logistics")?,
        )?,
        shared_logistics: parse_optional_decimal(
            "shared_logistics",
            row.try_get("shared_logistics")?,
        )?,
    })
}
