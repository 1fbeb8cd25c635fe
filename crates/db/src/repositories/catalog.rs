use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use margin_core::domain::bundle::BundleComponent;
use margin_core::domain::product::{Product, ProductId, ProductKind};
use margin_core::domain::receipt::{GoodsReceipt, StockLevel};

use super::{
    encode_decimal, encode_optional_decimal, parse_decimal, parse_optional_decimal,
    parse_timestamp, BomRepository, ProductRepository, ReceiptRepository, RepositoryError,
    StockRepository,
};
use crate::DbPool;

/// Sqlite access to the warehouse side of the catalog: products, goods
/// receipts, stock levels, and bills of materials.
pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for SqlCatalogRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, kind, catalog_cost, receipt_cost FROM product ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(product_from_row).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, kind, catalog_cost, receipt_cost FROM product WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(product_from_row).transpose()
    }

    async fn upsert(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product (id, name, kind, catalog_cost, receipt_cost)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                kind = excluded.kind,
                catalog_cost = excluded.catalog_cost,
                receipt_cost = excluded.receipt_cost",
        )
        .bind(&product.id.0)
        .bind(&product.name)
        .bind(product.kind.as_str())
        .bind(encode_optional_decimal(product.catalog_cost))
        .bind(encode_optional_decimal(product.receipt_cost))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save_receipt_cost(
        &self,
        id: &ProductId,
        receipt_cost: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE product SET receipt_cost = ? WHERE id = ?")
            .bind(encode_decimal(receipt_cost))
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl ReceiptRepository for SqlCatalogRepository {
    async fn list(&self) -> Result<Vec<GoodsReceipt>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT sequence, product_id, received_at, quantity, unit_price, overhead
             FROM goods_receipt
             ORDER BY product_id, received_at, sequence",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(receipt_from_row).collect()
    }

    async fn list_for_product(
        &self,
        id: &ProductId,
    ) -> Result<Vec<GoodsReceipt>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT sequence, product_id, received_at, quantity, unit_price, overhead
             FROM goods_receipt
             WHERE product_id = ?
             ORDER BY received_at, sequence",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(receipt_from_row).collect()
    }

    async fn append(&self, receipt: GoodsReceipt) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO goods_receipt (product_id, received_at, quantity, unit_price, overhead)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&receipt.product_id.0)
        .bind(receipt.received_at.to_rfc3339())
        .bind(receipt.quantity)
        .bind(encode_decimal(receipt.unit_price))
        .bind(encode_decimal(receipt.overhead))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl StockRepository for SqlCatalogRepository {
    async fn list(&self) -> Result<Vec<StockLevel>, RepositoryError> {
        let rows =
            sqlx::query("SELECT product_id, on_hand FROM stock_level ORDER BY product_id")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|row| {
                Ok(StockLevel {
                    product_id: ProductId(row.try_get("product_id")?),
                    on_hand: row.try_get("on_hand")?,
                })
            })
            .collect()
    }

    async fn set(&self, level: StockLevel) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO stock_level (product_id, on_hand)
             VALUES (?, ?)
             ON CONFLICT(product_id) DO UPDATE SET on_hand = excluded.on_hand",
        )
        .bind(&level.product_id.0)
        .bind(level.on_hand)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl BomRepository for SqlCatalogRepository {
    async fn list(&self) -> Result<Vec<(ProductId, Vec<BundleComponent>)>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT bundle_id, component_id, quantity
             FROM bundle_component
             ORDER BY bundle_id, component_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: Vec<(ProductId, Vec<BundleComponent>)> = Vec::new();
        for row in rows {
            let bundle_id = ProductId(row.try_get("bundle_id")?);
            let component = BundleComponent {
                component_id: ProductId(row.try_get("component_id")?),
                quantity: row.try_get("quantity")?,
            };

            match grouped.last_mut() {
                Some((current, components)) if *current == bundle_id => components.push(component),
                _ => grouped.push((bundle_id, vec![component])),
            }
        }

        Ok(grouped)
    }

    async fn replace(
        &self,
        bundle_id: &ProductId,
        components: Vec<BundleComponent>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bundle_component WHERE bundle_id = ?")
            .bind(&bundle_id.0)
            .execute(&mut *tx)
            .await?;

        for component in components {
            sqlx::query(
                "INSERT INTO bundle_component (bundle_id, component_id, quantity)
                 VALUES (?, ?, ?)",
            )
            .bind(&bundle_id.0)
            .bind(&component.component_id.0)
            .bind(component.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn product_from_row(row: SqliteRow) -> Result<Product, RepositoryError> {
    let kind_raw = row.try_get::<String, _>("kind")?;
    let kind = ProductKind::parse(&kind_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown product kind `{kind_raw}`")))?;

    Ok(Product {
        id: ProductId(row.try_get("id")?),
        name: row.try_get("name")?,
        kind,
        catalog_cost: parse_optional_decimal("catalog_cost", row.try_get("catalog_cost")?)?,
        receipt_cost: parse_optional_decimal("receipt_cost", row.try_get("receipt_cost")?)?,
    })
}

fn receipt_from_row(row: SqliteRow) -> Result<GoodsReceipt, RepositoryError> {
    Ok(GoodsReceipt {
        product_id: ProductId(row.try_get("product_id")?),
        received_at: parse_timestamp("received_at", row.try_get("received_at")?)?,
        quantity: row.try_get("quantity")?,
        unit_price: parse_decimal("unit_price", row.try_get("unit_price")?)?,
        overhead: parse_decimal("overhead", row.try_get("overhead")?)?,
        sequence: row.try_get("sequence")?,
    })
}
