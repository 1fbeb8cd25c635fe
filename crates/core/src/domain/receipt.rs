use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductId;

/// A single goods-receipt batch recorded by the warehouse sync. Immutable
/// once written; `sequence` is the ingestion order and is the stable
/// tie-break when two batches share a receipt date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoodsReceipt {
    pub product_id: ProductId,
    pub received_at: DateTime<Utc>,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub overhead: Decimal,
    pub sequence: i64,
}

impl GoodsReceipt {
    /// Per-unit cost of this batch: unit price plus the batch overhead
    /// apportioned across the received quantity.
    pub fn unit_cost(&self) -> Decimal {
        if self.quantity <= 0 {
            return self.unit_price.round_dp(2);
        }
        (self.unit_price + self.overhead / Decimal::from(self.quantity)).round_dp(2)
    }
}

/// Current on-hand quantity per product, refreshed from the warehouse
/// system. Never mutated by this engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: ProductId,
    pub on_hand: i64,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::super::product::ProductId;
    use super::GoodsReceipt;

    #[test]
    fn unit_cost_apportions_overhead_across_quantity() {
        let receipt = GoodsReceipt {
            product_id: ProductId("SKU-1".to_string()),
            received_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            quantity: 4,
            unit_price: Decimal::new(10_00, 2),
            overhead: Decimal::new(2_00, 2),
            sequence: 1,
        };

        assert_eq!(receipt.unit_cost(), Decimal::new(10_50, 2));
    }
}
