//! Receipt-based cost derivation.
//!
//! Under a FIFO depletion assumption the newest stock is sold first, so the
//! units still on hand trace back to the oldest batch that is not yet fully
//! consumed. Walking receipts newest-first and accumulating quantities, the
//! receipt at which the running total first covers the on-hand quantity is
//! that oldest surviving batch.

use rust_decimal::Decimal;

use crate::domain::receipt::GoodsReceipt;

/// Pick the receipt that prices the current stock. Ties on receipt date are
/// broken by ingestion sequence, newest first.
///
/// Returns `None` only when there are no receipts at all. When on-hand
/// exceeds everything ever received, the oldest receipt is returned as a
/// best-effort fallback; when on-hand is zero the newest batch is returned
/// as the reference cost for restocking.
pub fn select_receipt(receipts: &[GoodsReceipt], on_hand: i64) -> Option<&GoodsReceipt> {
    let mut ordered: Vec<&GoodsReceipt> = receipts.iter().collect();
    ordered.sort_by(|a, b| {
        b.received_at.cmp(&a.received_at).then_with(|| b.sequence.cmp(&a.sequence))
    });

    let mut running = 0i64;
    for receipt in &ordered {
        running += receipt.quantity;
        if running >= on_hand {
            return Some(receipt);
        }
    }

    ordered.last().copied()
}

/// Unit cost of the stock on hand: the selected receipt's unit price plus
/// its overhead apportioned per unit. No receipts resolves to zero.
pub fn unit_cost(receipts: &[GoodsReceipt], on_hand: i64) -> Decimal {
    match select_receipt(receipts, on_hand) {
        Some(receipt) => receipt.unit_cost(),
        None => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::domain::product::ProductId;
    use crate::domain::receipt::GoodsReceipt;

    use super::{select_receipt, unit_cost};

    fn receipt(day: u32, quantity: i64, unit_price: i64, sequence: i64) -> GoodsReceipt {
        GoodsReceipt {
            product_id: ProductId("SKU-1".to_string()),
            received_at: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            quantity,
            unit_price: Decimal::new(unit_price * 100, 2),
            overhead: Decimal::ZERO,
            sequence,
        }
    }

    #[test]
    fn selects_oldest_receipt_covering_stock() {
        let receipts = vec![receipt(3, 5, 10, 3), receipt(2, 5, 12, 2), receipt(1, 5, 14, 1)];

        let selected = select_receipt(&receipts, 8).expect("receipt");
        assert_eq!(selected.unit_price, Decimal::new(12_00, 2));
        assert_eq!(unit_cost(&receipts, 8), Decimal::new(12_00, 2));
    }

    #[test]
    fn boundary_crossing_is_inclusive() {
        let receipts = vec![receipt(3, 5, 10, 3), receipt(2, 5, 12, 2), receipt(1, 5, 14, 1)];

        // Exactly covered by the two newest batches: the crossing receipt wins.
        let selected = select_receipt(&receipts, 10).expect("receipt");
        assert_eq!(selected.unit_price, Decimal::new(12_00, 2));
    }

    #[test]
    fn zero_stock_prices_from_the_newest_batch() {
        let receipts = vec![receipt(1, 5, 14, 1), receipt(3, 5, 10, 3)];

        let selected = select_receipt(&receipts, 0).expect("receipt");
        assert_eq!(selected.unit_price, Decimal::new(10_00, 2));
    }

    #[test]
    fn stock_beyond_all_receipts_falls_back_to_oldest() {
        let receipts = vec![receipt(3, 5, 10, 3), receipt(1, 5, 14, 1)];

        let selected = select_receipt(&receipts, 40).expect("receipt");
        assert_eq!(selected.unit_price, Decimal::new(14_00, 2));
    }

    #[test]
    fn no_receipts_costs_zero() {
        assert!(select_receipt(&[], 5).is_none());
        assert_eq!(unit_cost(&[], 5), Decimal::ZERO);
    }

    #[test]
    fn equal_dates_fall_back_to_ingestion_sequence() {
        let newer = GoodsReceipt { sequence: 7, ..receipt(2, 5, 11, 0) };
        let older = GoodsReceipt { sequence: 4, ..receipt(2, 5, 13, 0) };
        let receipts = vec![older.clone(), newer.clone()];

        // Both received the same day; the later-ingested batch counts as newer.
        let selected = select_receipt(&receipts, 8).expect("receipt");
        assert_eq!(selected.sequence, older.sequence);
        let reference = select_receipt(&receipts, 0).expect("receipt");
        assert_eq!(reference.sequence, newer.sequence);
    }

    #[test]
    fn overhead_is_apportioned_into_the_unit_cost() {
        let mut batch = receipt(3, 5, 10, 1);
        batch.overhead = Decimal::new(10_00, 2);

        assert_eq!(unit_cost(&[batch], 5), Decimal::new(12_00, 2));
    }
}
