//! Bidirectional price/profitability reconciliation.
//!
//! Forward derives profitability from a channel price; inverse derives the
//! price that hits a target profitability. Both are parameterized by the
//! commission/logistics figures already resolved for one fulfillment mode.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::domain::rates::ChannelRates;
use crate::errors::SkipReason;

/// Profit figures computed from one price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitComputation {
    pub profit: Decimal,
    pub profitability_pct: Decimal,
}

/// The two cost bases a product can carry. Inverse pricing produces one
/// candidate price per populated side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBasisPair {
    pub catalog: Option<Decimal>,
    pub receipt: Option<Decimal>,
}

impl CostBasisPair {
    pub fn of(product: &Product) -> Self {
        Self { catalog: product.catalog_cost, receipt: product.receipt_cost }
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_none() && self.receipt.is_none()
    }
}

/// Forward: price -> profitability.
///
/// `profit = price - cost - logistics - commission% * price - overheads% * price`,
/// both percentages taken of the channel price. Profitability is profit as a
/// percentage of price and may be negative.
pub fn profitability_from_price(
    price: Decimal,
    cost: Decimal,
    rates: &ChannelRates,
    overheads_pct: Decimal,
) -> Result<ProfitComputation, SkipReason> {
    if price <= Decimal::ZERO {
        return Err(SkipReason::NonPositivePrice);
    }

    let commission = rates.commission_pct * price / Decimal::ONE_HUNDRED;
    let overheads = overheads_pct * price / Decimal::ONE_HUNDRED;
    let profit = (price - cost - rates.logistics_cost - commission - overheads).round_dp(2);
    let profitability_pct = (profit / price * Decimal::ONE_HUNDRED).round_dp(2);

    Ok(ProfitComputation { profit, profitability_pct })
}

/// Inverse: target profitability -> price.
///
/// `price = (cost + logistics) / (1 - target% - commission% - overheads%)`.
/// A denominator at or below zero means the target margin cannot be reached
/// at any finite price.
pub fn price_from_profitability(
    target_pct: Decimal,
    cost: Decimal,
    rates: &ChannelRates,
    overheads_pct: Decimal,
) -> Result<Decimal, SkipReason> {
    let denominator = Decimal::ONE
        - target_pct / Decimal::ONE_HUNDRED
        - rates.commission_pct / Decimal::ONE_HUNDRED
        - overheads_pct / Decimal::ONE_HUNDRED;

    if denominator <= Decimal::ZERO {
        return Err(SkipReason::UnboundedPrice);
    }

    Ok(((cost + rates.logistics_cost) / denominator).round_dp(2))
}

/// Result of reconciling one listing against an incoming target
/// profitability. `recomputed` is false when the floor policy kept the
/// stored figures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReconciliation {
    pub catalog_price: Option<Decimal>,
    pub receipt_price: Option<Decimal>,
    pub profitability_pct: Decimal,
    pub recomputed: bool,
}

/// Incoming-profitability reconciliation with floor semantics: the target is
/// only applied when it does not lower the stored profitability. A listing
/// without a stored figure always recomputes.
pub fn reconcile_target_profitability(
    target_pct: Decimal,
    stored_pct: Option<Decimal>,
    stored_price: Decimal,
    costs: &CostBasisPair,
    rates: &ChannelRates,
    overheads_pct: Decimal,
) -> Result<TargetReconciliation, SkipReason> {
    if costs.is_empty() {
        return Err(SkipReason::MissingCostBasis);
    }

    if let Some(stored) = stored_pct {
        if target_pct < stored {
            return Ok(TargetReconciliation {
                catalog_price: Some(stored_price),
                receipt_price: Some(stored_price),
                profitability_pct: stored,
                recomputed: false,
            });
        }
    }

    let catalog_price = costs
        .catalog
        .map(|cost| price_from_profitability(target_pct, cost, rates, overheads_pct))
        .transpose()?;
    let receipt_price = costs
        .receipt
        .map(|cost| price_from_profitability(target_pct, cost, rates, overheads_pct))
        .transpose()?;

    Ok(TargetReconciliation {
        catalog_price,
        receipt_price,
        profitability_pct: target_pct,
        recomputed: true,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::rates::ChannelRates;
    use crate::errors::SkipReason;

    use super::{
        price_from_profitability, profitability_from_price, reconcile_target_profitability,
        CostBasisPair,
    };

    fn rates() -> ChannelRates {
        ChannelRates {
            commission_pct: Decimal::new(12_00, 2),
            logistics_cost: Decimal::new(55_00, 2),
        }
    }

    #[test]
    fn forward_profitability_matches_hand_calculation() {
        // price 1000, cost 450, logistics 55, commission 12%, overheads 20%.
        let computation = profitability_from_price(
            Decimal::new(1_000_00, 2),
            Decimal::new(450_00, 2),
            &rates(),
            Decimal::new(20_00, 2),
        )
        .expect("forward");

        assert_eq!(computation.profit, Decimal::new(175_00, 2));
        assert_eq!(computation.profitability_pct, Decimal::new(17_50, 2));
    }

    #[test]
    fn forward_rejects_non_positive_price() {
        let result = profitability_from_price(
            Decimal::ZERO,
            Decimal::new(450_00, 2),
            &rates(),
            Decimal::new(20_00, 2),
        );

        assert_eq!(result, Err(SkipReason::NonPositivePrice));
    }

    #[test]
    fn forward_profitability_can_be_negative() {
        let computation = profitability_from_price(
            Decimal::new(100_00, 2),
            Decimal::new(450_00, 2),
            &rates(),
            Decimal::new(20_00, 2),
        )
        .expect("forward");

        assert!(computation.profitability_pct < Decimal::ZERO);
    }

    #[test]
    fn inverse_rejects_unreachable_margin() {
        // 75% target + 12% commission + 20% overheads eat the whole price.
        let result = price_from_profitability(
            Decimal::new(75_00, 2),
            Decimal::new(450_00, 2),
            &rates(),
            Decimal::new(20_00, 2),
        );

        assert_eq!(result, Err(SkipReason::UnboundedPrice));
    }

    #[test]
    fn forward_inverse_round_trip_stays_within_a_cent() {
        let overheads = Decimal::new(20_00, 2);
        let cost = Decimal::new(450_00, 2);
        let tolerance = Decimal::new(1, 2);

        for target in [Decimal::new(5_00, 2), Decimal::new(15_00, 2), Decimal::new(32_50, 2)] {
            let price =
                price_from_profitability(target, cost, &rates(), overheads).expect("price");
            let computation =
                profitability_from_price(price, cost, &rates(), overheads).expect("forward");

            let delta = (computation.profitability_pct - target).abs();
            assert!(
                delta <= tolerance,
                "round trip drifted {delta} for target {target}",
            );
        }
    }

    #[test]
    fn floor_keeps_stored_figures_for_lower_targets() {
        let costs =
            CostBasisPair { catalog: Some(Decimal::new(450_00, 2)), receipt: None };

        let first = reconcile_target_profitability(
            Decimal::new(15_00, 2),
            Some(Decimal::new(8_00, 2)),
            Decimal::new(900_00, 2),
            &costs,
            &rates(),
            Decimal::new(20_00, 2),
        )
        .expect("reconcile");
        assert!(first.recomputed);
        assert_eq!(first.profitability_pct, Decimal::new(15_00, 2));

        let second = reconcile_target_profitability(
            Decimal::new(10_00, 2),
            Some(first.profitability_pct),
            first.catalog_price.expect("price"),
            &costs,
            &rates(),
            Decimal::new(20_00, 2),
        )
        .expect("reconcile");
        assert!(!second.recomputed);
        assert_eq!(second.catalog_price, first.catalog_price);
        assert_eq!(second.profitability_pct, Decimal::new(15_00, 2));
    }

    #[test]
    fn floor_recomputes_when_target_equals_stored() {
        let costs =
            CostBasisPair { catalog: Some(Decimal::new(450_00, 2)), receipt: None };

        let outcome = reconcile_target_profitability(
            Decimal::new(15_00, 2),
            Some(Decimal::new(15_00, 2)),
            Decimal::new(900_00, 2),
            &costs,
            &rates(),
            Decimal::new(20_00, 2),
        )
        .expect("reconcile");

        assert!(outcome.recomputed);
    }

    #[test]
    fn reconciliation_prices_both_cost_bases() {
        let costs = CostBasisPair {
            catalog: Some(Decimal::new(450_00, 2)),
            receipt: Some(Decimal::new(410_00, 2)),
        };

        let outcome = reconcile_target_profitability(
            Decimal::new(15_00, 2),
            None,
            Decimal::new(900_00, 2),
            &costs,
            &rates(),
            Decimal::new(20_00, 2),
        )
        .expect("reconcile");

        assert!(outcome.recomputed);
        let catalog = outcome.catalog_price.expect("catalog price");
        let receipt = outcome.receipt_price.expect("receipt price");
        assert!(receipt < catalog, "cheaper basis must price lower");
    }

    #[test]
    fn reconciliation_without_any_cost_basis_is_a_skip() {
        let result = reconcile_target_profitability(
            Decimal::new(15_00, 2),
            None,
            Decimal::new(900_00, 2),
            &CostBasisPair::default(),
            &rates(),
            Decimal::new(20_00, 2),
        );

        assert_eq!(result, Err(SkipReason::MissingCostBasis));
    }
}
