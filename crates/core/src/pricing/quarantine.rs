use rust_decimal::Decimal;

/// Flag a proposed price whose deviation from the reference retail price
/// exceeds the threshold. Listings without a usable reference price are
/// never quarantined; there is nothing to compare against.
pub fn is_quarantined(
    rrc: Option<Decimal>,
    proposed_price: Decimal,
    threshold_pct: Decimal,
) -> bool {
    let Some(rrc) = rrc.filter(|value| *value > Decimal::ZERO) else {
        return false;
    };

    let deviation_pct = (proposed_price - rrc).abs() / rrc * Decimal::ONE_HUNDRED;
    deviation_pct > threshold_pct
}
