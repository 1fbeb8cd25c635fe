use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::listing::{FulfillmentMode, ListingId, Platform};

/// The resolved commission/logistics pair for one `(platform, mode)` lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRates {
    pub commission_pct: Decimal,
    pub logistics_cost: Decimal,
}

/// Commission and logistics figures for one listing, as populated by the
/// marketplace sync. Ozon carries an independent logistics figure per mode;
/// Wildberries and Yandex Market report a single logistics figure shared by
/// every mode while commission still varies by mode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub listing_id: ListingId,
    pub fbo_commission_pct: Option<Decimal>,
    pub fbs_commission_pct: Option<Decimal>,
    pub dbs_commission_pct: Option<Decimal>,
    pub express_commission_pct: Option<Decimal>,
    pub fbo_logistics: Option<Decimal>,
    pub fbs_logistics: Option<Decimal>,
    pub dbs_logistics: Option<Decimal>,
    pub express_logistics: Option<Decimal>,
    pub shared_logistics: Option<Decimal>,
}

impl RateCard {
    pub fn empty(listing_id: ListingId) -> Self {
        Self { listing_id, ..Self::default() }
    }

    /// Select the commission/logistics figures for a `(platform, mode)`
    /// pair. Unknown combinations and unset fields resolve to zero so that a
    /// sparsely synced card degrades instead of failing the computation.
    pub fn resolve(&self, platform: Platform, mode: FulfillmentMode) -> ChannelRates {
        let commission_pct = match mode {
            FulfillmentMode::Fbo => self.fbo_commission_pct,
            FulfillmentMode::Fbs => self.fbs_commission_pct,
            FulfillmentMode::Dbs => self.dbs_commission_pct,
            FulfillmentMode::Express => self.express_commission_pct,
        }
        .unwrap_or(Decimal::ZERO);

        let logistics_cost = match platform {
            Platform::Ozon => match mode {
                FulfillmentMode::Fbo => self.fbo_logistics,
                FulfillmentMode::Fbs => self.fbs_logistics,
                FulfillmentMode::Dbs => self.dbs_logistics,
                FulfillmentMode::Express => self.express_logistics,
            },
            Platform::Wildberries | Platform::YandexMarket => self.shared_logistics,
        }
        .unwrap_or(Decimal::ZERO);

        ChannelRates { commission_pct, logistics_cost }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::super::listing::{FulfillmentMode, ListingId, Platform};
    use super::RateCard;

    fn card() -> RateCard {
        RateCard {
            listing_id: ListingId("L-1".to_string()),
            fbo_commission_pct: Some(Decimal::new(18_50, 2)),
            fbs_commission_pct: Some(Decimal::new(15_00, 2)),
            dbs_commission_pct: None,
            express_commission_pct: Some(Decimal::new(21_00, 2)),
            fbo_logistics: Some(Decimal::new(62_00, 2)),
            fbs_logistics: Some(Decimal::new(48_00, 2)),
            dbs_logistics: None,
            express_logistics: Some(Decimal::new(95_00, 2)),
            shared_logistics: Some(Decimal::new(55_00, 2)),
        }
    }

    #[test]
    fn ozon_logistics_varies_by_mode() {
        let rates_fbo = card().resolve(Platform::Ozon, FulfillmentMode::Fbo);
        let rates_fbs = card().resolve(Platform::Ozon, FulfillmentMode::Fbs);

        assert_eq!(rates_fbo.logistics_cost, Decimal::new(62_00, 2));
        assert_eq!(rates_fbs.logistics_cost, Decimal::new(48_00, 2));
        assert_eq!(rates_fbo.commission_pct, Decimal::new(18_50, 2));
    }

    #[test]
    fn wildberries_shares_logistics_across_modes() {
        let fbo = card().resolve(Platform::Wildberries, FulfillmentMode::Fbo);
        let fbs = card().resolve(Platform::Wildberries, FulfillmentMode::Fbs);

        assert_eq!(fbo.logistics_cost, Decimal::new(55_00, 2));
        assert_eq!(fbs.logistics_cost, Decimal::new(55_00, 2));
        assert_ne!(fbo.commission_pct, fbs.commission_pct);
    }

    #[test]
    fn unset_fields_resolve_to_zero() {
        let rates = card().resolve(Platform::Ozon, FulfillmentMode::Dbs);

        assert_eq!(rates.commission_pct, Decimal::ZERO);
        assert_eq!(rates.logistics_cost, Decimal::ZERO);
    }
}
