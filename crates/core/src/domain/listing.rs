use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductId;

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Sales channels the engine understands. A closed enum so that rate lookups
/// are matched exhaustively instead of branching on display names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Wildberries,
    Ozon,
    YandexMarket,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wildberries => "wildberries",
            Self::Ozon => "ozon",
            Self::YandexMarket => "yandex_market",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "wildberries" => Some(Self::Wildberries),
            "ozon" => Some(Self::Ozon),
            "yandex_market" => Some(Self::YandexMarket),
            _ => None,
        }
    }

    /// Fulfillment modes a listing on this platform can sell under.
    pub fn supported_modes(&self) -> &'static [FulfillmentMode] {
        match self {
            Self::Ozon => &[
                FulfillmentMode::Fbo,
                FulfillmentMode::Fbs,
                FulfillmentMode::Dbs,
                FulfillmentMode::Express,
            ],
            Self::Wildberries => {
                &[FulfillmentMode::Fbo, FulfillmentMode::Fbs, FulfillmentMode::Dbs]
            }
            Self::YandexMarket => {
                &[FulfillmentMode::Fbo, FulfillmentMode::Fbs, FulfillmentMode::Express]
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMode {
    Fbo,
    Fbs,
    Dbs,
    Express,
}

impl FulfillmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fbo => "fbo",
            Self::Fbs => "fbs",
            Self::Dbs => "dbs",
            Self::Express => "express",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "fbo" => Some(Self::Fbo),
            "fbs" => Some(Self::Fbs),
            "dbs" => Some(Self::Dbs),
            "express" => Some(Self::Express),
            _ => None,
        }
    }
}

impl std::str::FromStr for FulfillmentMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(&value.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unsupported fulfillment mode `{value}` (expected fbo|fbs|dbs|express)"))
    }
}

/// A product listed on one marketplace. Carries the current channel price,
/// the last computed profit figures, and the reference retail price used by
/// the quarantine guard. `overheads_pct` is the seller-configured catch-all
/// cost rate; `None` falls back to the engine default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceListing {
    pub id: ListingId,
    pub product_id: ProductId,
    pub platform: Platform,
    pub sku: String,
    pub seller_article: String,
    pub modes: Vec<FulfillmentMode>,
    pub price: Decimal,
    pub profit: Option<Decimal>,
    pub profitability_pct: Option<Decimal>,
    pub overheads_pct: Option<Decimal>,
    pub rrc: Option<Decimal>,
    pub catalog_price: Option<Decimal>,
    pub receipt_price: Option<Decimal>,
}

impl MarketplaceListing {
    pub fn overheads_or(&self, default_pct: Decimal) -> Decimal {
        self.overheads_pct.unwrap_or(default_pct)
    }
}

/// An externally fixed promotion price for one listing, fed to the
/// incoming-price reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CampaignPrice {
    pub listing_id: ListingId,
    pub price: Decimal,
    pub campaign_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{FulfillmentMode, Platform};

    #[test]
    fn platform_round_trips_through_str() {
        for platform in [Platform::Wildberries, Platform::Ozon, Platform::YandexMarket] {
            assert_eq!(Platform::parse(platform.as_str()), Some(platform));
        }
        assert_eq!(Platform::parse("OZON"), None);
    }

    #[test]
    fn fulfillment_mode_from_str_is_case_insensitive() {
        let mode: FulfillmentMode = "FBS".parse().expect("parse fbs");
        assert_eq!(mode, FulfillmentMode::Fbs);
        assert!("courier".parse::<FulfillmentMode>().is_err());
    }

    #[test]
    fn ozon_supports_all_four_modes() {
        assert_eq!(Platform::Ozon.supported_modes().len(), 4);
        assert!(!Platform::Wildberries.supported_modes().contains(&FulfillmentMode::Express));
    }
}
