use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Simple,
    Bundle,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Bundle => "bundle",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "simple" => Some(Self::Simple),
            "bundle" => Some(Self::Bundle),
            _ => None,
        }
    }
}

/// A warehouse product carrying up to two cost bases: the catalog cost from
/// the accounting system's product card, and the receipt cost derived from
/// goods-receipt history. Bundles never have receipts of their own; their
/// receipt cost is always recomputed from components.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub kind: ProductKind,
    pub catalog_cost: Option<Decimal>,
    pub receipt_cost: Option<Decimal>,
}

impl Product {
    /// The cost used for profitability computations: the receipt-derived cost
    /// when available, falling back to the catalog cost.
    pub fn effective_cost(&self) -> Option<Decimal> {
        self.receipt_cost.or(self.catalog_cost)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Product, ProductId, ProductKind};

    #[test]
    fn effective_cost_prefers_receipt_cost() {
        let product = Product {
            id: ProductId("SKU-1".to_string()),
            name: "Desk lamp".to_string(),
            kind: ProductKind::Simple,
            catalog_cost: Some(Decimal::new(45_000, 2)),
            receipt_cost: Some(Decimal::new(41_250, 2)),
        };

        assert_eq!(product.effective_cost(), Some(Decimal::new(41_250, 2)));
    }

    #[test]
    fn effective_cost_falls_back_to_catalog_cost() {
        let product = Product {
            id: ProductId("SKU-2".to_string()),
            name: "Desk lamp".to_string(),
            kind: ProductKind::Simple,
            catalog_cost: Some(Decimal::new(45_000, 2)),
            receipt_cost: None,
        };

        assert_eq!(product.effective_cost(), Some(Decimal::new(45_000, 2)));
    }

    #[test]
    fn kind_round_trips_through_str() {
        assert_eq!(ProductKind::parse("bundle"), Some(ProductKind::Bundle));
        assert_eq!(ProductKind::parse(ProductKind::Simple.as_str()), Some(ProductKind::Simple));
        assert_eq!(ProductKind::parse("kit"), None);
    }
}
