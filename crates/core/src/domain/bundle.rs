use serde::{Deserialize, Serialize};

use super::product::ProductId;

/// One line of a bundle's bill of materials. Components must be simple
/// products; nesting bundles is a data-quality error handled by the cost
/// aggregator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleComponent {
    pub component_id: ProductId,
    pub quantity: i64,
}
