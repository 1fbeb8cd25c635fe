use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::listing::ListingId;
use crate::domain::product::ProductId;

/// Recoverable per-item failures. A skip never aborts a batch run; it is
/// accumulated on the run outcome so downstream tooling can surface stale
/// listings.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    #[error("listing price is not positive")]
    NonPositivePrice,
    #[error("target margin leaves no price headroom (denominator <= 0)")]
    UnboundedPrice,
    #[error("product has no cost basis on either side")]
    MissingCostBasis,
    #[error("bundle has no recorded composition")]
    MissingComposition,
    #[error("bundle component `{component}` is itself a bundle")]
    NestedBundle { component: ProductId },
    #[error("bundle component `{component}` is not in the catalog")]
    UnknownComponent { component: ProductId },
    #[error("listing references product `{product}` which is not in the catalog")]
    UnknownProduct { product: ProductId },
    #[error("campaign price references listing `{listing}` which is not in the catalog")]
    UnknownListing { listing: ListingId },
}

#[cfg(test)]
mod tests {
    use crate::domain::product::ProductId;

    use super::SkipReason;

    #[test]
    fn skip_reasons_render_with_context() {
        let reason = SkipReason::NestedBundle { component: ProductId("KIT-2".to_string()) };
        assert_eq!(reason.to_string(), "bundle component `KIT-2` is itself a bundle");
    }
}
