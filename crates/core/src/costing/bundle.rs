use rust_decimal::Decimal;

use crate::domain::bundle::BundleComponent;
use crate::domain::product::ProductId;
use crate::errors::SkipReason;

/// Derive a bundle's unit cost from its bill of materials.
///
/// `component_cost` resolves one simple component to its current unit cost
/// and reports structural problems (unknown component, nested bundle) as a
/// `SkipReason`. Resolution is pull-based: nothing is cached between calls,
/// so a changed component cost is picked up on the next recomputation.
pub fn bundle_cost<F>(
    components: &[BundleComponent],
    mut component_cost: F,
) -> Result<Decimal, SkipReason>
where
    F: FnMut(&ProductId) -> Result<Decimal, SkipReason>,
{
    if components.is_empty() {
        return Err(SkipReason::MissingComposition);
    }

    let mut total = Decimal::ZERO;
    for component in components {
        let cost = component_cost(&component.component_id)?;
        total += cost * Decimal::from(component.quantity);
    }

    Ok(total.round_dp(2))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::bundle::BundleComponent;
    use crate::domain::product::ProductId;
    use crate::errors::SkipReason;

    use super::bundle_cost;

    fn component(id: &str, quantity: i64) -> BundleComponent {
        BundleComponent { component_id: ProductId(id.to_string()), quantity }
    }

    #[test]
    fn sums_component_costs_by_quantity() {
        let components = vec![component("A", 2), component("B", 1)];

        let cost = bundle_cost(&components, |id| {
            Ok(match id.0.as_str() {
                "A" => Decimal::new(5_00, 2),
                _ => Decimal::new(3_00, 2),
            })
        })
        .expect("bundle cost");

        assert_eq!(cost, Decimal::new(13_00, 2));
    }

    #[test]
    fn recompute_reflects_changed_component_cost() {
        let components = vec![component("A", 2), component("B", 1)];
        let price_a = |unit: i64| {
            move |id: &ProductId| {
                Ok(match id.0.as_str() {
                    "A" => Decimal::new(unit * 100, 2),
                    _ => Decimal::new(3_00, 2),
                })
            }
        };

        assert_eq!(bundle_cost(&components, price_a(5)).expect("cost"), Decimal::new(13_00, 2));
        assert_eq!(bundle_cost(&components, price_a(6)).expect("cost"), Decimal::new(15_00, 2));
    }

    #[test]
    fn structural_errors_propagate_as_skip_reasons() {
        let components = vec![component("KIT-2", 1)];

        let result = bundle_cost(&components, |id| {
            Err(SkipReason::NestedBundle { component: id.clone() })
        });

        assert_eq!(
            result,
            Err(SkipReason::NestedBundle { component: ProductId("KIT-2".to_string()) })
        );
    }

    #[test]
    fn empty_composition_is_a_skip() {
        let result = bundle_cost(&[], |_| Ok(Decimal::ONE));
        assert_eq!(result, Err(SkipReason::MissingComposition));
    }
}
