//! Soft stock reservation: how many more units of a `(product, size)` pair a
//! session may add, given what its cart already holds.
//!
//! This check only gates the add-to-cart mutation. The authoritative check is
//! the clamped decrement performed when a payment is confirmed.

use super::cart::{Cart, CartKey};
use super::catalog::ProductDetail;

/// Remaining purchasable units for `(product, size)` after subtracting what
/// the cart already holds.
///
/// - A concrete size is capped by that variant's stock; an unknown label
///   behaves as stock 0.
/// - No size on a product that has variants: the sum of all variant stocks
///   minus everything the cart holds for the product, any size. Display
///   aggregate only; a concrete size is still required to purchase.
/// - No variants at all: the product row's own stock.
pub fn remaining_stock(product: &ProductDetail, cart: &Cart, size: Option<&str>) -> u32 {
    match size.filter(|s| !s.is_empty()) {
        Some(label) => {
            let ceiling = product.variant(label).map_or(0, |v| clamp(v.stock));
            let held = cart.quantity(&CartKey::new(product.id, Some(label.to_string())));
            ceiling.saturating_sub(held)
        }
        None if product.has_variants() => {
            let ceiling: u32 = product.variants.iter().map(|v| clamp(v.stock)).sum();
            ceiling.saturating_sub(cart.units_for_product(product.id))
        }
        None => clamp(product.stock).saturating_sub(cart.quantity(&CartKey::sizeless(product.id))),
    }
}

fn clamp(stock: i32) -> u32 {
    u32::try_from(stock).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::VariantDetail;
    use bigdecimal::BigDecimal;

    fn simple_product(stock: i32) -> ProductDetail {
        ProductDetail {
            id: 1,
            name: "Collar".to_string(),
            price: BigDecimal::from(10),
            sale_price: None,
            available: true,
            stock,
            variants: vec![],
        }
    }

    fn sized_product(variants: &[(&str, i32)]) -> ProductDetail {
        ProductDetail {
            id: 1,
            name: "Jersey".to_string(),
            price: BigDecimal::from(10),
            sale_price: None,
            available: true,
            stock: 0,
            variants: variants
                .iter()
                .map(|(label, stock)| VariantDetail {
                    label: (*label).to_string(),
                    stock: *stock,
                })
                .collect(),
        }
    }

    #[test]
    fn simple_product_subtracts_sizeless_cart_entry() {
        let product = simple_product(5);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(1), 3);
        assert_eq!(remaining_stock(&product, &cart, None), 2);
    }

    #[test]
    fn simple_product_floors_at_zero() {
        let product = simple_product(2);
        let mut cart = Cart::new();
        cart.add(CartKey::sizeless(1), 2);
        assert_eq!(remaining_stock(&product, &cart, None), 0);
    }

    #[test]
    fn sized_product_checks_the_exact_variant() {
        let product = sized_product(&[("M", 2), ("L", 10)]);
        let mut cart = Cart::new();
        cart.add(CartKey::new(1, Some("M".to_string())), 1);
        assert_eq!(remaining_stock(&product, &cart, Some("M")), 1);
        assert_eq!(remaining_stock(&product, &cart, Some("L")), 10);
    }

    #[test]
    fn unknown_size_behaves_as_out_of_stock() {
        let product = sized_product(&[("M", 5)]);
        assert_eq!(remaining_stock(&product, &Cart::new(), Some("XXL")), 0);
    }

    #[test]
    fn size_on_a_variantless_product_behaves_as_out_of_stock() {
        let product = simple_product(5);
        assert_eq!(remaining_stock(&product, &Cart::new(), Some("M")), 0);
    }

    #[test]
    fn no_size_on_a_sized_product_aggregates_across_variants() {
        let product = sized_product(&[("M", 2), ("L", 3)]);
        let mut cart = Cart::new();
        cart.add(CartKey::new(1, Some("M".to_string())), 1);
        cart.add(CartKey::new(1, Some("L".to_string())), 2);
        // 5 total stock minus 3 held across all sizes.
        assert_eq!(remaining_stock(&product, &cart, None), 2);
    }

    #[test]
    fn empty_size_string_is_treated_as_no_size() {
        let product = simple_product(4);
        assert_eq!(remaining_stock(&product, &Cart::new(), Some("")), 4);
    }

    #[test]
    fn negative_stock_rows_count_as_zero() {
        let product = sized_product(&[("M", -3), ("L", 2)]);
        assert_eq!(remaining_stock(&product, &Cart::new(), Some("M")), 0);
        assert_eq!(remaining_stock(&product, &Cart::new(), None), 2);
    }
}
