//! Fixed-point pricing: per-line subtotals, cart subtotal, tax, shipping and
//! the order total. All arithmetic stays in `BigDecimal`; every stage is
//! rounded half-up to two decimals, so `total == subtotal + tax +
//! shipping_cost - discount` holds exactly.

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use super::catalog::ProductDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Delivery,
    Pickup,
}

/// Flat tax rate applied to the subtotal: 10%.
fn tax_rate() -> BigDecimal {
    BigDecimal::new(BigInt::from(10), 2)
}

/// Flat delivery fee below the free-shipping threshold: 2.99.
fn flat_shipping_fee() -> BigDecimal {
    BigDecimal::new(BigInt::from(299), 2)
}

/// Delivery is free from this subtotal upwards: 30.00.
fn free_shipping_threshold() -> BigDecimal {
    BigDecimal::new(BigInt::from(3000), 2)
}

fn zero() -> BigDecimal {
    BigDecimal::new(BigInt::from(0), 2)
}

/// Rounds half-up to two decimals.
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Effective unit price: the sale price when one is set, else the base price.
pub fn unit_price(product: &ProductDetail) -> BigDecimal {
    product
        .sale_price
        .clone()
        .unwrap_or_else(|| product.price.clone())
}

/// Line subtotal: unit price times quantity, rounded.
pub fn line_subtotal(unit_price: &BigDecimal, quantity: u32) -> BigDecimal {
    round2(&(unit_price * BigDecimal::from(quantity)))
}

/// Cart subtotal: sum of line subtotals, re-rounded after summation.
pub fn cart_subtotal<'a>(line_subtotals: impl Iterator<Item = &'a BigDecimal>) -> BigDecimal {
    round2(&line_subtotals.fold(zero(), |acc, s| acc + s))
}

/// Monetary breakdown of an order, every field at two decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub discount: BigDecimal,
    pub total: BigDecimal,
}

/// Derives tax, shipping and the grand total from a cart subtotal.
///
/// Shipping is free for pickup, and for delivery once the subtotal reaches
/// the threshold; otherwise the flat fee applies. There is no promotional
/// engine, so the discount is fixed at zero.
pub fn order_totals(subtotal: &BigDecimal, method: ShippingMethod) -> Totals {
    let subtotal = round2(subtotal);
    let tax = round2(&(&subtotal * tax_rate()));
    let shipping_cost = match method {
        ShippingMethod::Pickup => zero(),
        ShippingMethod::Delivery if subtotal >= free_shipping_threshold() => zero(),
        ShippingMethod::Delivery => flat_shipping_fee(),
    };
    let discount = zero();
    let total = round2(&(&subtotal + &tax + &shipping_cost - &discount));
    Totals {
        subtotal,
        tax,
        shipping_cost,
        discount,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn product(price: &str, sale_price: Option<&str>) -> ProductDetail {
        ProductDetail {
            id: 1,
            name: "Pienso".to_string(),
            price: dec(price),
            sale_price: sale_price.map(dec),
            available: true,
            stock: 10,
            variants: vec![],
        }
    }

    #[test]
    fn unit_price_prefers_sale_price() {
        assert_eq!(unit_price(&product("10.00", Some("8.00"))), dec("8.00"));
        assert_eq!(unit_price(&product("10.00", None)), dec("10.00"));
    }

    #[test]
    fn line_subtotal_multiplies_and_rounds() {
        assert_eq!(line_subtotal(&dec("10.00"), 3), dec("30.00"));
        // 3 × 10.33 = 30.99
        assert_eq!(line_subtotal(&dec("10.33"), 3), dec("30.99"));
        // half-up at the third decimal
        assert_eq!(line_subtotal(&dec("3.335"), 1), dec("3.34"));
    }

    #[test]
    fn cart_subtotal_rounds_after_summation() {
        let lines = [dec("10.005"), dec("10.005")];
        assert_eq!(cart_subtotal(lines.iter()), dec("20.01"));
    }

    #[test]
    fn delivery_below_threshold_pays_flat_fee() {
        let totals = order_totals(&dec("29.99"), ShippingMethod::Delivery);
        assert_eq!(totals.shipping_cost, dec("2.99"));
    }

    #[test]
    fn delivery_at_threshold_ships_free() {
        let totals = order_totals(&dec("30.00"), ShippingMethod::Delivery);
        assert_eq!(totals.shipping_cost, dec("0.00"));
    }

    #[test]
    fn pickup_always_ships_free() {
        let totals = order_totals(&dec("5.00"), ShippingMethod::Pickup);
        assert_eq!(totals.shipping_cost, dec("0.00"));
    }

    #[test]
    fn tax_is_ten_percent_rounded() {
        let totals = order_totals(&dec("29.99"), ShippingMethod::Pickup);
        // 29.99 × 0.10 = 2.999 → 3.00
        assert_eq!(totals.tax, dec("3.00"));
    }

    #[test]
    fn total_identity_holds_exactly() {
        for subtotal in ["0.01", "9.99", "29.99", "30.00", "123.45"] {
            for method in [ShippingMethod::Delivery, ShippingMethod::Pickup] {
                let t = order_totals(&dec(subtotal), method);
                assert_eq!(
                    t.total,
                    &t.subtotal + &t.tax + &t.shipping_cost - &t.discount,
                    "identity broken for subtotal {subtotal}"
                );
            }
        }
    }

    #[test]
    fn every_field_carries_two_decimals() {
        let t = order_totals(&dec("10.005"), ShippingMethod::Delivery);
        for value in [&t.subtotal, &t.tax, &t.shipping_cost, &t.discount, &t.total] {
            assert_eq!(value.fractional_digit_count(), 2);
        }
    }

    #[test]
    fn scenario_three_units_of_ten() {
        // 3 × 10.00 with delivery: subtotal 30.00, free shipping, tax 3.00.
        let subtotal = cart_subtotal([line_subtotal(&dec("10.00"), 3)].iter());
        let t = order_totals(&subtotal, ShippingMethod::Delivery);
        assert_eq!(t.subtotal, dec("30.00"));
        assert_eq!(t.shipping_cost, dec("0.00"));
        assert_eq!(t.tax, dec("3.00"));
        assert_eq!(t.total, dec("33.00"));
    }
}
