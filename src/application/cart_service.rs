//! Cart use-cases: every mutation validates against the catalog, applies to
//! the cart value and hands back the same view the storefront renders after
//! any change (item count, line items, running total).

use bigdecimal::BigDecimal;

use crate::domain::cart::{Cart, CartKey};
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::domain::{pricing, stock};

/// One rendered cart line. Prices are already rounded to two decimals.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub name: String,
    pub size: Option<String>,
    pub quantity: u32,
    pub unit_price: BigDecimal,
    pub subtotal: BigDecimal,
}

/// The post-mutation contract shared by full-page and AJAX callers.
#[derive(Debug, Clone)]
pub struct CartView {
    pub count: u32,
    pub items: Vec<CartItemView>,
    pub total: BigDecimal,
}

pub struct CartService<C> {
    catalog: C,
}

impl<C: CatalogRepository> CartService<C> {
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// Renders the cart. Entries whose product has vanished from the catalog
    /// are hidden from the view (and logged); the cart itself is left alone.
    /// Checkout is where such lines get dropped for real.
    pub fn view(&self, cart: &Cart) -> Result<CartView, DomainError> {
        let mut items = Vec::new();
        let mut subtotals = Vec::new();
        for (key, quantity) in cart.entries() {
            let Some(product) = self.catalog.find_product(key.product_id)? else {
                log::warn!(
                    "cart references product {} which no longer exists; hiding entry",
                    key.product_id
                );
                continue;
            };
            let unit_price = pricing::round2(&pricing::unit_price(&product));
            let subtotal = pricing::line_subtotal(&unit_price, quantity);
            subtotals.push(subtotal.clone());
            items.push(CartItemView {
                product_id: product.id,
                name: product.name,
                size: key.size.clone(),
                quantity,
                unit_price,
                subtotal,
            });
        }
        Ok(CartView {
            count: cart.total_units(),
            items,
            total: pricing::cart_subtotal(subtotals.iter()),
        })
    }

    /// Adds `count` units of `(product, size)` to the cart.
    ///
    /// Rejections: unknown product, unavailable product, missing or unknown
    /// size on a product with variants, and any `count` exceeding the soft
    /// remaining-stock check. On rejection the cart is untouched.
    pub fn add(
        &self,
        cart: &mut Cart,
        product_id: i32,
        size: Option<&str>,
        count: u32,
    ) -> Result<CartView, DomainError> {
        let product = self
            .catalog
            .find_product(product_id)?
            .ok_or(DomainError::NotFound)?;
        if !product.available {
            return Err(DomainError::Unavailable);
        }

        let size = size.filter(|s| !s.is_empty());
        if product.has_variants() {
            match size {
                None => return Err(DomainError::SizeRequired),
                Some(label) if product.variant(label).is_none() => {
                    return Err(DomainError::InvalidSize(label.to_string()));
                }
                _ => {}
            }
        }

        let count = count.max(1);
        let remaining = stock::remaining_stock(&product, cart, size);
        if count > remaining {
            return Err(DomainError::InsufficientStock { remaining });
        }

        cart.add(CartKey::new(product_id, size.map(str::to_owned)), count);
        self.view(cart)
    }

    pub fn decrement(
        &self,
        cart: &mut Cart,
        product_id: i32,
        size: Option<&str>,
    ) -> Result<CartView, DomainError> {
        cart.decrement(&CartKey::new(product_id, size.map(str::to_owned)));
        self.view(cart)
    }

    pub fn remove(
        &self,
        cart: &mut Cart,
        product_id: i32,
        size: Option<&str>,
    ) -> Result<CartView, DomainError> {
        cart.remove(&CartKey::new(product_id, size.map(str::to_owned)));
        self.view(cart)
    }

    pub fn set_quantity(
        &self,
        cart: &mut Cart,
        product_id: i32,
        size: Option<&str>,
        count: i64,
    ) -> Result<CartView, DomainError> {
        cart.set_quantity(CartKey::new(product_id, size.map(str::to_owned)), count);
        self.view(cart)
    }

    pub fn clear(&self, cart: &mut Cart) -> Result<CartView, DomainError> {
        cart.clear();
        self.view(cart)
    }
}
