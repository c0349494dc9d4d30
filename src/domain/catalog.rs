use bigdecimal::BigDecimal;

/// A product as the cart and pricing code see it: identity, prices,
/// availability and the stock rows, with size variants already loaded.
#[derive(Debug, Clone)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub price: BigDecimal,
    pub sale_price: Option<BigDecimal>,
    pub available: bool,
    pub stock: i32,
    pub variants: Vec<VariantDetail>,
}

#[derive(Debug, Clone)]
pub struct VariantDetail {
    pub label: String,
    pub stock: i32,
}

impl ProductDetail {
    /// A product either tracks stock per size variant or on the product row
    /// itself; the two modes are mutually exclusive.
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    pub fn variant(&self, label: &str) -> Option<&VariantDetail> {
        self.variants.iter().find(|v| v.label == label)
    }
}
