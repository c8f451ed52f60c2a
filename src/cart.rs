//! Cart of one customer session.

use crate::catalog::Price;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub product: String,
    pub price: Price,
}

impl std::fmt::Display for CartItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.product, self.price)
    }
}

/// Ordered line items; items are only ever appended or cleared all at once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: CartItem) {
        self.items.push(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Price {
        Price(self.items.iter().map(|item| item.price.0).sum())
    }

    /// Single-line rendering used in the ledger and admin messages
    pub fn render(&self) -> String {
        self.items
            .iter()
            .map(CartItem::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: &str, price: u32) -> CartItem {
        CartItem {
            product: product.to_string(),
            price: Price(price),
        }
    }

    #[test]
    fn test_total_is_sum_of_items() {
        let mut cart = Cart::new();
        assert_eq!(cart.total(), Price(0));

        cart.add(item("Classique", 30));
        cart.add(item("Premium", 100));
        cart.add(item("Classique", 30));
        assert_eq!(cart.total(), Price(160));
        assert_eq!(cart.items().len(), 3);
    }

    #[test]
    fn test_clear_resets_total() {
        let mut cart = Cart::new();
        cart.add(item("Premium", 50));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price(0));
    }

    #[test]
    fn test_render() {
        let mut cart = Cart::new();
        cart.add(item("Classique", 30));
        cart.add(item("Premium", 100));
        assert_eq!(cart.render(), "Classique 30€, Premium 100€");
    }
}
