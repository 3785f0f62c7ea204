//! # Cart
//!
//! The working set of items for the sale in progress.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Operations                                   │
//! │                                                                         │
//! │  Operator Action          Cart Method             Failure               │
//! │  ───────────────          ───────────             ───────               │
//! │                                                                         │
//! │  Tap product ───────────► add_item() ───────────► OutOfStock            │
//! │                                                   InsufficientStock     │
//! │                                                                         │
//! │  +/- on a line ─────────► set_quantity() ───────► InvalidQuantity (<1)  │
//! │                                                   InsufficientStock     │
//! │                                                                         │
//! │  Trash icon ────────────► remove_item() ────────► (never fails)         │
//! │                                                                         │
//! │  New sale / checkout ───► clear() ──────────────► (never fails)         │
//! │                                                                         │
//! │  A failed call leaves the cart exactly as it was.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The total is never cached: `total()` sums the lines on every call, so it
//! cannot drift from the lines it describes.

use serde::{Deserialize, Serialize};

use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::types::{Product, SaleItem};
use crate::MAX_CART_ITEMS;

// =============================================================================
// Cart Line
// =============================================================================

/// A product in the cart with its own quantity.
///
/// ## Snapshot
/// `product` is the catalog entry as it was when first added. Price and
/// cost are read from it at checkout, so a catalog refresh mid-sale does not
/// reprice lines already rung up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,

    /// Units of this product in the cart (always >= 1).
    pub cart_quantity: i64,
}

impl CartLine {
    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price * self.cart_quantity
    }

    /// (price − cost) × quantity at snapshot prices.
    #[inline]
    pub fn estimated_profit(&self) -> Money {
        self.product.unit_margin() * self.cart_quantity
    }
}

/// Freezes a cart line into a sale item.
impl From<&CartLine> for SaleItem {
    fn from(line: &CartLine) -> Self {
        SaleItem {
            product_id: line.product.id.clone(),
            product_name: line.product.name.clone(),
            price: Some(line.product.price),
            product_cost: Some(line.product.cost),
            quantity: Some(line.cart_quantity),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by product id (adding again increments)
/// - `1 <= cart_quantity <= product.quantity` for the snapshot used
/// - At most [`MAX_CART_ITEMS`] distinct lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `requested_qty` units of `product`, inserting a line or
    /// incrementing the existing one.
    ///
    /// ## Errors
    /// - `InvalidQuantity` if `requested_qty < 1`
    /// - `OutOfStock` if the product has no stock
    /// - `InsufficientStock` if the line would exceed the stock on hand
    /// - `CartTooLarge` if a new line would exceed [`MAX_CART_ITEMS`]
    ///
    /// ## Example
    /// ```rust
    /// # use till_core::{Cart, Money, Product};
    /// # let product = Product {
    /// #     id: "1".into(), name: "Coffee".into(), sku: "COF".into(),
    /// #     category: "Drinks".into(), price: Money::from_cents(10000),
    /// #     cost: Money::from_cents(6000), quantity: 5, reorder_point: 1,
    /// #     icon: None, barcode: None,
    /// # };
    /// let mut cart = Cart::new();
    /// cart.add_item(&product, 2).unwrap();
    /// assert_eq!(cart.total().cents(), 20000);
    /// ```
    pub fn add_item(&mut self, product: &Product, requested_qty: i64) -> CartResult<()> {
        if requested_qty < 1 {
            return Err(CartError::InvalidQuantity {
                product_id: product.id.clone(),
                requested: requested_qty,
            });
        }

        if !product.in_stock() {
            return Err(CartError::OutOfStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
            });
        }

        let in_cart = self.quantity_of(&product.id);
        let wanted = in_cart + requested_qty;
        if wanted > product.quantity {
            return Err(CartError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.quantity,
                requested: wanted,
            });
        }

        if let Some(line) = self.line_mut(&product.id) {
            line.cart_quantity = wanted;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CartError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        self.lines.push(CartLine {
            product: product.clone(),
            cart_quantity: requested_qty,
        });
        Ok(())
    }

    /// Sets the quantity of an existing line, checking the stock of the
    /// product in `catalog` (the latest fetched snapshot).
    ///
    /// Use [`Cart::remove_item`] to drop a line; quantities below 1 are
    /// rejected rather than treated as removal.
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        new_qty: i64,
        catalog: &[Product],
    ) -> CartResult<()> {
        if new_qty < 1 {
            return Err(CartError::InvalidQuantity {
                product_id: product_id.to_string(),
                requested: new_qty,
            });
        }

        let product = catalog
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| CartError::ProductNotFound(product_id.to_string()))?;

        if new_qty > product.quantity {
            return Err(CartError::InsufficientStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
                available: product.quantity,
                requested: new_qty,
            });
        }

        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.to_string()))?;
        line.cart_quantity = new_qty;
        Ok(())
    }

    /// Removes a line. Removing a product that is not in the cart is a no-op.
    pub fn remove_item(&mut self, product_id: &str) {
        self.lines.retain(|line| line.product.id != product_id);
    }

    /// Empties the cart. Idempotent.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ(price × cart_quantity).
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Σ((price − cost) × cart_quantity) at snapshot prices.
    pub fn estimated_profit(&self) -> Money {
        self.lines.iter().map(CartLine::estimated_profit).sum()
    }

    /// Lines in insertion order.
    #[inline]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct products.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|line| line.cart_quantity).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units of `product_id` currently in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .find(|line| line.product.id == product_id)
            .map_or(0, |line| line.cart_quantity)
    }

    /// Frozen sale items for every line, in cart order.
    pub fn sale_items(&self) -> Vec<SaleItem> {
        self.lines.iter().map(SaleItem::from).collect()
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product_id)
    }
}

/// Cart totals summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
    pub estimated_profit: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
            estimated_profit: cart.estimated_profit(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64, cost: i64, quantity: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            category: "General".to_string(),
            price: Money::from_cents(price),
            cost: Money::from_cents(cost),
            quantity,
            reorder_point: 2,
            icon: None,
            barcode: None,
        }
    }

    fn independent_total(cart: &Cart) -> i64 {
        cart.lines()
            .iter()
            .map(|l| l.product.price.cents() * l.cart_quantity)
            .sum()
    }

    #[test]
    fn test_add_item_computes_total() {
        let mut cart = Cart::new();
        let coffee = product("1", 10000, 6000, 5);

        cart.add_item(&coffee, 2).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.total().cents(), 20000);
        assert_eq!(cart.estimated_profit().cents(), 8000);
    }

    #[test]
    fn test_add_same_product_increments_line() {
        let mut cart = Cart::new();
        let coffee = product("1", 999, 500, 10);

        cart.add_item(&coffee, 2).unwrap();
        cart.add_item(&coffee, 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of("1"), 5);
    }

    #[test]
    fn test_add_out_of_stock() {
        let mut cart = Cart::new();
        let err = cart.add_item(&product("1", 999, 500, 0), 1).unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_second_add_beyond_stock_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        let last_one = product("1", 999, 500, 1);

        cart.add_item(&last_one, 1).unwrap();
        let err = cart.add_item(&last_one, 1).unwrap_err();

        assert!(matches!(
            err,
            CartError::InsufficientStock { available: 1, requested: 2, .. }
        ));
        assert_eq!(cart.quantity_of("1"), 1);
        assert_eq!(cart.total().cents(), 999);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let err = cart.add_item(&product("1", 999, 500, 5), 0).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { requested: 0, .. }));
    }

    #[test]
    fn test_add_beyond_max_lines() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&product(&i.to_string(), 100, 50, 1), 1).unwrap();
        }
        let err = cart.add_item(&product("overflow", 100, 50, 1), 1).unwrap_err();
        assert!(matches!(err, CartError::CartTooLarge { .. }));
        assert_eq!(cart.item_count(), MAX_CART_ITEMS);
    }

    #[test]
    fn test_set_quantity_checks_catalog_snapshot() {
        let mut cart = Cart::new();
        let tea = product("1", 500, 200, 10);
        cart.add_item(&tea, 1).unwrap();

        // The latest catalog fetch shows only 3 left.
        let catalog = vec![product("1", 500, 200, 3)];

        cart.set_quantity("1", 3, &catalog).unwrap();
        assert_eq!(cart.quantity_of("1"), 3);

        let err = cart.set_quantity("1", 4, &catalog).unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { available: 3, .. }));
        assert_eq!(cart.quantity_of("1"), 3);
    }

    #[test]
    fn test_set_quantity_below_one_is_invalid() {
        let mut cart = Cart::new();
        let tea = product("1", 500, 200, 10);
        cart.add_item(&tea, 2).unwrap();

        let err = cart.set_quantity("1", 0, &[tea]).unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity { .. }));
        assert_eq!(cart.quantity_of("1"), 2);
    }

    #[test]
    fn test_set_quantity_unknown_product_or_line() {
        let mut cart = Cart::new();
        let tea = product("1", 500, 200, 10);

        let err = cart.set_quantity("9", 1, &[tea.clone()]).unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(_)));

        let err = cart.set_quantity("1", 1, &[tea]).unwrap_err();
        assert!(matches!(err, CartError::NotInCart(_)));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 500, 200, 10), 1).unwrap();
        cart.remove_item("2");
        assert_eq!(cart.item_count(), 1);
        cart.remove_item("1");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 999, 500, 5), 2).unwrap();

        cart.clear();
        let once = cart.clone();
        cart.clear();

        assert_eq!(cart, once);
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_total_never_drifts_over_mixed_operations() {
        let mut cart = Cart::new();
        let catalog = vec![
            product("a", 1999, 1200, 20),
            product("b", 10, 5, 50),
            product("c", 333, 100, 7),
        ];

        let steps: Vec<Box<dyn Fn(&mut Cart)>> = vec![
            Box::new(|c: &mut Cart| { let _ = c.add_item(&catalog[0], 3); }),
            Box::new(|c: &mut Cart| { let _ = c.add_item(&catalog[1], 10); }),
            Box::new(|c: &mut Cart| { let _ = c.add_item(&catalog[2], 8); }),
            Box::new(|c: &mut Cart| { let _ = c.set_quantity("b", 49, &catalog); }),
            Box::new(|c: &mut Cart| { let _ = c.add_item(&catalog[2], 7); }),
            Box::new(|c: &mut Cart| c.remove_item("a")),
            Box::new(|c: &mut Cart| { let _ = c.set_quantity("c", 0, &catalog); }),
            Box::new(|c: &mut Cart| { let _ = c.add_item(&catalog[0], 20); }),
        ];

        for step in &steps {
            step(&mut cart);
            assert_eq!(cart.total().cents(), independent_total(&cart));
        }
        assert_eq!(cart.total().cents(), 49 * 10 + 7 * 333 + 20 * 1999);
    }

    #[test]
    fn test_sale_items_freeze_price_and_cost() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 10000, 6000, 5), 2).unwrap();

        let items = cart.sale_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, Some(Money::from_cents(10000)));
        assert_eq!(items[0].product_cost, Some(Money::from_cents(6000)));
        assert_eq!(items[0].quantity, Some(2));
        assert_eq!(items[0].profit().cents(), 8000);
    }
}
