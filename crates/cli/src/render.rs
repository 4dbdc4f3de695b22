//! Plain-text rendering of ledger state and outcomes.

use std::fmt::Write;

use storefront_core::Entity;
use storefront_inventory::{Cart, CatalogItem, LedgerError, Receipt};

pub fn catalog_table<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> String {
    let mut out = String::new();
    let mut empty = true;
    for item in items {
        empty = false;
        let availability = if item.is_available() {
            format!("Stock: {}", item.stock())
        } else {
            "Out of stock".to_string()
        };
        let _ = writeln!(
            out,
            "{:>6}  {:<30} ${:<10} {}",
            item.id(),
            item.name(),
            item.price(),
            availability
        );
    }
    if empty {
        out.push_str("No products match the filters.\n");
    }
    out
}

pub fn cart_table(cart: &Cart) -> String {
    if cart.is_empty() {
        return "The cart is empty.\n".to_string();
    }
    let mut out = String::new();
    for line in cart.lines() {
        let _ = writeln!(
            out,
            "{:>6}  {:<30} ${:<10} x{}",
            line.id(),
            line.name(),
            line.price(),
            line.quantity()
        );
    }
    let _ = writeln!(out, "Total: ${}", cart.total());
    out
}

pub fn receipt(receipt: &Receipt) -> String {
    format!(
        "Purchase complete! Total paid: ${}. Thank you for your purchase! (receipt {})\n",
        receipt.total, receipt.id
    )
}

/// User-facing text for a declined operation.
pub fn declined(reason: &LedgerError) -> String {
    match reason {
        LedgerError::UnknownItem(id) => format!("There is no product with id {id}."),
        LedgerError::NoStock(id) => format!("Product {id} is out of stock."),
        LedgerError::EmptyCart => "Nothing in the cart to act on.".to_string(),
        LedgerError::Unconfirmed => "Nothing was changed.".to_string(),
    }
}
