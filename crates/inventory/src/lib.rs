//! Inventory-cart ledger.
//!
//! This crate contains the rules that keep catalog stock and cart contents
//! consistent, implemented purely as deterministic domain logic (no IO, no
//! storage, no rendering).

pub mod cart;
pub mod catalog;
pub mod ledger;

pub use cart::{Cart, CartLine};
pub use catalog::{Catalog, CatalogItem, CatalogQuery};
pub use ledger::{
    AddToCart, CartCleared, CheckedOut, Checkout, ClearCart, Ledger, LedgerCommand, LedgerError,
    LedgerEvent, LedgerResult, Receipt, RemoveFromCart, RestoreReport, UnitReleased, UnitReserved,
};
