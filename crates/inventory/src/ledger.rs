use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::{Aggregate, DomainError, DomainResult, Entity, ItemId, Price, ReceiptId};
use storefront_events::Event;

use crate::cart::{Cart, CartLine};
use crate::catalog::Catalog;

/// Why a ledger operation declined.
///
/// None of these are failures: state is untouched and the caller only has to
/// tell the user (or grey out a control).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The catalog has no item with this id.
    #[error("unknown item {0}")]
    UnknownItem(ItemId),

    /// The item exists but has no units left.
    #[error("item {0} is out of stock")]
    NoStock(ItemId),

    /// Nothing to act on: remove of an item the cart does not hold, or clear
    /// and checkout on a cart without lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Clear was requested without the user's confirmation.
    #[error("clearing the cart was not confirmed")]
    Unconfirmed,
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Command: AddToCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToCart {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveFromCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveFromCart {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    /// The caller already asked the user and got a yes.
    pub confirmed: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    pub receipt_id: ReceiptId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    AddToCart(AddToCart),
    RemoveFromCart(RemoveFromCart),
    ClearCart(ClearCart),
    Checkout(Checkout),
}

/// Event: one unit moved from stock into the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitReserved {
    pub item_id: ItemId,
    pub name: String,
    pub price: Price,
    pub occurred_at: DateTime<Utc>,
}

/// Event: one unit moved from the cart back into stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitReleased {
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: every line went back to stock and the cart emptied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartCleared {
    pub restored: Vec<CartLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: the cart was sold; its units leave circulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedOut {
    pub receipt: Receipt,
}

/// What a checkout sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub occurred_at: DateTime<Utc>,
}

impl Receipt {
    pub fn unit_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    UnitReserved(UnitReserved),
    UnitReleased(UnitReleased),
    CartCleared(CartCleared),
    CheckedOut(CheckedOut),
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::UnitReserved(_) => "cart.unit_reserved",
            LedgerEvent::UnitReleased(_) => "cart.unit_released",
            LedgerEvent::CartCleared(_) => "cart.cleared",
            LedgerEvent::CheckedOut(_) => "cart.checked_out",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::UnitReserved(e) => e.occurred_at,
            LedgerEvent::UnitReleased(e) => e.occurred_at,
            LedgerEvent::CartCleared(e) => e.occurred_at,
            LedgerEvent::CheckedOut(e) => e.receipt.occurred_at,
        }
    }
}

/// Lines that did not survive a restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Lines whose item is no longer in the catalog.
    pub dropped: Vec<ItemId>,
    /// Ids that appeared on more than one line and were merged.
    pub merged: Vec<ItemId>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.merged.is_empty()
    }
}

/// The single authority over stock and cart.
///
/// Every unit of an item is either on the shelf (`stock`) or in the cart until
/// checkout sells it. All mutation goes through [`Aggregate::handle`] /
/// [`Aggregate::apply`]; a declined command changes nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    catalog: Catalog,
    cart: Cart,
    version: u64,
}

impl Ledger {
    /// Fresh ledger over a catalog with an empty cart.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            cart: Cart::new(),
            version: 0,
        }
    }

    /// Rebuild a ledger from persisted catalog and cart.
    ///
    /// Persisted stock already excludes the units held by the cart, so lines
    /// are taken as-is. Lines for items the catalog no longer has are dropped;
    /// repeated ids are merged into the first line.
    ///
    /// Fails when an item's stock plus the units held for it do not fit in a
    /// `u32`, since clearing the cart could then not put them back.
    pub fn restore(catalog: Catalog, lines: Vec<CartLine>) -> DomainResult<(Self, RestoreReport)> {
        let mut cart = Cart::new();
        let mut report = RestoreReport::default();
        for line in lines {
            if !catalog.contains(line.id()) {
                report.dropped.push(line.id().clone());
                continue;
            }
            let id = line.id().clone();
            if cart.merge_line(line)? && !report.merged.contains(&id) {
                report.merged.push(id);
            }
        }

        for line in cart.lines() {
            let held = catalog
                .get(line.id())
                .and_then(|item| item.stock().checked_add(line.quantity()));
            if held.is_none() {
                return Err(DomainError::invariant(format!(
                    "stock plus cart units of item {} overflow",
                    line.id()
                )));
            }
        }

        let ledger = Self {
            catalog,
            cart,
            version: 0,
        };
        Ok((ledger, report))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Sum of `price × quantity` over the cart (snapshot prices).
    pub fn total_price(&self) -> Price {
        self.cart.total()
    }

    /// Units of `id` still in circulation: on the shelf plus in the cart.
    pub fn units_in_circulation(&self, id: &ItemId) -> Option<u32> {
        self.catalog
            .get(id)
            .map(|item| item.stock() + self.cart.quantity_of(id))
    }

    /// Move one unit of `item_id` from stock into the cart.
    pub fn add(&mut self, item_id: &ItemId) -> LedgerResult<()> {
        self.execute(&LedgerCommand::AddToCart(AddToCart {
            item_id: item_id.clone(),
            occurred_at: Utc::now(),
        }))
        .map(drop)
    }

    /// Move one unit of `item_id` from the cart back into stock.
    pub fn remove(&mut self, item_id: &ItemId) -> LedgerResult<()> {
        self.execute(&LedgerCommand::RemoveFromCart(RemoveFromCart {
            item_id: item_id.clone(),
            occurred_at: Utc::now(),
        }))
        .map(drop)
    }

    /// Return every held unit to stock and empty the cart.
    pub fn clear(&mut self, confirmed: bool) -> LedgerResult<()> {
        self.execute(&LedgerCommand::ClearCart(ClearCart {
            confirmed,
            occurred_at: Utc::now(),
        }))
        .map(drop)
    }

    /// Sell the cart: empty it without returning stock.
    pub fn checkout(&mut self) -> LedgerResult<Receipt> {
        let events = self.execute(&LedgerCommand::Checkout(Checkout {
            receipt_id: ReceiptId::new(),
            occurred_at: Utc::now(),
        }))?;
        events
            .into_iter()
            .find_map(|event| match event {
                LedgerEvent::CheckedOut(e) => Some(e.receipt),
                _ => None,
            })
            .ok_or(LedgerError::EmptyCart)
    }

    fn handle_add(&self, cmd: &AddToCart) -> LedgerResult<Vec<LedgerEvent>> {
        let item = self
            .catalog
            .get(&cmd.item_id)
            .ok_or_else(|| LedgerError::UnknownItem(cmd.item_id.clone()))?;

        if !item.is_available() {
            return Err(LedgerError::NoStock(cmd.item_id.clone()));
        }

        Ok(vec![LedgerEvent::UnitReserved(UnitReserved {
            item_id: cmd.item_id.clone(),
            name: item.name().to_string(),
            price: item.price(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveFromCart) -> LedgerResult<Vec<LedgerEvent>> {
        if self.cart.line(&cmd.item_id).is_none() {
            if !self.catalog.contains(&cmd.item_id) {
                return Err(LedgerError::UnknownItem(cmd.item_id.clone()));
            }
            return Err(LedgerError::EmptyCart);
        }

        Ok(vec![LedgerEvent::UnitReleased(UnitReleased {
            item_id: cmd.item_id.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearCart) -> LedgerResult<Vec<LedgerEvent>> {
        // Emptiness wins over confirmation so callers can skip the prompt.
        if self.cart.is_empty() {
            return Err(LedgerError::EmptyCart);
        }
        if !cmd.confirmed {
            return Err(LedgerError::Unconfirmed);
        }

        Ok(vec![LedgerEvent::CartCleared(CartCleared {
            restored: self.cart.lines().to_vec(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_checkout(&self, cmd: &Checkout) -> LedgerResult<Vec<LedgerEvent>> {
        if self.cart.is_empty() {
            return Err(LedgerError::EmptyCart);
        }

        Ok(vec![LedgerEvent::CheckedOut(CheckedOut {
            receipt: Receipt {
                id: cmd.receipt_id,
                lines: self.cart.lines().to_vec(),
                total: self.cart.total(),
                occurred_at: cmd.occurred_at,
            },
        })])
    }
}

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = LedgerError;

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::UnitReserved(e) => {
                if let Some(item) = self.catalog.get_mut(&e.item_id) {
                    item.take_unit();
                }
                self.cart.add_unit(&e.item_id, &e.name, e.price);
            }
            LedgerEvent::UnitReleased(e) => {
                self.cart.remove_unit(&e.item_id);
                if let Some(item) = self.catalog.get_mut(&e.item_id) {
                    item.restock(1);
                }
            }
            LedgerEvent::CartCleared(e) => {
                for line in &e.restored {
                    if let Some(item) = self.catalog.get_mut(line.id()) {
                        item.restock(line.quantity());
                    }
                }
                self.cart.clear();
            }
            LedgerEvent::CheckedOut(_) => {
                // Sold units stay out of stock.
                self.cart.clear();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LedgerCommand::AddToCart(cmd) => self.handle_add(cmd),
            LedgerCommand::RemoveFromCart(cmd) => self.handle_remove(cmd),
            LedgerCommand::ClearCart(cmd) => self.handle_clear(cmd),
            LedgerCommand::Checkout(cmd) => self.handle_checkout(cmd),
        }
    }
}
