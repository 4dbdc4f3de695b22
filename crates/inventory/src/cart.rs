use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, ItemId, Price};

/// One item's accumulated quantity held by the shopper.
///
/// Name and price are snapshotted when the first unit is added, so the cart
/// renders (and totals) without going back to the catalog. Persisted as
/// `{id, nombre, precio, cantidad}`; any other fields an older save carries are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    id: ItemId,
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "precio")]
    price: Price,
    #[serde(rename = "cantidad")]
    quantity: u32,
}

impl CartLine {
    pub fn new(id: ItemId, name: impl Into<String>, price: Price, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity`.
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl Entity for CartLine {
    type Id = ItemId;

    fn id(&self) -> &ItemId {
        &self.id
    }
}

/// Ordered cart lines, in the order items were first added.
///
/// Invariants: at most one line per item id; every line has quantity ≥ 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Units of `id` currently held (0 when there is no line).
    pub fn quantity_of(&self, id: &ItemId) -> u32 {
        self.line(id).map_or(0, CartLine::quantity)
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }

    /// Sum of `price × quantity` over all lines.
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Put one unit on the existing line, or open a new line with the snapshot.
    pub(crate) fn add_unit(&mut self, id: &ItemId, name: &str, price: Price) {
        match self.lines.iter_mut().find(|line| line.id() == id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine::new(id.clone(), name, price, 1)),
        }
    }

    /// Take one unit off a line, dropping the line when it reaches zero.
    pub(crate) fn remove_unit(&mut self, id: &ItemId) {
        if let Some(pos) = self.lines.iter().position(|line| line.id() == id) {
            let line = &mut self.lines[pos];
            line.quantity = line.quantity.saturating_sub(1);
            if line.quantity == 0 {
                self.lines.remove(pos);
            }
        }
    }

    /// Merge `line` into the cart (restore path); zero-quantity lines are skipped.
    ///
    /// Returns whether the line was folded into an existing one.
    pub(crate) fn merge_line(&mut self, line: CartLine) -> DomainResult<bool> {
        if line.quantity == 0 {
            return Ok(false);
        }
        match self.lines.iter_mut().find(|existing| existing.id() == line.id()) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(|| {
                        DomainError::invariant(format!("cart quantity of item {} overflows", line.id))
                    })?;
                Ok(true)
            }
            None => {
                self.lines.push(line);
                Ok(false)
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
    }
}
