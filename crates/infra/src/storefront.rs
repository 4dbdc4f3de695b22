//! Ledger + persistence orchestration.
//!
//! `Storefront` is what a UI talks to. It owns one [`Ledger`] and one
//! [`DocumentStore`] and runs every operation through the same pipeline:
//!
//! ```text
//! operation
//!   ↓
//! 1. Build the ledger command
//!   ↓
//! 2. Handle + apply (pure; declined commands stop here, nothing is saved)
//!   ↓
//! 3. Save the "catalog" and "cart" documents (synchronously, whole documents;
//!    a failed save rolls memory and both documents back to the last saved state)
//!   ↓
//! 4. Return a plain outcome for the UI to render
//! ```
//!
//! A crash between steps 2 and 3 loses the last operation; that is the only
//! window where memory and storage disagree.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use storefront_core::{Aggregate, ItemId, Price, ReceiptId};
use storefront_events::Event;
use storefront_inventory::{
    AddToCart, Cart, CartLine, Catalog, CatalogItem, CatalogQuery, Checkout, ClearCart, Ledger,
    LedgerCommand, LedgerError, LedgerEvent, Receipt, RemoveFromCart,
};

use crate::catalog_source::{CatalogSource, LoadError, catalog_from_value};
use crate::store::{DocumentKey, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The catalog could not be obtained; the storefront must not start.
    #[error("failed to load catalog: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to a storefront operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// State changed and was persisted.
    Applied,
    /// The cart was sold and persisted.
    CheckedOut(Receipt),
    /// Nothing changed; the reason is for the UI.
    Declined(LedgerError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Outcome::Declined(_))
    }

    pub fn declined_reason(&self) -> Option<&LedgerError> {
        match self {
            Outcome::Declined(reason) => Some(reason),
            _ => None,
        }
    }
}

/// A ledger bound to its persistence collaborator.
#[derive(Debug)]
pub struct Storefront<S> {
    ledger: Ledger,
    store: S,
}

impl<S> Storefront<S>
where
    S: DocumentStore,
{
    /// Restore from persisted documents, or fetch the catalog from `source`
    /// on first run.
    ///
    /// The fetched catalog is persisted immediately. A cart left behind without
    /// its catalog is discarded, since a fresh catalog already counts those
    /// units as stock. A cart document whose lines no longer match the catalog
    /// is repaired and re-saved.
    pub async fn open<C>(store: S, source: &C) -> Result<Self, StorefrontError>
    where
        C: CatalogSource + ?Sized,
    {
        let (catalog, fetched) = match store.load(DocumentKey::Catalog)? {
            Some(document) => {
                tracing::debug!("restoring catalog from persisted state");
                let catalog = catalog_from_value(document).inspect_err(|err| {
                    tracing::error!(error = %err, "persisted catalog is unusable");
                })?;
                (catalog, false)
            }
            None => {
                tracing::info!(source = %source.describe(), "no persisted catalog; fetching");
                let catalog = source.fetch().await.inspect_err(|err| {
                    tracing::error!(source = %source.describe(), error = %err, "catalog fetch failed");
                })?;
                save_document(&store, DocumentKey::Catalog, catalog.items())?;
                (catalog, true)
            }
        };

        let lines: Vec<CartLine> = match store.load(DocumentKey::Cart)? {
            Some(_) if fetched => {
                tracing::warn!("cart document found without its catalog; discarding it");
                save_document(&store, DocumentKey::Cart, &[] as &[CartLine])?;
                Vec::new()
            }
            Some(document) => serde_json::from_value(document).map_err(|source| {
                StoreError::Corrupt {
                    key: DocumentKey::Cart,
                    source,
                }
            })?,
            None => Vec::new(),
        };

        let (ledger, report) = Ledger::restore(catalog, lines)
            .map_err(LoadError::from)
            .inspect_err(|err| {
                tracing::error!(error = %err, "persisted catalog and cart do not fit together");
            })?;
        let storefront = Self { ledger, store };

        if !report.is_clean() {
            tracing::warn!(
                dropped = ?report.dropped,
                merged = ?report.merged,
                "persisted cart did not match the catalog; repaired"
            );
            save_document(&storefront.store, DocumentKey::Cart, storefront.ledger.cart().lines())?;
        }

        tracing::info!(
            items = storefront.ledger.catalog().len(),
            cart_lines = storefront.ledger.cart().lines().len(),
            "storefront ready"
        );
        Ok(storefront)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn catalog(&self) -> &Catalog {
        self.ledger.catalog()
    }

    pub fn cart(&self) -> &Cart {
        self.ledger.cart()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn total_price(&self) -> Price {
        self.ledger.total_price()
    }

    /// Catalog items matching `query`, in catalog order.
    pub fn search<'a>(&'a self, query: &'a CatalogQuery) -> Vec<&'a CatalogItem> {
        self.ledger.catalog().filter(query).collect()
    }

    pub fn add(&mut self, item_id: &ItemId) -> Result<Outcome, StorefrontError> {
        self.dispatch(LedgerCommand::AddToCart(AddToCart {
            item_id: item_id.clone(),
            occurred_at: Utc::now(),
        }))
    }

    pub fn remove(&mut self, item_id: &ItemId) -> Result<Outcome, StorefrontError> {
        self.dispatch(LedgerCommand::RemoveFromCart(RemoveFromCart {
            item_id: item_id.clone(),
            occurred_at: Utc::now(),
        }))
    }

    /// `confirmed` is the user's answer to the UI's "are you sure?" prompt.
    pub fn clear(&mut self, confirmed: bool) -> Result<Outcome, StorefrontError> {
        self.dispatch(LedgerCommand::ClearCart(ClearCart {
            confirmed,
            occurred_at: Utc::now(),
        }))
    }

    pub fn checkout(&mut self) -> Result<Outcome, StorefrontError> {
        self.dispatch(LedgerCommand::Checkout(Checkout {
            receipt_id: ReceiptId::new(),
            occurred_at: Utc::now(),
        }))
    }

    fn dispatch(&mut self, command: LedgerCommand) -> Result<Outcome, StorefrontError> {
        let last_saved = self.ledger.clone();
        let events = match self.ledger.execute(&command) {
            Ok(events) => events,
            Err(reason) => {
                tracing::debug!(%reason, "ledger declined command");
                return Ok(Outcome::Declined(reason));
            }
        };

        if let Err(err) = self.persist() {
            // Memory goes back to the last saved state, and so does whatever
            // part of the pair was already written.
            self.ledger = last_saved;
            if let Err(rollback) = self.persist() {
                tracing::error!(error = %rollback, "failed to restore persisted documents");
            }
            return Err(err);
        }

        for event in &events {
            tracing::info!(
                event_type = event.event_type(),
                version = self.ledger.version(),
                "ledger event applied"
            );
        }

        let receipt = events.into_iter().find_map(|event| match event {
            LedgerEvent::CheckedOut(e) => Some(e.receipt),
            _ => None,
        });
        Ok(receipt.map_or(Outcome::Applied, Outcome::CheckedOut))
    }

    fn persist(&self) -> Result<(), StorefrontError> {
        save_document(&self.store, DocumentKey::Catalog, self.ledger.catalog().items())?;
        save_document(&self.store, DocumentKey::Cart, self.ledger.cart().lines())?;
        Ok(())
    }
}

fn save_document<S, T>(store: &S, key: DocumentKey, value: &T) -> Result<(), StoreError>
where
    S: DocumentStore + ?Sized,
    T: Serialize + ?Sized,
{
    let document = serde_json::to_value(value).map_err(|source| StoreError::Encode { key, source })?;
    store.save(key, &document).inspect_err(|err| {
        tracing::error!(document = %key, error = %err, "failed to persist document");
    })
}
