//! End-to-end behaviour of the storefront service against real stores.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Value as JsonValue, json};

use storefront_core::{ItemId, Price};
use storefront_infra::{
    DocumentKey, DocumentStore, InMemoryCatalogSource, InMemoryDocumentStore, JsonFileStore,
    LoadError, Outcome, StoreError, Storefront, StorefrontError,
};
use storefront_inventory::{CatalogItem, CatalogQuery, LedgerError};

fn price(v: f64) -> Price {
    Price::new(v).unwrap()
}

fn id(n: i64) -> ItemId {
    ItemId::Number(n)
}

fn source() -> InMemoryCatalogSource {
    InMemoryCatalogSource::new(vec![
        CatalogItem::new(id(1), "Yerba Mate", price(10.0), 3, "img/yerba.png"),
        CatalogItem::new(id(2), "Termo", price(5.0), 1, "img/termo.png"),
    ])
}

/// Refuses every write of the cart document.
struct CartWritesFail {
    inner: Arc<InMemoryDocumentStore>,
}

impl DocumentStore for CartWritesFail {
    fn load(&self, key: DocumentKey) -> Result<Option<JsonValue>, StoreError> {
        self.inner.load(key)
    }

    fn save(&self, key: DocumentKey, document: &JsonValue) -> Result<(), StoreError> {
        if key == DocumentKey::Cart {
            return Err(StoreError::Io {
                key,
                path: PathBuf::from("cart.json"),
                source: io::Error::other("disk full"),
            });
        }
        self.inner.save(key, document)
    }
}

fn stock_of<S: DocumentStore>(shop: &Storefront<S>, n: i64) -> u32 {
    shop.catalog().get(&id(n)).unwrap().stock()
}

#[tokio::test]
async fn first_run_fetches_and_persists_catalog() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let shop = Storefront::open(store.clone(), &source()).await.unwrap();

    assert_eq!(shop.catalog().len(), 2);
    assert!(shop.cart().is_empty());
    let persisted = store.load(DocumentKey::Catalog).unwrap().unwrap();
    assert_eq!(persisted[0]["nombre"], json!("Yerba Mate"));
    assert_eq!(persisted[0]["stock"], json!(3));
}

#[tokio::test]
async fn every_applied_operation_is_persisted() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let mut shop = Storefront::open(store.clone(), &source()).await.unwrap();

    assert_eq!(shop.add(&id(1)).unwrap(), Outcome::Applied);
    assert_eq!(shop.add(&id(1)).unwrap(), Outcome::Applied);

    let cart = store.load(DocumentKey::Cart).unwrap().unwrap();
    assert_eq!(cart, json!([{"id": 1, "nombre": "Yerba Mate", "precio": 10.0, "cantidad": 2}]));
    let catalog = store.load(DocumentKey::Catalog).unwrap().unwrap();
    assert_eq!(catalog[0]["stock"], json!(1));
}

#[tokio::test]
async fn declined_operations_report_reason_and_skip_persistence() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let mut shop = Storefront::open(store.clone(), &source()).await.unwrap();

    assert_eq!(shop.add(&id(2)).unwrap(), Outcome::Applied);
    assert_eq!(
        shop.add(&id(2)).unwrap(),
        Outcome::Declined(LedgerError::NoStock(id(2)))
    );
    assert_eq!(
        shop.add(&id(42)).unwrap(),
        Outcome::Declined(LedgerError::UnknownItem(id(42)))
    );
    assert_eq!(
        shop.remove(&id(1)).unwrap(),
        Outcome::Declined(LedgerError::EmptyCart)
    );
    assert_eq!(shop.ledger().cart().quantity_of(&id(2)), 1);
    assert_eq!(stock_of(&shop, 2), 0);
}

#[tokio::test]
async fn clear_restores_stock_and_is_idempotent() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let mut shop = Storefront::open(store.clone(), &source()).await.unwrap();
    shop.add(&id(1)).unwrap();
    shop.add(&id(2)).unwrap();

    assert_eq!(
        shop.clear(false).unwrap(),
        Outcome::Declined(LedgerError::Unconfirmed)
    );
    assert_eq!(shop.clear(true).unwrap(), Outcome::Applied);
    assert_eq!(stock_of(&shop, 1), 3);
    assert_eq!(stock_of(&shop, 2), 1);
    assert_eq!(store.load(DocumentKey::Cart).unwrap(), Some(json!([])));

    assert_eq!(
        shop.clear(true).unwrap(),
        Outcome::Declined(LedgerError::EmptyCart)
    );
}

#[tokio::test]
async fn checkout_returns_total_and_keeps_units_sold() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let mut shop = Storefront::open(store.clone(), &source()).await.unwrap();
    shop.add(&id(1)).unwrap();
    shop.add(&id(1)).unwrap();
    shop.add(&id(2)).unwrap();
    assert_eq!(shop.total_price(), price(25.0));

    let receipt = match shop.checkout().unwrap() {
        Outcome::CheckedOut(receipt) => receipt,
        other => panic!("expected checkout, got {other:?}"),
    };
    assert_eq!(receipt.total, price(25.0));
    assert_eq!(receipt.unit_count(), 3);
    assert!(shop.cart().is_empty());
    assert_eq!(stock_of(&shop, 1), 1);
    assert_eq!(stock_of(&shop, 2), 0);

    assert_eq!(
        shop.checkout().unwrap(),
        Outcome::Declined(LedgerError::EmptyCart)
    );
}

#[tokio::test]
async fn reopening_restores_partially_depleted_stock_and_cart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut shop = Storefront::open(JsonFileStore::new(dir.path()), &source())
            .await
            .unwrap();
        shop.add(&id(1)).unwrap();
        shop.add(&id(1)).unwrap();
    }

    // An empty source proves the catalog came from disk.
    let shop = Storefront::open(
        JsonFileStore::new(dir.path()),
        &InMemoryCatalogSource::default(),
    )
    .await
    .unwrap();
    assert_eq!(stock_of(&shop, 1), 1);
    assert_eq!(shop.cart().quantity_of(&id(1)), 2);
    assert_eq!(shop.ledger().units_in_circulation(&id(1)), Some(3));
}

#[tokio::test]
async fn fetch_failure_is_surfaced_as_load_error() {
    let store = InMemoryDocumentStore::new();
    let err = Storefront::open(store, &InMemoryCatalogSource::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorefrontError::Load(LoadError::Empty)));
}

#[tokio::test]
async fn legacy_cart_documents_are_restored_and_repaired() {
    let store = Arc::new(InMemoryDocumentStore::with_documents([
        (
            DocumentKey::Catalog,
            json!([
                {"id": 1, "nombre": "Yerba Mate", "precio": 10, "stock": 1, "imagenUrl": "y.png"}
            ]),
        ),
        (
            DocumentKey::Cart,
            json!([
                {"id": 1, "nombre": "Yerba Mate", "precio": 10, "stock": 3, "imagenUrl": "y.png", "cantidad": 2},
                {"id": 7, "nombre": "Discontinued", "precio": 1, "stock": 0, "cantidad": 1}
            ]),
        ),
    ]));

    let mut shop = Storefront::open(store.clone(), &InMemoryCatalogSource::default())
        .await
        .unwrap();
    assert_eq!(shop.cart().lines().len(), 1);
    assert_eq!(
        store.load(DocumentKey::Cart).unwrap(),
        Some(json!([{"id": 1, "nombre": "Yerba Mate", "precio": 10.0, "cantidad": 2}]))
    );

    match shop.checkout().unwrap() {
        Outcome::CheckedOut(receipt) => assert_eq!(receipt.total, price(20.0)),
        other => panic!("expected checkout, got {other:?}"),
    }
}

#[tokio::test]
async fn corrupt_cart_document_is_reported() {
    let store = InMemoryDocumentStore::with_documents([
        (
            DocumentKey::Catalog,
            json!([{"id": 1, "nombre": "Yerba", "precio": 10, "stock": 1}]),
        ),
        (DocumentKey::Cart, json!({"not": "an array"})),
    ]);
    let err = Storefront::open(store, &InMemoryCatalogSource::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorefrontError::Store(_)));
}

#[tokio::test]
async fn search_filters_without_touching_stock() {
    let shop = Storefront::open(InMemoryDocumentStore::new(), &source())
        .await
        .unwrap();
    let query = CatalogQuery::new().name_contains("termo").max_price(price(5.0));
    let found = shop.search(&query);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name(), "Termo");
    assert_eq!(stock_of(&shop, 2), 1);
}

#[tokio::test]
async fn failed_save_rolls_back_memory_and_documents() {
    let inner = Arc::new(InMemoryDocumentStore::new());
    let mut shop = Storefront::open(CartWritesFail { inner: inner.clone() }, &source())
        .await
        .unwrap();

    let err = shop.add(&id(1)).unwrap_err();
    assert!(matches!(err, StorefrontError::Store(StoreError::Io { .. })));
    assert_eq!(stock_of(&shop, 1), 3);
    assert!(shop.cart().is_empty());

    let reopened = Storefront::open(inner, &InMemoryCatalogSource::default())
        .await
        .unwrap();
    assert_eq!(stock_of(&reopened, 1), 3);
    assert_eq!(reopened.ledger().units_in_circulation(&id(1)), Some(3));
}

#[tokio::test]
async fn cart_without_catalog_is_discarded_on_fresh_fetch() {
    let store = Arc::new(InMemoryDocumentStore::with_documents([(
        DocumentKey::Cart,
        json!([{"id": 1, "nombre": "Yerba Mate", "precio": 10, "cantidad": 2}]),
    )]));

    let shop = Storefront::open(store.clone(), &source()).await.unwrap();
    assert!(shop.cart().is_empty());
    assert_eq!(shop.ledger().units_in_circulation(&id(1)), Some(3));
    assert_eq!(store.load(DocumentKey::Cart).unwrap(), Some(json!([])));
}

#[tokio::test]
async fn restored_state_past_the_stock_limit_is_a_load_error() {
    let store = InMemoryDocumentStore::with_documents([
        (
            DocumentKey::Catalog,
            json!([{"id": 1, "nombre": "Yerba", "precio": 10, "stock": u32::MAX - 1}]),
        ),
        (
            DocumentKey::Cart,
            json!([{"id": 1, "nombre": "Yerba", "precio": 10, "cantidad": 5}]),
        ),
    ]);
    let err = Storefront::open(store, &InMemoryCatalogSource::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StorefrontError::Load(LoadError::Invalid(_))));
}
