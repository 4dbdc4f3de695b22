use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, ItemId, Price};

/// A purchasable item with its live stock.
///
/// Field names on the wire follow the remote catalog document
/// (`{id, nombre, precio, stock, imagenUrl}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    id: ItemId,
    #[serde(rename = "nombre")]
    name: String,
    #[serde(rename = "precio")]
    price: Price,
    stock: u32,
    #[serde(rename = "imagenUrl", default)]
    image_url: String,
}

impl CatalogItem {
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        price: Price,
        stock: u32,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock,
            image_url: image_url.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Whether one more unit can be put in a cart.
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    pub(crate) fn take_unit(&mut self) {
        self.stock = self.stock.saturating_sub(1);
    }

    pub(crate) fn restock(&mut self, units: u32) {
        self.stock = self.stock.saturating_add(units);
    }
}

impl Entity for CatalogItem {
    type Id = ItemId;

    fn id(&self) -> &ItemId {
        &self.id
    }
}

/// Ordered collection of catalog items with unique identifiers.
///
/// Built once at startup; afterwards only the stock of existing items changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate identifiers and blank names.
    pub fn new(items: Vec<CatalogItem>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(DomainError::invariant(format!(
                    "duplicate catalog item id {}",
                    item.id()
                )));
            }
            if item.name.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "catalog item {} has an empty name",
                    item.id()
                )));
            }
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Items matching `query`, in catalog order.
    pub fn filter<'a>(&'a self, query: &'a CatalogQuery) -> impl Iterator<Item = &'a CatalogItem> {
        self.items.iter().filter(move |item| query.matches(item))
    }

    pub(crate) fn get_mut(&mut self, id: &ItemId) -> Option<&mut CatalogItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }
}

/// Read-only catalog filter: name substring and/or maximum price.
///
/// A blank name or a missing bound does not filter anything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogQuery {
    name: Option<String>,
    max_price: Option<Price>,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match on the display name.
    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        self.name = if needle.trim().is_empty() {
            None
        } else {
            Some(needle.to_lowercase())
        };
        self
    }

    /// Inclusive upper bound on the unit price.
    pub fn max_price(mut self, max: Price) -> Self {
        self.max_price = Some(max);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.max_price.is_none()
    }

    pub fn matches(&self, item: &CatalogItem) -> bool {
        let name_ok = self
            .name
            .as_deref()
            .is_none_or(|needle| item.name.to_lowercase().contains(needle));
        let price_ok = self.max_price.is_none_or(|max| item.price <= max);
        name_ok && price_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(v: f64) -> Price {
        Price::new(v).unwrap()
    }

    fn sample() -> Catalog {
        Catalog::new(vec![
            CatalogItem::new(ItemId::Number(1), "Yerba Mate", price(1500.0), 4, "img/yerba.png"),
            CatalogItem::new(ItemId::Number(2), "Mate de calabaza", price(3200.0), 0, "img/mate.png"),
            CatalogItem::new(ItemId::Number(3), "Bombilla", price(900.0), 10, "img/bombilla.png"),
        ])
        .unwrap()
    }

    fn ids<'a>(items: impl Iterator<Item = &'a CatalogItem>) -> Vec<ItemId> {
        items.map(|item| item.id().clone()).collect()
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Catalog::new(vec![
            CatalogItem::new(ItemId::Number(1), "A", price(1.0), 1, ""),
            CatalogItem::new(ItemId::Number(1), "B", price(2.0), 1, ""),
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn rejects_blank_names() {
        let err = Catalog::new(vec![CatalogItem::new(ItemId::Number(1), "  ", price(1.0), 1, "")])
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn parses_remote_document_shape() {
        let json = r#"[
            {"id": 1, "nombre": "Yerba", "precio": 1500, "stock": 5, "imagenUrl": "img/y.png"},
            {"id": 2, "nombre": "Termo", "precio": 12.5, "stock": 0}
        ]"#;
        let items: Vec<CatalogItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].name(), "Yerba");
        assert_eq!(items[0].price().amount(), 1500.0);
        assert_eq!(items[0].image_url(), "img/y.png");
        assert_eq!(items[1].image_url(), "");
        assert!(!items[1].is_available());
    }

    #[test]
    fn negative_stock_is_malformed() {
        let json = r#"[{"id": 1, "nombre": "Yerba", "precio": 10, "stock": -1}]"#;
        assert!(serde_json::from_str::<Vec<CatalogItem>>(json).is_err());
    }

    #[test]
    fn empty_query_returns_whole_catalog_in_order() {
        let catalog = sample();
        let query = CatalogQuery::new().name_contains("   ");
        assert!(query.is_empty());
        assert_eq!(ids(catalog.filter(&query)), vec![ItemId::Number(1), ItemId::Number(2), ItemId::Number(3)]);
    }

    #[test]
    fn name_filter_is_case_insensitive() {
        let catalog = sample();
        let query = CatalogQuery::new().name_contains("MATE");
        assert_eq!(ids(catalog.filter(&query)), vec![ItemId::Number(1), ItemId::Number(2)]);
    }

    #[test]
    fn price_filter_is_inclusive() {
        let catalog = sample();
        let query = CatalogQuery::new().max_price(price(1500.0));
        assert_eq!(ids(catalog.filter(&query)), vec![ItemId::Number(1), ItemId::Number(3)]);
    }

    #[test]
    fn combined_filter_requires_both() {
        let catalog = sample();
        let query = CatalogQuery::new().name_contains("mate").max_price(price(2000.0));
        assert_eq!(ids(catalog.filter(&query)), vec![ItemId::Number(1)]);
    }
}
