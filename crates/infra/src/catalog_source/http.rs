use async_trait::async_trait;

use storefront_inventory::Catalog;

use super::{CatalogSource, LoadError, parse_catalog};

/// Remote catalog document fetched over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    url: String,
    client: reqwest::Client,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Catalog, LoadError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LoadError::Status(resp.status().as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;
        parse_catalog(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
