//! Configuration loading and representation.

use std::path::PathBuf;

/// Remote catalog the storefront was built against.
pub const DEFAULT_CATALOG_URL: &str = "https://diegocb08.github.io/webcoder/productos.json";

pub const ENV_DATA_DIR: &str = "STOREFRONT_DATA_DIR";
pub const ENV_CATALOG_URL: &str = "STOREFRONT_CATALOG_URL";
pub const ENV_LOG_JSON: &str = "STOREFRONT_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Directory holding `catalog.json` and `cart.json`.
    pub data_dir: PathBuf,
    /// Where the catalog is fetched from when nothing is persisted yet.
    pub catalog_url: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            log_json: false,
        }
    }
}

impl StorefrontConfig {
    /// Defaults overridden by `STOREFRONT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(ENV_CATALOG_URL).filter(|v| !v.trim().is_empty()) {
            config.catalog_url = url;
        }
        if let Some(flag) = lookup(ENV_LOG_JSON) {
            config.log_json = parse_flag(&flag);
        }

        config
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("storefront"))
        .unwrap_or_else(|| PathBuf::from(".storefront"))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
