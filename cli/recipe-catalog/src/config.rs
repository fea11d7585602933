//! Configuration types for catalog client construction.

use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com";

/// Configuration for catalog client construction.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL for the catalog API.
    // Trailing slashes are stripped when building request URLs.
    pub catalog_url: String,
    /// Optional `User-Agent` sent with every request.
    pub user_agent: Option<String>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    /// Upper bound for a whole request.
    ///
    /// Unset by default, only the connect phase is bounded then.
    pub request_timeout: Option<Duration>,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            user_agent: None,
            extra_headers: BTreeMap::new(),
            request_timeout: None,
        }
    }
}
