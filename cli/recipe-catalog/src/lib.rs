//! HTTP client for the remote recipe catalog.
//!
//! This crate provides:
//! - HTTP client construction with optional extra headers and timeouts
//! - The two request shapes the catalog supports: browsing a page and free-text search
//! - A small error taxonomy distinguishing transport failures from malformed responses
//! - A gated test client for driving consumers deterministically (feature-gated)
//!
//! ## Usage
//!
//! ```ignore
//! use recipe_catalog::{CatalogClient, CatalogClientConfig, ClientTrait};
//!
//! let client = CatalogClient::new(CatalogClientConfig::default())?;
//! let page = client.list_page(NonZeroU32::MIN).await?;
//! let found = client.search("pasta").await?;
//! ```

mod client;
mod config;
mod error;
pub mod types;

#[cfg(any(test, feature = "tests"))]
pub mod test_helpers;

pub use client::{CatalogClient, ClientTrait};
pub use config::{CatalogClientConfig, DEFAULT_CATALOG_URL};
pub use error::{CatalogClientError, FetchErrorKind};
pub use types::{
    FIRST_PAGE,
    PAGE_SIZE,
    Recipe,
    RecipesPage,
    Request,
    skip_for_page,
    total_pages,
};
