//! Catalog interaction types.
//!
//! These types represent the domain model for catalog operations:
//! the records themselves, the envelope they arrive in,
//! and the page arithmetic shared by the client and its consumers.

use std::fmt::Display;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Number of records the catalog returns per browse page.
pub const PAGE_SIZE: NonZeroU32 = NonZeroU32::new(10).unwrap();

pub const FIRST_PAGE: NonZeroU32 = NonZeroU32::MIN;

/// Number of records preceding `page` in the unfiltered catalog.
pub fn skip_for_page(page: NonZeroU32) -> u64 {
    u64::from(page.get() - 1) * u64::from(PAGE_SIZE.get())
}

/// Number of pages needed to show `total` records.
///
/// There is always at least one page, even for an empty result.
pub fn total_pages(total: u64) -> u32 {
    let pages = total.div_ceil(u64::from(PAGE_SIZE.get())).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A single catalog entry.
///
/// Records are received wholesale and never modified by the client.
/// Fields the catalog sends beyond these are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u64,
    pub name: String,
    pub cuisine: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
}

impl Recipe {
    pub fn ingredients_joined(&self) -> String {
        self.ingredients.join(", ")
    }
}

/// The envelope returned by both the browse and the search endpoint.
///
/// `total` counts every record matching the request,
/// not only those contained in `recipes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipesPage {
    pub recipes: Vec<Recipe>,
    pub total: u64,
}

impl RecipesPage {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// The request shapes understood by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Request {
    /// One page of the unfiltered catalog.
    ListPage(NonZeroU32),
    /// All records matching a free-text query, as determined by the catalog.
    Search(String),
}

impl Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::ListPage(page) => write!(f, "page {page}"),
            Request::Search(text) => write!(f, "search '{text}'"),
        }
    }
}
