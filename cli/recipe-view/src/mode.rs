use std::fmt::Display;
use std::num::NonZeroU32;

use recipe_catalog::Request;

/// What the displayed records are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// A page of the unfiltered catalog.
    Browse { page: NonZeroU32 },
    /// The catalog's results for a free-text query.
    Search { query: String },
}

impl Mode {
    /// The catalog request that produces the records for this mode.
    pub fn request(&self) -> Request {
        match self {
            Mode::Browse { page } => Request::ListPage(*page),
            Mode::Search { query } => Request::Search(query.clone()),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Browse { page } => write!(f, "browsing page {page}"),
            Mode::Search { query } => write!(f, "searching for '{query}'"),
        }
    }
}

/// User input reported by the rendering side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The search text changed, carries the complete new text.
    QueryChanged(String),
    /// A page was picked in the pagination control.
    PageChanged(NonZeroU32),
    /// Repeat the request that last failed.
    Retry,
}
