//! Error handling for catalog API operations.

use std::fmt::Display;

use reqwest::StatusCode;
use thiserror::Error;

/// Common error type for catalog API operations.
#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("could not reach the recipe catalog")]
    Network(#[source] reqwest::Error),
    #[error("recipe catalog responded with {status}")]
    UnexpectedStatus { status: StatusCode },
    #[error("could not decode recipe catalog response")]
    Decode(#[source] serde_json::Error),
    #[error("{}", .0)]
    Other(String),
}

/// The failure categories that consumers surface to users.
///
/// Anything that prevented a catalog page from arriving counts as
/// [FetchErrorKind::Network], a page that arrived but could not be read
/// is a [FetchErrorKind::Decode] failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Network,
    Decode,
}

impl Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchErrorKind::Network => write!(f, "network error"),
            FetchErrorKind::Decode => write!(f, "decode error"),
        }
    }
}

impl CatalogClientError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            CatalogClientError::Decode(_) => FetchErrorKind::Decode,
            CatalogClientError::Network(_)
            | CatalogClientError::UnexpectedStatus { .. }
            | CatalogClientError::Other(_) => FetchErrorKind::Network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecipesPage;

    #[test]
    fn status_errors_count_as_network_failures() {
        let err = CatalogClientError::UnexpectedStatus {
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert_eq!(err.kind(), FetchErrorKind::Network);
        assert_eq!(
            err.to_string(),
            "recipe catalog responded with 500 Internal Server Error"
        );
    }

    #[test]
    fn malformed_envelopes_count_as_decode_failures() {
        let source = serde_json::from_str::<RecipesPage>("{}").unwrap_err();
        let err = CatalogClientError::Decode(source);
        assert_eq!(err.kind(), FetchErrorKind::Decode);
    }
}
