//! Catalog client for browsing and searching recipes.

use std::fmt::Debug;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{self, HeaderMap};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::CatalogClientConfig;
use crate::error::CatalogClientError;
use crate::types::{PAGE_SIZE, RecipesPage, Request, skip_for_page};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// A client for the recipe catalog service.
///
/// Every operation is a single round-trip without retries.
/// The client holds no state besides its configuration.
pub struct CatalogClient {
    client: reqwest::Client,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let client = build_http_client(&config)?;
        Ok(Self { client, config })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.catalog_url.trim_end_matches('/'))
    }

    /// Send a GET request and decode the recipes envelope.
    ///
    /// Any non-success status is an error even if the body happens to parse.
    async fn get_recipes(
        &self,
        url: String,
        query: &(impl Serialize + Debug),
    ) -> Result<RecipesPage, CatalogClientError> {
        debug!(%url, ?query, "sending catalog request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(CatalogClientError::Network)?;

        let status = response.status();
        if !status.is_success() {
            debug!(%url, %status, "catalog request failed");
            return Err(CatalogClientError::UnexpectedStatus { status });
        }

        let body = response
            .bytes()
            .await
            .map_err(CatalogClientError::Network)?;
        let page: RecipesPage =
            serde_json::from_slice(&body).map_err(CatalogClientError::Decode)?;

        debug!(
            n_recipes = page.recipes.len(),
            total = page.total,
            "received catalog page"
        );
        Ok(page)
    }
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ListQuery {
    limit: u32,
    skip: u64,
}

#[derive(Debug, Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
}

/// The complete catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog service via [`CatalogClient`]
/// - **Gated** (tests): requests parked until a test answers them,
///   see `test_helpers::GatedClient`
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch one page of the unfiltered catalog.
    async fn list_page(&self, page: NonZeroU32) -> Result<RecipesPage, CatalogClientError>;

    /// Search for recipes matching a free-text query.
    ///
    /// The text is passed on unchanged, including the empty string.
    /// Which records match, and how many, is up to the catalog.
    async fn search(
        &self,
        text: impl AsRef<str> + Send + Sync,
    ) -> Result<RecipesPage, CatalogClientError>;

    /// Issue whichever operation `request` describes.
    async fn fetch(&self, request: &Request) -> Result<RecipesPage, CatalogClientError> {
        match request {
            Request::ListPage(page) => self.list_page(*page).await,
            Request::Search(text) => self.search(text).await,
        }
    }
}

impl ClientTrait for CatalogClient {
    #[instrument(skip_all, fields(page = page.get()))]
    async fn list_page(&self, page: NonZeroU32) -> Result<RecipesPage, CatalogClientError> {
        let query = ListQuery {
            limit: PAGE_SIZE.get(),
            skip: skip_for_page(page),
        };
        self.get_recipes(self.endpoint("recipes"), &query).await
    }

    #[instrument(skip_all, fields(search_term = %text.as_ref()))]
    async fn search(
        &self,
        text: impl AsRef<str> + Send + Sync,
    ) -> Result<RecipesPage, CatalogClientError> {
        let query = SearchQuery { q: text.as_ref() };
        self.get_recipes(self.endpoint("recipes/search"), &query)
            .await
    }
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| CatalogClientError::Other(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| CatalogClientError::Other(e.to_string()),
            )?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        extra_headers = config.extra_headers.len(),
        request_timeout = ?config.request_timeout,
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(CONNECT_TIMEOUT);

    let client_builder = if let Some(timeout) = config.request_timeout {
        client_builder.timeout(timeout)
    } else {
        client_builder
    };

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| CatalogClientError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::FetchErrorKind;
    use crate::types::Recipe;

    fn client_config(url: &str) -> CatalogClientConfig {
        CatalogClientConfig {
            catalog_url: url.to_string(),
            ..Default::default()
        }
    }

    fn recipe_json(id: u64, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "cuisine": "Italian",
            "ingredients": ["Flour", "Water"],
            "instructions": "Mix and bake.",
            "prepTimeMinutes": 20,
            "image": format!("https://cdn.dummyjson.com/recipe-images/{id}.webp"),
        })
    }

    fn recipe(id: u64, name: &str) -> Recipe {
        Recipe {
            id,
            name: name.to_string(),
            cuisine: "Italian".to_string(),
            ingredients: vec!["Flour".to_string(), "Water".to_string()],
            instructions: "Mix and bake.".to_string(),
        }
    }

    #[tokio::test]
    async fn list_page_requests_ten_records_after_skip() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recipes")
                .query_param("limit", "10")
                .query_param("skip", "20");
            then.status(200).json_body(json!({
                "recipes": [recipe_json(21, "Focaccia"), recipe_json(22, "Ciabatta")],
                "total": 50,
                "skip": 20,
                "limit": 10,
            }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let page = client.list_page(NonZeroU32::new(3).unwrap()).await.unwrap();

        mock.assert();
        assert_eq!(page, RecipesPage {
            recipes: vec![recipe(21, "Focaccia"), recipe(22, "Ciabatta")],
            total: 50,
        });
    }

    #[tokio::test]
    async fn first_page_starts_at_zero() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recipes")
                .query_param("limit", "10")
                .query_param("skip", "0");
            then.status(200)
                .json_body(json!({ "recipes": [], "total": 0, "skip": 0, "limit": 10 }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let page = client.list_page(NonZeroU32::MIN).await.unwrap();

        mock.assert();
        assert_eq!(page.total_pages(), 1);
    }

    #[tokio::test]
    async fn trailing_slash_in_catalog_url_is_ignored() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/recipes");
            then.status(200).json_body(json!({ "recipes": [], "total": 0 }));
        });

        let url = format!("{}/", server.base_url());
        let client = CatalogClient::new(client_config(&url)).unwrap();
        client.list_page(NonZeroU32::MIN).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn search_sends_query_text() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recipes/search")
                .query_param("q", "pasta");
            then.status(200).json_body(json!({
                "recipes": [recipe_json(7, "Pasta al Pomodoro")],
                "total": 1,
                "skip": 0,
                "limit": 1,
            }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let page = client.search("pasta").await.unwrap();

        mock.assert();
        assert_eq!(page.recipes, vec![recipe(7, "Pasta al Pomodoro")]);
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn search_does_not_send_paging_parameters() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recipes/search")
                .query_param_exists("q")
                .query_param_missing("limit")
                .query_param_missing("skip");
            then.status(200).json_body(json!({ "recipes": [], "total": 0 }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        client.search("soup").await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn search_text_is_percent_encoded() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recipes/search")
                .query_param("q", "mac & cheese");
            then.status(200).json_body(json!({ "recipes": [], "total": 0 }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        client.search("mac & cheese").await.unwrap();

        mock.assert();
    }

    /// Empty text is not short-circuited by the client
    #[tokio::test]
    async fn empty_search_is_sent() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/recipes/search")
                .query_param_exists("q");
            then.status(200)
                .json_body(json!({ "recipes": [recipe_json(1, "Pizza")], "total": 50 }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let page = client.search("").await.unwrap();

        mock.assert();
        assert_eq!(page.total, 50);
    }

    #[tokio::test]
    async fn fetch_dispatches_on_request_shape() {
        let server = MockServer::start_async().await;
        let list = server.mock(|when, then| {
            when.method(GET).path("/recipes").query_param("skip", "10");
            then.status(200).json_body(json!({ "recipes": [], "total": 20 }));
        });
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/recipes/search")
                .query_param("q", "curry");
            then.status(200).json_body(json!({ "recipes": [], "total": 2 }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let listed = client
            .fetch(&Request::ListPage(NonZeroU32::new(2).unwrap()))
            .await
            .unwrap();
        let found = client
            .fetch(&Request::Search("curry".to_string()))
            .await
            .unwrap();

        list.assert();
        search.assert();
        assert_eq!(listed.total, 20);
        assert_eq!(found.total, 2);
    }

    #[tokio::test]
    async fn extra_headers_set_on_all_requests() {
        let mut extra_headers: BTreeMap<String, String> = BTreeMap::new();
        extra_headers.insert("recipes-test".to_string(), "test-value".to_string());
        extra_headers.insert("recipes-test2".to_string(), "test-value2".to_string());

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("recipes-test", "test-value")
                .header("recipes-test2", "test-value2");
            then.status(200).json_body(json!({ "recipes": [], "total": 0 }));
        });

        let config = CatalogClientConfig {
            extra_headers,
            ..client_config(&server.base_url())
        };

        let client = CatalogClient::new(config).unwrap();
        client.search("anything").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn user_agent_set_on_all_requests() {
        let expected_agent = "my-custom-user-agent";

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("user-agent", expected_agent);
            then.status(200).json_body(json!({ "recipes": [], "total": 0 }));
        });

        let config = CatalogClientConfig {
            user_agent: Some(expected_agent.to_owned()),
            ..client_config(&server.base_url())
        };

        let client = CatalogClient::new(config).unwrap();
        client.list_page(NonZeroU32::MIN).await.unwrap();
        mock.assert();
    }

    #[test]
    fn invalid_extra_header_is_rejected() {
        let config = CatalogClientConfig {
            extra_headers: BTreeMap::from([("not a header".to_string(), "value".to_string())]),
            ..Default::default()
        };
        let result = CatalogClient::new(config);
        assert!(
            matches!(result, Err(CatalogClientError::Other(_))),
            "expected CatalogClientError::Other, found: {result:?}"
        );
    }

    // region: Error response handling
    //
    // Any status outside of 2xx is reported as `UnexpectedStatus` without
    // looking at the body.
    // A 2xx response whose body is not a recipes envelope is a `Decode` error.
    // Failing to connect at all is a `Network` error.

    #[tokio::test]
    async fn server_error_is_unexpected_status() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(500)
                .json_body(json!({ "recipes": [], "total": 0 }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let result = client.list_page(NonZeroU32::MIN).await;

        mock.assert();
        match result {
            Err(err @ CatalogClientError::UnexpectedStatus { status }) => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(err.kind(), FetchErrorKind::Network);
            },
            other => panic!("expected UnexpectedStatus, found: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_total_is_decode_error() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(200)
                .json_body(json!({ "recipes": [recipe_json(1, "Pizza")] }));
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let result = client.search("pizza").await;

        mock.assert();
        assert!(
            matches!(result, Err(CatalogClientError::Decode(_))),
            "expected CatalogClientError::Decode, found: {result:?}"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|_, then| {
            then.status(200)
                .header("content-type", "text/html")
                .body("<html>maintenance</html>");
        });

        let client = CatalogClient::new(client_config(&server.base_url())).unwrap();
        let result = client.list_page(NonZeroU32::MIN).await;

        mock.assert();
        let err = result.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Decode);
    }

    #[tokio::test]
    async fn unreachable_catalog_is_network_error() {
        // nothing listens on the discard port
        let client = CatalogClient::new(client_config("http://127.0.0.1:9")).unwrap();
        let result = client.list_page(NonZeroU32::MIN).await;
        assert!(
            matches!(result, Err(CatalogClientError::Network(_))),
            "expected CatalogClientError::Network, found: {result:?}"
        );
    }

    // endregion
}
