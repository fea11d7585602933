//! Test support for consumers of [ClientTrait].
//!
//! [GatedClient] parks every request until the test answers it,
//! which lets tests decide the order in which responses arrive.

use std::num::NonZeroU32;
use std::sync::Mutex;

use futures::channel::oneshot;
use reqwest::StatusCode;

use crate::client::ClientTrait;
use crate::error::CatalogClientError;
use crate::types::{Recipe, RecipesPage, Request};

type Reply = Result<RecipesPage, CatalogClientError>;

/// A [ClientTrait] implementation whose responses are released by the test.
///
/// Requests are recorded when the returned future is first polled.
/// An answer given with [GatedClient::respond] before the request was
/// issued is kept and handed to the first matching request.
#[derive(Debug, Default)]
pub struct GatedClient {
    issued: Mutex<Vec<Request>>,
    parked: Mutex<Vec<(Request, oneshot::Sender<Reply>)>>,
    answers: Mutex<Vec<(Request, Reply)>>,
}

impl GatedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// All requests issued so far, in issue order.
    pub fn issued(&self) -> Vec<Request> {
        self.issued.lock().unwrap().clone()
    }

    /// Requests waiting for an answer, in issue order.
    ///
    /// Requests whose caller went away are not included.
    pub fn parked(&self) -> Vec<Request> {
        self.parked
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, sender)| !sender.is_canceled())
            .map(|(request, _)| request.clone())
            .collect()
    }

    /// Answer the oldest parked request equal to `request`.
    ///
    /// Requests whose future was dropped are skipped. Returns `false` if
    /// such a dropped request was the only match.
    /// If no such request is parked, the answer is stored for the next one.
    pub fn respond(&self, request: &Request, reply: Reply) -> bool {
        let mut parked = self.parked.lock().unwrap();
        let mut dropped = false;
        parked.retain(|(parked, sender)| {
            let gone = sender.is_canceled();
            dropped |= gone && parked == request;
            !gone
        });

        let Some(position) = parked.iter().position(|(parked, _)| parked == request) else {
            if dropped {
                return false;
            }
            self.answers.lock().unwrap().push((request.clone(), reply));
            return true;
        };
        let (_, sender) = parked.remove(position);
        sender.send(reply).is_ok()
    }

    async fn park(&self, request: Request) -> Reply {
        self.issued.lock().unwrap().push(request.clone());

        let (sender, receiver) = oneshot::channel();
        {
            // same lock order as `respond`
            let mut parked = self.parked.lock().unwrap();
            let mut answers = self.answers.lock().unwrap();
            if let Some(position) = answers.iter().position(|(answer, _)| *answer == request) {
                let (_, reply) = answers.remove(position);
                let _ = sender.send(reply);
            } else {
                parked.push((request, sender));
            }
        }

        receiver
            .await
            .unwrap_or_else(|_| Err(CatalogClientError::Other("request was never answered".into())))
    }
}

impl ClientTrait for GatedClient {
    async fn list_page(&self, page: NonZeroU32) -> Result<RecipesPage, CatalogClientError> {
        self.park(Request::ListPage(page)).await
    }

    async fn search(
        &self,
        text: impl AsRef<str> + Send + Sync,
    ) -> Result<RecipesPage, CatalogClientError> {
        self.park(Request::Search(text.as_ref().to_string())).await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn recipe(id: u64, name: &str) -> Recipe {
    Recipe {
        id,
        name: name.to_string(),
        cuisine: "Italian".to_string(),
        ingredients: vec!["Flour".to_string(), "Water".to_string(), "Salt".to_string()],
        instructions: "Mix everything and bake until golden.".to_string(),
    }
}

/// A page holding the records with the given ids, out of `total`.
pub fn page_of(ids: impl IntoIterator<Item = u64>, total: u64) -> RecipesPage {
    RecipesPage {
        recipes: ids
            .into_iter()
            .map(|id| recipe(id, &format!("Recipe {id}")))
            .collect(),
        total,
    }
}

/// The page the catalog would return for browse page `page` out of `total`.
pub fn browse_page(page: u32, total: u64) -> RecipesPage {
    let first = u64::from(page - 1) * 10 + 1;
    let last = (first + 9).min(total);
    page_of(first..=last, total)
}

pub fn list_request(page: u32) -> Request {
    Request::ListPage(NonZeroU32::new(page).expect("pages start at 1"))
}

pub fn search_request(text: &str) -> Request {
    Request::Search(text.to_string())
}

pub fn server_error() -> CatalogClientError {
    CatalogClientError::UnexpectedStatus {
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn decode_error() -> CatalogClientError {
    let source = serde_json::from_str::<RecipesPage>(r#"{"recipes": []}"#)
        .expect_err("envelope without total should not decode");
    CatalogClientError::Decode(source)
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn answers_are_delivered_in_any_order() {
        let client = GatedClient::new();
        let mut first = Box::pin(client.search("pasta"));
        let mut second = Box::pin(client.search("pastry"));
        assert!((&mut first).now_or_never().is_none());
        assert!((&mut second).now_or_never().is_none());
        assert_eq!(client.parked(), vec![
            search_request("pasta"),
            search_request("pastry")
        ]);

        assert!(client.respond(&search_request("pastry"), Ok(page_of([2], 1))));
        assert_eq!(second.now_or_never().unwrap().unwrap(), page_of([2], 1));

        assert!(client.respond(&search_request("pasta"), Ok(page_of([1], 1))));
        assert_eq!(first.now_or_never().unwrap().unwrap(), page_of([1], 1));

        assert_eq!(client.issued(), vec![
            search_request("pasta"),
            search_request("pastry")
        ]);
    }

    #[test]
    fn early_answers_are_kept() {
        let client = GatedClient::new();
        assert!(client.respond(&list_request(1), Err(server_error())));
        let reply = client.list_page(NonZeroU32::MIN).now_or_never().unwrap();
        assert!(matches!(
            reply,
            Err(CatalogClientError::UnexpectedStatus { .. })
        ));
    }

    #[test]
    fn dropped_request_does_not_take_the_answer() {
        let client = GatedClient::new();
        let mut first = Box::pin(client.list_page(NonZeroU32::MIN));
        assert!((&mut first).now_or_never().is_none());
        drop(first);

        let mut second = Box::pin(client.list_page(NonZeroU32::MIN));
        assert!((&mut second).now_or_never().is_none());
        assert_eq!(client.parked(), vec![list_request(1)]);

        assert!(client.respond(&list_request(1), Ok(browse_page(1, 5))));
        assert_eq!(second.now_or_never().unwrap().unwrap(), browse_page(1, 5));
    }

    #[test]
    fn answer_for_dropped_request_is_refused() {
        let client = GatedClient::new();
        let mut request = Box::pin(client.search("pasta"));
        assert!((&mut request).now_or_never().is_none());
        drop(request);

        assert!(!client.respond(&search_request("pasta"), Ok(page_of([1], 1))));
        assert!(client.parked().is_empty());
    }

    #[test]
    fn browse_page_fixture_is_clamped_to_total() {
        let last = browse_page(5, 45);
        assert_eq!(
            last.recipes.iter().map(|r| r.id).collect::<Vec<_>>(),
            (41..=45).collect::<Vec<_>>()
        );
    }
}
