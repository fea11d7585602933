//! Request sequencing between user input and the catalog.
//!
//! Every action that needs data issues one catalog request tagged with a
//! [RequestSeq]. Issuing a request aborts everything still in flight, and a
//! completed request may only write the view state if it is the latest one
//! issued. A response that was already produced when its request got
//! superseded is therefore discarded as well.
//!
//! Requests are driven on the caller's task through [ViewController::next_completion],
//! nothing is spawned.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::num::NonZeroU32;
use std::sync::Arc;

use derive_more::Display;
use futures::future::{AbortHandle, Abortable, Aborted, FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use recipe_catalog::{CatalogClientError, ClientTrait, FIRST_PAGE, FetchErrorKind, RecipesPage};
use tracing::{debug, trace, warn};

use crate::mode::{Action, Mode};
use crate::state::{LastError, View, ViewState};

/// Issue order of a catalog request, starting at 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("#{_0}")]
pub struct RequestSeq(u64);

impl RequestSeq {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Go back to the first browse page when the search text is cleared,
    /// instead of searching for the empty string.
    pub reset_on_clear: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            reset_on_clear: true,
        }
    }
}

/// What became of a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response replaced the displayed records.
    Applied(RequestSeq),
    /// The latest request failed, the displayed records were kept.
    Failed(RequestSeq, FetchErrorKind),
    /// The request was superseded or cancelled, its result was dropped.
    Discarded(RequestSeq),
}

type Completion = (
    RequestSeq,
    Result<Result<RecipesPage, CatalogClientError>, Aborted>,
);

/// Owner of the [ViewState] and the only writer to it.
pub struct ViewController<C> {
    client: Arc<C>,
    options: ControllerOptions,
    state: ViewState,
    /// Sequence of the most recently issued request.
    latest: RequestSeq,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion>>,
    abort_handles: BTreeMap<RequestSeq, AbortHandle>,
}

impl<C> Debug for ViewController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewController")
            .field("state", &self.state)
            .field("latest", &self.latest)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

impl<C: ClientTrait + 'static> ViewController<C> {
    /// Create a controller showing an empty first page.
    ///
    /// Nothing is fetched until [Self::initialize] is called.
    pub fn new(client: Arc<C>, options: ControllerOptions) -> Self {
        Self {
            client,
            options,
            state: ViewState::default(),
            latest: RequestSeq::default(),
            in_flight: FuturesUnordered::new(),
            abort_handles: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn view(&self) -> View<'_> {
        self.state.view()
    }

    /// Whether a response is awaited for the latest request.
    pub fn is_loading(&self) -> bool {
        self.state.pending.is_some()
    }

    /// Whether [Self::next_completion] has anything to wait for.
    ///
    /// Aborted requests count until they were collected.
    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Enter browse mode at the first page.
    ///
    /// Like every other request, `page` only moves once the response arrived.
    pub fn initialize(&mut self) -> RequestSeq {
        self.issue(Mode::Browse { page: FIRST_PAGE })
    }

    pub fn on_page_changed(&mut self, page: NonZeroU32) -> RequestSeq {
        self.issue(Mode::Browse { page })
    }

    pub fn on_query_changed(&mut self, query: impl Into<String>) -> RequestSeq {
        let query = query.into();
        self.state.query = query.clone();

        let mode = if query.is_empty() && self.options.reset_on_clear {
            Mode::Browse { page: FIRST_PAGE }
        } else {
            Mode::Search { query }
        };
        self.issue(mode)
    }

    /// Re-issue the request that failed last.
    ///
    /// Does nothing if there is no failure to retry or a newer request is
    /// already in flight.
    pub fn retry(&mut self) -> Option<RequestSeq> {
        if self.state.pending.is_some() {
            return None;
        }
        let mode = self.state.last_error.as_ref()?.mode.clone();
        Some(self.issue(mode))
    }

    /// Apply a user action.
    ///
    /// Returns the sequence of the request it issued, if any.
    pub fn dispatch(&mut self, action: Action) -> Option<RequestSeq> {
        match action {
            Action::QueryChanged(query) => Some(self.on_query_changed(query)),
            Action::PageChanged(page) => Some(self.on_page_changed(page)),
            Action::Retry => self.retry(),
        }
    }

    /// Wait for the next in-flight request to finish and apply it.
    ///
    /// Returns `None` right away if nothing is in flight.
    /// Cancel safe, dropping the future loses no completion.
    pub async fn next_completion(&mut self) -> Option<Outcome> {
        let (seq, result) = self.in_flight.next().await?;
        self.abort_handles.remove(&seq);

        let outcome = match result {
            Ok(result) => self.complete(seq, result),
            Err(Aborted) => {
                trace!(%seq, "collected cancelled request");
                Outcome::Discarded(seq)
            },
        };
        Some(outcome)
    }

    /// Drive every in-flight request to completion.
    pub async fn settle(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_completion().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Drop everything in flight, e.g. when the view is torn down.
    pub fn cancel_all(&mut self) {
        if !self.in_flight.is_empty() {
            debug!(n_requests = self.in_flight.len(), "cancelling in-flight requests");
        }
        for (_, handle) in std::mem::take(&mut self.abort_handles) {
            handle.abort();
        }
        self.in_flight.clear();
        self.state.pending = None;
    }

    fn issue(&mut self, mode: Mode) -> RequestSeq {
        for (superseded, handle) in std::mem::take(&mut self.abort_handles) {
            trace!(%superseded, "aborting superseded request");
            handle.abort();
        }

        self.latest = self.latest.next();
        let seq = self.latest;
        let request = mode.request();
        debug!(%seq, %request, "issuing catalog request");

        let (handle, registration) = AbortHandle::new_pair();
        let client = Arc::clone(&self.client);
        let fetch = Abortable::new(
            async move { client.fetch(&request).await },
            registration,
        );
        self.in_flight
            .push(async move { (seq, fetch.await) }.boxed_local());
        self.abort_handles.insert(seq, handle);
        self.state.pending = Some((seq, mode));

        seq
    }

    /// Write the result of request `seq` into the view state,
    /// unless a newer request was issued since.
    fn complete(
        &mut self,
        seq: RequestSeq,
        result: Result<RecipesPage, CatalogClientError>,
    ) -> Outcome {
        if seq != self.latest {
            debug!(%seq, latest = %self.latest, ok = result.is_ok(), "discarding stale response");
            return Outcome::Discarded(seq);
        }
        let Some((_, mode)) = self.state.pending.take() else {
            debug!(%seq, "discarding response without pending request");
            return Outcome::Discarded(seq);
        };

        match result {
            Ok(response) => {
                debug!(
                    %seq,
                    %mode,
                    n_recipes = response.recipes.len(),
                    total = response.total,
                    "applying catalog response"
                );
                self.state.apply(mode, response);
                Outcome::Applied(seq)
            },
            Err(err) => {
                let kind = err.kind();
                warn!(%seq, %mode, error = %err, "catalog request failed, keeping previous results");
                self.state.last_error = Some(LastError {
                    kind,
                    mode,
                    message: display_chain(&err),
                });
                Outcome::Failed(seq, kind)
            },
        }
    }
}

/// Render an error and its sources on one line.
fn display_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
