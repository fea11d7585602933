use std::num::NonZeroU32;

use recipe_catalog::{FIRST_PAGE, FetchErrorKind, Recipe, RecipesPage};

use crate::controller::RequestSeq;
use crate::mode::Mode;

/// The most recent failure of the latest request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub kind: FetchErrorKind,
    /// The mode whose request failed, re-issued on retry.
    pub mode: Mode,
    pub message: String,
}

/// Everything the user sees, owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Mode of the records currently displayed.
    pub(crate) mode: Mode,
    /// Contents of the search input, follows every edit immediately.
    pub(crate) query: String,
    /// Position shown by the pagination control.
    ///
    /// Only browse results move it, search results leave it where it was.
    pub(crate) page: NonZeroU32,
    pub(crate) total_pages: u32,
    pub(crate) records: Vec<Recipe>,
    pub(crate) pending: Option<(RequestSeq, Mode)>,
    pub(crate) last_error: Option<LastError>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: Mode::Browse { page: FIRST_PAGE },
            query: String::new(),
            page: FIRST_PAGE,
            total_pages: 1,
            records: Vec::new(),
            pending: None,
            last_error: None,
        }
    }
}

impl ViewState {
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> NonZeroU32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn records(&self) -> &[Recipe] {
        &self.records
    }

    /// The request whose response is awaited, if any.
    pub fn pending(&self) -> Option<&(RequestSeq, Mode)> {
        self.pending.as_ref()
    }

    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    pub fn view(&self) -> View<'_> {
        View {
            records: &self.records,
            page: self.page,
            total_pages: self.total_pages,
            query: &self.query,
            mode: &self.mode,
            loading: self.pending.is_some(),
            last_error: self.last_error.as_ref(),
        }
    }

    /// Replace the displayed records with a successful response for `mode`.
    pub(crate) fn apply(&mut self, mode: Mode, response: RecipesPage) {
        if let Mode::Browse { page } = mode {
            self.page = page;
        }
        self.total_pages = response.total_pages();
        self.records = response.recipes;
        self.mode = mode;
        self.last_error = None;
    }
}

/// A read-only snapshot of [ViewState] for rendering.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub records: &'a [Recipe],
    pub page: NonZeroU32,
    pub total_pages: u32,
    pub query: &'a str,
    pub mode: &'a Mode,
    /// Whether a request is in flight.
    pub loading: bool,
    pub last_error: Option<&'a LastError>,
}

impl View<'_> {
    /// The page before the current one, if there is one.
    pub fn previous_page(&self) -> Option<NonZeroU32> {
        NonZeroU32::new(self.page.get() - 1)
    }

    /// The page after the current one, if there is one.
    pub fn next_page(&self) -> Option<NonZeroU32> {
        self.page
            .checked_add(1)
            .filter(|next| next.get() <= self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use recipe_catalog::test_helpers::{browse_page, page_of};

    use super::*;

    fn page(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn browse_results_move_the_page() {
        let mut state = ViewState::default();
        state.apply(Mode::Browse { page: page(3) }, browse_page(3, 50));

        assert_eq!(state.page(), page(3));
        assert_eq!(state.total_pages(), 5);
        assert_eq!(state.records().len(), 10);
        assert_eq!(state.mode(), &Mode::Browse { page: page(3) });
    }

    #[test]
    fn search_results_keep_the_page() {
        let mut state = ViewState::default();
        state.apply(Mode::Browse { page: page(2) }, browse_page(2, 50));
        state.apply(
            Mode::Search {
                query: "pasta".to_string(),
            },
            page_of([4, 9, 31], 3),
        );

        assert_eq!(state.page(), page(2));
        assert_eq!(state.total_pages(), 1);
        assert_eq!(
            state.records().iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![4, 9, 31]
        );
    }

    #[test]
    fn successful_results_clear_the_last_error() {
        let mut state = ViewState {
            last_error: Some(LastError {
                kind: FetchErrorKind::Network,
                mode: Mode::Browse { page: page(2) },
                message: "recipe catalog responded with 500".to_string(),
            }),
            ..Default::default()
        };
        state.apply(Mode::Browse { page: page(2) }, browse_page(2, 50));
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn neighbouring_pages_stay_in_range() {
        let mut state = ViewState::default();
        assert_eq!(state.view().previous_page(), None);
        assert_eq!(state.view().next_page(), None);

        state.apply(Mode::Browse { page: page(2) }, browse_page(2, 30));
        assert_eq!(state.view().previous_page(), Some(page(1)));
        assert_eq!(state.view().next_page(), Some(page(3)));

        state.apply(Mode::Browse { page: page(3) }, browse_page(3, 30));
        assert_eq!(state.view().next_page(), None);
    }
}
