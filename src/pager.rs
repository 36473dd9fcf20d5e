//! Paginated result aggregation
//!
//! Every list view (movies, TV shows, search, anime) browses the same way:
//! load page 1 whenever the query changes, append the next page when the
//! user asks for more. [`AggregationState`] is the per-view record of what
//! has been loaded so far; [`Aggregator`] runs the provider calls against it.
//!
//! Requests are tagged with a [`FetchTicket`] carrying the generation (bumped
//! by every reset) and page number they were issued for. Only the response
//! for the single pending ticket is applied; anything else is stale and is
//! dropped without touching state. Network calls are never cancelled.
//!
//! While a request is pending `load_more` is a no-op, so a view has at most
//! one page request of the current generation in flight. A `reset` may be
//! issued at any time and supersedes whatever was pending.

use serde::Serialize;

use crate::api::tmdb::Result;
use crate::api::{ErrorCategory, MetadataProvider, TmdbError};
use crate::models::{Catalog, FilterSet, Item, MediaKind, QueryDescriptor, ResultPage};

// =============================================================================
// Endpoint Selection
// =============================================================================

/// Provider operation a generation paginates over
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum Endpoint {
    Search { catalog: Catalog, term: String },
    Discover { kind: MediaKind, filters: FilterSet },
}

impl Endpoint {
    /// Search when the query carries a non-blank term, discover otherwise.
    ///
    /// Returns `None` for [`Catalog::Multi`] without a term: mixed results
    /// only exist as search results.
    pub fn select(catalog: Catalog, query: &QueryDescriptor) -> Option<Self> {
        if let Some(term) = query.search_term() {
            return Some(Endpoint::Search {
                catalog,
                term: term.to_string(),
            });
        }

        let filters = match query {
            QueryDescriptor::Filters(filters) => filters.clone(),
            QueryDescriptor::Search(_) => FilterSet::default(),
        };
        let kind = match catalog {
            Catalog::Movies => MediaKind::Movie,
            Catalog::Tv => MediaKind::Tv,
            Catalog::Multi => return None,
        };
        Some(Endpoint::Discover { kind, filters })
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Endpoint::Search { .. })
    }
}

// =============================================================================
// Tickets & Outcomes
// =============================================================================

/// Tag attached to one in-flight page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    page: u32,
    endpoint: Endpoint,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

/// Failure of a single page fetch, kept for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub category: ErrorCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    pub page: u32,
}

impl FetchFailure {
    fn new(err: &TmdbError, page: u32) -> Self {
        Self {
            category: err.category(),
            status: err.status(),
            message: err.to_string(),
            page,
        }
    }
}

/// What happened to state when a request was issued or resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Page 1 replaced the accumulated items
    Replaced { items: usize },
    /// A later page was appended
    Appended { items: usize },
    /// The request failed; state rolled back
    Failed(FetchFailure),
    /// Response belonged to a superseded request and was dropped
    Stale,
    /// No request was issued
    Skipped,
}

// =============================================================================
// Aggregation State
// =============================================================================

/// Per-view pagination state.
///
/// Created when a view opens, reset on every query change, dropped with the
/// view. Invariant after each applied page: `has_more == current_page < total_pages`.
#[derive(Debug, Clone)]
pub struct AggregationState {
    catalog: Catalog,
    query: Option<QueryDescriptor>,
    endpoint: Option<Endpoint>,
    accumulated: Vec<Item>,
    current_page: u32,
    total_pages: u32,
    total_results: u32,
    has_more: bool,
    is_loading: bool,
    generation: u64,
    pending: Option<FetchTicket>,
    last_error: Option<FetchFailure>,
}

impl AggregationState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            query: None,
            endpoint: None,
            accumulated: Vec::new(),
            current_page: 1,
            total_pages: 0,
            total_results: 0,
            has_more: false,
            is_loading: false,
            generation: 0,
            pending: None,
            last_error: None,
        }
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    /// Query of the current generation
    pub fn query(&self) -> Option<&QueryDescriptor> {
        self.query.as_ref()
    }

    /// Endpoint chosen by the last reset
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Items loaded so far, in provider order
    pub fn items(&self) -> &[Item] {
        &self.accumulated
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_results(&self) -> u32 {
        self.total_results
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> Option<&FetchTicket> {
        self.pending.as_ref()
    }

    /// Failure of the most recent request, cleared when a new one is issued
    pub fn last_error(&self) -> Option<&FetchFailure> {
        self.last_error.as_ref()
    }

    /// Start a new generation for `query` and return the page-1 ticket.
    ///
    /// Clears accumulated items immediately. Returns `None` (and leaves the
    /// view empty and idle) when the catalog has nothing to show for the query.
    pub fn begin_reset(&mut self, query: impl Into<QueryDescriptor>) -> Option<FetchTicket> {
        let query = query.into();

        self.generation = self.generation.wrapping_add(1);
        self.accumulated.clear();
        self.current_page = 1;
        self.total_pages = 0;
        self.total_results = 0;
        self.has_more = false;
        self.last_error = None;
        self.endpoint = Endpoint::select(self.catalog, &query);
        self.query = Some(query);

        let Some(endpoint) = self.endpoint.clone() else {
            tracing::debug!(generation = self.generation, "nothing to fetch for query");
            self.pending = None;
            self.is_loading = false;
            return None;
        };

        let ticket = FetchTicket {
            generation: self.generation,
            page: 1,
            endpoint,
        };
        self.pending = Some(ticket.clone());
        self.is_loading = true;
        Some(ticket)
    }

    /// Advance to the next page and return its ticket.
    ///
    /// Returns `None` without changing state unless more pages remain and
    /// nothing is in flight.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if !self.has_more || self.is_loading {
            return None;
        }
        let endpoint = self.endpoint.clone()?;

        self.current_page += 1;
        self.is_loading = true;
        self.last_error = None;

        let ticket = FetchTicket {
            generation: self.generation,
            page: self.current_page,
            endpoint,
        };
        self.pending = Some(ticket.clone());
        Some(ticket)
    }

    /// Whether `ticket` is the request state is waiting on
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.pending.as_ref().is_some_and(|p| {
            p.generation == ticket.generation
                && p.page == ticket.page
                && p.endpoint == ticket.endpoint
        })
    }

    /// Apply the result of the request tagged `ticket`.
    ///
    /// Pages are taken whole or not at all. Responses for anything but the
    /// pending ticket are dropped.
    pub fn apply(&mut self, ticket: &FetchTicket, outcome: Result<ResultPage<Item>>) -> PageOutcome {
        if !self.is_current(ticket) {
            tracing::debug!(
                generation = ticket.generation,
                page = ticket.page,
                current_generation = self.generation,
                "discarding stale page response"
            );
            return PageOutcome::Stale;
        }

        self.pending = None;
        self.is_loading = false;

        match outcome {
            Ok(page) => {
                let count = page.items.len();
                self.total_pages = page.total_pages;
                self.total_results = page.total_results;

                let result = if ticket.page == 1 {
                    self.accumulated = page.items;
                    PageOutcome::Replaced { items: count }
                } else {
                    self.accumulated.extend(page.items);
                    PageOutcome::Appended { items: count }
                };
                self.has_more = self.current_page < self.total_pages;

                tracing::debug!(
                    generation = ticket.generation,
                    page = ticket.page,
                    total_pages = self.total_pages,
                    items = count,
                    "page applied"
                );
                result
            }
            Err(err) => {
                tracing::warn!(
                    generation = ticket.generation,
                    page = ticket.page,
                    category = ?err.category(),
                    error = %err,
                    "page fetch failed"
                );

                if ticket.page > 1 {
                    self.current_page = ticket.page - 1;
                }
                let failure = FetchFailure::new(&err, ticket.page);
                self.last_error = Some(failure.clone());
                PageOutcome::Failed(failure)
            }
        }
    }

    /// Owned copy of what the presentation layer renders
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            catalog: self.catalog,
            endpoint: self.endpoint.clone(),
            items: self.accumulated.clone(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            has_more: self.has_more,
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
        }
    }
}

/// Serializable view of an [`AggregationState`]
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub catalog: Catalog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    pub items: Vec<Item>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u32,
    pub has_more: bool,
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<FetchFailure>,
}

// =============================================================================
// Aggregator
// =============================================================================

/// Runs page requests for views against a metadata provider
#[derive(Debug, Clone)]
pub struct Aggregator<P> {
    provider: P,
}

impl<P: MetadataProvider> Aggregator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Perform the provider call for `ticket` without touching any state
    pub async fn fetch(&self, ticket: &FetchTicket) -> Result<ResultPage<Item>> {
        match &ticket.endpoint {
            Endpoint::Search { catalog, term } => {
                self.provider.search(*catalog, term, ticket.page).await
            }
            Endpoint::Discover { kind, filters } => {
                self.provider.discover(*kind, filters, ticket.page).await
            }
        }
    }

    /// Reset `state` to `query` and load its first page
    pub async fn reset(
        &self,
        state: &mut AggregationState,
        query: impl Into<QueryDescriptor>,
    ) -> PageOutcome {
        let Some(ticket) = state.begin_reset(query) else {
            return PageOutcome::Skipped;
        };
        let outcome = self.fetch(&ticket).await;
        state.apply(&ticket, outcome)
    }

    /// Load and append the next page, if there is one and nothing is in flight
    pub async fn load_more(&self, state: &mut AggregationState) -> PageOutcome {
        let Some(ticket) = state.begin_load_more() else {
            return PageOutcome::Skipped;
        };
        let outcome = self.fetch(&ticket).await;
        state.apply(&ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Movie, SortOrder};

    fn movie(id: u64) -> Item {
        Item::Movie(Movie {
            id,
            title: format!("Movie {}", id),
            release_date: None,
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            vote_average: 5.0,
            genre_ids: vec![],
        })
    }

    fn page(number: u32, total_pages: u32, ids: std::ops::Range<u64>) -> Result<ResultPage<Item>> {
        let items: Vec<Item> = ids.map(movie).collect();
        Ok(ResultPage {
            total_results: total_pages * items.len() as u32,
            items,
            page: number,
            total_pages,
        })
    }

    fn not_found() -> Result<ResultPage<Item>> {
        Err(TmdbError::Provider {
            status: 404,
            message: "The resource you requested could not be found.".to_string(),
        })
    }

    #[test]
    fn test_endpoint_selection() {
        let filters = FilterSet::default().sort_by(SortOrder::RatingDesc);

        assert!(matches!(
            Endpoint::select(Catalog::Movies, &"batman".into()),
            Some(Endpoint::Search { catalog: Catalog::Movies, ref term }) if term == "batman"
        ));
        assert_eq!(
            Endpoint::select(Catalog::Tv, &filters.clone().into()),
            Some(Endpoint::Discover {
                kind: MediaKind::Tv,
                filters
            })
        );
        // Blank search falls back to unfiltered discover
        assert_eq!(
            Endpoint::select(Catalog::Movies, &"  ".into()),
            Some(Endpoint::Discover {
                kind: MediaKind::Movie,
                filters: FilterSet::default()
            })
        );
        assert_eq!(Endpoint::select(Catalog::Multi, &"".into()), None);
    }

    #[test]
    fn test_new_state_is_empty_and_idle() {
        let state = AggregationState::new(Catalog::Movies);
        assert!(state.items().is_empty());
        assert_eq!(state.current_page(), 1);
        assert!(!state.has_more());
        assert!(!state.is_loading());
        assert!(state.pending().is_none());
    }

    #[test]
    fn test_reset_clears_before_response() {
        let mut state = AggregationState::new(Catalog::Movies);
        let t1 = state.begin_reset(FilterSet::default()).unwrap();
        state.apply(&t1, page(1, 3, 0..20));
        assert_eq!(state.items().len(), 20);

        let t2 = state.begin_reset("alien").unwrap();
        assert!(state.items().is_empty());
        assert_eq!(state.current_page(), 1);
        assert!(state.is_loading());
        assert!(!state.has_more());
        assert_eq!(t2.page(), 1);
        assert_eq!(t2.generation(), t1.generation() + 1);
    }

    #[test]
    fn test_load_more_appends_in_order() {
        let mut state = AggregationState::new(Catalog::Movies);
        let t1 = state.begin_reset(FilterSet::default()).unwrap();
        assert_eq!(state.apply(&t1, page(1, 3, 0..2)), PageOutcome::Replaced { items: 2 });

        let t2 = state.begin_load_more().unwrap();
        assert_eq!(t2.page(), 2);
        assert_eq!(state.apply(&t2, page(2, 3, 2..4)), PageOutcome::Appended { items: 2 });

        let ids: Vec<u64> = state.items().iter().map(Item::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(state.has_more());
    }

    #[test]
    fn test_load_more_is_noop_while_loading() {
        let mut state = AggregationState::new(Catalog::Movies);
        let t1 = state.begin_reset(FilterSet::default()).unwrap();
        state.apply(&t1, page(1, 5, 0..20));

        let t2 = state.begin_load_more().unwrap();
        assert!(state.begin_load_more().is_none());
        assert_eq!(state.current_page(), 2);
        assert_eq!(state.pending(), Some(&t2));
    }

    #[test]
    fn test_load_more_is_noop_on_last_page() {
        let mut state = AggregationState::new(Catalog::Movies);
        let t1 = state.begin_reset(FilterSet::default()).unwrap();
        state.apply(&t1, page(1, 1, 0..5));

        assert!(!state.has_more());
        assert!(state.begin_load_more().is_none());
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.items().len(), 5);
    }

    #[test]
    fn test_stale_reset_response_is_discarded() {
        let mut state = AggregationState::new(Catalog::Movies);
        let old = state.begin_reset("bat").unwrap();
        let new = state.begin_reset("batman").unwrap();

        state.apply(&new, page(1, 2, 100..110));
        assert_eq!(state.apply(&old, page(1, 9, 0..20)), PageOutcome::Stale);

        assert_eq!(state.items().len(), 10);
        assert_eq!(state.items()[0].id(), 100);
        assert_eq!(state.total_pages(), 2);
    }

    #[test]
    fn test_stale_failure_does_not_record_error() {
        let mut state = AggregationState::new(Catalog::Movies);
        let old = state.begin_reset("bat").unwrap();
        let new = state.begin_reset("batman").unwrap();

        assert_eq!(state.apply(&old, not_found()), PageOutcome::Stale);
        assert!(state.last_error().is_none());
        assert!(state.is_loading());
        assert!(state.is_current(&new));
    }

    #[test]
    fn test_reset_supersedes_pending_load_more() {
        let mut state = AggregationState::new(Catalog::Movies);
        let t1 = state.begin_reset(FilterSet::default()).unwrap();
        state.apply(&t1, page(1, 4, 0..20));
        let more = state.begin_load_more().unwrap();

        let fresh = state.begin_reset(FilterSet::default().year(1999)).unwrap();
        assert_eq!(state.apply(&more, page(2, 4, 20..40)), PageOutcome::Stale);
        assert!(state.items().is_empty());

        state.apply(&fresh, page(1, 1, 500..503));
        assert_eq!(state.items().len(), 3);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn test_ticket_applies_once() {
        let mut state = AggregationState::new(Catalog::Tv);
        let ticket = state.begin_reset(FilterSet::default()).unwrap();
        state.apply(&ticket, page(1, 3, 0..5));
        assert_eq!(state.apply(&ticket, page(1, 3, 0..5)), PageOutcome::Stale);
        assert_eq!(state.items().len(), 5);
    }

    #[test]
    fn test_ticket_from_another_view_is_stale() {
        let mut movies = AggregationState::new(Catalog::Movies);
        let mut shows = AggregationState::new(Catalog::Tv);
        let movie_ticket = movies.begin_reset(FilterSet::default()).unwrap();
        let show_ticket = shows.begin_reset(FilterSet::default()).unwrap();

        // Same generation and page, different endpoint
        assert_eq!(movie_ticket.generation(), show_ticket.generation());
        assert!(!shows.is_current(&movie_ticket));
        assert_eq!(shows.apply(&movie_ticket, page(1, 3, 0..5)), PageOutcome::Stale);
        assert!(shows.items().is_empty());
        assert!(shows.is_loading());
    }

    #[test]
    fn test_reset_failure_leaves_empty_state() {
        let mut state = AggregationState::new(Catalog::Movies);
        let ticket = state.begin_reset("batman").unwrap();

        let outcome = state.apply(&ticket, not_found());
        assert!(matches!(outcome, PageOutcome::Failed(ref f) if f.status == Some(404)));
        assert!(state.items().is_empty());
        assert!(!state.is_loading());
        assert!(!state.has_more());
        assert_eq!(state.last_error().map(|e| e.category), Some(ErrorCategory::Provider));
    }

    #[test]
    fn test_load_more_failure_rolls_back_page() {
        let mut state = AggregationState::new(Catalog::Movies);
        let t1 = state.begin_reset(FilterSet::default()).unwrap();
        state.apply(&t1, page(1, 3, 0..20));

        let t2 = state.begin_load_more().unwrap();
        state.apply(&t2, not_found());

        assert_eq!(state.current_page(), 1);
        assert_eq!(state.items().len(), 20);
        assert!(state.has_more());
        assert!(!state.is_loading());
        assert_eq!(state.last_error().map(|e| e.page), Some(2));

        // Manual retry asks for the same page again and clears the error
        let retry = state.begin_load_more().unwrap();
        assert_eq!(retry.page(), 2);
        assert!(state.last_error().is_none());
    }

    #[test]
    fn test_multi_without_term_issues_nothing() {
        let mut state = AggregationState::new(Catalog::Multi);
        let t1 = state.begin_reset("batman").unwrap();
        state.apply(&t1, page(1, 3, 0..20));

        assert!(state.begin_reset("   ").is_none());
        assert!(state.items().is_empty());
        assert!(!state.is_loading());
        assert!(!state.has_more());
        assert!(state.endpoint().is_none());
        assert!(state.begin_load_more().is_none());
    }

    #[test]
    fn test_zero_total_pages_has_no_more() {
        let mut state = AggregationState::new(Catalog::Movies);
        let ticket = state.begin_reset("zzzzzz").unwrap();
        state.apply(&ticket, page(1, 0, 0..0));
        assert!(!state.has_more());
        assert_eq!(state.total_results(), 0);
    }

    #[test]
    fn test_snapshot_serializes_pagination() {
        let mut state = AggregationState::new(Catalog::Movies);
        let ticket = state.begin_reset("batman").unwrap();
        state.apply(&ticket, page(1, 2, 0..3));

        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["catalog"], "movies");
        assert_eq!(json["endpoint"]["operation"], "search");
        assert_eq!(json["items"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["has_more"], true);
        assert!(json.get("last_error").is_none());
    }
}
