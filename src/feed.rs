//! The feed controller: owner of the paginated, deduplicated collection.
//!
//! All collection state lives here and is mutated from exactly one place —
//! the engine loop calls into these operations; background fetch tasks never
//! touch state directly, they only queue [`FeedEvent`]s. Every outgoing fetch
//! is tagged with the filter generation current at spawn time, and a result
//! whose generation no longer matches is dropped without any state change.

use crate::error::GatewayError;
use crate::filter::FilterChange;
use crate::gateway::RecipeGateway;
use crate::types::{FeedPage, PageParams, PopularTag, RecipeMutation, RecipeRecord};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ============================================================================
// Events and Snapshots
// ============================================================================

/// Whether a completed page replaces the collection or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Page 1 of a new filter generation.
    Reset,
    /// The next page of the current generation.
    Append,
}

/// Completion events queued by background gateway tasks.
pub enum FeedEvent {
    PageLoaded {
        generation: u64,
        kind: PageKind,
        result: Result<FeedPage, GatewayError>,
    },
    LikeCompleted {
        id: String,
        result: Result<RecipeRecord, GatewayError>,
    },
    DeleteCompleted {
        id: String,
        result: Result<(), GatewayError>,
    },
}

/// Published state for the view layer.
///
/// Item and tag lists are Arc-backed so a snapshot is O(1) to produce and
/// clone regardless of collection size.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub items: Arc<Vec<RecipeRecord>>,
    pub page: u32,
    pub total_pages: u32,
    pub total_recipes: u64,
    pub is_loading: bool,
    pub popular_tags: Arc<Vec<PopularTag>>,
}

/// Outcome of applying a completed page result.
#[derive(Debug, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was merged into the collection.
    Applied,
    /// The result belonged to a superseded generation and was discarded.
    /// Expected, ordinary traffic — not an error.
    Stale,
    /// The fetch failed; loading was cleared and the collection left intact.
    Failed(String),
}

// ============================================================================
// Feed Controller
// ============================================================================

/// Paginated feed state and the logic that keeps it consistent under
/// overlapping asynchronous fetches.
pub struct FeedController {
    gateway: Arc<dyn RecipeGateway>,
    events: mpsc::Sender<FeedEvent>,
    page_size: u32,

    /// Filter configuration the current generation was built from.
    filter: FilterChange,
    /// Bumped on every filter reset; tags every outgoing fetch.
    generation: u64,

    items: Arc<Vec<RecipeRecord>>,
    page: u32,
    total_pages: u32,
    total_recipes: u64,
    is_loading: bool,
    popular_tags: Arc<Vec<PopularTag>>,

    /// Handle to the in-flight fetch task, aborted on supersede.
    fetch_handle: Option<JoinHandle<()>>,
}

impl FeedController {
    pub fn new(
        gateway: Arc<dyn RecipeGateway>,
        events: mpsc::Sender<FeedEvent>,
        page_size: u32,
    ) -> Self {
        Self {
            gateway,
            events,
            page_size,
            filter: FilterChange::default(),
            generation: 0,
            items: Arc::new(Vec::new()),
            page: 0,
            total_pages: 0,
            total_recipes: 0,
            is_loading: false,
            popular_tags: Arc::new(Vec::new()),
            fetch_handle: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True when more pages exist beyond what is loaded.
    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }

    /// Id of the last loaded item — the scroll sentinel.
    pub fn last_item_id(&self) -> Option<&str> {
        self.items.last().map(|r| r.id.as_str())
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: Arc::clone(&self.items),
            page: self.page,
            total_pages: self.total_pages,
            total_recipes: self.total_recipes,
            is_loading: self.is_loading,
            popular_tags: Arc::clone(&self.popular_tags),
        }
    }

    /// Reset the feed for a new filter configuration and fetch its first page.
    ///
    /// The outstanding fetch, if any, is aborted outright; the generation
    /// bump keeps us correct even when the abort loses the race and the old
    /// task has already queued its result.
    pub fn apply_filter_change(&mut self, change: FilterChange) {
        self.generation = self.generation.wrapping_add(1);
        self.filter = change;

        self.items = Arc::new(Vec::new());
        self.page = 0;
        self.total_pages = 0;
        self.total_recipes = 0;
        self.is_loading = true;

        tracing::debug!(
            generation = self.generation,
            mode = ?self.filter.mode,
            query = %self.filter.query,
            "Filter changed, resetting feed"
        );
        self.spawn_fetch(1, PageKind::Reset);
    }

    /// Fetch the next page, if one exists and nothing is in flight.
    ///
    /// Returns true when a fetch was issued. The `is_loading` guard
    /// serializes page fetches within a generation: a second call while one
    /// is outstanding is a no-op.
    pub fn load_more(&mut self) -> bool {
        if self.is_loading {
            tracing::trace!("load_more ignored: fetch already in flight");
            return false;
        }
        if !self.has_more() {
            tracing::trace!(
                page = self.page,
                total_pages = self.total_pages,
                "load_more ignored: no further pages"
            );
            return false;
        }

        self.is_loading = true;
        self.spawn_fetch(self.page + 1, PageKind::Append);
        true
    }

    /// Apply a completed page result. Results arrive in completion order;
    /// only results tagged with the current generation are applied.
    pub fn on_page_loaded(
        &mut self,
        generation: u64,
        kind: PageKind,
        result: Result<FeedPage, GatewayError>,
    ) -> PageOutcome {
        if generation != self.generation {
            tracing::debug!(
                expected = self.generation,
                got = generation,
                "Ignoring stale page result (generation mismatch)"
            );
            return PageOutcome::Stale;
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.is_loading = false;
                tracing::warn!(error = %e, kind = ?kind, "Page fetch failed");
                return PageOutcome::Failed(e.to_string());
            }
        };

        match kind {
            PageKind::Reset => {
                self.total_pages = page.total_pages;
                self.total_recipes = page.total_recipes;
                // An empty result set has no pages at all.
                self.page = if page.total_pages == 0 { 0 } else { 1 };
                self.items = Arc::new(page.items);
                // Search pages may omit the tag aggregation; keep the last
                // good set rather than blanking the tag strip.
                if !page.popular_tags.is_empty() {
                    self.popular_tags = Arc::new(page.popular_tags);
                }
            }
            PageKind::Append => {
                let mut seen: HashSet<String> =
                    self.items.iter().map(|r| r.id.clone()).collect();
                let items = Arc::make_mut(&mut self.items);
                for record in page.items {
                    // Servers can duplicate records at page boundaries when
                    // the underlying collection shifts between fetches.
                    if seen.insert(record.id.clone()) {
                        items.push(record);
                    } else {
                        tracing::debug!(
                            recipe_id = %record.id,
                            "Skipping duplicate record at page boundary"
                        );
                    }
                }
                self.page += 1;
                if page.page != self.page {
                    tracing::debug!(
                        echoed = page.page,
                        tracked = self.page,
                        "Server echoed unexpected page number"
                    );
                }
            }
        }

        self.is_loading = false;
        debug_assert!(
            self.page <= self.total_pages || self.total_pages == 0,
            "page {} ran past total_pages {}",
            self.page,
            self.total_pages
        );
        PageOutcome::Applied
    }

    /// Merge a single-record mutation into the loaded collection.
    ///
    /// Updates replace the matching record in place; deletes remove it and
    /// decrement the total count. A mutation whose id is not loaded — it
    /// scrolled out of the window, or a filter reset has since replaced the
    /// collection — is ignored entirely, including the count decrement.
    /// The removed slot is not backfilled from the next page.
    pub fn merge_mutation(&mut self, mutation: RecipeMutation) -> bool {
        match mutation {
            RecipeMutation::Updated(record) => {
                let Some(idx) = self.items.iter().position(|r| r.id == record.id) else {
                    tracing::debug!(recipe_id = %record.id, "Update target not loaded, ignoring");
                    return false;
                };
                Arc::make_mut(&mut self.items)[idx] = record;
                true
            }
            RecipeMutation::Deleted(id) => {
                let Some(idx) = self.items.iter().position(|r| r.id == id) else {
                    tracing::debug!(recipe_id = %id, "Delete target not loaded, ignoring");
                    return false;
                };
                Arc::make_mut(&mut self.items).remove(idx);
                self.total_recipes = self.total_recipes.saturating_sub(1);
                true
            }
        }
    }

    fn spawn_fetch(&mut self, page: u32, kind: PageKind) {
        // Abort any outstanding fetch before starting a new one. Abort is
        // advisory — the generation check in on_page_loaded is the backstop.
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
            tracing::debug!("Aborted superseded fetch task");
        }

        let params = PageParams {
            mode: self.filter.mode,
            query: self.filter.query.clone(),
            sort: self.filter.sort,
            tag: self.filter.tag.clone(),
            page,
            limit: self.page_size,
        };
        let generation = self.generation;
        let gateway = Arc::clone(&self.gateway);
        let tx = self.events.clone();

        tracing::debug!(generation, page, kind = ?kind, "Spawning page fetch");
        self.fetch_handle = Some(tokio::spawn(async move {
            let result = gateway.fetch_page(&params).await;
            if tx
                .send(FeedEvent::PageLoaded {
                    generation,
                    kind,
                    result,
                })
                .await
                .is_err()
            {
                tracing::warn!("Feed event receiver dropped before page result delivery");
            }
        }));
    }
}

/// Abort the in-flight fetch when the feed goes away, preventing orphaned
/// tasks from outliving the view.
impl Drop for FeedController {
    fn drop(&mut self) {
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
            tracing::debug!("Aborted fetch task on feed teardown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FetchMode, SortOption};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn recipe(id: &str) -> RecipeRecord {
        RecipeRecord {
            id: id.to_string(),
            name: format!("Recipe {id}"),
            image_ref: format!("https://cdn.example.com/{id}.png"),
            dietary_tags: vec!["vegan".to_string()],
            liked_by: Vec::new(),
            owned_by_current_user: false,
            nutrition_summary: "400 kcal".to_string(),
            created_at: None,
        }
    }

    fn page(ids: &[&str], page: u32, total_pages: u32, total_recipes: u64) -> FeedPage {
        FeedPage {
            items: ids.iter().map(|id| recipe(id)).collect(),
            page,
            total_pages,
            total_recipes,
            popular_tags: Vec::new(),
        }
    }

    /// Gateway that serves queued pages and counts calls.
    struct ScriptedGateway {
        pages: Mutex<Vec<FeedPage>>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(pages: Vec<FeedPage>) -> Self {
            Self {
                pages: Mutex::new(pages),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecipeGateway for ScriptedGateway {
        async fn fetch_page(&self, _params: &PageParams) -> Result<FeedPage, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                Err(GatewayError::HttpStatus(500))
            } else {
                Ok(pages.remove(0))
            }
        }

        async fn like_recipe(&self, _id: &str) -> Result<RecipeRecord, GatewayError> {
            Err(GatewayError::HttpStatus(500))
        }

        async fn delete_recipe(&self, _id: &str) -> Result<(), GatewayError> {
            Err(GatewayError::HttpStatus(500))
        }
    }

    fn controller_with(
        pages: Vec<FeedPage>,
    ) -> (
        FeedController,
        Arc<ScriptedGateway>,
        mpsc::Receiver<FeedEvent>,
    ) {
        let gateway = Arc::new(ScriptedGateway::new(pages));
        let (tx, rx) = mpsc::channel(8);
        let controller = FeedController::new(gateway.clone(), tx, 12);
        (controller, gateway, rx)
    }

    fn search_change(query: &str) -> FilterChange {
        FilterChange {
            mode: FetchMode::Search,
            query: query.to_string(),
            sort: SortOption::Popular,
            tag: None,
        }
    }

    fn ids(controller: &FeedController) -> Vec<String> {
        controller.items.iter().map(|r| r.id.clone()).collect()
    }

    #[tokio::test]
    async fn initial_load_then_load_more_appends() {
        let (mut controller, _gateway, mut rx) = controller_with(vec![
            page(&["A", "B", "C"], 1, 3, 30),
            page(&["D", "E", "F"], 2, 3, 30),
        ]);

        controller.apply_filter_change(FilterChange::default());
        assert!(controller.is_loading());
        let FeedEvent::PageLoaded {
            generation,
            kind,
            result,
        } = rx.recv().await.unwrap()
        else {
            panic!("expected page event");
        };
        assert_eq!(controller.on_page_loaded(generation, kind, result), PageOutcome::Applied);

        assert_eq!(ids(&controller), ["A", "B", "C"]);
        assert_eq!(controller.page, 1);
        assert_eq!(controller.total_pages, 3);
        assert_eq!(controller.total_recipes, 30);
        assert!(!controller.is_loading());

        assert!(controller.load_more());
        let FeedEvent::PageLoaded {
            generation,
            kind,
            result,
        } = rx.recv().await.unwrap()
        else {
            panic!("expected page event");
        };
        assert_eq!(controller.on_page_loaded(generation, kind, result), PageOutcome::Applied);

        assert_eq!(ids(&controller), ["A", "B", "C", "D", "E", "F"]);
        assert_eq!(controller.page, 2);
    }

    #[tokio::test]
    async fn double_load_more_issues_exactly_one_fetch() {
        let (mut controller, gateway, mut rx) = controller_with(vec![
            page(&["A"], 1, 3, 3),
            page(&["B"], 2, 3, 3),
        ]);

        controller.apply_filter_change(FilterChange::default());
        let FeedEvent::PageLoaded {
            generation,
            kind,
            result,
        } = rx.recv().await.unwrap()
        else {
            panic!("expected page event");
        };
        controller.on_page_loaded(generation, kind, result);
        assert_eq!(gateway.call_count(), 1);

        assert!(controller.load_more());
        assert!(!controller.load_more(), "second call must be a no-op");

        let _ = rx.recv().await.unwrap();
        assert_eq!(gateway.call_count(), 2, "exactly one fetch for the burst");
    }

    #[tokio::test]
    async fn load_more_is_noop_on_last_page() {
        let (mut controller, gateway, mut rx) = controller_with(vec![page(&["A"], 1, 1, 1)]);

        controller.apply_filter_change(FilterChange::default());
        let FeedEvent::PageLoaded {
            generation,
            kind,
            result,
        } = rx.recv().await.unwrap()
        else {
            panic!("expected page event");
        };
        controller.on_page_loaded(generation, kind, result);

        assert!(!controller.load_more());
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn stale_append_result_is_dropped() {
        let (mut controller, _gateway, mut rx) = controller_with(vec![
            page(&["A", "B"], 1, 3, 6),
            page(&["S1", "S2"], 1, 1, 2), // search result for the new generation
        ]);

        controller.apply_filter_change(FilterChange::default());
        let FeedEvent::PageLoaded {
            generation: gen1,
            kind,
            result,
        } = rx.recv().await.unwrap()
        else {
            panic!("expected page event");
        };
        controller.on_page_loaded(gen1, kind, result);
        assert!(controller.load_more());

        // Filters change while the page-2 fetch is outstanding.
        controller.apply_filter_change(search_change("pasta"));
        let gen2 = controller.generation();
        assert_ne!(gen1, gen2);

        // The old generation's append resolves late: dropped unconditionally.
        let stale = controller.on_page_loaded(
            gen1,
            PageKind::Append,
            Ok(page(&["C", "D"], 2, 3, 6)),
        );
        assert_eq!(stale, PageOutcome::Stale);
        assert!(controller.items.is_empty(), "reset state untouched by stale result");
        assert!(controller.is_loading(), "still waiting on the new generation");

        // The new generation's reset lands normally.
        let applied = controller.on_page_loaded(
            gen2,
            PageKind::Reset,
            Ok(page(&["S1", "S2"], 1, 1, 2)),
        );
        assert_eq!(applied, PageOutcome::Applied);
        assert_eq!(ids(&controller), ["S1", "S2"]);
        assert_eq!(controller.total_recipes, 2);
    }

    #[tokio::test]
    async fn stale_error_is_dropped_silently() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(FilterChange::default());
        let old_gen = controller.generation();
        controller.apply_filter_change(search_change("soup"));

        let outcome = controller.on_page_loaded(
            old_gen,
            PageKind::Reset,
            Err(GatewayError::Timeout),
        );
        assert_eq!(outcome, PageOutcome::Stale);
        assert!(controller.is_loading(), "current generation still in flight");
    }

    #[tokio::test]
    async fn duplicate_ids_at_page_boundary_are_skipped() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(FilterChange::default());
        let generation = controller.generation();

        controller.on_page_loaded(generation, PageKind::Reset, Ok(page(&["A", "B", "C"], 1, 2, 5)));
        // Server shifted between fetches: page 2 re-serves "C".
        controller.on_page_loaded(generation, PageKind::Append, Ok(page(&["C", "D", "E"], 2, 2, 5)));

        assert_eq!(ids(&controller), ["A", "B", "C", "D", "E"]);
        assert_eq!(controller.page, 2);
    }

    #[tokio::test]
    async fn reset_failure_leaves_empty_state_and_reports() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(FilterChange::default());
        let generation = controller.generation();

        let outcome = controller.on_page_loaded(
            generation,
            PageKind::Reset,
            Err(GatewayError::HttpStatus(502)),
        );
        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert!(!controller.is_loading());
        assert!(controller.items.is_empty());
    }

    #[tokio::test]
    async fn append_failure_keeps_loaded_items() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(FilterChange::default());
        let generation = controller.generation();
        controller.on_page_loaded(generation, PageKind::Reset, Ok(page(&["A", "B"], 1, 2, 4)));

        controller.load_more();
        let outcome = controller.on_page_loaded(
            generation,
            PageKind::Append,
            Err(GatewayError::Timeout),
        );
        assert!(matches!(outcome, PageOutcome::Failed(_)));
        assert_eq!(ids(&controller), ["A", "B"], "no partial state on failure");
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn like_merge_replaces_in_place() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(FilterChange::default());
        let generation = controller.generation();
        controller.on_page_loaded(
            generation,
            PageKind::Reset,
            Ok(page(&["A", "B", "C", "D", "E"], 1, 1, 5)),
        );

        let mut updated = recipe("C");
        updated.liked_by = vec!["user-1".to_string()];
        assert!(controller.merge_mutation(RecipeMutation::Updated(updated)));

        assert_eq!(ids(&controller), ["A", "B", "C", "D", "E"], "order preserved");
        assert_eq!(controller.items[2].liked_by, ["user-1"]);
        assert!(controller.items[0].liked_by.is_empty());
        assert_eq!(controller.total_recipes, 5);
    }

    #[tokio::test]
    async fn delete_merge_removes_one_and_decrements_total() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(FilterChange::default());
        let generation = controller.generation();
        controller.on_page_loaded(generation, PageKind::Reset, Ok(page(&["A", "B", "C"], 1, 2, 6)));

        assert!(controller.merge_mutation(RecipeMutation::Deleted("B".to_string())));

        assert_eq!(ids(&controller), ["A", "C"]);
        assert_eq!(controller.total_recipes, 5);
        assert_eq!(controller.page, 1, "page untouched");
        assert_eq!(controller.total_pages, 2, "total_pages untouched");
    }

    #[tokio::test]
    async fn mutation_for_unloaded_id_is_ignored() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(FilterChange::default());
        let generation = controller.generation();
        controller.on_page_loaded(generation, PageKind::Reset, Ok(page(&["A"], 1, 1, 1)));

        // A reset for a new generation clears the collection; a late delete
        // for the old generation's id must not touch the new counts.
        controller.apply_filter_change(search_change("stew"));
        assert!(!controller.merge_mutation(RecipeMutation::Deleted("A".to_string())));
        assert_eq!(controller.total_recipes, 0);

        assert!(!controller.merge_mutation(RecipeMutation::Updated(recipe("A"))));
        assert!(controller.items.is_empty());
    }

    #[tokio::test]
    async fn empty_result_set_has_no_pages() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(search_change("xyzzy"));
        let generation = controller.generation();

        controller.on_page_loaded(generation, PageKind::Reset, Ok(page(&[], 1, 0, 0)));
        assert_eq!(controller.page, 0);
        assert!(!controller.has_more());
        assert!(!controller.load_more());
    }

    #[tokio::test]
    async fn reset_keeps_tags_when_response_omits_them() {
        let (mut controller, _gateway, _rx) = controller_with(vec![]);
        controller.apply_filter_change(FilterChange::default());
        let generation = controller.generation();

        let mut first = page(&["A"], 1, 1, 1);
        first.popular_tags = vec![PopularTag {
            tag: "vegan".to_string(),
            count: 12,
        }];
        controller.on_page_loaded(generation, PageKind::Reset, Ok(first));
        assert_eq!(controller.popular_tags.len(), 1);

        controller.apply_filter_change(search_change("pasta"));
        let generation = controller.generation();
        controller.on_page_loaded(generation, PageKind::Reset, Ok(page(&["B"], 1, 1, 1)));

        assert_eq!(controller.popular_tags[0].tag, "vegan", "tag strip survives search");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Appending arbitrary overlapping pages never produces duplicate
            /// ids, and insertion order is first-fetch order.
            #[test]
            fn appended_pages_never_duplicate(
                pages in proptest::collection::vec(
                    proptest::collection::vec(0u8..20, 1..8),
                    1..6,
                )
            ) {
                let gateway = Arc::new(ScriptedGateway::new(Vec::new()));
                let (tx, _rx) = mpsc::channel(1);
                let mut controller = FeedController::new(gateway, tx, 12);

                let total = pages.len() as u32 + 1;
                controller.on_page_loaded(
                    0,
                    PageKind::Reset,
                    Ok(FeedPage { total_pages: total, total_recipes: 100, page: 1, ..FeedPage::default() }),
                );

                let mut first_seen = Vec::new();
                for (i, raw) in pages.iter().enumerate() {
                    let ids: Vec<String> = raw.iter().map(|n| format!("r{n}")).collect();
                    for id in &ids {
                        if !first_seen.contains(id) {
                            first_seen.push(id.clone());
                        }
                    }
                    let items = ids.iter().map(|id| recipe(id)).collect();
                    controller.is_loading = false;
                    controller.on_page_loaded(
                        0,
                        PageKind::Append,
                        Ok(FeedPage {
                            items,
                            page: i as u32 + 2,
                            total_pages: total,
                            total_recipes: 100,
                            popular_tags: Vec::new(),
                        }),
                    );
                }

                let loaded: Vec<String> =
                    controller.items.iter().map(|r| r.id.clone()).collect();
                let unique: HashSet<&String> = loaded.iter().collect();
                prop_assert_eq!(unique.len(), loaded.len(), "duplicate id in collection");
                prop_assert_eq!(loaded, first_seen, "order must be first-fetch order");
            }
        }
    }
}
