//! Search / sort / tag coordination.
//!
//! Keystrokes update the query locally without fetching; explicit commits arm
//! a single debounce timer that the engine tick fires. Sort and tag toggles
//! emit immediately. Every pathway funnels into one [`FilterChange`] so the
//! feed is reset exactly once per user-visible action.

use crate::types::{FetchMode, SortOption};
use std::time::Duration;
use tokio::time::Instant;

/// A filter configuration to apply to the feed.
///
/// Consuming one of these is what increments the feed generation; the
/// coordinator itself never talks to the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChange {
    pub mode: FetchMode,
    pub query: String,
    pub sort: SortOption,
    pub tag: Option<String>,
}

impl Default for FilterChange {
    /// The default (non-search) listing.
    fn default() -> Self {
        Self {
            mode: FetchMode::Listing,
            query: String::new(),
            sort: SortOption::default(),
            tag: None,
        }
    }
}

/// Owns search text, sort option, and the active tag.
///
/// At most one tag is active at a time, sort is disabled while a query is
/// present, and a second commit before the debounce fires replaces the
/// pending timer rather than stacking a new one.
pub struct FilterCoordinator {
    search_input: String,
    sort: SortOption,
    active_tag: Option<String>,
    /// Debounce timer armed by a commit; checked from the engine tick.
    debounce: Option<Instant>,
    debounce_delay: Duration,
    /// Query text of the last emitted search change, for detecting
    /// uncommitted input when the scroll trigger fires.
    last_committed_query: Option<String>,
}

impl FilterCoordinator {
    pub fn new(debounce_delay: Duration) -> Self {
        Self {
            search_input: String::new(),
            sort: SortOption::default(),
            active_tag: None,
            debounce: None,
            debounce_delay,
            last_committed_query: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.search_input
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    /// True while the input holds a query that no emitted filter-change has
    /// carried yet. The scroll trigger uses this to arm the commit pathway
    /// so paging keeps working mid-search.
    pub fn has_uncommitted_query(&self) -> bool {
        let trimmed = self.search_input.trim();
        !trimmed.is_empty() && self.last_committed_query.as_deref() != Some(trimmed)
    }

    /// Record a keystroke. Never fetches, with one exception: clearing the
    /// query to empty resets back to the default listing immediately.
    pub fn set_query(&mut self, text: String) -> Option<FilterChange> {
        let was_populated = !self.search_input.trim().is_empty();
        self.search_input = text;

        if self.search_input.trim().is_empty() {
            self.search_input.clear();
            self.active_tag = None;
            self.debounce = None;
            if was_populated || self.last_committed_query.is_some() {
                tracing::debug!("Search cleared, returning to default listing");
                self.last_committed_query = None;
                return Some(self.listing_change());
            }
        }
        None
    }

    /// Explicit commit (search button or Enter). Arms the debounce timer;
    /// a commit while one is pending replaces it.
    pub fn commit_search(&mut self) {
        if self.search_input.trim().is_empty() {
            return;
        }
        let rearmed = self.debounce.is_some();
        self.debounce = Some(Instant::now());
        tracing::debug!(query = %self.search_input.trim(), rearmed, "Search commit armed");
    }

    /// Fire the pending commit once the debounce delay has elapsed.
    /// Called from the engine's periodic tick.
    pub fn tick(&mut self) -> Option<FilterChange> {
        let armed_at = self.debounce?;
        if armed_at.elapsed() < self.debounce_delay {
            return None;
        }
        self.debounce = None;

        let query = self.search_input.trim().to_string();
        if query.is_empty() {
            // Input was cleared after the commit was armed; set_query already
            // emitted the reset.
            return None;
        }
        self.last_committed_query = Some(query.clone());
        Some(FilterChange {
            mode: FetchMode::Search,
            query,
            sort: self.sort,
            tag: self.active_tag.clone(),
        })
    }

    /// Select a sort order for the listing. No-op when already active or
    /// while a search query is present (sort is disabled during search).
    pub fn toggle_sort(&mut self, option: SortOption) -> Option<FilterChange> {
        if self.sort == option || !self.search_input.trim().is_empty() {
            return None;
        }
        self.sort = option;
        tracing::debug!(sort = option.as_str(), "Sort order changed");
        Some(self.listing_change())
    }

    /// Toggle a tag. Clicking the active tag clears it back to the default
    /// listing; clicking a different tag replaces the previous one.
    /// Both directions emit immediately and cancel any pending commit.
    pub fn toggle_tag(&mut self, tag: &str) -> Option<FilterChange> {
        self.debounce = None;

        if self.active_tag.as_deref() == Some(tag) {
            self.active_tag = None;
            self.search_input.clear();
            self.last_committed_query = None;
            tracing::debug!(tag, "Tag cleared, returning to default listing");
            return Some(self.listing_change());
        }

        self.active_tag = Some(tag.to_string());
        self.search_input = tag.to_string();
        self.last_committed_query = Some(tag.to_string());
        tracing::debug!(tag, "Tag activated");
        Some(FilterChange {
            mode: FetchMode::Search,
            query: tag.to_string(),
            sort: self.sort,
            tag: self.active_tag.clone(),
        })
    }

    fn listing_change(&self) -> FilterChange {
        FilterChange {
            mode: FetchMode::Listing,
            query: String::new(),
            sort: self.sort,
            tag: None,
        }
    }
}
