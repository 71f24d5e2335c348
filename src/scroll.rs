//! Infinite-scroll trigger.
//!
//! The view layer observes the last rendered item and reports visibility
//! entries; the trigger decides when a report should page the feed. Only the
//! current sentinel counts — retargeting invalidates the old observation, so
//! late entries for a previous sentinel can never double-fire.

/// A visibility report from the view layer for an observed item.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEntry {
    /// Id of the observed item.
    pub id: String,
    /// Fraction of the item's area currently visible, `0.0..=1.0`.
    pub visible_ratio: f32,
}

/// What the trigger wants done in response to a visibility report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollIntent {
    /// Fetch the next page.
    pub load_more: bool,
    /// Arm the search commit pathway so paging keeps working while a typed
    /// query has not been committed yet.
    pub arm_search_commit: bool,
}

/// Fraction of the sentinel that must be visible before paging.
const FIRE_THRESHOLD: f32 = 0.5;

/// Watches the scroll sentinel (the last loaded item).
#[derive(Debug, Default)]
pub struct ScrollTrigger {
    sentinel: Option<String>,
}

impl ScrollTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sentinel(&self) -> Option<&str> {
        self.sentinel.as_deref()
    }

    /// Point the trigger at a new last item. The previous observation is
    /// torn down first: once retargeted, entries for the old id are ignored.
    pub fn retarget(&mut self, last_item: Option<&str>) {
        if self.sentinel.as_deref() == last_item {
            return;
        }
        if let Some(old) = &self.sentinel {
            tracing::trace!(old = %old, new = ?last_item, "Scroll sentinel retargeted");
        }
        self.sentinel = last_item.map(str::to_owned);
    }

    /// Decide what a visibility report should do, given the feed guards.
    ///
    /// Fires only when the entry targets the current sentinel, the visible
    /// ratio crosses the threshold, no fetch is in flight, and further pages
    /// exist. `uncommitted_search` additionally requests the commit pathway.
    pub fn evaluate(
        &self,
        entry: &VisibilityEntry,
        is_loading: bool,
        has_more: bool,
        uncommitted_search: bool,
    ) -> ScrollIntent {
        if self.sentinel.as_deref() != Some(entry.id.as_str()) {
            tracing::trace!(id = %entry.id, "Visibility report for stale sentinel ignored");
            return ScrollIntent::default();
        }
        if entry.visible_ratio < FIRE_THRESHOLD || is_loading || !has_more {
            return ScrollIntent::default();
        }

        ScrollIntent {
            load_more: true,
            arm_search_commit: uncommitted_search,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, ratio: f32) -> VisibilityEntry {
        VisibilityEntry {
            id: id.to_string(),
            visible_ratio: ratio,
        }
    }

    #[test]
    fn fires_when_sentinel_crosses_threshold() {
        let mut trigger = ScrollTrigger::new();
        trigger.retarget(Some("C"));

        let intent = trigger.evaluate(&entry("C", 0.6), false, true, false);
        assert!(intent.load_more);
        assert!(!intent.arm_search_commit);
    }

    #[test]
    fn below_threshold_does_not_fire() {
        let mut trigger = ScrollTrigger::new();
        trigger.retarget(Some("C"));

        let intent = trigger.evaluate(&entry("C", 0.4), false, true, false);
        assert_eq!(intent, ScrollIntent::default());
    }

    #[test]
    fn stale_sentinel_reports_are_ignored() {
        let mut trigger = ScrollTrigger::new();
        trigger.retarget(Some("C"));
        trigger.retarget(Some("F")); // new page appended, old observation gone

        let intent = trigger.evaluate(&entry("C", 1.0), false, true, false);
        assert_eq!(intent, ScrollIntent::default());

        let intent = trigger.evaluate(&entry("F", 1.0), false, true, false);
        assert!(intent.load_more);
    }

    #[test]
    fn guards_suppress_firing() {
        let mut trigger = ScrollTrigger::new();
        trigger.retarget(Some("C"));

        let loading = trigger.evaluate(&entry("C", 1.0), true, true, false);
        assert_eq!(loading, ScrollIntent::default());

        let exhausted = trigger.evaluate(&entry("C", 1.0), false, false, false);
        assert_eq!(exhausted, ScrollIntent::default());
    }

    #[test]
    fn uncommitted_search_arms_commit_pathway() {
        let mut trigger = ScrollTrigger::new();
        trigger.retarget(Some("C"));

        let intent = trigger.evaluate(&entry("C", 0.9), false, true, true);
        assert!(intent.load_more);
        assert!(intent.arm_search_commit);
    }

    #[test]
    fn empty_feed_has_no_sentinel() {
        let mut trigger = ScrollTrigger::new();
        trigger.retarget(None);
        let intent = trigger.evaluate(&entry("anything", 1.0), false, true, false);
        assert_eq!(intent, ScrollIntent::default());
    }
}
