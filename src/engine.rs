//! The feed engine event loop.
//!
//! Every callback of the original design — scroll, timer, fetch completion —
//! arrives here as a message, and this loop is the only writer of feed state.
//! View intents come in over an mpsc channel, background task completions
//! over a second one, and published state goes out over a broadcast channel
//! that the view layer subscribes to.

use crate::config::Config;
use crate::feed::{FeedController, FeedEvent, FeedSnapshot, PageOutcome};
use crate::filter::{FilterChange, FilterCoordinator};
use crate::gateway::RecipeGateway;
use crate::scroll::{ScrollTrigger, VisibilityEntry};
use crate::types::{RecipeMutation, SortOption};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

/// How often the loop checks the debounce timer.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Channel capacities. View intents and task completions are both bursty
/// but small; 32 gives plenty of slack without unbounded growth.
const CHANNEL_CAPACITY: usize = 32;

// ============================================================================
// Messages
// ============================================================================

/// User intents forwarded by the view layer.
#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// A keystroke in the search box (the full current text).
    SearchInput(String),
    /// Explicit search commit: button press or Enter.
    SearchSubmit,
    /// A sort button was clicked.
    SortSelected(SortOption),
    /// A trending tag was clicked.
    TagClicked(String),
    /// Visibility report for the observed scroll sentinel.
    Visibility(VisibilityEntry),
    /// Like button on a recipe card.
    Like(String),
    /// Confirmed deletion of an owned recipe.
    Delete(String),
    /// The feed view is going away; stop the engine.
    Shutdown,
}

/// Events published to the view layer.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Feed state changed; render from this snapshot.
    FeedUpdated(FeedSnapshot),
    /// A non-fatal failure the view may surface as a toast/banner.
    /// The previously displayed collection is always left intact.
    Error { message: String },
}

/// Errors returned by engine handle operations.
#[derive(Debug, Error)]
pub enum EngineChannelError {
    /// The engine loop has stopped and no longer accepts intents.
    #[error("feed engine is no longer running")]
    EngineStopped,
}

// ============================================================================
// Handle
// ============================================================================

/// Cloneable handle the view layer uses to talk to a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    view_tx: mpsc::Sender<ViewEvent>,
    events: broadcast::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Subscribe to published feed updates and errors.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Send one view intent to the engine.
    pub async fn send(&self, event: ViewEvent) -> Result<(), EngineChannelError> {
        self.view_tx
            .send(event)
            .await
            .map_err(|_| EngineChannelError::EngineStopped)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Owns the controller, filter coordinator, and scroll trigger, and runs the
/// loop that connects them.
pub struct FeedEngine {
    gateway: Arc<dyn RecipeGateway>,
    controller: FeedController,
    filter: FilterCoordinator,
    scroll: ScrollTrigger,
    view_rx: mpsc::Receiver<ViewEvent>,
    feed_rx: mpsc::Receiver<FeedEvent>,
    feed_tx: mpsc::Sender<FeedEvent>,
    events: broadcast::Sender<EngineEvent>,
}

impl FeedEngine {
    pub fn new(gateway: Arc<dyn RecipeGateway>, config: &Config) -> (Self, EngineHandle) {
        let (view_tx, view_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (feed_tx, feed_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);

        let controller =
            FeedController::new(Arc::clone(&gateway), feed_tx.clone(), config.page_size);
        let filter = FilterCoordinator::new(Duration::from_millis(config.search_debounce_ms));

        let engine = Self {
            gateway,
            controller,
            filter,
            scroll: ScrollTrigger::new(),
            view_rx,
            feed_rx,
            feed_tx,
            events: events.clone(),
        };
        let handle = EngineHandle { view_tx, events };
        (engine, handle)
    }

    /// Run until shutdown. Consumes the engine; dropping it afterwards
    /// aborts any fetch still in flight.
    pub async fn run(mut self) {
        // The feed mounts with the default listing.
        self.apply_change(FilterChange::default());

        let mut tick = tokio::time::interval(TICK_INTERVAL);

        loop {
            // Drain queued task completions before taking more input so a
            // burst of view events cannot starve fetch results.
            while let Ok(event) = self.feed_rx.try_recv() {
                self.handle_feed_event(event);
            }

            tokio::select! {
                biased;

                maybe_view = self.view_rx.recv() => {
                    match maybe_view {
                        None | Some(ViewEvent::Shutdown) => {
                            tracing::info!("Feed engine shutting down");
                            break;
                        }
                        Some(event) => self.handle_view_event(event),
                    }
                }

                Some(event) = self.feed_rx.recv() => {
                    self.handle_feed_event(event);
                }

                _ = tick.tick() => {
                    self.handle_tick();
                }
            }
        }
    }

    fn handle_view_event(&mut self, event: ViewEvent) {
        match event {
            ViewEvent::SearchInput(text) => {
                if let Some(change) = self.filter.set_query(text) {
                    self.apply_change(change);
                }
            }
            ViewEvent::SearchSubmit => {
                self.filter.commit_search();
            }
            ViewEvent::SortSelected(option) => {
                if let Some(change) = self.filter.toggle_sort(option) {
                    self.apply_change(change);
                }
            }
            ViewEvent::TagClicked(tag) => {
                if let Some(change) = self.filter.toggle_tag(&tag) {
                    self.apply_change(change);
                }
            }
            ViewEvent::Visibility(entry) => {
                let intent = self.scroll.evaluate(
                    &entry,
                    self.controller.is_loading(),
                    self.controller.has_more(),
                    self.filter.has_uncommitted_query(),
                );
                if intent.load_more && self.controller.load_more() {
                    self.publish();
                }
                if intent.arm_search_commit {
                    self.filter.commit_search();
                }
            }
            ViewEvent::Like(id) => self.spawn_like(id),
            ViewEvent::Delete(id) => self.spawn_delete(id),
            ViewEvent::Shutdown => unreachable!("handled by the run loop"),
        }
    }

    fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::PageLoaded {
                generation,
                kind,
                result,
            } => match self.controller.on_page_loaded(generation, kind, result) {
                PageOutcome::Applied => {
                    self.scroll.retarget(self.controller.last_item_id());
                    self.publish();
                }
                PageOutcome::Stale => {}
                PageOutcome::Failed(message) => {
                    self.publish();
                    self.emit_error(message);
                }
            },
            FeedEvent::LikeCompleted { id, result } => match result {
                Ok(record) => {
                    if self.controller.merge_mutation(RecipeMutation::Updated(record)) {
                        self.publish();
                    }
                }
                Err(e) => {
                    tracing::warn!(recipe_id = %id, error = %e, "Like failed");
                    self.emit_error(format!("Could not like recipe: {e}"));
                }
            },
            FeedEvent::DeleteCompleted { id, result } => match result {
                Ok(()) => {
                    if self.controller.merge_mutation(RecipeMutation::Deleted(id)) {
                        self.scroll.retarget(self.controller.last_item_id());
                        self.publish();
                    }
                }
                Err(e) => {
                    tracing::warn!(recipe_id = %id, error = %e, "Delete failed");
                    self.emit_error(format!("Could not delete recipe: {e}"));
                }
            },
        }
    }

    /// Fire the debounced search commit once its delay elapses.
    fn handle_tick(&mut self) {
        if let Some(change) = self.filter.tick() {
            self.apply_change(change);
        }
    }

    fn apply_change(&mut self, change: FilterChange) {
        self.controller.apply_filter_change(change);
        // The collection was cleared; the old sentinel no longer exists.
        self.scroll.retarget(None);
        self.publish();
    }

    fn spawn_like(&self, id: String) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.feed_tx.clone();
        tokio::spawn(async move {
            let result = gateway.like_recipe(&id).await;
            if tx.send(FeedEvent::LikeCompleted { id, result }).await.is_err() {
                tracing::warn!("Feed event receiver dropped before like result delivery");
            }
        });
    }

    fn spawn_delete(&self, id: String) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.feed_tx.clone();
        tokio::spawn(async move {
            let result = gateway.delete_recipe(&id).await;
            if tx
                .send(FeedEvent::DeleteCompleted { id, result })
                .await
                .is_err()
            {
                tracing::warn!("Feed event receiver dropped before delete result delivery");
            }
        });
    }

    /// Emission is best-effort; a view with no live subscriber just misses
    /// the update and re-reads on the next one.
    fn publish(&self) {
        let _ = self
            .events
            .send(EngineEvent::FeedUpdated(self.controller.snapshot()));
    }

    fn emit_error(&self, message: String) {
        let _ = self.events.send(EngineEvent::Error { message });
    }
}
