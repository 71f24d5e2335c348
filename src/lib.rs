//! Incremental recipe feed engine.
//!
//! Drives a recipe-discovery client's home feed: paginated fetches,
//! infinite-scroll paging, debounced free-text search, sort/tag coordination,
//! and in-place merging of like/delete mutations — correct under overlapping
//! asynchronous responses. The view layer talks to a running [`FeedEngine`]
//! through an [`EngineHandle`] and renders from published [`FeedSnapshot`]s.

/// Engine configuration loaded from TOML.
pub mod config;
/// The event loop wiring controller, filter, and scroll trigger together.
pub mod engine;
/// Gateway error taxonomy.
pub mod error;
/// The feed controller: collection state, pagination, mutation merges.
pub mod feed;
/// Search / sort / tag coordination with debounced commits.
pub mod filter;
/// The gateway seam to the recipes API.
pub mod gateway;
/// Infinite-scroll sentinel tracking.
pub mod scroll;
/// Wire and domain types.
pub mod types;

pub use config::{Config, ConfigError};
pub use engine::{EngineChannelError, EngineEvent, EngineHandle, FeedEngine, ViewEvent};
pub use error::GatewayError;
pub use feed::{FeedController, FeedEvent, FeedSnapshot, PageKind, PageOutcome};
pub use filter::{FilterChange, FilterCoordinator};
pub use gateway::{HttpGateway, RecipeGateway};
pub use scroll::{ScrollIntent, ScrollTrigger, VisibilityEntry};
pub use types::{
    FeedPage, FetchMode, PageParams, PopularTag, RecipeMutation, RecipeRecord, SortOption,
};
