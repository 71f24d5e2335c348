use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Sort and Fetch Modes
// ============================================================================

/// Sort order for the default (non-search) listing.
///
/// Sorting is a server-side concern; the engine only forwards the selection.
/// Sorting is disabled while a search query is active (see `FilterCoordinator`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    Recent,
    Popular,
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption::Popular
    }
}

impl SortOption {
    /// Query-parameter value understood by the recipes API.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Recent => "recent",
            SortOption::Popular => "popular",
        }
    }
}

/// Which endpoint a page fetch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// The default paginated listing (`/api/get-recipes`).
    Listing,
    /// Free-text / tag search (`/api/search-recipes`).
    Search,
}

// ============================================================================
// Wire Types
// ============================================================================

/// A single recipe as returned by the recipes API.
///
/// Identity is `id`; every other field may be replaced wholesale when the
/// server returns an updated record (e.g. after a like).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "imgLink")]
    pub image_ref: String,
    /// Dietary tags in server order, unique by construction.
    #[serde(rename = "dietaryPreference", default)]
    pub dietary_tags: Vec<String>,
    /// User ids that have liked this recipe.
    #[serde(rename = "likedBy", default)]
    pub liked_by: Vec<String>,
    /// True when the requesting user owns the recipe (owners cannot like it).
    #[serde(rename = "owns", default)]
    pub owned_by_current_user: bool,
    #[serde(rename = "nutritionSummary", default)]
    pub nutrition_summary: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An aggregated tag with its usage count, for the trending-tags strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularTag {
    /// The aggregation pipeline groups by tag, so the tag text arrives as `_id`.
    #[serde(rename = "_id")]
    pub tag: String,
    pub count: u64,
}

/// One page of feed results from either listing or search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(rename = "recipes", default)]
    pub items: Vec<RecipeRecord>,
    #[serde(rename = "currentPage", default)]
    pub page: u32,
    #[serde(rename = "totalPages", default)]
    pub total_pages: u32,
    #[serde(rename = "totalRecipes", default)]
    pub total_recipes: u64,
    /// Tag aggregation; the search endpoint may omit it.
    #[serde(rename = "popularTags", default)]
    pub popular_tags: Vec<PopularTag>,
}

// ============================================================================
// Request Parameters
// ============================================================================

/// Parameters for a single page fetch.
///
/// The filter layer owns what goes in here; the gateway owns how it is
/// spelled on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub mode: FetchMode,
    /// Free-text query; meaningful only in `FetchMode::Search`.
    pub query: String,
    pub sort: SortOption,
    /// Active tag, if the query originated from a tag toggle.
    pub tag: Option<String>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

// ============================================================================
// Mutations
// ============================================================================

/// A single-record change to merge into the loaded collection.
///
/// The upstream contract passes `(updatedRecord | null, deletedId?)`; an enum
/// expresses the same two operations without the nullable pair.
#[derive(Debug, Clone)]
pub enum RecipeMutation {
    /// Replace the record with the same id in place.
    Updated(RecipeRecord),
    /// Remove the record with this id and decrement the total count.
    Deleted(String),
}
