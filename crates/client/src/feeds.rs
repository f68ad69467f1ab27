//! The dish lists a screen can be built from, and their wire shapes.

use std::fmt;

use aicook_core::dish::{normalize_list, Dish};
use serde::Deserialize;
use serde_json::Value;

/// Days of activity the trending feed ranks over.
pub const TRENDING_DAYS: u32 = 7;

/// Dishes per trending page.
pub const TRENDING_PAGE_SIZE: u32 = 6;

/// Backend endpoint a screen lists dishes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedSource {
    /// `GET /api/recommendations/trending`, paginated.
    Trending { days: u32, page_size: u32 },
    /// `GET /dishes/suggest/today`.
    TodaySuggestions { user_id: Option<String> },
    /// `GET /search/all` or `GET /search/dishes-by-ingredients`.
    Search { query: String },
    /// `GET /dishes/user/{user_id}`.
    UserDishes { user_id: String },
    /// `GET /users/me/favorites`; requires a session.
    Favorites,
}

impl FeedSource {
    /// The home screen's trending feed.
    pub fn trending() -> Self {
        FeedSource::Trending {
            days: TRENDING_DAYS,
            page_size: TRENDING_PAGE_SIZE,
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        FeedSource::Search {
            query: query.into(),
        }
    }

    pub fn is_paginated(&self) -> bool {
        matches!(self, FeedSource::Trending { .. })
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, FeedSource::Favorites)
    }

    /// Key under which the first page of this feed is cached.
    pub fn cache_key(&self) -> String {
        match self {
            FeedSource::Trending { days, page_size } => format!("trending:{days}:{page_size}"),
            FeedSource::TodaySuggestions { user_id } => {
                format!("today:{}", user_id.as_deref().unwrap_or("guest"))
            }
            FeedSource::Search { query } => format!("search:{}", query.trim().to_lowercase()),
            FeedSource::UserDishes { user_id } => format!("user:{user_id}"),
            FeedSource::Favorites => "favorites".to_string(),
        }
    }

    /// Ingredients of a comma-separated search, if there are at least two.
    ///
    /// A single term goes to the general search instead.
    pub fn search_ingredients(query: &str) -> Option<Vec<String>> {
        let ingredients: Vec<String> = query
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        (ingredients.len() > 1).then_some(ingredients)
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

/// One page of a feed, already normalized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedPage {
    pub dishes: Vec<Dish>,
    /// Whether a following page exists (paginated feeds only).
    pub has_more: bool,
    /// Records the backend returned, including ones dropped during
    /// normalization. Paging offsets advance by this.
    pub record_count: usize,
}

impl FeedPage {
    pub fn single(dishes: Vec<Dish>) -> Self {
        Self {
            record_count: dishes.len(),
            dishes,
            has_more: false,
        }
    }

    /// Normalize raw records into a page.
    pub fn from_records(records: Vec<Value>, has_more: bool) -> Self {
        Self {
            record_count: records.len(),
            dishes: normalize_list(records),
            has_more,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct TrendingResponse {
    #[serde(default)]
    recommendations: Vec<Value>,
    #[serde(default)]
    metadata: Option<TrendingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct TrendingMetadata {
    #[serde(default)]
    has_more: bool,
}

impl From<TrendingResponse> for FeedPage {
    fn from(response: TrendingResponse) -> Self {
        let has_more = response.metadata.map(|m| m.has_more).unwrap_or(false);
        FeedPage::from_records(response.recommendations, has_more)
    }
}

/// Search endpoints answer either with a bare list or with an object
/// that groups dishes next to users and ingredients.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchResponse {
    Grouped {
        #[serde(default)]
        dishes: Vec<Value>,
    },
    List(Vec<Value>),
}

impl From<SearchResponse> for FeedPage {
    fn from(response: SearchResponse) -> Self {
        let records = match response {
            SearchResponse::Grouped { dishes } => dishes,
            SearchResponse::List(records) => records,
        };
        FeedPage::from_records(records, false)
    }
}
