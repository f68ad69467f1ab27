//! The backend seam screens are written against.

use std::collections::HashMap;

use aicook_core::dish::Dish;
use aicook_core::DishId;
use async_trait::async_trait;

use crate::api::{ApiError, BackendClient};
use crate::feeds::{FeedPage, FeedSource};

/// Everything a list screen needs from the backend.
///
/// [`BackendClient`] is the production implementation; tests drive the
/// syncers with in-memory fakes.
#[async_trait]
pub trait FavoriteBackend: Send + Sync {
    /// One page of `source`, starting at `offset`.
    async fn fetch_feed(
        &self,
        token: Option<&str>,
        source: &FeedSource,
        offset: u32,
    ) -> Result<FeedPage, ApiError>;

    /// Authoritative favorite status for each of `ids`.
    async fn check_favorites(
        &self,
        token: &str,
        ids: &[DishId],
    ) -> Result<HashMap<DishId, bool>, ApiError>;

    /// Flip the server-side favorite flag of `id`.
    async fn toggle_favorite(&self, token: &str, id: &DishId) -> Result<(), ApiError>;

    /// The user's full favorite list.
    async fn my_favorites(&self, token: &str) -> Result<Vec<Dish>, ApiError>;
}

#[async_trait]
impl FavoriteBackend for BackendClient {
    async fn fetch_feed(
        &self,
        token: Option<&str>,
        source: &FeedSource,
        offset: u32,
    ) -> Result<FeedPage, ApiError> {
        BackendClient::fetch_feed(self, token, source, offset).await
    }

    async fn check_favorites(
        &self,
        token: &str,
        ids: &[DishId],
    ) -> Result<HashMap<DishId, bool>, ApiError> {
        BackendClient::check_favorites(self, token, ids).await
    }

    async fn toggle_favorite(&self, token: &str, id: &DishId) -> Result<(), ApiError> {
        BackendClient::toggle_favorite(self, token, id).await
    }

    async fn my_favorites(&self, token: &str) -> Result<Vec<Dish>, ApiError> {
        BackendClient::my_favorites(self, token).await
    }
}
