//! REST API client for the recipe backend.
//!
//! Wraps the dish feed endpoints and the three favorite endpoints
//! (bulk status lookup, toggle, authoritative favorite list) using
//! [`reqwest`]. Authenticated calls take the bearer token as a `&str`,
//! so a call that needs a session cannot be issued without one.

use std::collections::HashMap;

use aicook_core::dish::{normalize_list, Dish};
use aicook_core::DishId;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

use crate::config::ClientConfig;
use crate::feeds::{FeedPage, FeedSource, SearchResponse, TrendingResponse};

/// HTTP client for one backend instance.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    api_url: String,
}

/// Errors from the backend REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, bad JSON).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The endpoint needs a session and none was supplied.
    #[error("Authentication required")]
    Unauthenticated,
}

impl ApiError {
    /// Whether the backend rejected the credentials (401/403), or no
    /// credentials were available.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ApiError::Status { status, .. } => *status == 401 || *status == 403,
            ApiError::Unauthenticated => true,
            ApiError::Request(_) => false,
        }
    }
}

impl BackendClient {
    /// Build a client from configuration (timeout, user agent, base URL).
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone()))
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Fetch one page of a feed.
    ///
    /// `offset` is only sent for paginated sources. The token, when
    /// present, is attached as a bearer header so the backend can fill in
    /// inline favorite flags.
    pub async fn fetch_feed(
        &self,
        token: Option<&str>,
        source: &FeedSource,
        offset: u32,
    ) -> Result<FeedPage, ApiError> {
        match source {
            FeedSource::Trending { days, page_size } => {
                let request = self
                    .client
                    .get(format!("{}/api/recommendations/trending", self.api_url))
                    .query(&[
                        ("days", days.to_string()),
                        ("limit", page_size.to_string()),
                        ("offset", offset.to_string()),
                        ("min_rating", "0".to_string()),
                    ]);
                let response: TrendingResponse = self.send_json(request, token).await?;
                Ok(response.into())
            }
            FeedSource::TodaySuggestions { user_id } => {
                let mut request = self
                    .client
                    .get(format!("{}/dishes/suggest/today", self.api_url));
                if let Some(user_id) = user_id {
                    request = request.query(&[("userId", user_id)]);
                }
                let records: Vec<serde_json::Value> = self.send_json(request, token).await?;
                Ok(FeedPage::from_records(records, false))
            }
            FeedSource::Search { query } => {
                let request = match FeedSource::search_ingredients(query) {
                    Some(ingredients) => self
                        .client
                        .get(format!("{}/search/dishes-by-ingredients", self.api_url))
                        .query(&[("ingredients", ingredients.join(","))]),
                    None => self
                        .client
                        .get(format!("{}/search/all", self.api_url))
                        .query(&[("q", query.trim())]),
                };
                let response: SearchResponse = self.send_json(request, token).await?;
                Ok(response.into())
            }
            FeedSource::UserDishes { user_id } => {
                let request = self
                    .client
                    .get(format!("{}/dishes/user/{}", self.api_url, user_id));
                let records: Vec<serde_json::Value> = self.send_json(request, token).await?;
                Ok(FeedPage::from_records(records, false))
            }
            FeedSource::Favorites => {
                let token = token.ok_or(ApiError::Unauthenticated)?;
                Ok(FeedPage::single(self.my_favorites(token).await?))
            }
        }
    }

    /// Bulk favorite-status lookup.
    ///
    /// Sends `POST /dishes/check-favorites` with `{"dish_ids": [...]}` and
    /// returns the id -> favorited map. An empty id list is answered
    /// locally without a request.
    pub async fn check_favorites(
        &self,
        token: &str,
        ids: &[DishId],
    ) -> Result<HashMap<DishId, bool>, ApiError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let body = serde_json::json!({ "dish_ids": ids });
        let request = self
            .client
            .post(format!("{}/dishes/check-favorites", self.api_url))
            .json(&body);
        self.send_json(request, Some(token)).await
    }

    /// Flip the favorite flag of one dish on the server.
    ///
    /// Sends `POST /dishes/{id}/toggle-favorite`; any 2xx is success and
    /// the body is ignored.
    pub async fn toggle_favorite(&self, token: &str, id: &DishId) -> Result<(), ApiError> {
        let request = self
            .client
            .post(format!("{}/dishes/{}/toggle-favorite", self.api_url, id));
        let response = Self::authorize(request, Some(token)).send().await?;
        Self::check_status(response).await
    }

    /// The signed-in user's favorite dishes (`GET /users/me/favorites`).
    pub async fn my_favorites(&self, token: &str) -> Result<Vec<Dish>, ApiError> {
        let request = self
            .client
            .get(format!("{}/users/me/favorites", self.api_url));
        let records: Vec<serde_json::Value> = self.send_json(request, Some(token)).await?;
        Ok(normalize_list(records))
    }

    // ---- private helpers ----

    fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = Self::authorize(request, token).send().await?;
        Self::parse_response(response).await
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Status`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), "Backend returned an error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
