//! In-memory backend for driving syncers in tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aicook_client::{ApiError, FavoriteBackend, FeedPage, FeedSource};
use aicook_core::dish::{Difficulty, Dish};
use aicook_core::session::SessionUser;
use aicook_core::DishId;
use aicook_sync::AppContext;
use async_trait::async_trait;
use tokio::sync::Notify;

pub const TOKEN: &str = "test-token";

pub fn dish(id: impl Into<DishId>, is_favorite: bool) -> Dish {
    let id = id.into();
    Dish {
        label: format!("dish {id}"),
        id,
        image: String::new(),
        duration: "30 phút".to_string(),
        difficulty: Difficulty::Easy,
        rating: 4.5,
        ingredients: Vec::new(),
        steps: Vec::new(),
        is_favorite,
    }
}

fn server_error(body: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        body: body.to_string(),
    }
}

/// Fake backend with failure injection and call counters.
#[derive(Default)]
pub struct FakeBackend {
    /// Pages keyed by `(cache_key, offset)`.
    pub pages: Mutex<HashMap<(String, u32), FeedPage>>,
    /// Server-side favorite set.
    pub favorites: Mutex<HashSet<DishId>>,
    pub failing_toggles: Mutex<HashSet<DishId>>,
    pub fail_feeds: Mutex<bool>,
    pub fail_check: Mutex<bool>,
    pub fail_my_favorites: Mutex<bool>,
    /// When set, `fetch_feed` waits for one notification before answering.
    pub feed_gate: Mutex<Option<Arc<Notify>>>,

    pub feed_calls: AtomicUsize,
    pub check_calls: AtomicUsize,
    pub toggle_calls: AtomicUsize,
    pub my_favorites_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_page(&self, source: &FeedSource, offset: u32, dishes: Vec<Dish>, has_more: bool) {
        let page = FeedPage {
            record_count: dishes.len(),
            dishes,
            has_more,
        };
        self.with_raw_page(source, offset, page);
    }

    /// Serve `page` as is, e.g. with a `record_count` larger than the
    /// dishes that survived normalization.
    pub fn with_raw_page(&self, source: &FeedSource, offset: u32, page: FeedPage) {
        self.pages
            .lock()
            .unwrap()
            .insert((source.cache_key(), offset), page);
    }

    pub fn favorite(&self, id: impl Into<DishId>) {
        self.favorites.lock().unwrap().insert(id.into());
    }

    pub fn fail_toggle(&self, id: impl Into<DishId>) {
        self.failing_toggles.lock().unwrap().insert(id.into());
    }

    pub fn gate_feeds(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.feed_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn feed_calls(&self) -> usize {
        self.feed_calls.load(Ordering::SeqCst)
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn toggle_calls(&self) -> usize {
        self.toggle_calls.load(Ordering::SeqCst)
    }

    pub fn my_favorites_calls(&self) -> usize {
        self.my_favorites_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FavoriteBackend for FakeBackend {
    async fn fetch_feed(
        &self,
        _token: Option<&str>,
        source: &FeedSource,
        offset: u32,
    ) -> Result<FeedPage, ApiError> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.feed_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if *self.fail_feeds.lock().unwrap() {
            return Err(server_error("feed failed"));
        }
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&(source.cache_key(), offset))
            .cloned()
            .unwrap_or_default())
    }

    async fn check_favorites(
        &self,
        _token: &str,
        ids: &[DishId],
    ) -> Result<HashMap<DishId, bool>, ApiError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_check.lock().unwrap() {
            return Err(server_error("check failed"));
        }
        let favorites = self.favorites.lock().unwrap();
        Ok(ids
            .iter()
            .map(|id| (id.clone(), favorites.contains(id)))
            .collect())
    }

    async fn toggle_favorite(&self, _token: &str, id: &DishId) -> Result<(), ApiError> {
        self.toggle_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing_toggles.lock().unwrap().contains(id) {
            return Err(server_error("toggle failed"));
        }
        let mut favorites = self.favorites.lock().unwrap();
        if !favorites.remove(id) {
            favorites.insert(id.clone());
        }
        Ok(())
    }

    async fn my_favorites(&self, _token: &str) -> Result<Vec<Dish>, ApiError> {
        self.my_favorites_calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_my_favorites.lock().unwrap() {
            return Err(server_error("favorites failed"));
        }
        let mut ids: Vec<DishId> = self.favorites.lock().unwrap().iter().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids.into_iter().map(|id| dish(id, true)).collect())
    }
}

/// Context over `backend` with a signed-in user.
pub fn signed_in(backend: &Arc<FakeBackend>) -> AppContext {
    let ctx = AppContext::new(backend.clone());
    ctx.sign_in(
        TOKEN,
        SessionUser {
            id: "u1".to_string(),
            email: None,
            display_name: Some("Tester".to_string()),
        },
    );
    ctx
}

/// Context over `backend` with nobody signed in.
pub fn guest(backend: &Arc<FakeBackend>) -> AppContext {
    AppContext::new(backend.clone())
}
