//! Dependency-injected application context.
//!
//! [`AppContext`] is built once at startup and handed to every screen.
//! It is cheaply cloneable (every member is behind an `Arc`).

use std::sync::Arc;

use aicook_client::{FavoriteBackend, FeedPage, FeedSource};
use aicook_core::cache::RecentCache;
use aicook_core::optimistic::perform_optimistic_toggle;
use aicook_core::session::{Session, SessionUser};
use aicook_core::{DishId, FavoriteStatusStore};

use crate::error::SyncError;
use crate::resync;
use crate::syncer::FavoriteSyncer;

/// Cache of recently fetched first pages, keyed by [`FeedSource::cache_key`].
pub type RecentFeeds = RecentCache<String, FeedPage>;

/// Shared client state available to all screens.
#[derive(Clone)]
pub struct AppContext {
    store: Arc<FavoriteStatusStore>,
    session: Arc<Session>,
    backend: Arc<dyn FavoriteBackend>,
    recent: Arc<RecentFeeds>,
}

impl AppContext {
    /// Context with a fresh store, a signed-out session and an empty cache.
    pub fn new(backend: Arc<dyn FavoriteBackend>) -> Self {
        Self {
            store: Arc::new(FavoriteStatusStore::new()),
            session: Arc::new(Session::new()),
            backend,
            recent: Arc::new(RecentFeeds::new()),
        }
    }

    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn with_store(mut self, store: Arc<FavoriteStatusStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_recent_feeds(mut self, recent: Arc<RecentFeeds>) -> Self {
        self.recent = recent;
        self
    }

    pub fn store(&self) -> &Arc<FavoriteStatusStore> {
        &self.store
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn backend(&self) -> &Arc<dyn FavoriteBackend> {
        &self.backend
    }

    pub fn recent_feeds(&self) -> &Arc<RecentFeeds> {
        &self.recent
    }

    /// Drop every cached page that lists `id`. Called after a confirmed
    /// toggle so no other screen comes back with the old flag.
    pub(crate) fn forget_cached_dish(&self, id: &DishId) {
        self.recent
            .invalidate_where(|_, page| page.dishes.iter().any(|dish| &dish.id == id));
    }

    /// Mount a screen listing `source`. The screen is subscribed to store
    /// changes from this point on; call [`FavoriteSyncer::load`] to fill it.
    pub fn mount(&self, source: FeedSource) -> FavoriteSyncer {
        FavoriteSyncer::new(self.clone(), source)
    }

    /// Start a session. Cached feeds were hydrated for the previous user
    /// and are dropped.
    pub fn sign_in(&self, token: impl Into<String>, user: SessionUser) {
        self.session.login(token, user);
        self.recent.clear();
    }

    /// End the session and forget every favorite override.
    pub fn sign_out(&self) {
        self.session.logout();
        self.store.clear();
        self.recent.clear();
    }

    /// Toggle a dish that is not tied to a list screen (detail views, the
    /// CLI).
    ///
    /// The current value comes from the store; when the store has no
    /// entry the favorite list is resynced first. Only the store is
    /// written optimistically.
    pub async fn toggle_favorite(&self, id: impl Into<DishId>) -> Result<bool, SyncError> {
        let id = id.into();
        let token = self
            .session
            .token()
            .ok_or(SyncError::AuthenticationRequired)?;

        let current = match self.store.get_status(&id) {
            Some(current) => current,
            None => {
                resync::refresh_favorites(self)
                    .await
                    .map_err(|source| SyncError::CouldNotUpdate {
                        id: id.clone(),
                        source,
                    })?;
                self.store.get_status(&id).unwrap_or(false)
            }
        };

        let result = perform_optimistic_toggle(
            current,
            |_| {},
            |value| self.store.set_status(&id, value),
            |_| self.backend.toggle_favorite(&token, &id),
        )
        .await;

        match result {
            Ok(is_favorite) => {
                self.forget_cached_dish(&id);
                tracing::info!(dish_id = %id, is_favorite, "Toggled favorite");
                Ok(is_favorite)
            }
            Err(source) => {
                tracing::warn!(dish_id = %id, error = %source, "Favorite toggle failed; reverted");
                Err(SyncError::CouldNotUpdate { id, source })
            }
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("store", &self.store)
            .field("authenticated", &self.session.is_authenticated())
            .field("recent_feeds", &self.recent.len())
            .finish()
    }
}
