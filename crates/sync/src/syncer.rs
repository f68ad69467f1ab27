//! Per-screen favorite synchronization.
//!
//! A [`FavoriteSyncer`] owns one screen's dish list. Loading goes through
//! three layers, each authoritative over the previous one:
//!
//! 1. the `is_favorite` flag embedded in the feed records,
//! 2. the bulk `check-favorites` lookup (signed-in users only),
//! 3. the overrides held by the shared [`FavoriteStatusStore`].
//!
//! Fetches are split into a detached future ([`FavoriteSyncer::start_load`])
//! and an apply step ([`FavoriteSyncer::apply`]) so a host can run them on
//! its own tasks. Every fetch carries a generation ticket; results for a
//! superseded ticket, or arriving after unmount, are dropped.
//!
//! [`FavoriteStatusStore`]: aicook_core::FavoriteStatusStore

use std::collections::HashMap;
use std::future::Future;

use aicook_client::{ApiError, FeedPage, FeedSource};
use aicook_core::dish::Dish;
use aicook_core::generation::{FetchGeneration, FetchTicket};
use aicook_core::optimistic::perform_optimistic_toggle;
use aicook_core::overlay::{apply_bulk_status, dish_ids, overlay_overrides, set_local_status};
use aicook_core::{DishId, StoreChange};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::context::AppContext;
use crate::error::SyncError;
use crate::resync;

/// Which kind of fetch [`FavoriteSyncer::start_load`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// First page; served from the recent-feed cache when fresh.
    Initial,
    /// First page, always from the backend.
    Refresh,
    /// Next page of a paginated feed, appended to the list.
    More,
}

#[derive(Debug)]
enum FetchOutcome {
    Page { page: FeedPage, cached: bool },
    Failed(ApiError),
    Cancelled,
}

/// Result of a fetch started with [`FavoriteSyncer::start_load`], waiting
/// to be applied.
#[derive(Debug)]
pub struct FetchedFeed {
    ticket: FetchTicket,
    mode: LoadMode,
    offset: u32,
    outcome: FetchOutcome,
}

impl FetchedFeed {
    /// The fetch stopped because its screen was unmounted.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Cancelled)
    }

    /// The page came from the recent-feed cache.
    pub fn is_cached(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Page { cached: true, .. })
    }

    pub fn ticket(&self) -> FetchTicket {
        self.ticket
    }
}

/// Favorite state of one mounted list screen.
pub struct FavoriteSyncer {
    ctx: AppContext,
    source: FeedSource,
    dishes: Vec<Dish>,
    next_offset: u32,
    has_more: bool,
    generation: FetchGeneration,
    changes: broadcast::Receiver<StoreChange>,
}

impl FavoriteSyncer {
    /// Use [`AppContext::mount`].
    pub(crate) fn new(ctx: AppContext, source: FeedSource) -> Self {
        let changes = ctx.store().subscribe();
        Self {
            ctx,
            source,
            dishes: Vec::new(),
            next_offset: 0,
            has_more: false,
            generation: FetchGeneration::new(),
            changes,
        }
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    /// The list as currently rendered.
    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    pub fn dish(&self, id: impl Into<DishId>) -> Option<&Dish> {
        let id = id.into();
        self.dishes.iter().find(|dish| dish.id == id)
    }

    /// Whether [`load_more`](Self::load_more) would fetch anything.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_mounted(&self) -> bool {
        !self.generation.is_retired()
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Fill the screen, using the recent-feed cache when it is fresh.
    pub async fn load(&mut self) -> Result<usize, SyncError> {
        let fetched = self.start_load(LoadMode::Initial).await;
        self.apply(fetched)
    }

    /// Reload the first page from the backend.
    pub async fn refresh(&mut self) -> Result<usize, SyncError> {
        let fetched = self.start_load(LoadMode::Refresh).await;
        self.apply(fetched)
    }

    /// Append the next page. Returns `Ok(0)` for feeds without more pages.
    pub async fn load_more(&mut self) -> Result<usize, SyncError> {
        if !self.source.is_paginated() || !self.has_more {
            return Ok(0);
        }
        let fetched = self.start_load(LoadMode::More).await;
        self.apply(fetched)
    }

    /// Begin a fetch and return it as a detached future.
    ///
    /// Taking the ticket here supersedes every fetch started earlier. The
    /// future resolves early with a cancelled result once the screen is
    /// unmounted.
    pub fn start_load(&self, mode: LoadMode) -> impl Future<Output = FetchedFeed> + Send + 'static {
        let ticket = self.generation.begin();
        let offset = match mode {
            LoadMode::More => self.next_offset,
            LoadMode::Initial | LoadMode::Refresh => 0,
        };
        let ctx = self.ctx.clone();
        let source = self.source.clone();
        let generation = self.generation.clone();

        async move {
            let outcome = tokio::select! {
                _ = generation.cancelled() => FetchOutcome::Cancelled,
                outcome = fetch_page(&ctx, &source, mode, offset) => outcome,
            };
            FetchedFeed {
                ticket,
                mode,
                offset,
                outcome,
            }
        }
    }

    /// Apply a finished fetch to the list. Returns the number of dishes
    /// the fetch contributed.
    pub fn apply(&mut self, fetched: FetchedFeed) -> Result<usize, SyncError> {
        if self.generation.is_retired() {
            return Err(SyncError::Unmounted);
        }
        if !self.generation.is_current(fetched.ticket) {
            tracing::debug!(
                feed = %self.source,
                generation = fetched.ticket.generation(),
                "Dropping response for superseded fetch"
            );
            return Err(SyncError::Stale);
        }

        match fetched.outcome {
            FetchOutcome::Cancelled => Err(SyncError::Unmounted),
            FetchOutcome::Failed(e) => {
                tracing::warn!(feed = %self.source, error = %e, "Failed to load dishes");
                // A failed next page keeps what is already shown.
                if fetched.mode != LoadMode::More {
                    self.dishes.clear();
                    self.next_offset = 0;
                    self.has_more = false;
                }
                Err(SyncError::LoadFailed(e))
            }
            FetchOutcome::Page { page, cached } => {
                let count = page.dishes.len();
                let consumed = u32::try_from(page.record_count).unwrap_or(u32::MAX);
                match fetched.mode {
                    LoadMode::More => self.dishes.extend(page.dishes),
                    LoadMode::Initial | LoadMode::Refresh => self.dishes = page.dishes,
                }
                // Records dropped during normalization still occupy offsets.
                self.next_offset = fetched.offset.saturating_add(consumed);
                self.has_more = self.source.is_paginated() && page.has_more;
                self.sync_from_store();

                tracing::debug!(
                    feed = %self.source,
                    count,
                    cached,
                    total = self.dishes.len(),
                    "Applied feed page"
                );
                Ok(count)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Store changes
    // -----------------------------------------------------------------------

    /// Re-apply the store's overrides without fetching. Returns the number
    /// of dishes whose flag changed.
    pub fn sync_from_store(&mut self) -> usize {
        overlay_overrides(&mut self.dishes, self.ctx.store())
    }

    /// Consume pending store notifications and re-overlay if there were any.
    pub fn drain_store_changes(&mut self) -> usize {
        let mut changed = false;
        loop {
            match self.changes.try_recv() {
                Ok(_) => changed = true,
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(feed = %self.source, skipped, "Store notifications lagged");
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        if changed {
            self.sync_from_store()
        } else {
            0
        }
    }

    /// Wait for the next store change and re-overlay.
    ///
    /// Returns the number of dishes whose flag changed, or `None` once the
    /// screen is unmounted.
    pub async fn next_store_change(&mut self) -> Option<usize> {
        let cancel = self.generation.cancellation_token();
        let received = tokio::select! {
            _ = cancel.cancelled() => return None,
            received = self.changes.recv() => received,
        };
        match received {
            Ok(_) | Err(RecvError::Lagged(_)) => Some(self.sync_from_store()),
            Err(RecvError::Closed) => None,
        }
    }

    /// Screen regained focus: overlay what the store already knows, then
    /// resync the store from the server's favorite list.
    ///
    /// Resync failures are logged and otherwise ignored.
    pub async fn on_focus(&mut self) -> usize {
        let mut changed = self.sync_from_store();

        let cancel = self.generation.cancellation_token();
        let resynced = tokio::select! {
            _ = cancel.cancelled() => return changed,
            resynced = resync::refresh_favorites(&self.ctx) => resynced,
        };

        match resynced {
            Ok(Some(ids)) => {
                let statuses: HashMap<DishId, bool> =
                    ids.into_iter().map(|id| (id, true)).collect();
                changed += apply_bulk_status(&mut self.dishes, &statuses);
                changed += self.sync_from_store();
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(feed = %self.source, error = %e, "Failed to resync favorites on focus");
            }
        }
        changed
    }

    // -----------------------------------------------------------------------
    // Toggle
    // -----------------------------------------------------------------------

    /// Flip the favorite flag of a dish on this screen.
    ///
    /// The new value is shown and published to the store before the
    /// backend answers; both are reverted if the backend call fails.
    pub async fn toggle(&mut self, id: impl Into<DishId>) -> Result<bool, SyncError> {
        let id = id.into();
        if !self.is_mounted() {
            return Err(SyncError::Unmounted);
        }
        let token = self
            .ctx
            .session()
            .token()
            .ok_or(SyncError::AuthenticationRequired)?;
        let current = self
            .dishes
            .iter()
            .find(|dish| dish.id == id)
            .map(|dish| dish.is_favorite)
            .ok_or_else(|| SyncError::UnknownDish(id.clone()))?;

        let id_ref = &id;
        let token_ref = token.as_str();
        let dishes = &mut self.dishes;
        let store = self.ctx.store();
        let backend = self.ctx.backend();

        let result = perform_optimistic_toggle(
            current,
            move |value| {
                set_local_status(dishes.as_mut_slice(), id_ref, value);
            },
            move |value| store.set_status(id_ref, value),
            move |_| backend.toggle_favorite(token_ref, id_ref),
        )
        .await;

        match result {
            Ok(is_favorite) => {
                self.ctx.forget_cached_dish(&id);
                tracing::info!(feed = %self.source, dish_id = %id, is_favorite, "Toggled favorite");
                Ok(is_favorite)
            }
            Err(source) => {
                tracing::warn!(
                    feed = %self.source,
                    dish_id = %id,
                    error = %source,
                    "Favorite toggle failed; reverted"
                );
                Err(SyncError::CouldNotUpdate { id, source })
            }
        }
    }

    /// Stop the screen: in-flight fetches resolve as cancelled and no
    /// later result is applied.
    pub fn unmount(&mut self) {
        self.generation.retire();
        tracing::debug!(feed = %self.source, "Screen unmounted");
    }
}

impl Drop for FavoriteSyncer {
    fn drop(&mut self) {
        self.generation.retire();
    }
}

impl std::fmt::Debug for FavoriteSyncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoriteSyncer")
            .field("source", &self.source)
            .field("dishes", &self.dishes.len())
            .field("next_offset", &self.next_offset)
            .field("has_more", &self.has_more)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

// ---- private helpers ----

async fn fetch_page(
    ctx: &AppContext,
    source: &FeedSource,
    mode: LoadMode,
    offset: u32,
) -> FetchOutcome {
    let cache_key = source.cache_key();
    if mode == LoadMode::Initial {
        if let Some(page) = ctx.recent_feeds().get(&cache_key) {
            tracing::debug!(feed = %source, "Serving feed from recent cache");
            return FetchOutcome::Page { page, cached: true };
        }
    }

    let token = ctx.session().token();
    if source.requires_auth() && token.is_none() {
        tracing::debug!(feed = %source, "Not signed in; showing an empty list");
        return FetchOutcome::Page {
            page: FeedPage::default(),
            cached: false,
        };
    }

    let mut page = match ctx.backend().fetch_feed(token.as_deref(), source, offset).await {
        Ok(page) => page,
        Err(e) => return FetchOutcome::Failed(e),
    };

    match (source, token.as_deref()) {
        // Every dish on the favorites list is a favorite by definition.
        (FeedSource::Favorites, _) => {
            for dish in &mut page.dishes {
                dish.is_favorite = true;
            }
        }
        (_, Some(token)) => hydrate_favorites(ctx, token, source, &mut page.dishes).await,
        (_, None) => {}
    }

    if offset == 0 {
        ctx.recent_feeds().insert(cache_key, page.clone());
    }
    FetchOutcome::Page {
        page,
        cached: false,
    }
}

/// Overwrite inline flags with the bulk lookup. On failure the inline
/// values stay.
async fn hydrate_favorites(ctx: &AppContext, token: &str, source: &FeedSource, dishes: &mut [Dish]) {
    let ids = dish_ids(dishes);
    if ids.is_empty() {
        return;
    }
    match ctx.backend().check_favorites(token, &ids).await {
        Ok(statuses) => {
            let changed = apply_bulk_status(dishes, &statuses);
            tracing::debug!(feed = %source, checked = ids.len(), changed, "Applied bulk favorite status");
        }
        Err(e) => {
            tracing::warn!(feed = %source, error = %e, "Bulk favorite lookup failed; keeping inline values");
        }
    }
}
