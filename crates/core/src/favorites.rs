//! Process-wide favorite override store.
//!
//! [`FavoriteStatusStore`] records every favorite-status change the user
//! made since the client started, independent of which screen made it.
//! Screens overlay these overrides on top of whatever the backend
//! reported, and subscribe to [`StoreChange`] notifications to re-apply
//! the overlay when another screen writes.
//!
//! The store is created once per process and shared via `Arc` (see the
//! `AppContext` provider in `aicook-sync`). It is memory-resident only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;

use crate::types::DishId;

/// Buffer capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// A mutation that was applied to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    /// One override was written.
    Updated { id: DishId, is_favorite: bool },
    /// The map was replaced by an authoritative favorite list of `count` ids.
    Replaced { count: usize },
    /// The map was emptied.
    Cleared,
}

/// Map from dish id to a local favorite override.
///
/// Every write touches exactly one key or swaps the whole map, so
/// readers never observe a partially applied mutation.
pub struct FavoriteStatusStore {
    overrides: RwLock<HashMap<DishId, bool>>,
    revision: AtomicU64,
    changes: broadcast::Sender<StoreChange>,
}

impl FavoriteStatusStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            overrides: RwLock::new(HashMap::new()),
            revision: AtomicU64::new(0),
            changes,
        }
    }

    /// Record a favorite override for `id`, replacing any previous one.
    pub fn set_status(&self, id: impl Into<DishId>, is_favorite: bool) {
        let id = id.into();
        self.write().insert(id.clone(), is_favorite);
        self.notify(StoreChange::Updated { id, is_favorite });
    }

    /// Override for `id`, or `None` when the backend value should be used.
    ///
    /// `Some(false)` ("known not favorited") and `None` ("unknown") are
    /// deliberately distinct.
    pub fn get_status(&self, id: impl Into<DishId>) -> Option<bool> {
        let id = id.into();
        self.read().get(&id).copied()
    }

    /// Resynchronize to an authoritative favorite list.
    ///
    /// Wipes every override, including unconfirmed optimistic ones, and
    /// marks each given id as favorited. Ids not in the list end up with
    /// no override at all; a negative is never tracked.
    pub fn replace_all<I, T>(&self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<DishId>,
    {
        let fresh: HashMap<DishId, bool> = ids.into_iter().map(|id| (id.into(), true)).collect();
        let count = fresh.len();
        *self.write() = fresh;
        self.notify(StoreChange::Replaced { count });
    }

    /// Drop every override.
    pub fn clear(&self) {
        self.write().clear();
        self.notify(StoreChange::Cleared);
    }

    /// Receive a [`StoreChange`] for every subsequent mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Copy of the current overrides.
    pub fn snapshot(&self) -> HashMap<DishId, bool> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Monotonic counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    // ---- private helpers ----

    fn notify(&self, change: StoreChange) {
        self.revision.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(?change, "Favorite store changed");
        // Ignore the SendError -- it only means no screen is mounted.
        let _ = self.changes.send(change);
    }

    // A panic while holding the lock cannot leave the map half-written
    // (single insert or whole swap), so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<DishId, bool>> {
        self.overrides.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<DishId, bool>> {
        self.overrides.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FavoriteStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FavoriteStatusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoriteStatusStore")
            .field("overrides", &self.len())
            .field("revision", &self.revision())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips_both_values() {
        let store = FavoriteStatusStore::new();
        store.set_status("x", true);
        assert_eq!(store.get_status("x"), Some(true));
        store.set_status("x", false);
        assert_eq!(store.get_status("x"), Some(false));
    }

    #[test]
    fn unwritten_id_is_unknown_not_false() {
        let store = FavoriteStatusStore::new();
        assert_eq!(store.get_status("never-written"), None);
        store.set_status("other", false);
        assert_eq!(store.get_status("never-written"), None);
    }

    #[test]
    fn numeric_and_string_keys_share_one_entry() {
        let store = FavoriteStatusStore::new();
        store.set_status(42, true);
        assert_eq!(store.get_status("42"), Some(true));
        store.set_status("42", false);
        assert_eq!(store.get_status(42), Some(false));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn replace_all_wipes_ids_outside_the_list() {
        let store = FavoriteStatusStore::new();
        store.set_status("c", true);
        store.set_status("d", false);

        store.replace_all(["a", "b"]);

        assert_eq!(store.get_status("a"), Some(true));
        assert_eq!(store.get_status("b"), Some(true));
        // Full wipe: previous overrides for other ids are discarded.
        assert_eq!(store.get_status("c"), None);
        assert_eq!(store.get_status("d"), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn replace_all_discards_unconfirmed_optimistic_override() {
        let store = FavoriteStatusStore::new();
        // Optimistic favorite the server does not know about yet.
        store.set_status("pending", true);
        store.replace_all(Vec::<DishId>::new());
        assert_eq!(store.get_status("pending"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_the_map() {
        let store = FavoriteStatusStore::new();
        store.set_status("a", true);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.get_status("a"), None);
    }

    #[test]
    fn revision_counts_every_mutation() {
        let store = FavoriteStatusStore::new();
        assert_eq!(store.revision(), 0);
        store.set_status("a", true);
        store.replace_all(["b"]);
        store.clear();
        assert_eq!(store.revision(), 3);
    }

    #[tokio::test]
    async fn subscribers_receive_changes_in_order() {
        let store = FavoriteStatusStore::new();
        let mut rx = store.subscribe();

        store.set_status(7, true);
        store.replace_all(["1", "2", "2"]);
        store.clear();

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreChange::Updated {
                id: DishId::from("7"),
                is_favorite: true
            }
        );
        assert_eq!(rx.recv().await.unwrap(), StoreChange::Replaced { count: 2 });
        assert_eq!(rx.recv().await.unwrap(), StoreChange::Cleared);
    }

    #[test]
    fn writes_without_subscribers_do_not_panic() {
        let store = FavoriteStatusStore::new();
        store.set_status("orphan", true);
        assert_eq!(store.get_status("orphan"), Some(true));
    }
}
