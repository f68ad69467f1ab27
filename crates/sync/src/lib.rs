//! Favorite-status synchronization for list screens.
//!
//! Each mounted screen owns a [`FavoriteSyncer`] that fetches its dish
//! list, hydrates favorite flags from the backend, overlays the shared
//! override store and performs optimistic toggles. Screens are created
//! from an explicitly constructed [`AppContext`] that bundles the store,
//! the session and the backend.

pub mod context;
pub mod error;
pub mod resync;
pub mod syncer;

pub use context::AppContext;
pub use error::SyncError;
pub use syncer::{FavoriteSyncer, FetchedFeed, LoadMode};
