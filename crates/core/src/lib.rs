//! Client-side domain types and state for the aicook recipe app.
//!
//! Everything here is transport-agnostic: the favorite override store,
//! the dish projection and its normalization from backend records, the
//! optimistic toggle protocol, the session store, and the small caches
//! and guards the per-screen syncers are built from.

pub mod cache;
pub mod dish;
pub mod favorites;
pub mod generation;
pub mod optimistic;
pub mod overlay;
pub mod session;
pub mod types;

pub use dish::{Difficulty, Dish, DishRecord};
pub use favorites::{FavoriteStatusStore, StoreChange};
pub use types::DishId;
