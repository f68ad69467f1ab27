//! REST client for the aicook recipe backend.
//!
//! Provides environment configuration, typed wrappers around the dish
//! feed and favorite endpoints using [`reqwest`], and the
//! [`FavoriteBackend`] trait the per-screen syncers are written against.

pub mod api;
pub mod backend;
pub mod config;
pub mod feeds;

pub use api::{ApiError, BackendClient};
pub use backend::FavoriteBackend;
pub use config::{ClientConfig, ConfigError};
pub use feeds::{FeedPage, FeedSource};
