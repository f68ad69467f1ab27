//! Fetch generations: drop responses that arrive for a superseded request.
//!
//! A screen takes a [`FetchTicket`] when it starts a fetch and checks it
//! when the response arrives. Starting another fetch, or retiring the
//! screen, makes every older ticket stale.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Proof that a fetch was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Shared generation counter for one screen.
///
/// Cheap to clone; clones observe the same counter, so a fetch task
/// spawned off the screen can check staleness on its own.
#[derive(Debug, Clone, Default)]
pub struct FetchGeneration {
    current: Arc<AtomicU64>,
    cancel: CancellationToken,
}

impl FetchGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, superseding all earlier tickets.
    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.current.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether results for `ticket` may still be applied.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        !self.cancel.is_cancelled() && self.current.load(Ordering::Acquire) == ticket.0
    }

    /// Retire the owner for good: all tickets become stale and
    /// [`cancelled`](Self::cancelled) resolves.
    pub fn retire(&self) {
        self.cancel.cancel();
    }

    pub fn is_retired(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once [`retire`](Self::retire) has been called.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Token cancelled on retirement, for use in `tokio::select!`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}
