//! Optimistic mutation with rollback.
//!
//! Every screen toggles favorites the same way: flip the value locally
//! and in the shared store first, then call the backend, and put both
//! back if the call fails. [`perform_optimistic_toggle`] is that
//! protocol in one place.

use std::future::Future;

/// Flip `current`, apply it through both sinks, then confirm remotely.
///
/// * `apply_locally` - writes the screen's own list state.
/// * `apply_shared`  - writes the process-wide override store.
/// * `remote_call`   - receives the new value and performs the mutation.
///
/// On success returns the new value. On failure both sinks are called
/// again with `current` before the error is returned, so the caller
/// observes exactly the pre-toggle state.
pub async fn perform_optimistic_toggle<L, S, R, Fut, E>(
    current: bool,
    mut apply_locally: L,
    mut apply_shared: S,
    remote_call: R,
) -> Result<bool, E>
where
    L: FnMut(bool),
    S: FnMut(bool),
    R: FnOnce(bool) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let next = !current;
    apply_locally(next);
    apply_shared(next);

    match remote_call(next).await {
        Ok(()) => Ok(next),
        Err(e) => {
            apply_locally(current);
            apply_shared(current);
            Err(e)
        }
    }
}
