//! Authoritative favorite resync.
//!
//! Fetches the user's full favorite list from the backend and feeds it
//! through [`FavoriteStatusStore::replace_all`](aicook_core::FavoriteStatusStore::replace_all),
//! discarding every local override the server does not confirm. Cached
//! feed pages whose flags disagree with the list are dropped as well.

use std::collections::HashSet;

use aicook_client::ApiError;
use aicook_core::DishId;

use crate::context::AppContext;

/// Replace the store's overrides with the server's favorite list.
///
/// Returns the favorited ids, or `None` when nobody is signed in (no
/// request is made in that case).
pub async fn refresh_favorites(ctx: &AppContext) -> Result<Option<HashSet<DishId>>, ApiError> {
    let Some(token) = ctx.session().token() else {
        return Ok(None);
    };

    let favorites = ctx.backend().my_favorites(&token).await?;
    let ids: HashSet<DishId> = favorites.into_iter().map(|dish| dish.id).collect();
    ctx.store().replace_all(ids.iter().cloned());
    ctx.recent_feeds().invalidate_where(|_, page| {
        page.dishes
            .iter()
            .any(|dish| dish.is_favorite != ids.contains(&dish.id))
    });

    tracing::info!(
        count = ids.len(),
        revision = ctx.store().revision(),
        "Synced favorites to store"
    );
    Ok(Some(ids))
}
