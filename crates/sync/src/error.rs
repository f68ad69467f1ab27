use aicook_client::ApiError;
use aicook_core::DishId;

/// Errors surfaced by a screen's favorite syncer.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A favorite mutation was attempted without a session. Refused
    /// locally; the backend was never called.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The screen does not list the dish it was asked to toggle.
    #[error("Dish {0} is not shown on this screen")]
    UnknownDish(DishId),

    /// The backend toggle failed; local and shared state were reverted.
    #[error("Could not update favorite status of dish {id}: {source}")]
    CouldNotUpdate { id: DishId, source: ApiError },

    /// The list fetch failed; the screen shows an empty list.
    #[error("Could not load dishes: {0}")]
    LoadFailed(#[source] ApiError),

    /// The response belonged to a fetch that a newer one superseded.
    #[error("Response belonged to a superseded fetch")]
    Stale,

    /// The screen was unmounted before the operation could apply.
    #[error("Screen is no longer mounted")]
    Unmounted,
}

impl SyncError {
    /// Localized alert text for the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            SyncError::AuthenticationRequired => "Vui lòng đăng nhập để sử dụng tính năng này",
            SyncError::UnknownDish(_) | SyncError::CouldNotUpdate { .. } => {
                "Không thể cập nhật trạng thái yêu thích"
            }
            SyncError::LoadFailed(_) => "Không thể tải danh sách món ăn",
            SyncError::Stale | SyncError::Unmounted => "",
        }
    }

    /// Whether the host should navigate to the login screen.
    pub fn requires_login(&self) -> bool {
        match self {
            SyncError::AuthenticationRequired => true,
            SyncError::CouldNotUpdate { source, .. } | SyncError::LoadFailed(source) => {
                source.is_auth_failure()
            }
            _ => false,
        }
    }

    /// Errors the host should not show at all.
    pub fn is_silent(&self) -> bool {
        matches!(self, SyncError::Stale | SyncError::Unmounted)
    }
}
