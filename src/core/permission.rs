//! Permission negotiation.

use crate::core::alerts::model::PermissionState;
use crate::core::platform::AlertPlatform;

/// Tracks the session's permission. Once decided, the platform is not asked again.
#[derive(Debug, Clone, Copy)]
pub struct PermissionNegotiator {
    state: PermissionState,
}

impl PermissionNegotiator {
    pub fn new(initial: PermissionState) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Ask the platform for permission. Call only from a user action.
    ///
    /// Prompts only from `Default`; every other state is returned as is.
    /// A failing prompt counts as `Denied`.
    pub async fn request(&mut self, platform: &dyn AlertPlatform) -> PermissionState {
        if !self.state.can_prompt() {
            return self.state;
        }

        self.state = match platform.request_permission().await {
            // A dismissed prompt comes back as Default and may be asked again
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Permission request failed, treating as denied: {}", e);
                PermissionState::Denied
            }
        };
        log::info!("Notification permission is now {:?}", self.state);
        self.state
    }
}
