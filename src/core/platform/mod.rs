//! Platform boundary.
//!
//! Everything the alert pipeline needs from the host (notification API,
//! permission prompt, audio, vibration, background channel) goes through the
//! traits here so the core can run against the desktop backend or a fake.

pub mod desktop;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::core::alerts::model::{NotificationRequest, PermissionState, Playback, Tone};

/// Failure reported by a platform call.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{0} is not available on this platform")]
    Unavailable(&'static str),

    #[error("platform rejected the call: {0}")]
    Rejected(String),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw environment facts as the platform reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub notification_api: bool,
    pub secure_context: bool,
    pub permission: PermissionState,
}

/// Foreground alerting surface.
#[async_trait]
pub trait AlertPlatform: Send + Sync {
    /// Read the current environment. Must not prompt or otherwise mutate.
    fn environment(&self) -> EnvironmentReport;

    /// Show the platform permission prompt and return the user's answer.
    async fn request_permission(&self) -> Result<PermissionState, PlatformError>;

    fn show_notification(&self, request: &NotificationRequest) -> Result<(), PlatformError>;

    /// With `Playback::Detached` this must return without waiting on the device.
    fn play_tone(&self, tone: &Tone, playback: Playback) -> Result<(), PlatformError>;

    fn vibrate(&self, pattern: &[u64]) -> Result<(), PlatformError>;
}

/// Lifecycle notifications emitted by an installed background channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    Installed,
    Activated,
    /// The channel took over delivery for its scope
    Claimed,
}

/// Handle to an installed background channel.
///
/// Notifications are queued into the worker; the worker shows them on its own
/// schedule and reports lifecycle changes on `events`.
pub struct ChannelHandle {
    pub scope: String,
    pub sender: mpsc::Sender<NotificationRequest>,
    pub events: mpsc::UnboundedReceiver<ChannelEvent>,
}

/// Installs persistent background delivery channels.
#[async_trait]
pub trait ChannelHost: Send + Sync {
    async fn install(&self, scope: &str) -> Result<ChannelHandle, PlatformError>;
}
