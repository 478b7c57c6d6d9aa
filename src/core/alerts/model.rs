// Alert model types shared by the engine, the dispatcher and the platform layer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::model::EntryKey;

/// Platform permission for showing alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Never asked; a user-initiated request may still prompt
    #[default]
    Default,
    Granted,
    /// Terminal for the session, the platform will not prompt again
    Denied,
    /// The alerting API is absent
    Unsupported,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }

    /// Whether a new request could still change this state
    pub fn can_prompt(self) -> bool {
        self == Self::Default
    }
}

/// What the hosting environment offers, captured once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySnapshot {
    pub api_available: bool,
    pub secure_context: bool,
    pub permission: PermissionState,
}

/// Decision to alert for one zero-to-positive transition of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireDecision {
    pub key: EntryKey,
    pub count: u32,
    pub title: String,
    pub body: String,
    /// Collapses repeats of the same key into a single visible notification
    pub tag: String,
}

/// Payload handed to the platform when showing a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub tag: String,
    /// Keep the notification on screen until the user dismisses it
    pub require_interaction: bool,
}

impl From<&FireDecision> for NotificationRequest {
    fn from(decision: &FireDecision) -> Self {
        Self {
            title: decision.title.clone(),
            body: decision.body.clone(),
            tag: decision.tag.clone(),
            require_interaction: true,
        }
    }
}

/// Synthesized alert tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: Duration,
    /// Linear gain, 0.0..=1.0
    pub volume: f32,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            frequency_hz: 880.0,
            duration: Duration::from_millis(400),
            volume: 0.3,
        }
    }
}

/// How long the caller is willing to wait on the audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Start playback and return at once; failures only get logged
    Detached,
    /// Wait until the output device opened, to report whether sound played
    Confirmed,
}

/// Vibration pattern in milliseconds, alternating on/off
pub const DEFAULT_VIBRATION_PATTERN: &[u64] = &[200, 100, 200];

/// Whether the background delivery channel got installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryChannelState {
    pub registered: bool,
}

/// Result of the manual test path. The two outcomes are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestOutcome {
    pub notification_shown: bool,
    pub sound_played: bool,
}
