// Alert dispatcher - turns fire decisions into notifications, tones and vibration.

use std::sync::Arc;

use super::model::{
    CapabilitySnapshot, FireDecision, NotificationRequest, Playback, TestOutcome, Tone,
    DEFAULT_VIBRATION_PATTERN,
};
use crate::core::channel::DeliveryChannel;
use crate::core::config::Settings;
use crate::core::platform::AlertPlatform;

const TEST_TAG: &str = "detection-test";

pub struct AlertDispatcher {
    platform: Arc<dyn AlertPlatform>,
    tone: Tone,
    vibration: Vec<u64>,
}

impl AlertDispatcher {
    pub fn new(platform: Arc<dyn AlertPlatform>) -> Self {
        Self {
            platform,
            tone: Tone::default(),
            vibration: DEFAULT_VIBRATION_PATTERN.to_vec(),
        }
    }

    fn can_notify(caps: &CapabilitySnapshot) -> bool {
        caps.api_available && caps.permission.is_granted()
    }

    /// Show a notification, through the background channel when there is one.
    fn show(&self, request: &NotificationRequest, channel: Option<&DeliveryChannel>) -> bool {
        if let Some(channel) = channel {
            if channel.enqueue(request) {
                return true;
            }
            log::info!("Falling back to foreground delivery for {}", request.tag);
        }
        match self.platform.show_notification(request) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to show notification {}: {}", request.tag, e);
                false
            }
        }
    }

    /// Tone and vibration. Failures are logged and otherwise ignored.
    /// Returns whether the tone played; a detached tone only reports failures
    /// that show up before the device is touched.
    fn play_feedback(&self, playback: Playback) -> bool {
        let played = match self.platform.play_tone(&self.tone, playback) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Alert tone failed: {}", e);
                false
            }
        };
        if let Err(e) = self.platform.vibrate(&self.vibration) {
            log::warn!("Vibration failed: {}", e);
        }
        played
    }

    /// Deliver one automatic alert. True only when the notification was shown;
    /// sound and vibration do not count.
    pub fn dispatch(
        &self,
        decision: &FireDecision,
        caps: &CapabilitySnapshot,
        settings: &Settings,
        channel: Option<&DeliveryChannel>,
    ) -> bool {
        if !Self::can_notify(caps) {
            log::debug!("Not delivering {}: notifications unavailable", decision.key);
            return false;
        }

        let delivered = self.show(&NotificationRequest::from(decision), channel);
        if settings.sound_enabled {
            self.play_feedback(Playback::Detached);
        }
        delivered
    }

    /// Manual test from the settings screen. Sound is attempted even when the
    /// notification cannot be shown, so the user can check audio on its own.
    pub fn dispatch_test(
        &self,
        caps: &CapabilitySnapshot,
        channel: Option<&DeliveryChannel>,
    ) -> TestOutcome {
        let notification_shown = Self::can_notify(caps) && {
            let request = NotificationRequest {
                title: "Test notification".to_string(),
                body: "Detection alerts are working".to_string(),
                tag: TEST_TAG.to_string(),
                require_interaction: false,
            };
            self.show(&request, channel)
        };
        let sound_played = self.play_feedback(Playback::Confirmed);
        TestOutcome {
            notification_shown,
            sound_played,
        }
    }
}
