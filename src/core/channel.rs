//! Background delivery channel registration.
//!
//! The channel is a bonus: when it is installed, notifications are queued to a
//! worker that keeps running independently of the foreground loop. Nothing
//! else depends on it being there.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::core::alerts::model::{CapabilitySnapshot, DeliveryChannelState, NotificationRequest};
use crate::core::platform::{ChannelEvent, ChannelHandle, ChannelHost};

/// Installed channel as seen from the foreground.
pub struct DeliveryChannel {
    scope: String,
    sender: mpsc::Sender<NotificationRequest>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl From<ChannelHandle> for DeliveryChannel {
    fn from(handle: ChannelHandle) -> Self {
        Self {
            scope: handle.scope,
            sender: handle.sender,
            events: handle.events,
        }
    }
}

impl DeliveryChannel {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Queue a notification for the worker. Never waits.
    pub fn enqueue(&self, request: &NotificationRequest) -> bool {
        match self.sender.try_send(request.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::warn!("Delivery channel {} is full", self.scope);
                false
            }
            Err(TrySendError::Closed(_)) => {
                log::warn!("Delivery channel {} has no worker", self.scope);
                false
            }
        }
    }

    fn drain_events(&mut self) -> Vec<ChannelEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Installs the channel once per session and remembers the outcome.
#[derive(Default)]
pub struct ChannelRegistrar {
    attempted: bool,
    channel: Option<DeliveryChannel>,
}

impl ChannelRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to install the background channel for `scope`.
    ///
    /// Returns `false` without error when the API is missing, the context is
    /// not secure, or installation fails. Later calls return the first outcome.
    pub async fn register(
        &mut self,
        snapshot: &CapabilitySnapshot,
        host: &dyn ChannelHost,
        scope: &str,
    ) -> bool {
        if self.attempted {
            return self.channel.is_some();
        }
        self.attempted = true;

        if !snapshot.api_available {
            log::info!("Background delivery skipped: notification API missing");
            return false;
        }
        if !snapshot.secure_context {
            log::info!("Background delivery skipped: insecure context");
            return false;
        }

        match host.install(scope).await {
            Ok(handle) => {
                log::info!("Background delivery channel registered for {}", scope);
                self.channel = Some(handle.into());
                true
            }
            Err(e) => {
                log::warn!("Background delivery channel registration failed: {}", e);
                false
            }
        }
    }

    pub fn state(&self) -> DeliveryChannelState {
        DeliveryChannelState {
            registered: self.channel.is_some(),
        }
    }

    pub fn channel(&self) -> Option<&DeliveryChannel> {
        self.channel.as_ref()
    }

    /// Collect and log lifecycle events the worker reported since the last call.
    pub fn poll_events(&mut self) -> Vec<ChannelEvent> {
        let Some(channel) = self.channel.as_mut() else {
            return Vec::new();
        };
        let events = channel.drain_events();
        for event in &events {
            log::info!("Delivery channel {}: {:?}", channel.scope, event);
        }
        events
    }
}
