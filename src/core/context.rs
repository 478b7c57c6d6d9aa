//! The assembled alert pipeline.
//!
//! `AlertContext` owns every piece of mutable state (settings, permission,
//! notified entries, the background channel) so nothing lives in globals and
//! tests can build one against fake platforms.

use std::sync::Arc;

use crate::core::alerts::dispatcher::AlertDispatcher;
use crate::core::alerts::engine::TriggerEngine;
use crate::core::alerts::model::{
    CapabilitySnapshot, DeliveryChannelState, FireDecision, PermissionState, TestOutcome,
};
use crate::core::capability;
use crate::core::channel::ChannelRegistrar;
use crate::core::config::{PreferenceStore, Settings};
use crate::core::model::EntryBatch;
use crate::core::permission::PermissionNegotiator;
use crate::core::platform::{AlertPlatform, ChannelHost};

/// What one poller tick produced
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub decisions: Vec<FireDecision>,
    pub delivered: usize,
}

pub struct AlertContext {
    platform: Arc<dyn AlertPlatform>,
    channel_host: Arc<dyn ChannelHost>,
    channel_scope: String,
    snapshot: CapabilitySnapshot,
    negotiator: PermissionNegotiator,
    registrar: ChannelRegistrar,
    engine: TriggerEngine,
    dispatcher: AlertDispatcher,
    store: PreferenceStore,
    settings: Settings,
}

impl AlertContext {
    /// Probe the platform and load settings. A stored `enabled` flag is
    /// dropped when permission is not granted this session.
    pub fn new(
        platform: Arc<dyn AlertPlatform>,
        channel_host: Arc<dyn ChannelHost>,
        store: PreferenceStore,
        channel_scope: impl Into<String>,
    ) -> Self {
        let snapshot = capability::probe(platform.as_ref());
        let mut settings = store.load();

        if settings.enabled && !snapshot.permission.is_granted() {
            log::warn!(
                "Alerts were enabled but permission is {:?}, turning them off",
                snapshot.permission
            );
            settings.enabled = false;
            if let Err(e) = store.save(&settings) {
                log::warn!("Failed to save settings: {}", e);
            }
        }

        Self {
            dispatcher: AlertDispatcher::new(platform.clone()),
            platform,
            channel_host,
            channel_scope: channel_scope.into(),
            snapshot,
            negotiator: PermissionNegotiator::new(snapshot.permission),
            registrar: ChannelRegistrar::new(),
            engine: TriggerEngine::new(),
            store,
            settings,
        }
    }

    /// Startup snapshot with the permission as currently negotiated
    pub fn capabilities(&self) -> CapabilitySnapshot {
        CapabilitySnapshot {
            permission: self.negotiator.state(),
            ..self.snapshot
        }
    }

    pub fn permission(&self) -> PermissionState {
        self.negotiator.state()
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn status_message(&self) -> Option<&'static str> {
        capability::status_message(&self.capabilities())
    }

    pub fn channel_state(&self) -> DeliveryChannelState {
        self.registrar.state()
    }

    pub fn is_notified(&self, key: &str) -> bool {
        self.engine.is_notified(key)
    }

    pub async fn request_permission(&mut self) -> PermissionState {
        self.negotiator.request(self.platform.as_ref()).await
    }

    pub async fn register_channel(&mut self) -> bool {
        let snapshot = self.capabilities();
        self.registrar
            .register(&snapshot, self.channel_host.as_ref(), &self.channel_scope)
            .await
    }

    fn persist(&mut self, settings: Settings) -> bool {
        match self.store.save(&settings) {
            Ok(()) => {
                self.settings = settings;
                true
            }
            Err(e) => {
                log::warn!("Failed to save settings: {}", e);
                false
            }
        }
    }

    /// Turn automatic alerts on or off.
    ///
    /// Enabling asks for permission when it was never requested and is refused
    /// (settings untouched) unless permission ends up granted.
    pub async fn set_enabled(&mut self, enabled: bool) -> bool {
        if enabled {
            let permission = self.request_permission().await;
            if !permission.is_granted() {
                log::info!("Cannot enable alerts, permission is {:?}", permission);
                return false;
            }
        }
        let settings = Settings {
            enabled,
            ..self.settings
        };
        self.persist(settings)
    }

    pub fn set_sound_enabled(&mut self, sound_enabled: bool) -> bool {
        let settings = Settings {
            sound_enabled,
            ..self.settings
        };
        self.persist(settings)
    }

    /// Evaluate one poller tick and deliver whatever fired.
    pub fn process_batch(&mut self, batch: &EntryBatch) -> BatchOutcome {
        self.registrar.poll_events();

        let decisions = self.engine.evaluate(batch, &self.settings);
        let caps = self.capabilities();
        let delivered = decisions
            .iter()
            .filter(|decision| {
                self.dispatcher
                    .dispatch(decision, &caps, &self.settings, self.registrar.channel())
            })
            .count();

        BatchOutcome {
            decisions,
            delivered,
        }
    }

    pub fn dispatch_test(&self) -> TestOutcome {
        self.dispatcher
            .dispatch_test(&self.capabilities(), self.registrar.channel())
    }
}
