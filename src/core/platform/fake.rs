// Scriptable in-memory platform for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{AlertPlatform, ChannelEvent, ChannelHandle, ChannelHost, EnvironmentReport, PlatformError};
use crate::core::alerts::model::{NotificationRequest, PermissionState, Playback, Tone};

pub struct FakePlatform {
    pub report: EnvironmentReport,
    /// Answer given to the next permission prompt; `None` makes the prompt error
    pub prompt_answer: Option<PermissionState>,
    pub fail_notification: bool,
    pub fail_tone: bool,
    pub fail_vibrate: bool,
    pub prompts: AtomicUsize,
    pub shown: Mutex<Vec<NotificationRequest>>,
    pub tones: AtomicUsize,
    pub playbacks: Mutex<Vec<Playback>>,
    pub vibrations: AtomicUsize,
}

impl FakePlatform {
    /// Secure context, API present, never asked
    pub fn new() -> Self {
        Self {
            report: EnvironmentReport {
                notification_api: true,
                secure_context: true,
                permission: PermissionState::Default,
            },
            prompt_answer: Some(PermissionState::Granted),
            fail_notification: false,
            fail_tone: false,
            fail_vibrate: false,
            prompts: AtomicUsize::new(0),
            shown: Mutex::new(Vec::new()),
            tones: AtomicUsize::new(0),
            playbacks: Mutex::new(Vec::new()),
            vibrations: AtomicUsize::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new().with_permission(PermissionState::Granted)
    }

    pub fn with_permission(mut self, permission: PermissionState) -> Self {
        self.report.permission = permission;
        self
    }

    pub fn insecure(mut self) -> Self {
        self.report.secure_context = false;
        self
    }

    pub fn without_api(mut self) -> Self {
        self.report.notification_api = false;
        self
    }

    pub fn answering(mut self, answer: Option<PermissionState>) -> Self {
        self.prompt_answer = answer;
        self
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn shown_count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }

    pub fn tone_count(&self) -> usize {
        self.tones.load(Ordering::SeqCst)
    }

    pub fn vibration_count(&self) -> usize {
        self.vibrations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlertPlatform for FakePlatform {
    fn environment(&self) -> EnvironmentReport {
        self.report
    }

    async fn request_permission(&self) -> Result<PermissionState, PlatformError> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.prompt_answer
            .ok_or_else(|| PlatformError::Rejected("prompt failed".to_string()))
    }

    fn show_notification(&self, request: &NotificationRequest) -> Result<(), PlatformError> {
        if self.fail_notification {
            return Err(PlatformError::Rejected("notification blocked".to_string()));
        }
        self.shown.lock().unwrap().push(request.clone());
        Ok(())
    }

    fn play_tone(&self, _tone: &Tone, playback: Playback) -> Result<(), PlatformError> {
        self.tones.fetch_add(1, Ordering::SeqCst);
        self.playbacks.lock().unwrap().push(playback);
        if self.fail_tone {
            return Err(PlatformError::Audio("autoplay blocked".to_string()));
        }
        Ok(())
    }

    fn vibrate(&self, _pattern: &[u64]) -> Result<(), PlatformError> {
        self.vibrations.fetch_add(1, Ordering::SeqCst);
        if self.fail_vibrate {
            return Err(PlatformError::Unavailable("vibration"));
        }
        Ok(())
    }
}

pub struct FakeChannelHost {
    pub fail: bool,
    pub installs: AtomicUsize,
    /// Receiving side of the last installed channel, kept so tests can inspect the queue
    pub queue: Mutex<Option<mpsc::Receiver<NotificationRequest>>>,
}

impl FakeChannelHost {
    pub fn new() -> Self {
        Self {
            fail: false,
            installs: AtomicUsize::new(0),
            queue: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn install_count(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    /// Drain whatever the dispatcher queued into the channel
    pub fn queued(&self) -> Vec<NotificationRequest> {
        let mut queued = Vec::new();
        if let Some(rx) = self.queue.lock().unwrap().as_mut() {
            while let Ok(request) = rx.try_recv() {
                queued.push(request);
            }
        }
        queued
    }

    /// Simulate the worker going away
    pub fn drop_worker(&self) {
        self.queue.lock().unwrap().take();
    }
}

#[async_trait]
impl ChannelHost for FakeChannelHost {
    async fn install(&self, scope: &str) -> Result<ChannelHandle, PlatformError> {
        self.installs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PlatformError::Rejected("worker script fetch failed".to_string()));
        }
        let (tx, rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        for event in [ChannelEvent::Installed, ChannelEvent::Activated, ChannelEvent::Claimed] {
            let _ = event_tx.send(event);
        }
        *self.queue.lock().unwrap() = Some(rx);
        Ok(ChannelHandle {
            scope: scope.to_string(),
            sender: tx,
            events: event_rx,
        })
    }
}
