//! Desktop backend.
//!
//! Notifications go through the `notify-send` executable, the alert tone is
//! synthesized with rodio, and the background channel is a tokio task that
//! owns its own queue.

use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

use async_trait::async_trait;
use rodio::source::SineWave;
use rodio::Source;
use tokio::sync::mpsc;
use url::Url;

use super::{AlertPlatform, ChannelEvent, ChannelHandle, ChannelHost, EnvironmentReport, PlatformError};
use crate::core::alerts::model::{NotificationRequest, PermissionState, Playback, Tone};

pub const APP_NAME: &str = "warning-notifier";
const NOTIFY_SEND: &str = "notify-send";
/// How long a confirmed `play_tone` waits for the audio device to open
const AUDIO_OPEN_TIMEOUT: Duration = Duration::from_millis(500);
const CHANNEL_QUEUE_DEPTH: usize = 32;

/// Locate an executable on `PATH`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// Whether an origin counts as a secure context: https, or plain http on a
/// loopback host.
pub fn is_secure_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    match url.scheme() {
        "https" | "wss" => true,
        "http" | "ws" => match url.host() {
            Some(url::Host::Domain(domain)) => {
                domain == "localhost" || domain.ends_with(".localhost")
            }
            Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
            Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        },
        _ => false,
    }
}

/// Command line for one notification.
///
/// Critical urgency keeps the notification up until dismissed; the
/// synchronous hint makes notifications sharing a tag replace each other.
pub fn notify_send_args(request: &NotificationRequest) -> Vec<String> {
    let mut args = Vec::new();
    if request.require_interaction {
        args.push("--urgency".to_string());
        args.push("critical".to_string());
    }
    args.push("--app-name".to_string());
    args.push(APP_NAME.to_string());
    args.push("--hint".to_string());
    args.push(format!("string:x-canonical-private-synchronous:{}", request.tag));
    args.push(request.title.clone());
    args.push(request.body.clone());
    args
}

pub struct DesktopPlatform {
    notify_send: Option<PathBuf>,
    secure_context: bool,
}

impl DesktopPlatform {
    pub fn new(origin: &str) -> Self {
        Self::with_executable(origin, find_executable(NOTIFY_SEND))
    }

    pub fn with_executable(origin: &str, notify_send: Option<PathBuf>) -> Self {
        Self {
            notify_send,
            secure_context: is_secure_origin(origin),
        }
    }

    /// Desktop sessions have no prompt: a reachable notification client is
    /// the grant, and it is the same in every session.
    fn permission(&self) -> PermissionState {
        if self.notify_send.is_some() {
            PermissionState::Granted
        } else {
            PermissionState::Unsupported
        }
    }
}

fn open_tone(tone: Tone, ready: Option<std_mpsc::Sender<Result<(), String>>>) {
    let stream = match rodio::OutputStreamBuilder::open_default_stream() {
        Ok(stream) => stream,
        Err(e) => {
            match ready {
                Some(ready) => {
                    let _ = ready.send(Err(e.to_string()));
                }
                None => log::warn!("Alert tone failed: {}", e),
            }
            return;
        }
    };
    let sink = rodio::Sink::connect_new(stream.mixer());
    sink.append(
        SineWave::new(tone.frequency_hz)
            .take_duration(tone.duration)
            .amplify(tone.volume.clamp(0.0, 1.0)),
    );
    if let Some(ready) = ready {
        let _ = ready.send(Ok(()));
    }
    sink.sleep_until_end();
}

#[async_trait]
impl AlertPlatform for DesktopPlatform {
    fn environment(&self) -> EnvironmentReport {
        EnvironmentReport {
            notification_api: self.notify_send.is_some(),
            secure_context: self.secure_context,
            permission: self.permission(),
        }
    }

    async fn request_permission(&self) -> Result<PermissionState, PlatformError> {
        Ok(self.permission())
    }

    fn show_notification(&self, request: &NotificationRequest) -> Result<(), PlatformError> {
        let path = self
            .notify_send
            .as_deref()
            .ok_or(PlatformError::Unavailable(NOTIFY_SEND))?;
        let status = std::process::Command::new(path)
            .args(notify_send_args(request))
            .status()?;
        if !status.success() {
            return Err(PlatformError::Rejected(format!("{} exited with {}", NOTIFY_SEND, status)));
        }
        Ok(())
    }

    fn play_tone(&self, tone: &Tone, playback: Playback) -> Result<(), PlatformError> {
        let tone = *tone;

        // The output stream has to outlive playback, so it lives on its own thread.
        if playback == Playback::Detached {
            std::thread::spawn(move || open_tone(tone, None));
            return Ok(());
        }

        let (ready_tx, ready_rx) = std_mpsc::channel();
        std::thread::spawn(move || open_tone(tone, Some(ready_tx)));
        match ready_rx.recv_timeout(AUDIO_OPEN_TIMEOUT) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PlatformError::Audio(e)),
            Err(_) => Err(PlatformError::Audio("audio device did not open in time".to_string())),
        }
    }

    fn vibrate(&self, _pattern: &[u64]) -> Result<(), PlatformError> {
        Err(PlatformError::Unavailable("vibration"))
    }
}

/// Background channel host backed by a tokio task.
pub struct DesktopChannelHost {
    notify_send: Option<PathBuf>,
}

impl DesktopChannelHost {
    pub fn new() -> Self {
        Self {
            notify_send: find_executable(NOTIFY_SEND),
        }
    }

    pub fn with_executable(notify_send: Option<PathBuf>) -> Self {
        Self { notify_send }
    }
}

impl Default for DesktopChannelHost {
    fn default() -> Self {
        Self::new()
    }
}

async fn deliver(path: &Path, request: &NotificationRequest) {
    match tokio::process::Command::new(path)
        .args(notify_send_args(request))
        .status()
        .await
    {
        Ok(status) if status.success() => {}
        Ok(status) => log::warn!("Background notification exited with {}", status),
        Err(e) => log::warn!("Background notification failed: {}", e),
    }
}

#[async_trait]
impl ChannelHost for DesktopChannelHost {
    async fn install(&self, scope: &str) -> Result<ChannelHandle, PlatformError> {
        let path = self
            .notify_send
            .clone()
            .ok_or(PlatformError::Unavailable(NOTIFY_SEND))?;
        if !path.is_file() {
            return Err(PlatformError::Rejected(format!(
                "worker executable missing: {}",
                path.display()
            )));
        }

        let (tx, mut rx) = mpsc::channel::<NotificationRequest>(CHANNEL_QUEUE_DEPTH);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let worker_scope = scope.to_string();

        tokio::spawn(async move {
            let _ = event_tx.send(ChannelEvent::Installed);
            let _ = event_tx.send(ChannelEvent::Activated);
            let _ = event_tx.send(ChannelEvent::Claimed);
            log::debug!("Delivery worker running for {}", worker_scope);
            while let Some(request) = rx.recv().await {
                deliver(&path, &request).await;
            }
            log::debug!("Delivery worker for {} stopped", worker_scope);
        });

        Ok(ChannelHandle {
            scope: scope.to_string(),
            sender: tx,
            events: event_rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NotificationRequest {
        NotificationRequest {
            title: "Detection alert: cam-1".to_string(),
            body: "2 suspicious activity warnings detected".to_string(),
            tag: "detection-cam-1".to_string(),
            require_interaction: true,
        }
    }

    #[test]
    fn test_secure_origins() {
        assert!(is_secure_origin("https://device.lan"));
        assert!(is_secure_origin("http://localhost:8080"));
        assert!(is_secure_origin("http://127.0.0.1"));
        assert!(is_secure_origin("http://[::1]:3000"));
        assert!(is_secure_origin("http://panel.localhost"));
    }

    #[test]
    fn test_insecure_origins() {
        assert!(!is_secure_origin("http://192.168.1.20"));
        assert!(!is_secure_origin("http://device.lan"));
        assert!(!is_secure_origin("not a url"));
        assert!(!is_secure_origin("ftp://localhost"));
    }

    #[test]
    fn test_notify_send_args_carry_tag_and_urgency() {
        let args = notify_send_args(&request());
        assert_eq!(&args[..2], ["--urgency", "critical"]);
        assert!(args.contains(&"string:x-canonical-private-synchronous:detection-cam-1".to_string()));
        assert_eq!(args.last().unwrap(), "2 suspicious activity warnings detected");
    }

    #[test]
    fn test_no_urgency_without_interaction() {
        let mut req = request();
        req.require_interaction = false;
        assert!(!notify_send_args(&req).contains(&"critical".to_string()));
    }

    #[tokio::test]
    async fn test_missing_executable_is_unsupported() {
        let platform = DesktopPlatform::with_executable("https://device.lan", None);
        let env = platform.environment();
        assert!(!env.notification_api);
        assert_eq!(env.permission, PermissionState::Unsupported);
        assert_eq!(platform.request_permission().await.unwrap(), PermissionState::Unsupported);
        assert!(platform.show_notification(&request()).is_err());
    }

    #[tokio::test]
    async fn test_granted_from_startup_when_executable_present() {
        let platform =
            DesktopPlatform::with_executable("http://192.168.1.20", Some(PathBuf::from("/bin/true")));
        let env = platform.environment();
        assert!(env.notification_api);
        assert!(!env.secure_context);
        assert_eq!(env.permission, PermissionState::Granted);
        assert_eq!(platform.request_permission().await.unwrap(), PermissionState::Granted);
    }

    #[test]
    fn test_show_notification_reports_exit_status() {
        let ok = DesktopPlatform::with_executable("https://device.lan", Some(PathBuf::from("/bin/true")));
        assert!(ok.show_notification(&request()).is_ok());

        let failing =
            DesktopPlatform::with_executable("https://device.lan", Some(PathBuf::from("/bin/false")));
        assert!(matches!(
            failing.show_notification(&request()),
            Err(PlatformError::Rejected(_))
        ));
    }

    #[test]
    fn test_vibration_unavailable() {
        let platform = DesktopPlatform::with_executable("https://device.lan", None);
        assert!(platform.vibrate(&[200]).is_err());
    }

    #[tokio::test]
    async fn test_channel_install_needs_executable() {
        let host = DesktopChannelHost::with_executable(None);
        assert!(host.install("https://device.lan/").await.is_err());

        let host = DesktopChannelHost::with_executable(Some(PathBuf::from("/nonexistent/notify-send")));
        assert!(host.install("https://device.lan/").await.is_err());
    }
}
