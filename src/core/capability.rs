//! Capability probing and the user-facing status message derived from it.

use crate::core::alerts::model::{CapabilitySnapshot, PermissionState};
use crate::core::platform::AlertPlatform;

pub const INSECURE_CONTEXT_MESSAGE: &str =
    "Notifications need a secure connection. Open the app over HTTPS or from localhost.";
pub const UNSUPPORTED_MESSAGE: &str = "Notifications are not supported on this system.";
pub const BLOCKED_MESSAGE: &str =
    "Notifications are blocked. Allow them in your system settings to enable alerts.";

/// Read the environment once. A missing alerting API always reports
/// `Unsupported`, whatever the platform claims about permission.
pub fn probe(platform: &dyn AlertPlatform) -> CapabilitySnapshot {
    let report = platform.environment();
    let permission = if report.notification_api {
        report.permission
    } else {
        PermissionState::Unsupported
    };
    let snapshot = CapabilitySnapshot {
        api_available: report.notification_api,
        secure_context: report.secure_context,
        permission,
    };
    log::info!(
        "Capabilities: api={} secure={} permission={:?}",
        snapshot.api_available,
        snapshot.secure_context,
        snapshot.permission
    );
    snapshot
}

/// Explanation to show next to the alerts toggle, if anything is in the way.
pub fn status_message(snapshot: &CapabilitySnapshot) -> Option<&'static str> {
    if !snapshot.secure_context && !snapshot.permission.is_granted() {
        return Some(INSECURE_CONTEXT_MESSAGE);
    }
    match snapshot.permission {
        PermissionState::Unsupported => Some(UNSUPPORTED_MESSAGE),
        PermissionState::Denied => Some(BLOCKED_MESSAGE),
        PermissionState::Default | PermissionState::Granted => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::fake::FakePlatform;

    fn snapshot(secure: bool, permission: PermissionState) -> CapabilitySnapshot {
        CapabilitySnapshot {
            api_available: permission != PermissionState::Unsupported,
            secure_context: secure,
            permission,
        }
    }

    #[test]
    fn test_probe_reports_unsupported_without_api() {
        let platform = FakePlatform::granted().without_api();
        let snap = probe(&platform);
        assert!(!snap.api_available);
        assert_eq!(snap.permission, PermissionState::Unsupported);
        assert!(snap.secure_context);
    }

    #[test]
    fn test_probe_does_not_prompt() {
        let platform = FakePlatform::new().insecure();
        let snap = probe(&platform);
        assert_eq!(snap.permission, PermissionState::Default);
        assert!(!snap.secure_context);
        assert_eq!(platform.prompt_count(), 0);
    }

    #[test]
    fn test_insecure_message_takes_precedence() {
        assert_eq!(
            status_message(&snapshot(false, PermissionState::Denied)),
            Some(INSECURE_CONTEXT_MESSAGE)
        );
        assert_eq!(
            status_message(&snapshot(true, PermissionState::Denied)),
            Some(BLOCKED_MESSAGE)
        );
    }

    #[test]
    fn test_no_message_when_usable() {
        assert_eq!(status_message(&snapshot(true, PermissionState::Granted)), None);
        assert_eq!(status_message(&snapshot(true, PermissionState::Default)), None);
        // Foreground delivery still works once granted, even off a secure origin
        assert_eq!(status_message(&snapshot(false, PermissionState::Granted)), None);
    }

    #[test]
    fn test_unsupported_message() {
        assert_eq!(
            status_message(&snapshot(true, PermissionState::Unsupported)),
            Some(UNSUPPORTED_MESSAGE)
        );
    }
}
