// Per-entry trigger rule.
//
// An entry is either Idle or Notified. Only an Idle entry with a positive
// warning count fires; a zero or missing count puts it back to Idle.

use super::model::FireDecision;

/// State of one entry between zero-crossings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Idle,
    Notified,
}

/// Outcome of applying one observed count to an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Count dropped to zero (or vanished), history for the key is forgotten
    Reset,
    /// Still positive and already alerted
    Suppressed,
    /// Zero-to-positive edge
    Fire,
    /// Stayed at zero
    Unchanged,
}

pub fn next_transition(state: EntryState, count: Option<u32>) -> Transition {
    match (state, count.unwrap_or(0)) {
        (EntryState::Notified, 0) => Transition::Reset,
        (EntryState::Idle, 0) => Transition::Unchanged,
        (EntryState::Notified, _) => Transition::Suppressed,
        (EntryState::Idle, _) => Transition::Fire,
    }
}

pub fn notification_tag(key: &str) -> String {
    format!("detection-{}", key)
}

pub fn warning_body(count: u32) -> String {
    if count == 1 {
        "1 suspicious activity warning detected".to_string()
    } else {
        format!("{} suspicious activity warnings detected", count)
    }
}

pub fn compose_decision(key: &str, count: u32) -> FireDecision {
    FireDecision {
        key: key.to_string(),
        count,
        title: format!("Detection alert: {}", key),
        body: warning_body(count),
        tag: notification_tag(key),
    }
}
