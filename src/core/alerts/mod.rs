// Alert pipeline for detection warning counts.
//
// Architecture:
// - model.rs: Permission, capability and alert payload types
// - triggers.rs: Per-entry Idle/Notified transition rule and message text
// - engine.rs: Deduplicates fires across poller ticks
// - dispatcher.rs: Shows notifications and plays tone/vibration

pub mod dispatcher;
pub mod engine;
pub mod model;
pub mod triggers;
