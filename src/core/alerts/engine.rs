// Trigger engine - deduplicates alerts per entry across poller ticks.

use std::collections::HashSet;

use super::model::FireDecision;
use super::triggers::{compose_decision, next_transition, EntryState, Transition};
use crate::core::config::Settings;
use crate::core::model::EntryBatch;

/// Trigger engine state
#[derive(Debug, Default)]
pub struct TriggerEngine {
    /// Keys that already fired since their count was last zero
    notified: HashSet<String>,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state_of(&self, key: &str) -> EntryState {
        if self.notified.contains(key) {
            EntryState::Notified
        } else {
            EntryState::Idle
        }
    }

    /// Apply one observed count to one entry.
    ///
    /// While alerts are disabled nothing is recorded or forgotten, so turning
    /// them back on does not replay entries that already alerted.
    pub fn evaluate_entry(
        &mut self,
        key: &str,
        count: Option<u32>,
        settings: &Settings,
    ) -> Option<FireDecision> {
        if !settings.enabled {
            return None;
        }

        match next_transition(self.state_of(key), count) {
            Transition::Reset => {
                self.notified.remove(key);
                log::debug!("Entry {} back to zero warnings", key);
                None
            }
            Transition::Unchanged => None,
            Transition::Suppressed => {
                log::debug!("Entry {} already alerted, suppressing", key);
                None
            }
            Transition::Fire => {
                let count = count.unwrap_or_default();
                self.notified.insert(key.to_string());
                log::info!("Entry {} rose to {} warnings, firing", key, count);
                Some(compose_decision(key, count))
            }
        }
    }

    /// Evaluate one poller tick.
    /// Keys that alerted before but are missing from the batch count as zero.
    pub fn evaluate(&mut self, batch: &EntryBatch, settings: &Settings) -> Vec<FireDecision> {
        if !settings.enabled {
            return Vec::new();
        }

        let mut decisions = Vec::new();
        for (key, count) in batch.iter() {
            if let Some(decision) = self.evaluate_entry(key, *count, settings) {
                decisions.push(decision);
            }
        }

        let vanished: Vec<String> = self
            .notified
            .iter()
            .filter(|key| !batch.contains_key(key.as_str()))
            .cloned()
            .collect();
        for key in vanished {
            self.evaluate_entry(&key, None, settings);
        }

        decisions
    }

    pub fn is_notified(&self, key: &str) -> bool {
        self.notified.contains(key)
    }

    pub fn notified_len(&self) -> usize {
        self.notified.len()
    }
}
