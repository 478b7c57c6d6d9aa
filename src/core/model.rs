use std::collections::BTreeMap;

/// Stable identifier for one detection entry
pub type EntryKey = String;

/// One poller tick: every tracked entry and its current warning count.
/// `None` means the poller had no count for the entry.
pub type EntryBatch = BTreeMap<EntryKey, Option<u32>>;
