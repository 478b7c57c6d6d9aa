//! Newline-delimited JSON messages from the poller and the settings UI.

use serde::Deserialize;

use super::model::EntryBatch;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedMessage {
    /// One poller tick with every current entry
    Entries { entries: EntryBatch },
    Enable,
    Disable,
    Sound { enabled: bool },
    /// Manual test button
    Test,
    Status,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<Result<FeedMessage, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}
