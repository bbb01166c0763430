use crate::entry::{TokenUsage, TranscriptEntry};
use serde::Serialize;
use time::OffsetDateTime;

/// Token footprint of the most recent main-branch API response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    /// input + cache-read + cache-creation tokens.
    pub context_length: u64,
    /// Counters of the selected entry; all zero when nothing qualified.
    pub usage: TokenUsage,
    #[serde(with = "time::serde::rfc3339::option")]
    pub at: Option<OffsetDateTime>,
}

/// Pick the latest qualifying usage record and derive the context length.
///
/// Qualifying: has a usage block, is not a side-chain entry, and has a
/// parseable timestamp. Survivors are stable-sorted by timestamp, so on a
/// timestamp tie the later line in the file wins.
pub fn latest_usage<S: AsRef<str>>(lines: &[S]) -> UsageSnapshot {
    let mut candidates: Vec<(OffsetDateTime, TokenUsage)> = lines
        .iter()
        .filter_map(|line| TranscriptEntry::parse(line.as_ref()).ok())
        .filter(|entry| !entry.is_sidechain())
        .filter_map(|entry| {
            let usage = entry.usage()?;
            let at = entry.parsed_timestamp().ok()?;
            Some((at, usage))
        })
        .collect();

    candidates.sort_by_key(|(at, _)| *at);

    match candidates.last() {
        Some((at, usage)) => UsageSnapshot {
            context_length: usage.context_length(),
            usage: *usage,
            at: Some(*at),
        },
        None => UsageSnapshot::default(),
    }
}

/// Shorthand for `latest_usage(lines).context_length`.
pub fn context_length<S: AsRef<str>>(lines: &[S]) -> u64 {
    latest_usage(lines).context_length
}
