use crate::entry::TranscriptEntry;

/// Substrings the runtime injects into user-role records that the operator
/// never typed.
const SYNTHETIC_MARKERS: &[&str] = &[
    "<command-name>",
    "<local-command-stdout>",
    "Caveat: The messages below were generated by the user while running local commands",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnKind {
    /// A prompt the operator actually typed.
    Genuine,
    /// Not a `user` record at all.
    NotUser,
    /// User-role record carrying a tool result.
    ToolResult,
    /// Flagged `isMeta`.
    Meta,
    /// Slash-command echo, local command output, or caveat banner.
    Synthetic,
    /// Line did not decode.
    Undecodable,
}

/// Classify one decoded transcript entry.
pub fn classify_entry(entry: &TranscriptEntry) -> TurnKind {
    if !entry.is_type("user") {
        return TurnKind::NotUser;
    }
    if entry.has_tool_use_result() {
        return TurnKind::ToolResult;
    }
    if entry.is_meta() {
        return TurnKind::Meta;
    }
    let text = entry.content_text();
    if SYNTHETIC_MARKERS.iter().any(|m| text.contains(m)) {
        return TurnKind::Synthetic;
    }
    TurnKind::Genuine
}

/// Classify one raw JSONL line. Never fails: undecodable lines are
/// [`TurnKind::Undecodable`].
pub fn classify_line(line: &str) -> TurnKind {
    match TranscriptEntry::parse(line) {
        Ok(entry) => classify_entry(&entry),
        Err(_) => TurnKind::Undecodable,
    }
}

pub fn is_genuine_turn(line: &str) -> bool {
    classify_line(line) == TurnKind::Genuine
}

/// Number of operator-authored turns in a transcript.
pub fn count_turns<S: AsRef<str>>(lines: &[S]) -> usize {
    lines.iter().filter(|l| is_genuine_turn(l.as_ref())).count()
}
