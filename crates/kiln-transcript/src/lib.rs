mod classify;
mod entry;
mod fallback;
mod reader;
mod usage;

pub use classify::{classify_entry, classify_line, count_turns, is_genuine_turn, TurnKind};
pub use entry::{ParseError, TokenUsage, TranscriptEntry};
pub use fallback::OrDefault;
pub use reader::{read_transcript_lines, read_transcript_lines_blocking};
pub use usage::{context_length, latest_usage, UsageSnapshot};
