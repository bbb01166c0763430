use std::path::Path;

/// Read a transcript JSONL file into its non-blank lines.
///
/// A missing or unreadable file yields no lines: a fresh session has no
/// transcript yet. Invalid UTF-8 is decoded lossily and left for per-line
/// JSON decoding to reject.
pub async fn read_transcript_lines(path: &Path) -> Vec<String> {
    match tokio::fs::read(path).await {
        Ok(bytes) => split_lines(&bytes),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "transcript not readable");
            Vec::new()
        }
    }
}

/// Blocking variant of [`read_transcript_lines`].
pub fn read_transcript_lines_blocking(path: &Path) -> Vec<String> {
    match std::fs::read(path) {
        Ok(bytes) => split_lines(&bytes),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "transcript not readable");
            Vec::new()
        }
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_owned)
        .collect()
}
