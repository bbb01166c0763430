mod input;
mod path;
mod render;

pub use input::{parse_status_input, CostInfo, ModelInfo, OutputStyle, StatusInput, WorkspaceInfo};
pub use path::{display_path, probe_git_root, resolve_display_path};
pub use render::{format_tokens, render, StatusReport};

use kiln_transcript::{count_turns, latest_usage, read_transcript_lines, OrDefault};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_TIMEOUT_MS: u64 = 1500;
const DEFAULT_MODEL_NAME: &str = "Claude";

/// Knobs for one status refresh.
#[derive(Debug, Clone)]
pub struct StatusOptions {
    /// Per-lookup deadline; a lookup that misses it yields its default.
    pub deadline: Duration,
    pub home: Option<PathBuf>,
    /// Used when the input names no directory.
    pub fallback_cwd: Option<PathBuf>,
}

impl Default for StatusOptions {
    fn default() -> Self {
        Self {
            deadline: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            home: None,
            fallback_cwd: None,
        }
    }
}

impl StatusOptions {
    /// Home dir and cwd from the process; deadline from
    /// `KILN_STATUSLINE_TIMEOUT_MS`.
    pub fn from_env(home: Option<PathBuf>) -> Self {
        let timeout_ms: u64 = std::env::var("KILN_STATUSLINE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        Self {
            deadline: Duration::from_millis(timeout_ms),
            home,
            fallback_cwd: std::env::current_dir().ok(),
        }
    }
}

/// Gather everything the status line shows.
///
/// The transcript read and the path probe run concurrently. Neither can
/// fail: a missed deadline or I/O error degrades to zero turns, zero
/// context, or the non-git path form.
pub async fn collect(input: &StatusInput, opts: &StatusOptions) -> StatusReport {
    let dir = input.working_dir().or_else(|| opts.fallback_cwd.clone());
    let home = opts.home.as_deref();

    let transcript = async {
        match input.transcript_path.as_deref() {
            Some(p) => tokio::time::timeout(opts.deadline, read_transcript_lines(p))
                .await
                .or_default_logged("transcript read"),
            None => Vec::new(),
        }
    };
    let display = async {
        match dir.as_deref() {
            Some(d) => lookup_path(d, home, opts.deadline).await,
            None => String::new(),
        }
    };

    let (lines, path) = tokio::join!(transcript, display);
    let usage = latest_usage(&lines);

    let cost = input.cost.clone().unwrap_or_default();
    StatusReport {
        model: input
            .model_name()
            .unwrap_or(DEFAULT_MODEL_NAME)
            .to_string(),
        path,
        style: input
            .style_name()
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("default"))
            .map(str::to_owned),
        turns: count_turns(&lines),
        context_length: usage.context_length,
        cost_usd: cost.total_cost_usd.unwrap_or(0.0),
        lines_added: cost.total_lines_added.unwrap_or(0),
        lines_removed: cost.total_lines_removed.unwrap_or(0),
        over_budget: input.exceeds_200k_tokens.unwrap_or(false),
    }
}

async fn lookup_path(dir: &Path, home: Option<&Path>, deadline: Duration) -> String {
    path_within(resolve_display_path(dir, home), dir, home, deadline).await
}

/// Await a path lookup, falling back to the non-git form past `deadline`.
async fn path_within(
    lookup: impl Future<Output = String>,
    dir: &Path,
    home: Option<&Path>,
    deadline: Duration,
) -> String {
    match tokio::time::timeout(deadline, lookup).await {
        Ok(s) => s,
        Err(_) => {
            tracing::debug!(dir = %dir.display(), "path probe timed out");
            display_path(dir, None, home)
        }
    }
}
