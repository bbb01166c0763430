//! Launch errors. Each variant says what to do next.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The selected provider's credential variable is unset or blank.
    #[error("{provider} requires {var} to be set. Export it (non-empty) before launching.")]
    MissingCredential { provider: String, var: String },

    /// Unknown provider id on the command line, in `KILN_PROVIDER`, or in config.
    #[error("Unknown provider '{id}'. Known providers: {}", known.join(", "))]
    UnknownProvider { id: String, known: Vec<String> },

    /// The tool manifest could not be written to its temp file.
    #[error("Failed to write MCP tool manifest: {0}")]
    Manifest(#[source] std::io::Error),

    /// The assistant binary could not be started.
    #[error("Failed to start {}: {source}. Set KILN_CLAUDE_BIN or `claude_bin` in config.json if it is not on PATH.", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child failed.
    #[error("Lost track of {}: {source}", program.display())]
    Wait {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
