//! Launch the assistant against an alternate provider, with declared MCP
//! tool servers and a settings override applied.

mod compose;
mod config;
mod env;
mod error;
mod launcher;
mod manifest;
mod merge;
mod provider;

pub use compose::{
    build_args, compose_environment, prepare_launch, LaunchPlan, LaunchRequest, CLAUDE_BIN_VAR,
    DEFAULT_CLAUDE_BIN, MCP_CONFIG_FLAG,
};
pub use config::KilnConfig;
pub use env::EnvironmentSnapshot;
pub use error::LaunchError;
pub use launcher::{run_launch, ClaudeProcess, ProcessRunner, SIGNALED_EXIT_CODE};
pub use manifest::{ToolDescriptor, ToolManifest, ToolRuntimeEntry};
pub use merge::{apply_settings_override, merge_objects, merge_settings_files, MergeOutcome};
pub use provider::{
    registry, resolve_provider, select_provider, ModelTiers, ProviderConfig, ProviderId,
    ResolvedProvider, AUTH_TOKEN_VAR, BASE_URL_VAR, DEFAULT_MODEL_VAR, FAST_MODEL_VAR,
    PREMIUM_MODEL_VAR, PROVIDER_ENV_VAR, TIMEOUT_VAR,
};
