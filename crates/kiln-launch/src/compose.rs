use crate::config::KilnConfig;
use crate::env::EnvironmentSnapshot;
use crate::error::LaunchError;
use crate::manifest::ToolManifest;
use crate::merge::apply_settings_override;
use crate::provider::{registry, resolve_provider, select_provider, ProviderId, ResolvedProvider, AUTH_TOKEN_VAR};
use kiln_store::KilnPaths;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const MCP_CONFIG_FLAG: &str = "--mcp-config";
pub const DEFAULT_CLAUDE_BIN: &str = "claude";
/// Overrides `claude_bin` from config.json.
pub const CLAUDE_BIN_VAR: &str = "KILN_CLAUDE_BIN";

const REDACTED: &str = "<redacted>";

// ── Pure composition ──

/// Final child environment: process env, then provider env, then the
/// credential remap. Later layers win.
pub fn compose_environment(
    base: &EnvironmentSnapshot,
    provider: Option<&ResolvedProvider>,
) -> BTreeMap<OsString, OsString> {
    let mut env = base.to_map();
    if let Some(p) = provider {
        for (key, value) in p.environment() {
            env.insert(key.into(), value.into());
        }
    }
    env
}

/// Passthrough args, with `--mcp-config <path>` appended when a manifest
/// file is in play.
pub fn build_args(passthrough: &[OsString], manifest: Option<&Path>) -> Vec<OsString> {
    let mut args = passthrough.to_vec();
    if let Some(path) = manifest {
        args.push(MCP_CONFIG_FLAG.into());
        args.push(path.as_os_str().to_owned());
    }
    args
}

fn resolve_program(env: &EnvironmentSnapshot, config: &KilnConfig) -> PathBuf {
    env.non_empty(CLAUDE_BIN_VAR)
        .map(PathBuf::from)
        .or_else(|| config.claude_bin.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CLAUDE_BIN))
}

fn is_secret(key: &OsStr) -> bool {
    key == AUTH_TOKEN_VAR || registry().iter().any(|p| key == p.credential_var)
}

// ── Launch plan ──

/// What the user asked for on the command line.
#[derive(Debug, Clone, Default)]
pub struct LaunchRequest {
    pub provider: Option<ProviderId>,
    pub args: Vec<OsString>,
    /// Compose everything but leave the settings file untouched.
    pub dry_run: bool,
}

/// A fully composed launch. Owns the manifest temp file, which is removed
/// when the plan is dropped or [`finish`](Self::finish)ed.
#[derive(Debug)]
pub struct LaunchPlan {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub env: BTreeMap<OsString, OsString>,
    pub provider: Option<ResolvedProvider>,
    /// Keys whose value differs from the process environment.
    pub changed: Vec<OsString>,
    manifest: Option<NamedTempFile>,
}

impl LaunchPlan {
    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest.as_ref().map(NamedTempFile::path)
    }

    /// Human-readable summary for `--dry-run`. Credentials are redacted.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "program: {}", self.program.display());
        let args: Vec<_> = self.args.iter().map(|a| a.to_string_lossy()).collect();
        let _ = writeln!(out, "args: {}", args.join(" "));
        let provider = self.provider.as_ref().map_or("none", |p| p.config.name);
        let _ = writeln!(out, "provider: {provider}");
        let _ = writeln!(out, "env:");
        for key in &self.changed {
            let value = if is_secret(key) {
                REDACTED.into()
            } else {
                self.env
                    .get(key)
                    .map(|v| v.to_string_lossy())
                    .unwrap_or_default()
            };
            let _ = writeln!(out, "  {}={value}", key.to_string_lossy());
        }
        out
    }

    /// Remove the manifest temp file now, logging rather than failing.
    pub fn finish(mut self) {
        if let Some(file) = self.manifest.take() {
            let path = file.path().to_path_buf();
            if let Err(e) = file.close() {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove tool manifest");
            }
        }
    }
}

/// Validate the provider, merge settings, write the manifest, and compose
/// the child's program, args and environment. Nothing is spawned.
pub fn prepare_launch(
    request: LaunchRequest,
    paths: &KilnPaths,
    config: &KilnConfig,
    env: &EnvironmentSnapshot,
) -> Result<LaunchPlan, LaunchError> {
    let selection = select_provider(request.provider, env, config.default_provider.as_deref())?;
    let provider = resolve_provider(selection, env)?;
    tracing::debug!(provider = ?selection, "provider selected");

    if request.dry_run {
        tracing::debug!("dry run: settings merge skipped");
    } else {
        apply_settings_override(&paths.settings_json, &paths.settings_override_json);
    }

    let tools = ToolManifest::build(&config.tools);
    let manifest = if tools.is_empty() {
        None
    } else {
        Some(tools.write_temp()?)
    };

    let composed = compose_environment(env, provider.as_ref());
    let changed = composed
        .iter()
        .filter(|(k, v)| env.get_os(k) != Some(v.as_os_str()))
        .map(|(k, _)| k.clone())
        .collect();

    Ok(LaunchPlan {
        program: resolve_program(env, config),
        args: build_args(&request.args, manifest.as_ref().map(NamedTempFile::path)),
        env: composed,
        provider,
        changed,
        manifest,
    })
}
