use crate::manifest::ToolDescriptor;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// kiln's own `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KilnConfig {
    /// Provider id used when neither `--provider` nor `KILN_PROVIDER` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_provider: Option<String>,
    /// Assistant binary; `claude` on PATH when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claude_bin: Option<PathBuf>,
    pub tools: Vec<ToolDescriptor>,
}

impl KilnConfig {
    /// Read `path`. A missing file is the default config.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Like [`load`](Self::load), but a broken file warns and yields defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %format!("{e:#}"), "ignoring kiln config");
            Self::default()
        })
    }
}
