use crate::error::LaunchError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

/// A tool server as declared in `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    /// Shell-style command line, e.g. `docker mcp run`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub disabled: bool,
}

/// One server entry as the assistant runtime expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolRuntimeEntry {
    Stdio {
        command: String,
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        env: Option<BTreeMap<String, String>>,
    },
    Http {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        env: Option<BTreeMap<String, String>>,
    },
}

impl ToolRuntimeEntry {
    /// Convert one descriptor. `None` for disabled or unusable descriptors.
    pub fn from_descriptor(desc: &ToolDescriptor) -> Option<Self> {
        if desc.disabled {
            return None;
        }
        let env = desc.env.clone();
        match (desc.command.as_deref(), desc.url.as_deref()) {
            (Some(command), url) => {
                if url.is_some() {
                    tracing::warn!(tool = %desc.name, "both command and url set; using command");
                }
                let mut tokens = command.split_whitespace().map(str::to_owned);
                let Some(program) = tokens.next() else {
                    tracing::warn!(tool = %desc.name, "empty command; skipping tool");
                    return None;
                };
                Some(ToolRuntimeEntry::Stdio {
                    command: program,
                    args: tokens.collect(),
                    env,
                })
            }
            (None, Some(url)) if !url.trim().is_empty() => Some(ToolRuntimeEntry::Http {
                url: url.trim().to_string(),
                env,
            }),
            _ => {
                tracing::warn!(tool = %desc.name, "neither command nor url set; skipping tool");
                None
            }
        }
    }
}

/// Name-keyed set of enabled tool servers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolManifest {
    #[serde(rename = "mcpServers")]
    servers: BTreeMap<String, ToolRuntimeEntry>,
}

impl ToolManifest {
    /// Build from declared descriptors. Later duplicates of a name replace
    /// earlier ones.
    pub fn build(descriptors: &[ToolDescriptor]) -> Self {
        let mut servers = BTreeMap::new();
        for desc in descriptors {
            if let Some(entry) = ToolRuntimeEntry::from_descriptor(desc) {
                if servers.insert(desc.name.clone(), entry).is_some() {
                    tracing::warn!(tool = %desc.name, "duplicate tool name; last one wins");
                }
            }
        }
        Self { servers }
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn get(&self, name: &str) -> Option<&ToolRuntimeEntry> {
        self.servers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    /// `{"mcpServers": {...}}`, pretty-printed.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the manifest to a fresh temp file. The file is removed when the
    /// returned handle drops.
    pub fn write_temp(&self) -> Result<NamedTempFile, LaunchError> {
        let json = self
            .to_json()
            .map_err(|e| LaunchError::Manifest(e.into()))?;
        let mut file = tempfile::Builder::new()
            .prefix("kiln-mcp-")
            .suffix(".json")
            .tempfile()
            .map_err(LaunchError::Manifest)?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.flush())
            .map_err(LaunchError::Manifest)?;
        tracing::debug!(path = %file.path().display(), tools = self.len(), "wrote tool manifest");
        Ok(file)
    }
}
