use crate::env::EnvironmentSnapshot;
use crate::error::LaunchError;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ── Runtime-facing variable names ──

pub const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
pub const TIMEOUT_VAR: &str = "API_TIMEOUT_MS";
pub const FAST_MODEL_VAR: &str = "ANTHROPIC_DEFAULT_HAIKU_MODEL";
pub const DEFAULT_MODEL_VAR: &str = "ANTHROPIC_DEFAULT_SONNET_MODEL";
pub const PREMIUM_MODEL_VAR: &str = "ANTHROPIC_DEFAULT_OPUS_MODEL";
/// Generic credential variable the assistant authenticates with.
pub const AUTH_TOKEN_VAR: &str = "ANTHROPIC_AUTH_TOKEN";

/// Environment variable that picks a provider when no flag is given.
pub const PROVIDER_ENV_VAR: &str = "KILN_PROVIDER";

// ── Registry ──

/// A registered backend. At most one is selected per launch, so selection
/// is `Option<ProviderId>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    Zai,
    Kimi,
    DeepSeek,
    MiniMax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelTiers {
    pub fast: &'static str,
    pub default: &'static str,
    pub premium: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub name: &'static str,
    pub base_url: &'static str,
    /// Variable holding this provider's API key.
    pub credential_var: &'static str,
    pub models: ModelTiers,
    /// Remote backends get a longer request budget than the runtime default.
    pub timeout_ms: u64,
}

const REGISTRY: &[ProviderConfig] = &[
    ProviderConfig {
        id: ProviderId::Zai,
        name: "Z.ai GLM",
        base_url: "https://api.z.ai/api/anthropic",
        credential_var: "Z_AI_API_KEY",
        models: ModelTiers {
            fast: "glm-4.5-air",
            default: "glm-4.6",
            premium: "glm-4.6",
        },
        timeout_ms: 3_000_000,
    },
    ProviderConfig {
        id: ProviderId::Kimi,
        name: "Moonshot Kimi",
        base_url: "https://api.moonshot.ai/anthropic",
        credential_var: "MOONSHOT_API_KEY",
        models: ModelTiers {
            fast: "kimi-k2-turbo-preview",
            default: "kimi-k2-0905-preview",
            premium: "kimi-k2-0905-preview",
        },
        timeout_ms: 600_000,
    },
    ProviderConfig {
        id: ProviderId::DeepSeek,
        name: "DeepSeek",
        base_url: "https://api.deepseek.com/anthropic",
        credential_var: "DEEPSEEK_API_KEY",
        models: ModelTiers {
            fast: "deepseek-chat",
            default: "deepseek-chat",
            premium: "deepseek-reasoner",
        },
        timeout_ms: 600_000,
    },
    ProviderConfig {
        id: ProviderId::MiniMax,
        name: "MiniMax",
        base_url: "https://api.minimax.io/anthropic",
        credential_var: "MINIMAX_API_KEY",
        models: ModelTiers {
            fast: "MiniMax-M2",
            default: "MiniMax-M2",
            premium: "MiniMax-M2",
        },
        timeout_ms: 3_000_000,
    },
];

/// All registered providers, in display order.
pub fn registry() -> &'static [ProviderConfig] {
    REGISTRY
}

impl ProviderId {
    pub const ALL: [ProviderId; 4] = [
        ProviderId::Zai,
        ProviderId::Kimi,
        ProviderId::DeepSeek,
        ProviderId::MiniMax,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Zai => "zai",
            ProviderId::Kimi => "kimi",
            ProviderId::DeepSeek => "deepseek",
            ProviderId::MiniMax => "minimax",
        }
    }

    /// Registry rows are laid out in variant order.
    pub fn config(self) -> &'static ProviderConfig {
        &REGISTRY[self as usize]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zai" | "z.ai" | "glm" => Ok(ProviderId::Zai),
            "kimi" | "moonshot" => Ok(ProviderId::Kimi),
            "deepseek" => Ok(ProviderId::DeepSeek),
            "minimax" => Ok(ProviderId::MiniMax),
            _ => Err(LaunchError::UnknownProvider {
                id: s.to_string(),
                known: ProviderId::ALL.iter().map(|p| p.to_string()).collect(),
            }),
        }
    }
}

impl ProviderConfig {
    /// Check the credential variable is set and non-blank; return it trimmed.
    pub fn validate(&self, env: &EnvironmentSnapshot) -> Result<String, LaunchError> {
        env.non_empty(self.credential_var)
            .map(str::to_owned)
            .ok_or_else(|| LaunchError::MissingCredential {
                provider: self.name.to_string(),
                var: self.credential_var.to_string(),
            })
    }

    /// Base URL, timeout, and tier models under the runtime's own names.
    pub fn environment(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            (BASE_URL_VAR, self.base_url.to_string()),
            (TIMEOUT_VAR, self.timeout_ms.to_string()),
            (FAST_MODEL_VAR, self.models.fast.to_string()),
            (DEFAULT_MODEL_VAR, self.models.default.to_string()),
            (PREMIUM_MODEL_VAR, self.models.premium.to_string()),
        ])
    }
}

/// A provider whose credential has been validated.
#[derive(Clone)]
pub struct ResolvedProvider {
    pub config: &'static ProviderConfig,
    credential: String,
}

impl ResolvedProvider {
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Provider environment plus the credential under [`AUTH_TOKEN_VAR`].
    pub fn environment(&self) -> BTreeMap<&'static str, String> {
        let mut env = self.config.environment();
        env.insert(AUTH_TOKEN_VAR, self.credential.clone());
        env
    }
}

impl fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("id", &self.config.id)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Validate the selected provider, if any. Runs before anything is spawned.
pub fn resolve_provider(
    selection: Option<ProviderId>,
    env: &EnvironmentSnapshot,
) -> Result<Option<ResolvedProvider>, LaunchError> {
    let Some(id) = selection else {
        return Ok(None);
    };
    let config = id.config();
    let credential = config.validate(env)?;
    Ok(Some(ResolvedProvider { config, credential }))
}

/// Pick the provider: explicit flag, then `KILN_PROVIDER`, then the
/// configured default. `none` at either string layer means no provider.
pub fn select_provider(
    flag: Option<ProviderId>,
    env: &EnvironmentSnapshot,
    configured: Option<&str>,
) -> Result<Option<ProviderId>, LaunchError> {
    if flag.is_some() {
        return Ok(flag);
    }
    match env.non_empty(PROVIDER_ENV_VAR).or(configured.map(str::trim)) {
        Some(v) if v.is_empty() || v.eq_ignore_ascii_case("none") => Ok(None),
        Some(v) => v.parse().map(Some),
        None => Ok(None),
    }
}
