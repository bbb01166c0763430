use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::PathBuf;

// ── Hook stdin schema ──

/// The JSON Claude Code pipes into a `statusLine` command.
/// Every field is optional, and a field of the wrong type reads as absent,
/// so a sparse or partly garbled payload still renders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatusInput {
    #[serde(deserialize_with = "lenient")]
    pub session_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub transcript_path: Option<PathBuf>,
    #[serde(deserialize_with = "lenient")]
    pub cwd: Option<PathBuf>,
    #[serde(deserialize_with = "lenient")]
    pub model: Option<ModelInfo>,
    #[serde(deserialize_with = "lenient")]
    pub workspace: Option<WorkspaceInfo>,
    #[serde(deserialize_with = "lenient")]
    pub version: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub output_style: Option<OutputStyle>,
    #[serde(deserialize_with = "lenient")]
    pub cost: Option<CostInfo>,
    #[serde(deserialize_with = "lenient")]
    pub exceeds_200k_tokens: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelInfo {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkspaceInfo {
    #[serde(deserialize_with = "lenient")]
    pub current_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputStyle {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CostInfo {
    #[serde(deserialize_with = "lenient")]
    pub total_cost_usd: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub total_lines_added: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    pub total_lines_removed: Option<i64>,
}

impl StatusInput {
    /// `workspace.current_dir`, else `cwd`.
    pub fn working_dir(&self) -> Option<PathBuf> {
        self.workspace
            .as_ref()
            .and_then(|w| w.current_dir.clone())
            .or_else(|| self.cwd.clone())
    }

    pub fn model_name(&self) -> Option<&str> {
        let model = self.model.as_ref()?;
        model.display_name.as_deref().or(model.id.as_deref())
    }

    pub fn style_name(&self) -> Option<&str> {
        self.output_style.as_ref()?.name.as_deref()
    }
}

// ── Parsing ──

/// Decode one field, treating a type mismatch as absent.
fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    Ok(serde_json::from_value(value).ok())
}

/// Parse status input. Lines whose first non-blank character is `#` are
/// dropped first, so captured payloads can be annotated by hand.
pub fn parse_status_input(raw: &str) -> Result<StatusInput, serde_json::Error> {
    let stripped = strip_comment_lines(raw);
    if stripped.trim().is_empty() {
        return Ok(StatusInput::default());
    }
    serde_json::from_str(&stripped)
}

fn strip_comment_lines(raw: &str) -> String {
    raw.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_payload() {
        let raw = r#"{
            "session_id": "abc",
            "transcript_path": "/tmp/abc.jsonl",
            "cwd": "/work",
            "model": {"id": "claude-opus-4-1", "display_name": "Opus"},
            "workspace": {"current_dir": "/work/sub", "project_dir": "/work"},
            "version": "1.0.80",
            "output_style": {"name": "Explanatory"},
            "cost": {"total_cost_usd": 1.25, "total_lines_added": 10, "total_lines_removed": 3, "total_duration_ms": 5},
            "exceeds_200k_tokens": true
        }"#;
        let input = parse_status_input(raw).unwrap();
        assert_eq!(input.session_id.as_deref(), Some("abc"));
        assert_eq!(input.model_name(), Some("Opus"));
        assert_eq!(input.working_dir(), Some(PathBuf::from("/work/sub")));
        assert_eq!(input.style_name(), Some("Explanatory"));
        assert_eq!(input.cost.unwrap().total_lines_added, Some(10));
        assert_eq!(input.exceeds_200k_tokens, Some(true));
    }

    #[test]
    fn empty_object_is_default() {
        let input = parse_status_input("{}").unwrap();
        assert!(input.model_name().is_none());
        assert!(input.working_dir().is_none());
        assert!(input.cost.is_none());
    }

    #[test]
    fn blank_input_is_default() {
        let input = parse_status_input("  \n").unwrap();
        assert!(input.session_id.is_none());
    }

    #[test]
    fn comment_lines_are_stripped() {
        let raw = "# captured from a live session\n{\"cwd\": \"/work\",\n  # note\n \"model\": {\"id\": \"sonnet\"}}";
        let input = parse_status_input(raw).unwrap();
        assert_eq!(input.working_dir(), Some(PathBuf::from("/work")));
        assert_eq!(input.model_name(), Some("sonnet"));
    }

    #[test]
    fn mistyped_fields_do_not_sink_the_payload() {
        let raw = r#"{
            "transcript_path": "/tmp/t.jsonl",
            "cwd": "/work",
            "model": {"id": 5, "display_name": "Opus"},
            "output_style": "Explanatory",
            "cost": {"total_cost_usd": 0.5, "total_lines_added": 1.5},
            "exceeds_200k_tokens": "yes"
        }"#;
        let input = parse_status_input(raw).unwrap();
        assert_eq!(input.transcript_path, Some(PathBuf::from("/tmp/t.jsonl")));
        assert_eq!(input.working_dir(), Some(PathBuf::from("/work")));
        assert_eq!(input.model_name(), Some("Opus"));
        assert!(input.model.as_ref().unwrap().id.is_none());
        assert!(input.output_style.is_none());
        let cost = input.cost.unwrap();
        assert_eq!(cost.total_cost_usd, Some(0.5));
        assert!(cost.total_lines_added.is_none());
        assert!(input.exceeds_200k_tokens.is_none());
    }

    #[test]
    fn cwd_used_when_workspace_missing() {
        let input = parse_status_input(r#"{"cwd": "/a", "workspace": {}}"#).unwrap();
        assert_eq!(input.working_dir(), Some(PathBuf::from("/a")));
    }

    #[test]
    fn invalid_json_is_error() {
        assert!(parse_status_input("{nope").is_err());
    }
}
