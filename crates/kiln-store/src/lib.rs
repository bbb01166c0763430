mod paths;

pub use paths::KilnPaths;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Return the user's home directory, or `.` when it cannot be determined.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// Read a JSON object file. `Ok(None)` if the file doesn't exist.
///
/// A document that parses but is not an object is an error: callers that
/// write the map back would otherwise clobber whatever was there.
pub fn read_json_object(
    path: &Path,
) -> anyhow::Result<Option<serde_json::Map<String, serde_json::Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Some(serde_json::Map::new()));
    }
    let val: serde_json::Value = serde_json::from_str(&content)?;
    match val {
        serde_json::Value::Object(map) => Ok(Some(map)),
        other => anyhow::bail!(
            "{} is not a JSON object (found {})",
            path.display(),
            json_kind(&other)
        ),
    }
}

/// Pretty-print a JSON object and write it atomically.
pub fn write_json_object(
    path: &Path,
    map: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<()> {
    let mut json = serde_json::to_string_pretty(map)?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
