use anyhow::Context;
use serde_json::{Map, Value};
use std::path::Path;

/// Shallow merge: `overlay`'s top-level keys replace `base`'s. Nested
/// objects and arrays are replaced whole, never combined.
pub fn merge_objects(base: &mut Map<String, Value>, overlay: &Map<String, Value>) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// What a settings merge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// No override file; nothing was read or written.
    NoOverride,
    /// The merged document was already identical to the base file.
    Unchanged,
    /// The base file was rewritten; carries the keys the override set.
    Written { keys: Vec<String> },
}

/// Merge the override file into the base settings file and persist it.
pub fn merge_settings_files(base_path: &Path, override_path: &Path) -> anyhow::Result<MergeOutcome> {
    let Some(overlay) = kiln_store::read_json_object(override_path)
        .with_context(|| format!("reading override {}", override_path.display()))?
    else {
        return Ok(MergeOutcome::NoOverride);
    };

    let original = kiln_store::read_json_object(base_path)
        .with_context(|| format!("reading settings {}", base_path.display()))?;
    let existed = original.is_some();
    let original = original.unwrap_or_default();

    let mut merged = original.clone();
    merge_objects(&mut merged, &overlay);
    if existed && merged == original {
        return Ok(MergeOutcome::Unchanged);
    }

    kiln_store::write_json_object(base_path, &merged)
        .with_context(|| format!("writing settings {}", base_path.display()))?;
    Ok(MergeOutcome::Written {
        keys: overlay.keys().cloned().collect(),
    })
}

/// Best-effort merge used at launch: failures are logged and skipped.
pub fn apply_settings_override(base_path: &Path, override_path: &Path) -> Option<MergeOutcome> {
    match merge_settings_files(base_path, override_path) {
        Ok(outcome) => {
            tracing::debug!(?outcome, settings = %base_path.display(), "settings merge");
            Some(outcome)
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "settings merge skipped");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn override_wins_and_keeps_base_keys() {
        let mut base = obj(json!({"a": 1, "b": 2}));
        merge_objects(&mut base, &obj(json!({"b": 3, "c": 4})));
        assert_eq!(Value::Object(base), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn merge_is_shallow() {
        let mut base = obj(json!({"env": {"A": "1", "B": "2"}, "list": [1, 2]}));
        merge_objects(&mut base, &obj(json!({"env": {"C": "3"}, "list": [3]})));
        assert_eq!(Value::Object(base), json!({"env": {"C": "3"}, "list": [3]}));
    }

    #[test]
    fn merge_is_idempotent() {
        let overlay = obj(json!({"b": 3, "c": 4}));
        let mut once = obj(json!({"a": 1, "b": 2}));
        merge_objects(&mut once, &overlay);
        let mut twice = once.clone();
        merge_objects(&mut twice, &overlay);
        assert_eq!(once, twice);
    }

    #[test]
    fn files_merge_and_persist() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("settings.json");
        let over = tmp.path().join("override.json");
        std::fs::write(&base, r#"{"a": 1, "b": 2}"#).unwrap();
        std::fs::write(&over, r#"{"b": 3, "c": 4}"#).unwrap();

        let outcome = merge_settings_files(&base, &over).unwrap();
        assert_eq!(
            outcome,
            MergeOutcome::Written {
                keys: vec!["b".into(), "c".into()]
            }
        );
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&base).unwrap()).unwrap();
        assert_eq!(written, json!({"a": 1, "b": 3, "c": 4}));

        assert_eq!(merge_settings_files(&base, &over).unwrap(), MergeOutcome::Unchanged);
    }

    #[test]
    fn missing_override_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("settings.json");
        let outcome = merge_settings_files(&base, &tmp.path().join("none.json")).unwrap();
        assert_eq!(outcome, MergeOutcome::NoOverride);
        assert!(!base.exists());
    }

    #[test]
    fn missing_base_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("claude").join("settings.json");
        let over = tmp.path().join("override.json");
        std::fs::write(&over, r#"{"model": "opus"}"#).unwrap();

        merge_settings_files(&base, &over).unwrap();
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&base).unwrap()).unwrap();
        assert_eq!(written, json!({"model": "opus"}));
    }

    #[test]
    fn non_object_base_is_left_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("settings.json");
        let over = tmp.path().join("override.json");
        std::fs::write(&base, "[1, 2]").unwrap();
        std::fs::write(&over, r#"{"a": 1}"#).unwrap();

        assert!(merge_settings_files(&base, &over).is_err());
        assert!(apply_settings_override(&base, &over).is_none());
        assert_eq!(std::fs::read_to_string(&base).unwrap(), "[1, 2]");
    }

    #[test]
    fn malformed_override_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("settings.json");
        let over = tmp.path().join("override.json");
        std::fs::write(&base, r#"{"a": 1}"#).unwrap();
        std::fs::write(&over, "{not json").unwrap();

        assert!(apply_settings_override(&base, &over).is_none());
        assert_eq!(std::fs::read_to_string(&base).unwrap(), r#"{"a": 1}"#);
    }
}
