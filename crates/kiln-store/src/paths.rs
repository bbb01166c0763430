use std::path::{Path, PathBuf};

/// All well-known paths kiln reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KilnPaths {
    /// `~/.kiln/`, or `$KILN_HOME`.
    pub kiln_dir: PathBuf,
    /// kiln's own config: `~/.kiln/config.json`.
    pub config_json: PathBuf,
    /// Base assistant settings, merged into in place: `~/.claude/settings.json`.
    pub settings_json: PathBuf,
    /// Layer applied on top of `settings_json` at launch.
    pub settings_override_json: PathBuf,
}

impl KilnPaths {
    /// Derive all paths from a home directory. Pure computation, no I/O.
    pub fn discover(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        let kiln_dir = home.join(".kiln");
        Self {
            config_json: kiln_dir.join("config.json"),
            settings_override_json: kiln_dir.join("settings.override.json"),
            settings_json: home.join(".claude").join("settings.json"),
            kiln_dir,
        }
    }

    /// Like [`discover`](Self::discover), then apply `KILN_*` path overrides
    /// looked up through `var`.
    pub fn resolve(home: &Path, var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let mut paths = match non_empty("KILN_HOME") {
            Some(dir) => {
                let mut p = Self::discover(home);
                p.kiln_dir = PathBuf::from(dir);
                p.config_json = p.kiln_dir.join("config.json");
                p.settings_override_json = p.kiln_dir.join("settings.override.json");
                p
            }
            None => Self::discover(home),
        };
        if let Some(path) = non_empty("KILN_SETTINGS_PATH") {
            paths.settings_json = PathBuf::from(path);
        }
        if let Some(path) = non_empty("KILN_SETTINGS_OVERRIDE_PATH") {
            paths.settings_override_json = PathBuf::from(path);
        }
        paths
    }

    /// Resolve against the real home directory and process environment.
    pub fn from_env() -> Self {
        Self::resolve(&crate::home_dir(), |key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn discover_layout() {
        let p = KilnPaths::discover("/home/user");
        assert_eq!(p.kiln_dir, PathBuf::from("/home/user/.kiln"));
        assert_eq!(p.config_json, PathBuf::from("/home/user/.kiln/config.json"));
        assert_eq!(
            p.settings_json,
            PathBuf::from("/home/user/.claude/settings.json")
        );
        assert_eq!(
            p.settings_override_json,
            PathBuf::from("/home/user/.kiln/settings.override.json")
        );
    }

    #[test]
    fn resolve_without_overrides_matches_discover() {
        let p = KilnPaths::resolve(Path::new("/home/user"), |_| None);
        assert_eq!(p, KilnPaths::discover("/home/user"));
    }

    #[test]
    fn resolve_applies_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("KILN_HOME", "/opt/kiln"),
            ("KILN_SETTINGS_PATH", "/tmp/settings.json"),
            ("KILN_SETTINGS_OVERRIDE_PATH", "   "),
        ]
        .into_iter()
        .collect();
        let p = KilnPaths::resolve(Path::new("/home/user"), |k| {
            vars.get(k).map(|v| v.to_string())
        });
        assert_eq!(p.config_json, PathBuf::from("/opt/kiln/config.json"));
        assert_eq!(p.settings_json, PathBuf::from("/tmp/settings.json"));
        // Blank override is ignored.
        assert_eq!(
            p.settings_override_json,
            PathBuf::from("/opt/kiln/settings.override.json")
        );
    }
}
