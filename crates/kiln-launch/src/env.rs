use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

/// An immutable copy of a process environment.
///
/// Launch composition reads this instead of the live environment, so it can
/// be built and tested without touching global state. Values are kept as
/// `OsString` because the composed map fully replaces the child's
/// environment and nothing may be dropped on the way through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    vars: BTreeMap<OsString, OsString>,
}

impl EnvironmentSnapshot {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        std::env::vars_os().collect()
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.get_os(OsStr::new(key))
    }

    pub fn get_os(&self, key: &OsStr) -> Option<&OsStr> {
        self.vars.get(key).map(OsString::as_os_str)
    }

    /// The value as UTF-8, trimmed, if it is set and not blank.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(OsStr::to_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// A copy of the map, for layering.
    pub fn to_map(&self) -> BTreeMap<OsString, OsString> {
        self.vars.clone()
    }
}

impl<K: Into<OsString>, V: Into<OsString>> FromIterator<(K, V)> for EnvironmentSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_rejects_blank() {
        let env: EnvironmentSnapshot = [("A", "  value \n"), ("B", "   "), ("C", "")]
            .into_iter()
            .collect();
        assert_eq!(env.non_empty("A"), Some("value"));
        assert_eq!(env.non_empty("B"), None);
        assert_eq!(env.non_empty("C"), None);
        assert_eq!(env.non_empty("D"), None);
        assert_eq!(env.get("C"), Some(OsStr::new("")));
    }

    #[test]
    fn capture_matches_process_env() {
        let env = EnvironmentSnapshot::capture();
        assert_eq!(env.len(), std::env::vars_os().count());
    }
}
