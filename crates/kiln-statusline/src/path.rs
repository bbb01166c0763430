use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Short display form of a working directory.
///
/// 1. inside a git repo: `<root-name>` or `<root-name>/<relative>`;
/// 2. under `home`: `~` or `~/<relative>`;
/// 3. otherwise the last two path segments.
pub fn display_path(path: &Path, repo_root: Option<&Path>, home: Option<&Path>) -> String {
    if let Some(root) = repo_root {
        if let Ok(rel) = path.strip_prefix(root) {
            let root_name = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| root.display().to_string());
            let rel = join_segments(rel);
            return if rel.is_empty() {
                root_name
            } else {
                format!("{root_name}/{rel}")
            };
        }
    }

    if let Some(home) = home {
        if let Ok(rel) = path.strip_prefix(home) {
            let rel = join_segments(rel);
            return if rel.is_empty() {
                "~".to_string()
            } else {
                format!("~/{rel}")
            };
        }
    }

    let segments = normal_segments(path);
    match segments.len() {
        0 => path.display().to_string(),
        n => segments[n.saturating_sub(2)..].join("/"),
    }
}

fn normal_segments(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn join_segments(path: &Path) -> String {
    normal_segments(path).join("/")
}

/// Ask git for the repository root containing `dir`.
///
/// Every failure (git missing, not a repository, unreadable dir) is `None`.
pub async fn probe_git_root(dir: &Path) -> Option<PathBuf> {
    let result = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let root = stdout.trim();
            if root.is_empty() {
                None
            } else {
                Some(PathBuf::from(root))
            }
        }
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "git probe failed");
            None
        }
    }
}

/// Probe for a repo root, then pick the display form.
///
/// git reports the root with symlinks resolved, so the repo branch compares
/// against the canonicalized `dir`; the other branches use `dir` as given.
pub async fn resolve_display_path(dir: &Path, home: Option<&Path>) -> String {
    if let Some(root) = probe_git_root(dir).await {
        let canonical = tokio::fs::canonicalize(dir)
            .await
            .unwrap_or_else(|_| dir.to_path_buf());
        let root = tokio::fs::canonicalize(&root).await.unwrap_or(root);
        if canonical.starts_with(&root) {
            return display_path(&canonical, Some(&root), home);
        }
    }
    display_path(dir, None, home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_subdir() {
        let out = display_path(
            Path::new("/home/user/projects/repo/src"),
            Some(Path::new("/home/user/projects/repo")),
            Some(Path::new("/home/user")),
        );
        assert_eq!(out, "repo/src");
    }

    #[test]
    fn repo_root_itself() {
        let out = display_path(
            Path::new("/home/user/projects/repo"),
            Some(Path::new("/home/user/projects/repo")),
            Some(Path::new("/home/user")),
        );
        assert_eq!(out, "repo");
    }

    #[test]
    fn nested_repo_subdir() {
        let out = display_path(
            Path::new("/srv/repo/crates/core/src"),
            Some(Path::new("/srv/repo")),
            None,
        );
        assert_eq!(out, "repo/crates/core/src");
    }

    #[test]
    fn home_relative_outside_repo() {
        let out = display_path(
            Path::new("/home/user/docs"),
            None,
            Some(Path::new("/home/user")),
        );
        assert_eq!(out, "~/docs");
    }

    #[test]
    fn home_itself() {
        let out = display_path(Path::new("/home/user"), None, Some(Path::new("/home/user")));
        assert_eq!(out, "~");
    }

    #[test]
    fn home_prefix_must_be_whole_segment() {
        // /home/username is not under /home/user.
        let out = display_path(
            Path::new("/home/username/x"),
            None,
            Some(Path::new("/home/user")),
        );
        assert_eq!(out, "username/x");
    }

    #[test]
    fn last_two_segments_elsewhere() {
        let out = display_path(
            Path::new("/var/lib/postgres/data"),
            None,
            Some(Path::new("/home/user")),
        );
        assert_eq!(out, "postgres/data");
    }

    #[test]
    fn short_paths() {
        assert_eq!(display_path(Path::new("/opt"), None, None), "opt");
        assert_eq!(display_path(Path::new("/"), None, None), "/");
    }

    #[test]
    fn root_outside_path_falls_through() {
        let out = display_path(
            Path::new("/home/user/docs"),
            Some(Path::new("/srv/repo")),
            Some(Path::new("/home/user")),
        );
        assert_eq!(out, "~/docs");
    }

    async fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn resolves_inside_real_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = tmp.path().join("myrepo");
        std::fs::create_dir_all(repo.join("src").join("bin")).unwrap();
        if !git(&repo, &["init", "-q"]).await {
            // git unavailable on this machine
            return;
        }

        let out = resolve_display_path(&repo.join("src").join("bin"), None).await;
        assert_eq!(out, "myrepo/src/bin");

        let out = resolve_display_path(&repo, None).await;
        assert_eq!(out, "myrepo");
    }

    /// A `.git` file pointing nowhere makes git stop here with an error,
    /// even when the temp dir sits inside some outer checkout.
    fn fence_off_git(dir: &Path) {
        std::fs::write(dir.join(".git"), "gitdir: /nonexistent/kiln-fence\n").unwrap();
    }

    #[tokio::test]
    async fn non_repo_uses_home_branch() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path().join("home");
        let docs = home.join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        fence_off_git(&home);

        assert!(probe_git_root(&docs).await.is_none());
        assert_eq!(resolve_display_path(&docs, Some(&home)).await, "~/docs");
    }

    #[tokio::test]
    async fn missing_dir_is_not_an_error() {
        let out = resolve_display_path(Path::new("/definitely/not/here"), None).await;
        assert_eq!(out, "not/here");
    }
}
