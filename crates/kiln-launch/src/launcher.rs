use crate::compose::LaunchPlan;
use crate::error::LaunchError;
use std::process::Stdio;

/// Exit code reported when the child was killed by a signal.
pub const SIGNALED_EXIT_CODE: i32 = 1;

/// Runs a composed plan to completion. Implemented by [`ClaudeProcess`]
/// and by test doubles.
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Returns the child's exit code.
    async fn run(&self, plan: &LaunchPlan) -> Result<i32, LaunchError>;
}

/// Spawns the real assistant with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClaudeProcess;

#[async_trait::async_trait]
impl ProcessRunner for ClaudeProcess {
    async fn run(&self, plan: &LaunchPlan) -> Result<i32, LaunchError> {
        let mut cmd = tokio::process::Command::new(&plan.program);
        cmd.args(&plan.args)
            .env_clear()
            .envs(&plan.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
            program: plan.program.clone(),
            source,
        })?;
        tracing::debug!(pid = ?child.id(), program = %plan.program.display(), "spawned");

        // The terminal delivers Ctrl-C to the whole process group; the child
        // handles it, kiln just keeps waiting.
        let mut listen = true;
        let status = loop {
            tokio::select! {
                status = child.wait() => break status,
                signal = tokio::signal::ctrl_c(), if listen => match signal {
                    Ok(()) => tracing::debug!("interrupt received; waiting for child"),
                    Err(e) => {
                        tracing::warn!(error = %e, "cannot listen for interrupts");
                        listen = false;
                    }
                },
            }
        }
        .map_err(|source| LaunchError::Wait {
            program: plan.program.clone(),
            source,
        })?;

        let code = status.code().unwrap_or(SIGNALED_EXIT_CODE);
        tracing::debug!(code, "child exited");
        Ok(code)
    }
}

/// Run `plan` and clean up its manifest whatever the outcome.
pub async fn run_launch(plan: LaunchPlan, runner: &dyn ProcessRunner) -> Result<i32, LaunchError> {
    let result = runner.run(&plan).await;
    plan.finish();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{prepare_launch, LaunchRequest, MCP_CONFIG_FLAG};
    use crate::config::KilnConfig;
    use crate::env::EnvironmentSnapshot;
    use crate::manifest::ToolDescriptor;
    use kiln_store::KilnPaths;
    use std::ffi::OsString;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records what it was asked to run and returns a canned exit code.
    struct MockRunner {
        code: i32,
        seen: Mutex<Vec<(PathBuf, Vec<OsString>, bool)>>,
    }

    impl MockRunner {
        fn new(code: i32) -> Self {
            Self {
                code,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ProcessRunner for MockRunner {
        async fn run(&self, plan: &LaunchPlan) -> Result<i32, LaunchError> {
            let manifest_exists = plan.manifest_path().is_some_and(|p| p.exists());
            self.seen
                .lock()
                .unwrap()
                .push((plan.program.clone(), plan.args.clone(), manifest_exists));
            Ok(self.code)
        }
    }

    fn plan_with_tools(dir: &std::path::Path, env: EnvironmentSnapshot) -> LaunchPlan {
        let config = KilnConfig {
            tools: vec![ToolDescriptor {
                name: "fs".into(),
                command: Some("mcp-fs /srv".into()),
                ..ToolDescriptor::default()
            }],
            ..KilnConfig::default()
        };
        prepare_launch(
            LaunchRequest {
                args: vec!["--continue".into()],
                ..LaunchRequest::default()
            },
            &KilnPaths::discover(dir),
            &config,
            &env,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn mock_run_propagates_code_and_cleans_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = plan_with_tools(tmp.path(), EnvironmentSnapshot::default());
        let manifest = plan.manifest_path().unwrap().to_path_buf();

        let runner = MockRunner::new(7);
        let code = run_launch(plan, &runner).await.unwrap();
        assert_eq!(code, 7);
        assert!(!manifest.exists());

        let seen = runner.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (program, args, manifest_existed) = &seen[0];
        assert_eq!(program, &PathBuf::from("claude"));
        assert_eq!(args[0], OsString::from("--continue"));
        assert_eq!(args[1], OsString::from(MCP_CONFIG_FLAG));
        assert!(*manifest_existed);
    }

    #[tokio::test]
    async fn spawn_failure_is_reported_and_cleans_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let env: EnvironmentSnapshot = [("KILN_CLAUDE_BIN", "/nonexistent/kiln-test-claude")]
            .into_iter()
            .collect();
        let plan = plan_with_tools(tmp.path(), env);
        let manifest = plan.manifest_path().unwrap().to_path_buf();

        let err = run_launch(plan, &ClaudeProcess).await.unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
        assert!(err.to_string().contains("/nonexistent/kiln-test-claude"));
        assert!(!manifest.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn real_child_exit_code_propagates() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = prepare_launch(
            LaunchRequest {
                args: vec!["-c".into(), "exit 3".into()],
                ..LaunchRequest::default()
            },
            &KilnPaths::discover(tmp.path()),
            &KilnConfig {
                claude_bin: Some(PathBuf::from("/bin/sh")),
                ..KilnConfig::default()
            },
            &EnvironmentSnapshot::default(),
        )
        .unwrap();
        assert_eq!(run_launch(plan, &ClaudeProcess).await.unwrap(), 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn child_sees_only_composed_env() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join("marker");
        let script = format!(
            "test -z \"$HOME\" && test \"$ANTHROPIC_AUTH_TOKEN\" = mm && : > '{}'",
            marker.display()
        );
        let env: EnvironmentSnapshot = [("MINIMAX_API_KEY", "mm")].into_iter().collect();
        let plan = prepare_launch(
            LaunchRequest {
                provider: Some(crate::provider::ProviderId::MiniMax),
                args: vec!["-c".into(), script.into()],
                ..LaunchRequest::default()
            },
            &KilnPaths::discover(tmp.path()),
            &KilnConfig {
                claude_bin: Some(PathBuf::from("/bin/sh")),
                ..KilnConfig::default()
            },
            &env,
        )
        .unwrap();
        assert_eq!(run_launch(plan, &ClaudeProcess).await.unwrap(), 0);
        assert!(marker.exists());
    }
}
