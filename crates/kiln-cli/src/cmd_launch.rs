use kiln_launch::{
    prepare_launch, run_launch, ClaudeProcess, EnvironmentSnapshot, KilnConfig, LaunchRequest,
    ProviderId,
};
use kiln_store::KilnPaths;
use std::ffi::OsString;
use std::process::ExitCode;

/// `kiln launch [--provider ID] [--dry-run] [-- ARGS...]`
pub fn execute(
    provider: Option<ProviderId>,
    dry_run: bool,
    args: Vec<OsString>,
) -> anyhow::Result<ExitCode> {
    let paths = KilnPaths::from_env();
    let config = KilnConfig::load_or_default(&paths.config_json);
    tracing::debug!(config = %paths.config_json.display(), tools = config.tools.len(), "loaded config");
    let env = EnvironmentSnapshot::capture();

    let plan = prepare_launch(
        LaunchRequest {
            provider,
            args,
            dry_run,
        },
        &paths,
        &config,
        &env,
    )?;

    if dry_run {
        print!("{}", plan.describe());
        plan.finish();
        return Ok(ExitCode::SUCCESS);
    }

    let code = crate::runtime()?.block_on(run_launch(plan, &ClaudeProcess))?;
    Ok(exit_code(code))
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(exit_byte(code))
}

/// Out-of-range child codes become 1.
fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
