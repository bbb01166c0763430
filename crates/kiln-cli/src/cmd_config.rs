use clap::Subcommand;
use kiln_launch::{merge_settings_files, MergeOutcome};
use kiln_store::KilnPaths;
use std::process::ExitCode;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Merge settings.override.json into the Claude settings file now
    Merge,
    /// Show the paths kiln reads and writes
    Paths,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd) -> anyhow::Result<ExitCode> {
    let paths = KilnPaths::from_env();
    match cmd {
        ConfigCmd::Merge => merge(&paths),
        ConfigCmd::Paths => show_paths(&paths),
    }
    .map(|()| ExitCode::SUCCESS)
}

// ── Command Implementations ──

/// `kiln config merge`. Unlike the merge at launch, failures are errors here.
fn merge(paths: &KilnPaths) -> anyhow::Result<()> {
    match merge_settings_files(&paths.settings_json, &paths.settings_override_json)? {
        MergeOutcome::NoOverride => println!(
            "No override at {}; nothing to merge.",
            paths.settings_override_json.display()
        ),
        MergeOutcome::Unchanged => {
            println!("{} already up to date.", paths.settings_json.display())
        }
        MergeOutcome::Written { keys } => println!(
            "Merged {} key(s) into {}: {}",
            keys.len(),
            paths.settings_json.display(),
            keys.join(", ")
        ),
    }
    Ok(())
}

fn show_paths(paths: &KilnPaths) -> anyhow::Result<()> {
    println!("kiln dir:  {}", paths.kiln_dir.display());
    println!("config:    {}", paths.config_json.display());
    println!("settings:  {}", paths.settings_json.display());
    println!("override:  {}", paths.settings_override_json.display());
    Ok(())
}
