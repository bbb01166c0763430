use kiln_launch::{KilnConfig, ToolManifest};
use kiln_store::KilnPaths;
use std::process::ExitCode;

/// `kiln tools`: the manifest `kiln launch` would hand to `--mcp-config`.
pub fn execute() -> anyhow::Result<ExitCode> {
    let paths = KilnPaths::from_env();
    let config = KilnConfig::load(&paths.config_json)?;
    let manifest = ToolManifest::build(&config.tools);
    println!("{}", manifest.to_json()?);
    if manifest.is_empty() {
        eprintln!(
            "No enabled tools in {}; launch will not pass --mcp-config.",
            paths.config_json.display()
        );
    }
    Ok(ExitCode::SUCCESS)
}
