use kiln_launch::{registry, EnvironmentSnapshot, ProviderConfig};
use owo_colors::OwoColorize;
use std::process::ExitCode;

/// `kiln providers`
pub fn execute() -> anyhow::Result<ExitCode> {
    let env = EnvironmentSnapshot::capture();
    let color = crate::color_enabled();
    for provider in registry() {
        println!("{}", provider_line(provider, &env, color));
    }
    Ok(ExitCode::SUCCESS)
}

fn provider_line(p: &ProviderConfig, env: &EnvironmentSnapshot, color: bool) -> String {
    let ready = p.validate(env).is_ok();
    let status = match (ready, color) {
        (true, true) => "ready".green().to_string(),
        (false, true) => "missing".red().to_string(),
        (true, false) => "ready".to_string(),
        (false, false) => "missing".to_string(),
    };
    format!(
        "{:<9} {:<14} {:<17} {:<8} {}",
        p.id.as_str(),
        p.name,
        p.credential_var,
        status,
        p.base_url
    )
}
