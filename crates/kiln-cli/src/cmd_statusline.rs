use kiln_statusline::{collect, parse_status_input, render, StatusInput, StatusOptions};
use kiln_transcript::OrDefault;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// `kiln statusline [FILE]`
///
/// Always prints a line. Unreadable, stalled, or malformed input renders as
/// an empty payload rather than failing the host's refresh.
pub fn execute(file: Option<&Path>) -> anyhow::Result<ExitCode> {
    let opts = StatusOptions::from_env(Some(kiln_store::home_dir()));
    let color = crate::color_enabled();

    let rt = crate::runtime()?;
    let line = rt.block_on(async {
        let input = read_input(file, opts.deadline).await;
        let report = collect(&input, &opts).await;
        render(&report, color)
    });
    // A stdin read abandoned at the deadline still owns a blocking thread.
    rt.shutdown_background();

    println!("{line}");
    Ok(ExitCode::SUCCESS)
}

async fn read_input(file: Option<&Path>, deadline: Duration) -> StatusInput {
    let read = async {
        match file {
            Some(path) => tokio::fs::read_to_string(path).await,
            None => {
                let mut buf = String::new();
                tokio::io::stdin().read_to_string(&mut buf).await.map(|_| buf)
            }
        }
    };
    let raw = match tokio::time::timeout(deadline, read).await {
        Ok(result) => result.or_default_logged("status input read"),
        Err(_) => {
            tracing::debug!(?deadline, "status input not received in time");
            String::new()
        }
    };
    parse_status_input(&raw).or_default_logged("status input parse")
}
