mod cmd_config;
mod cmd_launch;
mod cmd_providers;
mod cmd_statusline;
mod cmd_tools;

use clap::{Parser, Subcommand};
use kiln_launch::ProviderId;
use owo_colors::OwoColorize;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kiln",
    version,
    about = "Launch Claude Code against alternate providers, and render its status line"
)]
struct Cli {
    /// Debug logging to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start Claude Code with provider routing and MCP tools applied
    Launch {
        /// Provider id or alias (zai, glm, kimi, moonshot, deepseek, minimax)
        #[arg(long, short)]
        provider: Option<ProviderId>,
        /// Print the composed command and environment instead of running it
        #[arg(long)]
        dry_run: bool,
        /// Arguments passed through to claude (after --)
        #[arg(last = true)]
        args: Vec<OsString>,
    },
    /// Render one status line from hook JSON (stdin, or FILE)
    Statusline {
        /// Read the hook payload from this file instead of stdin
        file: Option<PathBuf>,
    },
    /// List providers and whether their credentials are set
    Providers,
    /// Print the MCP manifest built from config.json
    Tools,
    /// Settings override management
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("kiln=debug,kiln_launch=debug,kiln_statusline=debug,kiln_transcript=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.cmd {
        Command::Launch {
            provider,
            dry_run,
            args,
        } => cmd_launch::execute(provider, dry_run, args),
        Command::Statusline { file } => cmd_statusline::execute(file.as_deref()),
        Command::Providers => cmd_providers::execute(),
        Command::Tools => cmd_tools::execute(),
        Command::Config { cmd } => cmd_config::run(cmd),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// A single-threaded runtime; every await point is I/O.
pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Honor https://no-color.org: any non-empty `NO_COLOR` disables ANSI.
pub(crate) fn color_enabled() -> bool {
    std::env::var_os("NO_COLOR").map_or(true, |v| v.is_empty())
}
