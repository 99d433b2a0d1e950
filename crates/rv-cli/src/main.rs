mod completion;
mod dispatch;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rv_core::DEFAULT_KEEP;

#[derive(Parser, Debug)]
#[command(name = "rv")]
#[command(about = "Manage multiple release bundles locally", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RV_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Disable status badges and the progress spinner.
    #[arg(long, global = true)]
    plain: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Uncompress the specified archive into the workspace and update the `current` link
    Release {
        /// Directory that contains all available releases
        #[arg(short, long)]
        workspace: PathBuf,
        /// Path to archive file containing the release (.zip or .tar.gz)
        #[arg(short, long)]
        archive: PathBuf,
        /// Maximum number of releases to keep in workspace at all times
        #[arg(short, long, default_value_t = DEFAULT_KEEP, value_parser = parse_keep)]
        keep: usize,
        /// User to whom all extracted archive files will belong
        #[arg(short, long)]
        user: Option<String>,
        /// Group to whom all extracted archive files will belong
        #[arg(short, long)]
        group: Option<String>,
    },
    /// List all the releases in the workspace, newest first
    List {
        #[arg(short, long)]
        workspace: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Reset the current release and discard the newer ones
    Rewind {
        #[arg(short, long)]
        workspace: PathBuf,
        /// Target release to reset the current link to (defaults to the previous release)
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Print the version of rv
    Version,
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CliCompletionShell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

fn parse_keep(raw: &str) -> std::result::Result<usize, String> {
    let keep = raw
        .parse::<usize>()
        .map_err(|err| format!("invalid value for --keep (-k) flag: {err}"))?;
    if keep == 0 {
        return Err("zero is not a valid value for --keep (-k) flag".to_string());
    }
    Ok(keep)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    dispatch::run_cli(cli)
}
