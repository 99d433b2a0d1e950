use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rv_core::OwnerSpec;
use rv_installer::{
    install_release, list_releases, rewind_release, InstallOptions, WorkspaceLayout,
};
use tracing::debug;

use crate::completion::write_completions_script;
use crate::render::{
    format_release_lines, render_status_line, resolve_output_style, OutputStyle,
    TerminalProgress,
};
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let style = resolve_output_style(cli.plain);
    // unlocked handle: the spinner thread also writes to stdout
    let mut stdout = io::stdout();
    debug!(command = ?cli.command, "dispatching command");

    match cli.command {
        Commands::Release {
            workspace,
            archive,
            keep,
            user,
            group,
        } => {
            let options = InstallOptions {
                workspace,
                bundle: archive,
                keep,
                owner: OwnerSpec::new(user, group),
            };
            run_release_command(&options, style, &mut stdout)
        }
        Commands::List { workspace, json } => {
            run_list_command(&workspace, json, style, &mut stdout)
        }
        Commands::Rewind { workspace, target } => {
            run_rewind_command(&workspace, target.as_deref(), style, &mut stdout)
        }
        Commands::Version => {
            writeln!(stdout, "{}", version_line()).context("failed writing version")
        }
        Commands::Completions { shell } => write_completions_script(shell, &mut stdout),
    }
}

pub(crate) fn version_line() -> String {
    let commit = option_env!("RV_GIT_COMMIT").unwrap_or("unknown");
    format!("{} [{commit}]", env!("CARGO_PKG_VERSION"))
}

pub(crate) fn run_release_command(
    options: &InstallOptions,
    style: OutputStyle,
    out: &mut dyn Write,
) -> Result<()> {
    let mut progress = TerminalProgress::start(style, "release", out);
    let result = install_release(options, &mut progress);
    progress.finish();
    let outcome = result?;

    writeln!(
        out,
        "{}",
        render_status_line(
            style,
            "ok",
            &format!("active version is {}", outcome.release_id)
        )
    )
    .context("failed writing release summary")?;

    if let Some(err) = outcome.prune_error {
        writeln!(out, "{}", render_status_line(style, "warn", &format!("{err:#}")))
            .context("failed writing release summary")?;
        return Err(err.context(format!(
            "release {} is active but old releases were not cleaned up",
            outcome.release_id
        )));
    }
    Ok(())
}

pub(crate) fn run_list_command(
    workspace: &Path,
    json: bool,
    style: OutputStyle,
    out: &mut dyn Write,
) -> Result<()> {
    let layout = WorkspaceLayout::absolute(workspace)?;
    let releases = list_releases(&layout)?;
    if json {
        let rendered = serde_json::to_string_pretty(&releases)
            .context("failed to serialize release list")?;
        writeln!(out, "{rendered}").context("failed writing release list")?;
        return Ok(());
    }
    for line in format_release_lines(&releases, style) {
        writeln!(out, "{line}").context("failed writing release list")?;
    }
    Ok(())
}

pub(crate) fn run_rewind_command(
    workspace: &Path,
    target: Option<&str>,
    style: OutputStyle,
    out: &mut dyn Write,
) -> Result<()> {
    let layout = WorkspaceLayout::absolute(workspace)?;
    let mut progress = TerminalProgress::start(style, "rewind", out);
    let result = rewind_release(&layout, target, &mut progress);
    progress.finish();
    let outcome = result?;

    writeln!(
        out,
        "{}",
        render_status_line(
            style,
            "ok",
            &format!("active version is {}", outcome.target)
        )
    )
    .context("failed writing rewind summary")?;

    if let Some(err) = outcome.cleanup_error {
        writeln!(out, "{}", render_status_line(style, "warn", &format!("{err:#}")))
            .context("failed writing rewind summary")?;
        return Err(err.context(format!(
            "current now points to {} but newer releases were not fully removed",
            outcome.target
        )));
    }
    Ok(())
}
