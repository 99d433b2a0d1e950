use std::env;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use anstyle::{AnsiColor, Effects, Style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rv_installer::ReleaseEntry;

pub(crate) const CURRENT_MARKER: &str = " <== current";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn resolve_output_style(force_plain: bool) -> OutputStyle {
    if force_plain || env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal() {
        OutputStyle::Plain
    } else {
        OutputStyle::Rich
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => format!("{} {message}", status_badge(status)),
    }
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "ok" => "[OK]",
        "warn" => "[WARN]",
        "err" => "[ERR]",
        _ => "[..]",
    }
}

pub(crate) fn format_release_lines(releases: &[ReleaseEntry], style: OutputStyle) -> Vec<String> {
    releases
        .iter()
        .map(|release| {
            if !release.current {
                return release.id.clone();
            }
            match style {
                OutputStyle::Plain => format!("{}{CURRENT_MARKER}", release.id),
                OutputStyle::Rich => {
                    format!("{}{}", release.id, colorize(current_style(), CURRENT_MARKER))
                }
            }
        })
        .collect()
}

fn current_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightGreen.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

fn progress_tick_chars(label: &str) -> &'static str {
    match label {
        "release" => ".oO@* ",
        "rewind" => "<^>v ",
        _ => "|/-\\ ",
    }
}

/// Output sink handed to the installer. Each complete line becomes a `step` status line; in
/// rich mode lines are printed above a spinner.
pub(crate) struct TerminalProgress<'a> {
    style: OutputStyle,
    writer: &'a mut dyn Write,
    pending: Vec<u8>,
    progress_bar: Option<ProgressBar>,
}

impl<'a> TerminalProgress<'a> {
    pub(crate) fn start(style: OutputStyle, label: &str, writer: &'a mut dyn Write) -> Self {
        let progress_bar = if style == OutputStyle::Rich {
            let progress_bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
            if let Ok(spinner) = ProgressStyle::with_template("{spinner:.cyan.bold} {msg}") {
                progress_bar.set_style(spinner.tick_chars(progress_tick_chars(label)));
            }
            progress_bar.set_message(label.to_string());
            progress_bar.enable_steady_tick(Duration::from_millis(80));
            Some(progress_bar)
        } else {
            None
        };

        Self {
            style,
            writer,
            pending: Vec::new(),
            progress_bar,
        }
    }

    pub(crate) fn finish(mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&String::from_utf8_lossy(&rest));
        }
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
    }

    fn emit(&mut self, line: &str) {
        let rendered = render_status_line(self.style, "step", line);
        match &self.progress_bar {
            Some(progress_bar) => progress_bar.println(rendered),
            None => {
                let _ = writeln!(self.writer, "{rendered}");
            }
        }
    }
}

impl Write for TerminalProgress<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(newline) = self.pending.iter().position(|byte| *byte == b'\n') {
            let line = self.pending.drain(..=newline).collect::<Vec<_>>();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            self.emit(&text);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
