use std::fmt::Display;
use std::io::{self, Write};

use anstyle::{AnsiColor, Color, Style};
use zipseries_core::branding::PROGRAM_NAME;
use zipseries_core::{ErrorCategory, MigrationError, MigrationOutcome, Step};

/// Writes the operator-facing lines of a run.
///
/// ```text
/// zipSeries: save completed (1048576 bytes)
/// zipSeries: error: remote command error: restore: target host tgt rejected RSTLIB
///     CPF3773: 0 objects restored.
/// ```
pub struct ConsoleReporter<W: Write> {
    writer: W,
    styled: bool,
    error_style: Style,
    success_style: Style,
    detail_style: Style,
}

impl<W: Write> ConsoleReporter<W> {
    /// Creates a reporter; `styled` enables ANSI colours.
    pub fn new(writer: W, styled: bool) -> Self {
        Self {
            writer,
            styled,
            error_style: Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
            success_style: Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))),
            detail_style: Style::new().dimmed(),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes a plain `zipSeries: message` line.
    pub fn info(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.writer, "{PROGRAM_NAME}: {message}")
    }

    /// Writes a success line.
    pub fn success(&mut self, message: impl Display) -> io::Result<()> {
        let text = self.paint(self.success_style, &message.to_string());
        writeln!(self.writer, "{PROGRAM_NAME}: {text}")
    }

    /// Writes an error line followed by the host diagnostics, indented.
    pub fn error(&mut self, step: Option<Step>, error: &MigrationError) -> io::Result<()> {
        let label = self.paint(self.error_style, "error");
        let category = error.category();
        match step.filter(|_| category != ErrorCategory::Configuration) {
            Some(step) => writeln!(
                self.writer,
                "{PROGRAM_NAME}: {label}: {category}: {step}: {error}"
            )?,
            None => writeln!(self.writer, "{PROGRAM_NAME}: {label}: {category}: {error}")?,
        }
        for line in error.diagnostics() {
            let line = self.paint(self.detail_style, line);
            writeln!(self.writer, "    {line}")?;
        }
        Ok(())
    }

    /// Summarises a finished run: what completed, then what failed.
    pub fn outcome(&mut self, outcome: &MigrationOutcome) -> io::Result<()> {
        let report = outcome.report();
        if report.has_completed(Step::Save) {
            let transferred = report.has_completed(Step::Download);
            match report.bytes() {
                Some(bytes) if transferred => {
                    self.success(format_args!("save completed ({bytes} bytes)"))?;
                }
                _ => self.success("save completed")?,
            }
        }
        if report.has_completed(Step::Restore) {
            self.success("restore completed")?;
        }

        match outcome {
            MigrationOutcome::Success(report) => {
                if let Some(path) = report.artifact() {
                    self.info(format_args!("save file kept at {}", path.display()))?;
                }
            }
            MigrationOutcome::PartialFailure {
                report,
                failed,
                error,
            } => {
                self.error(Some(*failed), error)?;
                if let Some(path) = report.artifact() {
                    self.info(format_args!(
                        "save file kept at {}; restore it with --target-save-file",
                        path.display()
                    ))?;
                }
            }
            MigrationOutcome::Failure { step, error, .. } => self.error(Some(*step), error)?,
        }
        self.writer.flush()
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.styled {
            format!("{}{text}{}", style.render(), style.render_reset())
        } else {
            text.to_owned()
        }
    }
}
