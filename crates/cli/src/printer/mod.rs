use std::{
    io::{self, IsTerminal, Write},
    path::Path,
};

use driftsync_engine::{FolderStatus, Progress, ProgressSink};
use driftsync_model::{ActionKind, FileRecord, SyncAction};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with optional colors.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

/// Color handling strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Color when writing to a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self, is_terminal: bool) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => is_terminal,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrinterConfig {
    pub color: ColorChoice,
}

/// Everything a command can print besides errors.
///
/// Progress arrives through [`ProgressSink`]; the engine ignores write
/// failures there, so printers swallow them too.
pub trait Printer: ProgressSink {
    /// A reconciled plan, in execution order.
    fn actions(&mut self, actions: &[SyncAction]) -> io::Result<()>;

    /// A remote listing.
    fn records(&mut self, records: &[FileRecord]) -> io::Result<()>;

    fn status(&mut self, folder: &Path, status: FolderStatus) -> io::Result<()>;

    /// Confirmation of a single remote operation.
    fn note(&mut self, kind: &str, message: &str) -> io::Result<()>;
}

/// Human-readable printer with optional color support.
pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    /// Colors only when the config says `always`.
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        Self {
            out,
            err,
            use_color: cfg.color.enabled(false),
        }
    }

    /// Create a printer that writes to stdout and stderr with TTY detection.
    pub fn stdout(cfg: PrinterConfig) -> HumanPrinter<io::Stdout, io::Stderr> {
        let use_color = cfg.color.enabled(io::stdout().is_terminal());
        HumanPrinter {
            use_color,
            ..HumanPrinter::new(io::stdout(), io::stderr(), cfg)
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_owned()
        }
    }

    fn write_progress(&mut self, event: &Progress) -> io::Result<()> {
        match event {
            Progress::Started | Progress::Finished(_) => writeln!(self.out, "{}", event.message()),
            Progress::Applied { kind, name } => {
                let line = event.message();
                let head = line.strip_suffix(name.as_str()).unwrap_or(&line);
                let color = if kind.is_upload() { "36" } else { "32" };
                let name = self.paint(color, name);
                writeln!(self.out, "{head}{name}")
            }
            Progress::Failed { .. } => {
                let line = self.paint("31", &event.message());
                writeln!(self.err, "{line}")
            }
        }
    }
}

impl<W: Write, E: Write> ProgressSink for HumanPrinter<W, E> {
    fn on_progress(&mut self, event: &Progress) {
        let _ = self.write_progress(event);
    }
}

impl<W: Write, E: Write> Printer for HumanPrinter<W, E> {
    fn actions(&mut self, actions: &[SyncAction]) -> io::Result<()> {
        let mut pending = 0;
        for action in actions {
            let kind = action.kind();
            let label = format!("{:<16}", kind.as_str());
            let label = match kind {
                ActionKind::NoOp => self.paint("2", &label),
                k if k.is_upload() => self.paint("36", &label),
                _ => self.paint("32", &label),
            };
            if kind != ActionKind::NoOp {
                pending += 1;
            }
            writeln!(self.out, "{label}{}", action.name())?;
        }

        writeln!(
            self.out,
            "\n{pending} pending, {} unchanged",
            actions.len() - pending
        )
    }

    fn records(&mut self, records: &[FileRecord]) -> io::Result<()> {
        if records.is_empty() {
            return writeln!(self.out, "Remote store is empty.");
        }

        writeln!(
            self.out,
            "{:<32}  {:>10}  {:<19}  {:<12}  EDITED BY",
            "NAME", "SIZE", "MODIFIED", "UPLOADED BY"
        )?;
        writeln!(self.out, "{}", "-".repeat(96))?;

        for r in records {
            writeln!(
                self.out,
                "{:<32}  {:>10}  {:<19}  {:<12}  {}",
                r.name,
                r.size,
                r.modified_at.format(TIME_FORMAT),
                r.uploaded_by.as_deref().unwrap_or("-"),
                r.edited_by.as_deref().unwrap_or("-"),
            )?;
        }

        Ok(())
    }

    fn status(&mut self, folder: &Path, status: FolderStatus) -> io::Result<()> {
        match status {
            FolderStatus::Missing => {
                writeln!(self.err, "{}: local folder not found", folder.display())
            }
            FolderStatus::Drift(0) => writeln!(self.out, "{}: in sync", folder.display()),
            FolderStatus::Drift(n) => {
                let count = self.paint("33", &n.to_string());
                writeln!(self.out, "{}: {count} file(s) out of sync", folder.display())
            }
        }
    }

    fn note(&mut self, _kind: &str, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }
}

/// One JSON object per line on `out`, failures included.
pub struct JsonPrinter<W: Write> {
    out: W,
}

impl<W: Write> JsonPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Create a printer that writes to stdout.
    pub fn stdout() -> JsonPrinter<io::Stdout> {
        JsonPrinter::new(io::stdout())
    }

    fn write_progress(&mut self, event: &Progress) -> io::Result<()> {
        let obj = match event {
            Progress::Started => serde_json::json!({ "type": "started" }),
            Progress::Applied { kind, name } => serde_json::json!({
                "type": "applied",
                "kind": kind.as_str(),
                "name": name,
            }),
            Progress::Failed { name, error } => serde_json::json!({
                "type": "failed",
                "name": name,
                "error": error,
            }),
            Progress::Finished(report) => serde_json::json!({
                "type": "summary",
                "uploaded": report.uploaded,
                "downloaded": report.downloaded,
                "failed": report.failed,
                "cancelled": report.cancelled,
                "summary": report.summary,
            }),
        };
        writeln!(self.out, "{obj}")
    }
}

impl<W: Write> ProgressSink for JsonPrinter<W> {
    fn on_progress(&mut self, event: &Progress) {
        let _ = self.write_progress(event);
    }
}

impl<W: Write> Printer for JsonPrinter<W> {
    fn actions(&mut self, actions: &[SyncAction]) -> io::Result<()> {
        for action in actions {
            let obj = serde_json::json!({
                "type": "action",
                "kind": action.kind().as_str(),
                "name": action.name(),
                "file": action.record(),
            });
            writeln!(self.out, "{obj}")?;
        }
        Ok(())
    }

    fn records(&mut self, records: &[FileRecord]) -> io::Result<()> {
        for record in records {
            let obj = serde_json::json!({ "type": "file", "file": record });
            writeln!(self.out, "{obj}")?;
        }
        Ok(())
    }

    fn status(&mut self, folder: &Path, status: FolderStatus) -> io::Result<()> {
        let obj = serde_json::json!({
            "type": "status",
            "folder": folder.display().to_string(),
            "missing": status == FolderStatus::Missing,
            "code": status.code(),
        });
        writeln!(self.out, "{obj}")
    }

    fn note(&mut self, kind: &str, message: &str) -> io::Result<()> {
        let obj = serde_json::json!({ "type": kind, "message": message });
        writeln!(self.out, "{obj}")
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
