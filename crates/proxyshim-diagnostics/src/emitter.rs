//! Rendering diagnostics for people and for tools.

use crate::diagnostic::{Diagnostic, Diagnostics, Severity};
use crate::source_cache::SourceCache;
use std::io::Write;

pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()>;

    fn emit_all(&mut self, diagnostics: &Diagnostics, cache: &SourceCache) -> std::io::Result<()> {
        for diag in diagnostics {
            self.emit(diag, cache)?;
        }
        Ok(())
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()>;
}

/// Human-oriented output with an excerpt of the offending line:
///
/// ```text
/// warning[N001]: optional chain is evaluated natively and bypasses virtual objects
///   --> app.js:2:8
///    |
///  2 | return config?.port;
///    |        ^^^^^^^^^^^^
///   = help: check for null explicitly if the receiver may be a virtual object
/// ```
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colored: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colored: bool) -> Self {
        Self { writer, colored }
    }

    fn paint(&self, ansi: &'static str) -> &'static str {
        if self.colored {
            ansi
        } else {
            ""
        }
    }

    fn severity_color(&self, severity: Severity) -> &'static str {
        self.paint(match severity {
            Severity::Error => "\x1b[31m",
            Severity::Warning => "\x1b[33m",
            Severity::Note => "\x1b[34m",
        })
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()> {
        let color = self.severity_color(diagnostic.severity);
        let bold = self.paint("\x1b[1m");
        let gutter = self.paint("\x1b[36m");
        let reset = self.paint("\x1b[0m");

        writeln!(
            self.writer,
            "{bold}{color}{}[{}]{reset}: {}",
            diagnostic.severity, diagnostic.code, diagnostic.message
        )?;

        if let Some(loc) = cache.location(diagnostic.span) {
            writeln!(self.writer, "  {gutter}-->{reset} {loc}")?;

            if let Some(line_text) = cache.line_text(diagnostic.span) {
                let number = loc.line.to_string();
                let pad = " ".repeat(number.len());
                let lead = (loc.column as usize).saturating_sub(1);
                let width = (diagnostic.span.len() as usize)
                    .min(line_text.len().saturating_sub(lead))
                    .max(1);

                writeln!(self.writer, "{pad} {gutter}|{reset}")?;
                writeln!(self.writer, "{gutter}{number} |{reset} {line_text}")?;
                writeln!(
                    self.writer,
                    "{pad} {gutter}|{reset} {}{color}{}{reset}",
                    " ".repeat(lead),
                    "^".repeat(width)
                )?;
            }
        }

        if let Some(help) = &diagnostic.help {
            writeln!(self.writer, "  {gutter}= help:{reset} {help}")?;
        }
        writeln!(self.writer)
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()> {
        let errors = diagnostics.error_count();
        let warnings = diagnostics.warning_count();
        if errors == 0 && warnings == 0 {
            return Ok(());
        }

        let color = if errors > 0 {
            self.severity_color(Severity::Error)
        } else {
            self.severity_color(Severity::Warning)
        };
        let reset = self.paint("\x1b[0m");
        let plural = |n: usize| if n == 1 { "" } else { "s" };

        let mut parts = Vec::new();
        if errors > 0 {
            parts.push(format!("{errors} error{}", plural(errors)));
        }
        if warnings > 0 {
            parts.push(format!("{warnings} warning{}", plural(warnings)));
        }
        writeln!(self.writer, "{color}{} emitted{reset}", parts.join(" and "))
    }
}

/// One JSON object per line, for editor and CI integration.
pub struct JsonEmitter<W: Write> {
    writer: W,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic, cache: &SourceCache) -> std::io::Result<()> {
        let location = cache.location(diagnostic.span).map(|l| {
            serde_json::json!({
                "file": l.file,
                "line": l.line,
                "column": l.column,
            })
        });
        let span = (!diagnostic.span.is_dummy()).then(|| {
            serde_json::json!({
                "start": diagnostic.span.start,
                "end": diagnostic.span.end,
            })
        });

        let json = serde_json::json!({
            "code": diagnostic.code.as_str(),
            "severity": diagnostic.severity.as_str(),
            "message": diagnostic.message,
            "location": location,
            "span": span,
            "help": diagnostic.help,
        });
        serde_json::to_writer(&mut self.writer, &json)?;
        writeln!(self.writer)
    }

    fn emit_summary(&mut self, diagnostics: &Diagnostics) -> std::io::Result<()> {
        let summary = serde_json::json!({
            "type": "summary",
            "errors": diagnostics.error_count(),
            "warnings": diagnostics.warning_count(),
            "total": diagnostics.len(),
        });
        serde_json::to_writer(&mut self.writer, &summary)?;
        writeln!(self.writer)
    }
}
