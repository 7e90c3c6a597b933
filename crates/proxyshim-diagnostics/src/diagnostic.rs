//! Diagnostic values produced while parsing and rewriting.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// How serious a diagnostic is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, never affects the exit status
    Note,
    /// The file was rewritten but some operation stays native
    Warning,
    /// The file could not be rewritten
    Error,
}

impl Severity {
    /// Lowercase name as printed before the code, e.g. `warning`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable diagnostic codes.
///
/// `P` codes come from the parser, `N` codes mark property operations the
/// rewriter leaves native, `I` codes are internal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Source text could not be parsed
    ParseError,
    /// Optional member access or optional call is not intercepted
    NativeOptionalChain,
    /// Member target inside a destructuring pattern or loop head is written natively
    NativePatternTarget,
    /// The rewriter itself failed
    InternalError,
}

impl DiagnosticCode {
    pub const ALL: [DiagnosticCode; 4] = [
        DiagnosticCode::ParseError,
        DiagnosticCode::NativeOptionalChain,
        DiagnosticCode::NativePatternTarget,
        DiagnosticCode::InternalError,
    ];

    /// The stable code, e.g. `P001`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ParseError => "P001",
            Self::NativeOptionalChain => "N001",
            Self::NativePatternTarget => "N002",
            Self::InternalError => "I001",
        }
    }

    /// Look up a code by its string form, ignoring case.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(code))
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Self::ParseError | Self::InternalError => Severity::Error,
            Self::NativeOptionalChain | Self::NativePatternTarget => Severity::Warning,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message about a source file.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Stable code, see [`DiagnosticCode`]
    pub code: DiagnosticCode,
    pub severity: Severity,
    /// One-line summary
    pub message: String,
    /// Suggested fix, printed as `= help: ...`
    pub help: Option<String>,
    /// Location in the source; [`Span::DUMMY`] when there is none
    pub span: Span,
}

impl Diagnostic {
    /// Start building an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, Severity::Error, message)
    }

    /// Start building a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, Severity::Warning, message)
    }

    /// Start building a note.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, Severity::Note, message)
    }

    /// Diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(code, code.default_severity(), message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Builder returned by the [`Diagnostic`] constructors.
pub struct DiagnosticBuilder {
    inner: Diagnostic,
}

impl DiagnosticBuilder {
    /// A diagnostic with no span and no help text.
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            inner: Diagnostic {
                code,
                severity,
                message: message.into(),
                help: None,
                span: Span::DUMMY,
            },
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.inner.span = span;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.help = Some(help.into());
        self
    }

    /// Finish building the diagnostic.
    pub fn build(self) -> Diagnostic {
        self.inner
    }
}

/// Diagnostics collected for one run, in the order they were produced.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Every diagnostic pushed so far
    pub items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_warning()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
