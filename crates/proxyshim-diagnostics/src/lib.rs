//! Diagnostic infrastructure for the proxyshim rewriter.
//!
//! Rewriting never fails on a well-formed file, but it can leave some
//! property operations native (optional chains, destructuring targets) and it
//! can be handed files that do not parse. Both are reported as diagnostics:
//! - byte spans resolved to file/line/column through a [`SourceCache`]
//! - stable codes (`P001`, `N001`, ...) that `proxyshim explain` documents
//! - terminal and JSON renderings
//!
//! # Example
//!
//! ```
//! use proxyshim_diagnostics::{
//!     Diagnostic, DiagnosticCode, DiagnosticEmitter, SourceCache, Span, TerminalEmitter,
//! };
//!
//! let mut cache = SourceCache::new();
//! let file = cache.add_file("app.js", "config?.port;".to_string());
//!
//! let diag = Diagnostic::warning(DiagnosticCode::NativeOptionalChain, "optional access left native")
//!     .with_span(Span::new(file, 0, 12))
//!     .with_help("check for null explicitly if the receiver may be a virtual object")
//!     .build();
//!
//! let mut out = Vec::new();
//! TerminalEmitter::new(&mut out, false).emit(&diag, &cache).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("warning[N001]"));
//! ```

pub mod diagnostic;
pub mod emitter;
pub mod source_cache;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Diagnostics, Severity};
pub use emitter::{DiagnosticEmitter, JsonEmitter, TerminalEmitter};
pub use source_cache::{SourceCache, SourceFile};
pub use span::{FileId, Location, Span};
