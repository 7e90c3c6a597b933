//! JavaScript/TypeScript parser and printer wrapping SWC.
//!
//! Every file is parsed with [`parse_with_cache`], which registers the text in
//! a [`SourceCache`] so that diagnostics can point into it, and keeps the SWC
//! `SourceMap` alive so the rewritten tree can be printed back with
//! [`print_program`]. Additional sources that must end up in the same output
//! (the dispatch runtime) are parsed into that same map with [`parse_into`].

mod print;

use proxyshim_diagnostics::{Diagnostic, DiagnosticCode, FileId, SourceCache, Span};
use std::path::Path;
use swc_common::{input::StringInput, sync::Lrc, BytePos, FileName, SourceMap, Spanned};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, Syntax, TsSyntax};
use thiserror::Error;

pub use print::{print_program, PrintError};

// Re-export AST types for consumers that build or inspect trees
pub use swc_common;
pub use swc_ecma_ast;

const TARGET: EsVersion = EsVersion::Es2022;

/// A parsed file together with everything needed to report on it and print it.
pub struct ParsedProgram {
    pub program: Program,
    pub source_map: Lrc<SourceMap>,
    pub file_id: FileId,
    /// Offset of this file inside `source_map`; subtract it from SWC positions
    /// to get byte offsets into the original text.
    pub base: BytePos,
}

impl std::fmt::Debug for ParsedProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedProgram")
            .field("program", &self.program)
            .field("file_id", &self.file_id)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl ParsedProgram {
    /// Convert an SWC span of this file into a diagnostics span.
    pub fn span(&self, span: swc_common::Span) -> Span {
        to_span(span, self.base, self.file_id)
    }

    pub fn is_module(&self) -> bool {
        matches!(self.program, Program::Module(_))
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub diagnostic: Diagnostic,
}

/// Pick the grammar from the file extension: `.ts`/`.mts`/`.cts` and `.tsx`
/// select TypeScript, `.jsx` enables JSX, anything else is plain JavaScript.
pub fn syntax_for(filename: &str) -> Syntax {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match ext {
        "ts" | "mts" | "cts" | "tsx" => Syntax::Typescript(TsSyntax {
            tsx: ext == "tsx",
            decorators: true,
            dts: false,
            no_early_errors: false,
            disallow_ambiguous_jsx_like: false,
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: ext == "jsx",
            ..Default::default()
        }),
    }
}

/// Parse a file as a script or module (decided by the presence of
/// `import`/`export`) and register it in `cache`.
pub fn parse_with_cache(
    source: &str,
    filename: &str,
    cache: &mut SourceCache,
) -> Result<ParsedProgram, ParseError> {
    let file_id = cache.add_file(filename, source.to_string());
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );
    let base = source_file.start_pos;

    let lexer = Lexer::new(
        syntax_for(filename),
        TARGET,
        StringInput::from(&*source_file),
        None,
    );
    let mut parser = Parser::new_from(lexer);

    let program = parser
        .parse_program()
        .map_err(|e| parse_error(&e, filename, base, file_id))?;

    // Errors the parser recovered from (strict-mode early errors and the
    // like) still make the file invalid JavaScript.
    let mut recovered = parser.take_errors().into_iter();
    if let Some(first) = recovered.next() {
        for rest in recovered {
            log::debug!("{}: also: {}", filename, rest.kind().msg());
        }
        return Err(parse_error(&first, filename, base, file_id));
    }

    Ok(ParsedProgram {
        program,
        source_map,
        file_id,
        base,
    })
}

fn parse_error(
    error: &swc_ecma_parser::error::Error,
    filename: &str,
    base: BytePos,
    file_id: FileId,
) -> ParseError {
    let message = error.kind().msg().to_string();
    log::debug!("{}: parse failed: {}", filename, message);
    ParseError {
        diagnostic: Diagnostic::error(DiagnosticCode::ParseError, message.clone())
            .with_span(to_span(error.span(), base, file_id))
            .build(),
        message: format!("{}: {}", filename, message),
    }
}

/// Parse a file without a diagnostics cache.
pub fn parse(source: &str, filename: &str) -> Result<ParsedProgram, ParseError> {
    parse_with_cache(source, filename, &mut SourceCache::new())
}

/// Parse additional source text into an existing source map, so that nodes
/// from both texts can be printed together.
pub fn parse_into(
    source_map: &Lrc<SourceMap>,
    source: &str,
    name: &str,
) -> Result<Program, ParseError> {
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(name.to_string())),
        source.to_string(),
    );
    let base = source_file.start_pos;
    let lexer = Lexer::new(
        syntax_for(name),
        TARGET,
        StringInput::from(&*source_file),
        None,
    );

    Parser::new_from(lexer).parse_program().map_err(|e| {
        let message = format!("{}: {}", name, e.kind().msg());
        ParseError {
            diagnostic: Diagnostic::error(DiagnosticCode::InternalError, message.clone())
                .with_span(to_span(e.span(), base, FileId::DUMMY))
                .build(),
            message,
        }
    })
}

/// Convert an SWC span into a diagnostics span relative to the file start.
pub fn to_span(span: swc_common::Span, base: BytePos, file_id: FileId) -> Span {
    if span.is_dummy() {
        return Span::DUMMY;
    }
    Span::new(
        file_id,
        span.lo.0.saturating_sub(base.0),
        span.hi.0.saturating_sub(base.0),
    )
}
