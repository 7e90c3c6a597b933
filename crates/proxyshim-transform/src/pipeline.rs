//! Single-file rewrite: parse, lower, inject, print.

use crate::config::TransformConfig;
use crate::inject::inject_runtime;
use crate::lower::{Lowering, LoweringStats};
use proxyshim_diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, SourceCache};
use proxyshim_parser::{parse_with_cache, print_program, to_span, ParseError, ParsedProgram, PrintError};
use proxyshim_runtime::NamesError;
use swc_common::{Globals, GLOBALS};
use thiserror::Error;

/// Result of rewriting one file.
#[derive(Debug)]
pub struct Rewritten {
    pub code: String,
    /// Sites left native
    pub diagnostics: Diagnostics,
    pub stats: LoweringStats,
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to load the dispatch runtime: {0}")]
    Runtime(ParseError),
    #[error(transparent)]
    Print(#[from] PrintError),
    #[error(transparent)]
    Names(#[from] NamesError),
}

impl RewriteError {
    /// The diagnostic to show for this error.
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            RewriteError::Parse(err) => err.diagnostic.clone(),
            RewriteError::Runtime(err) => {
                Diagnostic::error(DiagnosticCode::InternalError, err.message.clone()).build()
            }
            other => Diagnostic::error(DiagnosticCode::InternalError, other.to_string()).build(),
        }
    }
}

/// Rewrite `source` so that every property operation goes through the
/// dispatch runtime.
pub fn rewrite_source(
    source: &str,
    filename: &str,
    config: &TransformConfig,
) -> Result<Rewritten, RewriteError> {
    rewrite_with_cache(source, filename, config, &mut SourceCache::new())
}

/// Like [`rewrite_source`], registering the file in `cache` so diagnostics
/// can be rendered against it.
pub fn rewrite_with_cache(
    source: &str,
    filename: &str,
    config: &TransformConfig,
    cache: &mut SourceCache,
) -> Result<Rewritten, RewriteError> {
    config.dispatch.validate()?;

    let ParsedProgram {
        mut program,
        source_map,
        file_id,
        base,
    } = parse_with_cache(source, filename, cache)?;

    let mut diagnostics = Diagnostics::new();
    GLOBALS.set(&Globals::new(), || {
        let mut lowering = Lowering::new(config);
        lowering.lower_program(&mut program);

        for site in lowering.native_sites() {
            let mut builder = Diagnostic::warning(site.code, site.message())
                .with_span(to_span(site.span, base, file_id));
            if let Some(help) = site.help() {
                builder = builder.with_help(help);
            }
            diagnostics.push(builder.build());
        }

        if config.inject_runtime {
            inject_runtime(&mut program, &source_map, &config.dispatch)
                .map_err(RewriteError::Runtime)?;
        }

        let code = print_program(&program, &source_map)?;
        log::debug!(
            "{}: {} sites rewritten, {} diagnostics",
            filename,
            lowering.stats().rewritten(),
            diagnostics.len()
        );

        Ok(Rewritten {
            code,
            diagnostics,
            stats: lowering.stats(),
        })
    })
}
