//! CLI command implementations

pub mod check;
pub mod explain;
pub mod init;
pub mod rewrite;
pub mod run;

use anyhow::Result;
use proxyshim_diagnostics::{
    DiagnosticEmitter, Diagnostics, JsonEmitter, SourceCache, TerminalEmitter,
};

use crate::{Output, OutputFormat};

/// Write diagnostics to stderr in the selected format.
pub fn emit_diagnostics(
    diagnostics: &Diagnostics,
    cache: &SourceCache,
    output: Output,
) -> Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    let stderr = std::io::stderr();
    match output.format {
        OutputFormat::Text => {
            let mut emitter = TerminalEmitter::new(stderr.lock(), output.use_color);
            emitter.emit_all(diagnostics, cache)?;
        }
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(stderr.lock());
            emitter.emit_all(diagnostics, cache)?;
        }
    }
    Ok(())
}
