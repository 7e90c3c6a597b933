//! Printing trees back to source text.

use swc_common::{sync::Lrc, SourceMap};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_codegen::{text_writer::JsWriter, Config, Emitter, Node};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("failed to write generated code: {0}")]
    Io(#[from] std::io::Error),
    #[error("generated code is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Print `program` as source text. `source_map` must be the map every part of
/// the tree was parsed into.
pub fn print_program(program: &Program, source_map: &Lrc<SourceMap>) -> Result<String, PrintError> {
    let mut buf = Vec::new();
    {
        let writer = JsWriter::new(source_map.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: Config::default().with_target(EsVersion::Es2022),
            cm: source_map.clone(),
            comments: None,
            wr: writer,
        };
        program.emit_with(&mut emitter)?;
    }
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_print_round_trip_keeps_statements() {
        let parsed = parse("const obj = {};\nobj.bar = 7;\nobj.bar;\n", "a.js").unwrap();
        let code = print_program(&parsed.program, &parsed.source_map).unwrap();

        assert!(code.contains("const obj = {};"));
        assert!(code.contains("obj.bar = 7;"));
    }

    #[test]
    fn test_print_keeps_parentheses_from_source() {
        let parsed = parse("x = o[(a, b)];", "p.js").unwrap();
        let code = print_program(&parsed.program, &parsed.source_map).unwrap();
        assert!(code.contains("o[(a, b)]"));
    }
}
