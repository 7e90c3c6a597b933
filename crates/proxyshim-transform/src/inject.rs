//! Prepending the dispatch runtime to a lowered program.

use crate::builder::{directive_count, module_directive_count};
use proxyshim_parser::{parse_into, ParseError};
use proxyshim_runtime::{DispatchNames, RUNTIME_FILENAME, RUNTIME_SOURCE};
use swc_common::{sync::Lrc, SourceMap};
use swc_ecma_ast::{Ident, ModuleItem, Program, Stmt};
use swc_ecma_visit::{VisitMut, VisitMutWith};

/// Renames the runtime's entry points to the configured names.
struct EntryPointRenamer<'a> {
    renames: Vec<(&'static str, &'a str)>,
}

impl VisitMut for EntryPointRenamer<'_> {
    fn visit_mut_ident(&mut self, ident: &mut Ident) {
        if let Some((_, to)) = self.renames.iter().find(|(from, _)| &*ident.sym == *from) {
            ident.sym = (*to).into();
        }
    }
}

/// The runtime's top-level statements, with entry points named per `names`.
pub fn runtime_statements(
    source_map: &Lrc<SourceMap>,
    names: &DispatchNames,
) -> Result<Vec<Stmt>, ParseError> {
    let program = parse_into(source_map, RUNTIME_SOURCE, RUNTIME_FILENAME)?;
    let mut stmts = match program {
        Program::Script(script) => script.body,
        Program::Module(module) => module
            .body
            .into_iter()
            .filter_map(|item| match item {
                ModuleItem::Stmt(stmt) => Some(stmt),
                ModuleItem::ModuleDecl(_) => None,
            })
            .collect(),
    };

    let renames = names.renames();
    if !renames.is_empty() {
        log::debug!("renaming runtime entry points: {:?}", renames);
        stmts.visit_mut_with(&mut EntryPointRenamer { renames });
    }
    Ok(stmts)
}

/// Prepend the dispatch runtime to `program`, after its directive prologue.
///
/// `source_map` must be the map `program` was parsed into.
pub fn inject_runtime(
    program: &mut Program,
    source_map: &Lrc<SourceMap>,
    names: &DispatchNames,
) -> Result<(), ParseError> {
    let stmts = runtime_statements(source_map, names)?;
    log::debug!("injecting {} runtime statements", stmts.len());

    match program {
        Program::Script(script) => {
            let at = directive_count(&script.body);
            script.body.splice(at..at, stmts);
        }
        Program::Module(module) => {
            let at = module_directive_count(&module.body);
            module
                .body
                .splice(at..at, stmts.into_iter().map(ModuleItem::Stmt));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxyshim_parser::{parse, print_program};

    fn injected(source: &str, filename: &str, names: &DispatchNames) -> String {
        let mut parsed = parse(source, filename).unwrap();
        inject_runtime(&mut parsed.program, &parsed.source_map, names).unwrap();
        print_program(&parsed.program, &parsed.source_map).unwrap()
    }

    #[test]
    fn test_runtime_parses() {
        let source_map: Lrc<SourceMap> = Default::default();
        let stmts = runtime_statements(&source_map, &DispatchNames::default()).unwrap();
        assert!(stmts.len() >= 7);
    }

    #[test]
    fn test_runtime_goes_before_user_code() {
        let code = injected("main();", "a.js", &DispatchNames::default());
        let runtime = code.find("function globalGetter(").unwrap();
        let user = code.find("main();").unwrap();
        assert!(runtime < user);
    }

    #[test]
    fn test_directives_stay_first() {
        let code = injected("'use strict';\nmain();", "a.js", &DispatchNames::default());
        assert!(code.starts_with("'use strict';"), "{}", code);
        assert!(code.contains("function Proxy("));
    }

    #[test]
    fn test_module_injection() {
        let code = injected("export default 1;", "a.mjs", &DispatchNames::default());
        let runtime = code.find("function objectTarget(").unwrap();
        assert!(runtime < code.find("export default").unwrap());
    }

    #[test]
    fn test_entry_points_are_renamed() {
        let names = DispatchNames {
            getter: "__get".to_string(),
            constructor: "Virtual".to_string(),
            ..Default::default()
        };
        let code = injected("x;", "a.js", &names);
        assert!(code.contains("function __get("), "{}", code);
        assert!(code.contains("function Virtual("), "{}", code);
        assert!(code.contains("this instanceof Virtual"), "{}", code);
        assert!(!code.contains("globalGetter"), "{}", code);
        // property names are untouched
        assert!(code.contains("traps.get"), "{}", code);
    }
}
