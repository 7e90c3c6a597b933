//! Dispatch runtime for rewritten programs.
//!
//! Rewritten code never touches a property directly; it calls the entry
//! points defined in [`RUNTIME_SOURCE`], which is prepended to every output
//! file. The runtime decides per call whether the receiver is a plain value
//! (operate directly) or a virtual object created with `new Proxy(target,
//! handlers)` (run the handler, or fall back to the target).
//!
//! Virtual objects carry a non-enumerable, read-only `__proxyshim_slot`
//! property holding their target and handlers, so every injected copy of the
//! runtime recognises them, whatever their constructor is called. The source
//! sticks to ES5: the engines that need it have no `Proxy`, and usually no
//! `Symbol`, `WeakMap` or ES2015 syntax either.
//!
//! `globalSetter` and `globalDeleter` take a trailing `strict` flag. The
//! rewriter passes `true` from strict code, so failed writes and deletes throw
//! exactly where the original operation would have.
//!
//! The entry-point names are part of the calling convention between the
//! rewriter and the runtime. [`DispatchNames`] holds them; the rewriter emits
//! calls using these names and renames the runtime's declarations to match.

use serde::Deserialize;
use thiserror::Error;

/// Source of the dispatch runtime, written against [`DispatchNames::default`].
pub const RUNTIME_SOURCE: &str = include_str!("runtime.js");

/// File name used when the runtime is parsed.
pub const RUNTIME_FILENAME: &str = "<proxyshim-runtime>.js";

/// Property names that keep native semantics: they are how callers choose the
/// receiver of a function explicitly.
pub const CALL_BINDING_UTILITIES: [&str; 3] = ["apply", "bind", "call"];

/// Names of the runtime entry points as seen by rewritten code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchNames {
    /// `getter(object, key)`
    pub getter: String,
    /// `setter(object, key, value)`
    pub setter: String,
    /// `deleter(object, key)`
    pub deleter: String,
    /// `definer(object, key, descriptor)`
    pub definer: String,
    /// `target(object)`: the receiver methods are invoked on
    pub target: String,
    /// `is_virtual(object)`
    pub is_virtual: String,
    /// Virtual object constructor, `new constructor(target, handlers)`
    pub constructor: String,
}

impl Default for DispatchNames {
    fn default() -> Self {
        Self {
            getter: "globalGetter".to_string(),
            setter: "globalSetter".to_string(),
            deleter: "globalDeleter".to_string(),
            definer: "globalPropertyDefiner".to_string(),
            target: "objectTarget".to_string(),
            is_virtual: "isProxy".to_string(),
            constructor: "Proxy".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamesError {
    #[error("dispatch name `{0}` is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("dispatch name `{0}` is used for more than one entry point")]
    Duplicate(String),
    #[error("dispatch name `{0}` is already used inside the runtime")]
    Reserved(String),
}

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield", "let", "static",
    "await", "implements", "interface", "package", "private", "protected", "public",
    "arguments", "eval",
];

impl DispatchNames {
    /// `(default name, configured name)` for every entry point.
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        let defaults = Self::default_names();
        [
            (defaults[0], self.getter.as_str()),
            (defaults[1], self.setter.as_str()),
            (defaults[2], self.deleter.as_str()),
            (defaults[3], self.definer.as_str()),
            (defaults[4], self.target.as_str()),
            (defaults[5], self.is_virtual.as_str()),
            (defaults[6], self.constructor.as_str()),
        ]
    }

    /// Entry points whose configured name differs from the runtime source.
    pub fn renames(&self) -> Vec<(&'static str, &str)> {
        self.entries()
            .into_iter()
            .filter(|(from, to)| from != to)
            .collect()
    }

    pub fn is_default(&self) -> bool {
        self.renames().is_empty()
    }

    /// Every name must be an identifier, distinct from the others, and must
    /// not shadow a local or global the runtime refers to.
    pub fn validate(&self) -> Result<(), NamesError> {
        let entries = self.entries();
        let defaults = Self::default_names();
        for (i, (_, name)) in entries.iter().enumerate() {
            if !is_identifier(name) {
                return Err(NamesError::InvalidIdentifier(name.to_string()));
            }
            if !defaults.contains(name) && runtime_words().any(|word| word == *name) {
                return Err(NamesError::Reserved(name.to_string()));
            }
            if entries[..i].iter().any(|(_, other)| other == name) {
                return Err(NamesError::Duplicate(name.to_string()));
            }
        }
        Ok(())
    }

    fn default_names() -> [&'static str; 7] {
        [
            "globalGetter",
            "globalSetter",
            "globalDeleter",
            "globalPropertyDefiner",
            "objectTarget",
            "isProxy",
            "Proxy",
        ]
    }
}

/// Identifier-like words of the runtime source, string contents included.
fn runtime_words() -> impl Iterator<Item = &'static str> {
    RUNTIME_SOURCE
        .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .filter(|word| !word.is_empty())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');
    starts_well
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !RESERVED.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_declares_every_entry_point() {
        for (name, _) in DispatchNames::default().entries() {
            assert!(
                RUNTIME_SOURCE.contains(&format!("function {}(", name)),
                "runtime does not declare {}",
                name
            );
        }
    }

    #[test]
    fn test_default_names_validate() {
        let names = DispatchNames::default();
        assert!(names.is_default());
        assert_eq!(names.validate(), Ok(()));
    }

    #[test]
    fn test_renames_only_lists_changes() {
        let names = DispatchNames {
            getter: "__get".to_string(),
            constructor: "VirtualObject".to_string(),
            ..Default::default()
        };
        assert_eq!(
            names.renames(),
            vec![("globalGetter", "__get"), ("Proxy", "VirtualObject")]
        );
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let names = DispatchNames {
            setter: "2fast".to_string(),
            ..Default::default()
        };
        assert_eq!(
            names.validate(),
            Err(NamesError::InvalidIdentifier("2fast".to_string()))
        );

        let names = DispatchNames {
            deleter: "delete".to_string(),
            ..Default::default()
        };
        assert!(names.validate().is_err());

        let names = DispatchNames {
            deleter: "globalGetter".to_string(),
            ..Default::default()
        };
        assert_eq!(
            names.validate(),
            Err(NamesError::Duplicate("globalGetter".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_names_the_runtime_uses() {
        for used in ["target", "value", "traps", "Object", "TypeError", "__proxyshim_slotOf"] {
            let names = DispatchNames {
                getter: used.to_string(),
                ..Default::default()
            };
            assert_eq!(
                names.validate(),
                Err(NamesError::Reserved(used.to_string())),
                "{}",
                used
            );
        }

        // swapping two entry points is fine, the renamer handles it
        let names = DispatchNames {
            getter: "globalSetter".to_string(),
            setter: "globalGetter".to_string(),
            ..Default::default()
        };
        assert_eq!(names.validate(), Ok(()));
    }

    #[test]
    fn test_runtime_is_es5() {
        let es2015_words = [
            "let", "const", "class", "Symbol", "WeakMap", "WeakSet", "Map", "Set", "Reflect",
            "globalThis", "of",
        ];
        for word in runtime_words() {
            assert!(!es2015_words.contains(&word), "runtime uses `{}`", word);
        }
        for syntax in ["new.target", "=>", "`", "...", "?.", "??"] {
            assert!(!RUNTIME_SOURCE.contains(syntax), "runtime uses `{}`", syntax);
        }
    }

    #[test]
    fn test_partial_table_deserializes() {
        let names: DispatchNames = toml::from_str("getter = \"get$\"").unwrap();
        assert_eq!(names.getter, "get$");
        assert_eq!(names.setter, "globalSetter");
        assert!(toml::from_str::<DispatchNames>("nope = \"x\"").is_err());
    }
}
