//! Property-access lowering for proxyshim
//!
//! This crate rewrites a parsed program so that it no longer performs
//! property operations itself:
//! - Reads become `globalGetter(object, key)`
//! - Writes, compound and update assignments become `globalSetter(...)`
//! - Method calls look the method up through the getter and invoke it with
//!   `this` bound to `objectTarget(receiver)`
//! - `delete` becomes `globalDeleter(object, key)`
//!
//! The dispatch runtime that defines these functions is then prepended to
//! the program (see [`inject_runtime`]).

mod builder;
pub mod config;
pub mod inject;
pub mod lower;
pub mod names;
pub mod pipeline;

pub use config::TransformConfig;
pub use inject::inject_runtime;
pub use lower::{Lowering, LoweringStats, NativeSite};
pub use names::TempNames;
pub use pipeline::{rewrite_source, rewrite_with_cache, RewriteError, Rewritten};
