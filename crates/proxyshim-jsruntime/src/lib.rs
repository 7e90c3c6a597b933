//! JavaScript runtime for proxyshim
//!
//! Runs programs in an embedded engine (boa) so that a rewritten program can
//! be checked against the engine it targets: one without a native `Proxy`.
//! [`ScriptEngine::without_native_proxy`] removes the global before any user
//! code runs, so the only `Proxy` left is the one the dispatch runtime
//! defines.

mod engine;

pub use engine::{run_rewritten, run_script, EngineError, EngineLimits, ScriptEngine};
