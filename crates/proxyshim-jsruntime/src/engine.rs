use boa_engine::vm::RuntimeLimits;
use boa_engine::{Context, JsValue, Source};
use proxyshim_transform::{rewrite_source, RewriteError, TransformConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The script threw, or hit a runtime limit
    #[error("uncaught exception: {0}")]
    Script(String),
    #[error("failed to prepare the engine: {0}")]
    Setup(String),
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// Limits applied to every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineLimits {
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            loop_iteration_limit: 10_000_000,
            recursion_limit: 512,
        }
    }
}

/// A single-threaded script engine.
pub struct ScriptEngine {
    context: Context,
}

impl ScriptEngine {
    pub fn new(limits: &EngineLimits) -> Self {
        let mut context = Context::default();
        let mut runtime_limits = RuntimeLimits::default();
        runtime_limits.set_loop_iteration_limit(limits.loop_iteration_limit);
        runtime_limits.set_recursion_limit(limits.recursion_limit);
        context.set_runtime_limits(runtime_limits);
        Self { context }
    }

    /// An engine whose global object has no `Proxy`.
    pub fn without_native_proxy(limits: &EngineLimits) -> Result<Self, EngineError> {
        let mut engine = Self::new(limits);
        let removed = engine
            .evaluate("delete globalThis.Proxy")
            .map_err(|e| EngineError::Setup(e.to_string()))?;
        if !removed.as_boolean().unwrap_or(false) {
            return Err(EngineError::Setup("the global Proxy is not configurable".to_string()));
        }
        log::debug!("native Proxy removed");
        Ok(engine)
    }

    pub fn has_native_proxy(&mut self) -> Result<bool, EngineError> {
        let value = self.evaluate("typeof Proxy === 'function'")?;
        Ok(value.as_boolean().unwrap_or(false))
    }

    /// Evaluate `source` as a script and render its completion value.
    pub fn eval(&mut self, source: &str) -> Result<String, EngineError> {
        let value = self.evaluate(source)?;
        Ok(value.display().to_string())
    }

    fn evaluate(&mut self, source: &str) -> Result<JsValue, EngineError> {
        self.context
            .eval(Source::from_bytes(source))
            .map_err(|e| EngineError::Script(e.to_string()))
    }
}

/// Evaluate `source` in a fresh engine.
pub fn run_script(
    source: &str,
    limits: &EngineLimits,
    native_proxy: bool,
) -> Result<String, EngineError> {
    let mut engine = if native_proxy {
        ScriptEngine::new(limits)
    } else {
        ScriptEngine::without_native_proxy(limits)?
    };
    engine.eval(source)
}

/// Rewrite `source` (the runtime is always injected) and evaluate it in a
/// fresh engine without a native `Proxy`.
pub fn run_rewritten(
    source: &str,
    filename: &str,
    config: &TransformConfig,
    limits: &EngineLimits,
) -> Result<String, EngineError> {
    let config = TransformConfig {
        inject_runtime: true,
        ..config.clone()
    };
    let rewritten = rewrite_source(source, filename, &config)?;
    log::debug!("{}: running {} bytes of rewritten code", filename, rewritten.code.len());
    run_script(&rewritten.code, limits, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_completion_value() {
        let mut engine = ScriptEngine::new(&EngineLimits::default());
        assert_eq!(engine.eval("1 + 2").unwrap(), "3");
    }

    #[test]
    fn test_native_proxy_removal() {
        let limits = EngineLimits::default();
        assert!(ScriptEngine::new(&limits).has_native_proxy().unwrap());

        let mut engine = ScriptEngine::without_native_proxy(&limits).unwrap();
        assert!(!engine.has_native_proxy().unwrap());
    }

    #[test]
    fn test_thrown_errors_are_reported() {
        let err = run_script("null.x", &EngineLimits::default(), true).unwrap_err();
        assert!(matches!(err, EngineError::Script(_)));
    }

    #[test]
    fn test_loop_limit() {
        let limits = EngineLimits {
            loop_iteration_limit: 100,
            ..Default::default()
        };
        assert!(run_script("while (true) {}", &limits, true).is_err());
    }

    #[test]
    fn test_state_persists_between_evaluations() {
        let mut engine = ScriptEngine::new(&EngineLimits::default());
        engine.eval("var counter = 41;").unwrap();
        assert_eq!(engine.eval("counter + 1").unwrap(), "42");
    }
}
