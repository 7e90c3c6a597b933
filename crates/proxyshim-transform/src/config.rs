//! Transform options.

use proxyshim_runtime::{DispatchNames, CALL_BINDING_UTILITIES};
use serde::Deserialize;

/// Options for one rewrite. Deserializes from the `[transform]` table of
/// `proxyshim.toml`; the dispatch names come from `[dispatch]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Seed for temporary names. `None` draws a fresh suffix per run.
    pub seed: Option<u64>,
    /// Prepend the dispatch runtime to the output
    pub inject_runtime: bool,
    /// Property names left as native accesses in addition to
    /// `apply`, `bind` and `call`
    pub extra_passthrough: Vec<String>,
    #[serde(skip)]
    pub dispatch: DispatchNames,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            seed: None,
            inject_runtime: true,
            extra_passthrough: Vec::new(),
            dispatch: DispatchNames::default(),
        }
    }
}

impl TransformConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn without_runtime(mut self) -> Self {
        self.inject_runtime = false;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchNames) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Every property name that keeps native read and call semantics.
    pub fn passthrough_names(&self) -> Vec<String> {
        CALL_BINDING_UTILITIES
            .iter()
            .map(|name| name.to_string())
            .chain(self.extra_passthrough.iter().cloned())
            .collect()
    }
}
