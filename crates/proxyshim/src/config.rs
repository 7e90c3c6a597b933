//! proxyshim.toml

use proxyshim_jsruntime::EngineLimits;
use proxyshim_runtime::{DispatchNames, NamesError};
use proxyshim_transform::TransformConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = "proxyshim.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid [dispatch] table: {0}")]
    Names(#[from] NamesError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub transform: TransformConfig,
    pub dispatch: DispatchNames,
    pub run: EngineLimits,
}

impl ProjectConfig {
    /// Load `explicit` if given, else `./proxyshim.toml` if it exists, else
    /// the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.is_file() {
                    log::debug!("no {} found, using defaults", CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from(CONFIG_FILE),
            source,
        })?;
        config.dispatch.validate()?;
        Ok(config)
    }

    /// Transform options with the dispatch names folded in and command-line
    /// overrides applied.
    pub fn transform(&self, seed: Option<u64>, no_runtime: bool) -> TransformConfig {
        let mut config = self.transform.clone().with_dispatch(self.dispatch.clone());
        if let Some(seed) = seed {
            config = config.with_seed(seed);
        }
        if no_runtime {
            config = config.without_runtime();
        }
        config
    }
}
