//! Init command - write a default proxyshim.toml

use anyhow::{anyhow, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::config::CONFIG_FILE;
use crate::{Output, OutputFormat};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project directory (default: current)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing proxyshim.toml
    #[arg(long)]
    pub force: bool,
}

pub const DEFAULT_CONFIG: &str = r#"# proxyshim configuration

[transform]
# Fixed seed for temporary variable names; omit for random names
# seed = 1
inject_runtime = true
# Property names that are never routed through the dispatch runtime
extra_passthrough = []

# Names of the runtime entry points in rewritten code
[dispatch]
getter = "globalGetter"
setter = "globalSetter"
deleter = "globalDeleter"
definer = "globalPropertyDefiner"
target = "objectTarget"
is_virtual = "isProxy"
constructor = "Proxy"

# Limits for `proxyshim run`
[run]
loop_iteration_limit = 10000000
recursion_limit = 512
"#;

pub fn run(args: InitArgs, output: Output) -> Result<()> {
    fs::create_dir_all(&args.path)?;
    let config_path = args.path.join(CONFIG_FILE);

    if config_path.exists() && !args.force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        ));
    }
    fs::write(&config_path, DEFAULT_CONFIG)?;
    log::info!("wrote {}", config_path.display());

    match output.format {
        OutputFormat::Text => {
            if !output.quiet {
                println!("Created {}", config_path.display());
            }
        }
        OutputFormat::Json => {
            let result = serde_json::json!({
                "success": true,
                "path": config_path.to_string_lossy(),
            });
            println!("{}", serde_json::to_string(&result)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;

    #[test]
    fn test_default_config_matches_defaults() {
        assert_eq!(ProjectConfig::parse(DEFAULT_CONFIG).unwrap(), ProjectConfig::default());
    }
}
