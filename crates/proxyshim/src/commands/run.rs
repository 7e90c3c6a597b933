//! Run command - rewrite a script and evaluate it on an engine without Proxy

use anyhow::{Context, Result};
use clap::Args;
use proxyshim_jsruntime::{run_rewritten, run_script};
use std::fs;
use std::path::PathBuf;

use crate::config::ProjectConfig;
use crate::{Output, OutputFormat};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Script to run
    pub file: PathBuf,

    /// Run the script as written, with the engine's native Proxy
    #[arg(long)]
    pub no_rewrite: bool,

    /// Seed for temporary variable names
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run(args: RunArgs, config: ProjectConfig, output: Output) -> Result<()> {
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("could not read {}", args.file.display()))?;
    let filename = args.file.to_string_lossy();

    let result = if args.no_rewrite {
        run_script(&source, &config.run, true)
    } else {
        let transform = config.transform(args.seed, false);
        run_rewritten(&source, &filename, &transform, &config.run)
    };

    match (output.format, result) {
        (OutputFormat::Text, Ok(value)) => {
            if !output.quiet {
                println!("{}", value);
            }
            Ok(())
        }
        (OutputFormat::Text, Err(err)) => {
            let message = format!("{}: {}", filename, err);
            if output.use_color {
                eprintln!("{} {}", console::style("error:").red().bold(), message);
            } else {
                eprintln!("error: {}", message);
            }
            Err(anyhow::anyhow!("Run failed"))
        }
        (OutputFormat::Json, Ok(value)) => {
            let result = serde_json::json!({
                "success": true,
                "file": filename,
                "rewritten": !args.no_rewrite,
                "value": value,
            });
            println!("{}", serde_json::to_string(&result)?);
            Ok(())
        }
        (OutputFormat::Json, Err(err)) => {
            let result = serde_json::json!({
                "success": false,
                "file": filename,
                "rewritten": !args.no_rewrite,
                "error": err.to_string(),
            });
            println!("{}", serde_json::to_string(&result)?);
            Err(anyhow::anyhow!("Run failed"))
        }
    }
}
