//! Check command - reports what a rewrite would do without writing anything

use anyhow::{anyhow, Context, Result};
use clap::Args;
use proxyshim_diagnostics::{Diagnostics, SourceCache};
use proxyshim_transform::{rewrite_with_cache, LoweringStats};
use std::fs;
use std::path::PathBuf;

use crate::config::ProjectConfig;
use crate::sources::collect_sources;
use crate::{Output, OutputFormat};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Input file or directory
    #[arg(default_value = ".")]
    pub input: PathBuf,

    /// Treat warnings (sites left native) as errors
    #[arg(long)]
    pub strict: bool,
}

struct FileReport {
    path: PathBuf,
    stats: Option<LoweringStats>,
}

pub fn run(args: CheckArgs, config: ProjectConfig, output: Output) -> Result<()> {
    let files = collect_sources(&args.input)?;

    if files.is_empty() {
        match output.format {
            OutputFormat::Text => println!("No source files found."),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "files": 0,
                        "errors": 0,
                        "warnings": 0,
                    })
                );
            }
        }
        return Ok(());
    }

    if matches!(output.format, OutputFormat::Text) && !output.quiet {
        println!("Checking {} file(s)...", files.len());
    }

    // The runtime prelude is identical for every file, leave it out
    let transform = config.transform(None, true);
    let mut cache = SourceCache::new();
    let mut diagnostics = Diagnostics::new();
    let mut reports = Vec::with_capacity(files.len());

    for file in &files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("could not read {}", file.display()))?;
        let filename = file.to_string_lossy();

        match rewrite_with_cache(&source, &filename, &transform, &mut cache) {
            Ok(rewritten) => {
                log::debug!("{}: {:?}", filename, rewritten.stats);
                diagnostics.extend(rewritten.diagnostics);
                reports.push(FileReport {
                    path: file.clone(),
                    stats: Some(rewritten.stats),
                });
            }
            Err(err) => {
                diagnostics.push(err.diagnostic());
                reports.push(FileReport {
                    path: file.clone(),
                    stats: None,
                });
            }
        }
    }

    super::emit_diagnostics(&diagnostics, &cache, output)?;

    let errors = diagnostics.error_count();
    let warnings = diagnostics.warning_count();
    let failed = errors > 0 || (args.strict && warnings > 0);

    match output.format {
        OutputFormat::Text => {
            if output.verbose > 0 {
                println!();
                for report in &reports {
                    match &report.stats {
                        Some(stats) => println!(
                            "  {}: {} read(s), {} write(s), {} call(s), {} delete(s), {} update(s), {} left native",
                            report.path.display(),
                            stats.reads,
                            stats.writes,
                            stats.calls,
                            stats.deletes,
                            stats.updates,
                            stats.native_sites
                        ),
                        None => println!("  {}: not parsed", report.path.display()),
                    }
                }
            }
            println!();

            if errors > 0 {
                if output.use_color {
                    println!(
                        "{}: {} error(s), {} warning(s)",
                        console::style("Check failed").red().bold(),
                        errors,
                        warnings
                    );
                } else {
                    println!("Check failed: {} error(s), {} warning(s)", errors, warnings);
                }
            } else if warnings > 0 && args.strict {
                if output.use_color {
                    println!(
                        "{}: {} warning(s) (strict mode)",
                        console::style("Check failed").yellow().bold(),
                        warnings
                    );
                } else {
                    println!("Check failed: {} warning(s) (strict mode)", warnings);
                }
            } else if warnings > 0 {
                if output.use_color {
                    println!(
                        "{}: {} warning(s)",
                        console::style("Check passed").yellow(),
                        warnings
                    );
                } else {
                    println!("Check passed: {} warning(s)", warnings);
                }
            } else if output.use_color {
                println!(
                    "{} - {} file(s) checked",
                    console::style("All checks passed!").green().bold(),
                    files.len()
                );
            } else {
                println!("All checks passed! - {} file(s) checked", files.len());
            }
        }
        OutputFormat::Json => {
            let per_file: Vec<_> = reports
                .iter()
                .map(|report| {
                    serde_json::json!({
                        "path": report.path,
                        "parsed": report.stats.is_some(),
                        "stats": report.stats,
                    })
                })
                .collect();
            let summary = serde_json::json!({
                "type": "summary",
                "success": !failed,
                "files": files.len(),
                "errors": errors,
                "warnings": warnings,
                "strict": args.strict,
                "results": per_file,
            });
            println!("{}", serde_json::to_string(&summary)?);
        }
    }

    if failed {
        Err(anyhow!("Check failed"))
    } else {
        Ok(())
    }
}
