//! Rewrite command - lowers property access in one file or a whole tree

use anyhow::{anyhow, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use proxyshim_diagnostics::{Diagnostics, SourceCache};
use proxyshim_transform::{rewrite_with_cache, LoweringStats};
use similar::TextDiff;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;
use crate::sources::collect_sources;
use crate::{Output, OutputFormat};

#[derive(Args, Debug)]
pub struct RewriteArgs {
    /// Input file or directory
    pub input: PathBuf,

    /// Output file (single input file only)
    #[arg(short, long, conflicts_with = "out_dir")]
    pub output: Option<PathBuf>,

    /// Write rewritten files under this directory, mirroring the input tree
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Seed for temporary variable names (deterministic output)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not prepend the dispatch runtime
    #[arg(long)]
    pub no_runtime: bool,

    /// Print a unified diff against the input instead of the rewritten code
    #[arg(long, conflicts_with_all = ["output", "out_dir"])]
    pub diff: bool,
}

/// Where the rewritten text of `file` goes.
fn destination(args: &RewriteArgs, root: &Path, file: &Path) -> Option<PathBuf> {
    if let Some(output) = &args.output {
        return Some(output.clone());
    }
    let out_dir = args.out_dir.as_ref()?;
    let relative = if root.is_file() {
        file.file_name().map(PathBuf::from).unwrap_or_else(|| file.to_path_buf())
    } else {
        file.strip_prefix(root).unwrap_or(file).to_path_buf()
    };
    Some(out_dir.join(relative))
}

fn unified_diff(file: &Path, before: &str, after: &str) -> String {
    let name = file.display().to_string();
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&name, &format!("{} (rewritten)", name))
        .to_string()
}

fn progress_bar(len: usize, output: Output) -> ProgressBar {
    if len < 2 || output.quiet || matches!(output.format, OutputFormat::Json) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}") {
        bar.set_style(style);
    }
    bar
}

pub fn run(args: RewriteArgs, config: ProjectConfig, output: Output) -> Result<()> {
    let files = collect_sources(&args.input)?;
    if files.is_empty() {
        return Err(anyhow!("no source files found in {}", args.input.display()));
    }
    if files.len() > 1 && args.output.is_some() {
        return Err(anyhow!("--output needs a single input file; use --out-dir"));
    }
    if files.len() > 1 && args.out_dir.is_none() && !args.diff {
        return Err(anyhow!("rewriting a directory needs --out-dir"));
    }

    let transform = config.transform(args.seed, args.no_runtime);
    let mut cache = SourceCache::new();
    let mut diagnostics = Diagnostics::new();
    let mut totals = LoweringStats::default();
    let mut failed = 0;
    let mut written = Vec::new();

    let bar = progress_bar(files.len(), output);
    for file in &files {
        bar.set_message(file.display().to_string());
        let source = fs::read_to_string(file)
            .with_context(|| format!("could not read {}", file.display()))?;
        let filename = file.to_string_lossy();

        let rewritten = match rewrite_with_cache(&source, &filename, &transform, &mut cache) {
            Ok(rewritten) => rewritten,
            Err(err) => {
                log::warn!("{}: {}", filename, err);
                diagnostics.push(err.diagnostic());
                failed += 1;
                bar.inc(1);
                continue;
            }
        };

        let stats = rewritten.stats;
        totals.reads += stats.reads;
        totals.writes += stats.writes;
        totals.calls += stats.calls;
        totals.deletes += stats.deletes;
        totals.updates += stats.updates;
        totals.tagged_templates += stats.tagged_templates;
        totals.temporaries += stats.temporaries;
        totals.native_sites += stats.native_sites;
        diagnostics.extend(rewritten.diagnostics);

        if args.diff {
            bar.suspend(|| print!("{}", unified_diff(file, &source, &rewritten.code)));
        } else if let Some(dest) = destination(&args, &args.input, file) {
            if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("could not create {}", parent.display()))?;
            }
            fs::write(&dest, &rewritten.code)
                .with_context(|| format!("could not write {}", dest.display()))?;
            log::info!("{} -> {}", file.display(), dest.display());
            written.push(dest);
        } else {
            print!("{}", rewritten.code);
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    super::emit_diagnostics(&diagnostics, &cache, output)?;

    // Rewritten code may be on stdout; the summary goes to stderr then
    let code_on_stdout = args.diff || (args.output.is_none() && args.out_dir.is_none());
    match output.format {
        OutputFormat::Text => {
            if !output.quiet && !written.is_empty() {
                let summary = format!(
                    "Rewrote {} file(s): {} sites, {} left native",
                    written.len(),
                    totals.rewritten(),
                    totals.native_sites
                );
                if output.use_color {
                    eprintln!("{}", console::style(summary).green().bold());
                } else {
                    eprintln!("{}", summary);
                }
            }
        }
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "type": "summary",
                "success": failed == 0,
                "files": files.len(),
                "failed": failed,
                "written": written,
                "stats": totals,
            });
            let text = serde_json::to_string(&summary)?;
            if code_on_stdout {
                eprintln!("{}", text);
            } else {
                println!("{}", text);
            }
        }
    }

    if failed > 0 {
        Err(anyhow!("{} file(s) could not be rewritten", failed))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str, out_dir: Option<&str>) -> RewriteArgs {
        RewriteArgs {
            input: PathBuf::from(input),
            output: None,
            out_dir: out_dir.map(PathBuf::from),
            seed: None,
            no_runtime: false,
            diff: false,
        }
    }

    #[test]
    fn test_destination_mirrors_tree() {
        let args = args("src", Some("dist"));
        assert_eq!(
            destination(&args, Path::new("src"), Path::new("src/lib/a.js")),
            Some(PathBuf::from("dist/lib/a.js"))
        );
    }

    #[test]
    fn test_destination_stdout() {
        let args = args("src/a.js", None);
        assert_eq!(destination(&args, Path::new("src/a.js"), Path::new("src/a.js")), None);
    }

    #[test]
    fn test_unified_diff_shows_change() {
        let diff = unified_diff(Path::new("a.js"), "o.x;\n", "globalGetter(o, \"x\");\n");
        assert!(diff.contains("-o.x;"));
        assert!(diff.contains("+globalGetter(o, \"x\");"));
    }
}
