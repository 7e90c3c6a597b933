//! Finding input files.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

pub fn is_source_file(path: &Path) -> bool {
    let name = path.to_string_lossy();
    if name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts") {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// `path` itself if it is a file, else every source file below it, sorted.
/// `node_modules` directories are skipped.
pub fn collect_sources(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(anyhow!("{} does not exist", path.display()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && is_source_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    Ok(files)
}
