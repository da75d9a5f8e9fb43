use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file together with its last-modified time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub modified: DateTime<Local>,
}

/// Lists regular files directly inside `dir` whose name passes `accept`.
///
/// Symlinks count when they resolve to a regular file; dangling links do not.
/// Entries come back in directory-listing order. Reading a modification
/// time is not recoverable: the whole scan fails with the offending path.
pub fn collect_files<F>(dir: &Path, mut accept: F) -> Result<Vec<FileEntry>>
where
    F: FnMut(&str) -> bool,
{
    let mut out = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to list directory: {}", dir.display()))?;
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if !accept(&name) {
            continue;
        }

        let path = entry.path().to_path_buf();
        let modified = modified_time(&path)?;
        out.push(FileEntry {
            path,
            name,
            modified,
        });
    }

    tracing::debug!(dir = %dir.display(), count = out.len(), "collected files");
    Ok(out)
}

/// Stable sort, most recently modified first.
pub fn sort_newest_first(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| b.modified.cmp(&a.modified));
}

pub fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false)
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

pub fn modified_time(path: &Path) -> Result<DateTime<Local>> {
    let time = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("failed to read modification time: {}", path.display()))?;
    Ok(DateTime::from(time))
}
