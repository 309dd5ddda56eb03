//! Batch orchestration: gather input files and compute rename previews.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::extract::extract_identifier;
use crate::matcher;
use crate::reference::ReferenceIndex;
use crate::template::{self, Rendered};

/// An input file queued for renaming.
///
/// Preview only consumes the name and size; `path` is how the commit pass
/// fetches the file's bytes.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

impl FileEntry {
    /// Build an entry from a path on disk.
    ///
    /// # Errors
    /// Returns an error if the file metadata cannot be read.
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let name = crate::path_to_filename_string(&path);
        let size = fs::metadata(&path)
            .with_context(|| format!("Failed to read metadata for {}", path.display()))?
            .len();
        Ok(Self { path, name, size })
    }
}

/// One file's preview outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePreview {
    pub original_name: String,
    pub new_name: String,
    pub error: Option<String>,
    pub size: u64,
}

/// Everything one batch run resolves against: the built index, the chosen
/// match column, and the rename template.
///
/// The plan is immutable for the duration of a run; preview and commit
/// re-derive every name from it with the same pure functions.
#[derive(Debug)]
pub struct RenamePlan {
    index: ReferenceIndex,
    match_column: String,
    template: String,
}

impl RenamePlan {
    #[must_use]
    pub fn new(index: ReferenceIndex, match_column: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            index,
            match_column: match_column.into(),
            template: template.into(),
        }
    }

    /// Resolve a single filename to its rendered outcome.
    #[must_use]
    pub fn resolve_name(&self, filename: &str) -> Rendered {
        let candidate = extract_identifier(filename, &self.match_column);
        let matched = matcher::resolve(&candidate, &self.index, &self.match_column);
        template::render(filename, matched.map(|m| m.row), &self.template)
    }

    /// Compute the preview for every input file, preserving input order.
    ///
    /// Files resolve independently on the rayon pool; one unmatched file
    /// never blocks the rest.
    #[must_use]
    pub fn preview(&self, files: &[FileEntry]) -> Vec<RenamePreview> {
        files
            .par_iter()
            .map(|file| {
                let rendered = self.resolve_name(&file.name);
                RenamePreview {
                    original_name: file.name.clone(),
                    new_name: rendered.new_name,
                    error: rendered.error,
                    size: file.size,
                }
            })
            .collect()
    }
}

/// Gather the input files for a batch run.
///
/// A file path yields that single file. A directory is walked with hidden
/// entries skipped, optionally recursing into subdirectories. `exclude`
/// drops the reference sheet itself when it lives inside the input
/// directory. Results are sorted by name for a stable preview order.
///
/// # Errors
/// Returns an error if file metadata cannot be read.
pub fn gather_files(root: &Path, recurse: bool, exclude: Option<&Path>) -> Result<Vec<FileEntry>> {
    if root.is_file() {
        return Ok(vec![FileEntry::from_path(root.to_path_buf())?]);
    }

    let max_depth = if recurse { 100 } else { 1 };
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| !crate::is_hidden(entry))
        .filter_map(Result::ok)
    {
        let path = entry.into_path();
        if !path.is_file() || exclude.is_some_and(|excluded| path == excluded) {
            continue;
        }
        files.push(FileEntry::from_path(path)?);
    }

    files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(files)
}
