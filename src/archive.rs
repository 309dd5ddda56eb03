//! Commit pass: package resolved files into a ZIP archive.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
#[cfg(not(test))]
use indicatif::ProgressStyle;
use rayon::prelude::*;
use zip::{CompressionMethod, write::SimpleFileOptions};

use crate::batch::{FileEntry, RenamePlan};
use crate::split_extension;

#[cfg(not(test))]
const PROGRESS_BAR_CHARS: &str = "=> ";
#[cfg(not(test))]
const PROGRESS_BAR_TEMPLATE: &str = "[{elapsed_precise}] {bar:60.cyan/blue} {pos}/{len} {percent}%";

/// Folder inside the archive that receives files without a reference match.
pub const UNMATCHED_DIR: &str = "unmatched";

/// What to do with files whose resolution carried an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedPolicy {
    /// Package them under their original name inside [`UNMATCHED_DIR`].
    Include,
    /// Leave them out of the archive entirely.
    Skip,
}

/// Counts reported after a commit pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommitStats {
    pub renamed: usize,
    pub unmatched_included: usize,
    pub skipped: usize,
}

/// Write the archive for a batch, re-deriving every name from the plan.
///
/// File bytes are read concurrently, then written by a single writer in
/// input order. Unmatched files follow `policy` and are never silently
/// dropped: both outcomes are counted in the returned stats. Rendered-name
/// collisions get an incrementing counter inserted before the extension.
///
/// # Errors
/// Returns an error if any input file cannot be read or the archive cannot
/// be written. Reads happen before the archive file is created, so a failed
/// read leaves nothing behind.
pub fn write_archive(
    plan: &RenamePlan,
    files: &[FileEntry],
    output: &Path,
    policy: UnmatchedPolicy,
) -> Result<CommitStats> {
    let mut stats = CommitStats::default();
    let mut seen_names = HashSet::new();
    let mut planned: Vec<(&FileEntry, String)> = Vec::new();

    for file in files {
        let rendered = plan.resolve_name(&file.name);
        if rendered.error.is_some() {
            match policy {
                UnmatchedPolicy::Skip => stats.skipped += 1,
                UnmatchedPolicy::Include => {
                    stats.unmatched_included += 1;
                    let entry_name = format!("{UNMATCHED_DIR}/{}", file.name);
                    planned.push((file, unique_entry_name(entry_name, &mut seen_names)));
                }
            }
        } else {
            stats.renamed += 1;
            planned.push((file, unique_entry_name(rendered.new_name, &mut seen_names)));
        }
    }

    let contents: Vec<Vec<u8>> = planned
        .par_iter()
        .map(|(file, _)| fs::read(&file.path).with_context(|| format!("Failed to read {}", file.path.display())))
        .collect::<Result<_>>()?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let archive_file =
        File::create(output).with_context(|| format!("Failed to create archive {}", output.display()))?;
    let mut writer = zip::ZipWriter::new(archive_file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let progress_bar = create_progress_bar(planned.len() as u64);
    for ((_, entry_name), data) in planned.iter().zip(&contents) {
        writer
            .start_file(entry_name.as_str(), options)
            .with_context(|| format!("Failed to add {entry_name} to archive"))?;
        writer
            .write_all(data)
            .with_context(|| format!("Failed to write {entry_name} to archive"))?;
        progress_bar.inc(1);
    }
    progress_bar.finish_and_clear();

    writer.finish().context("Failed to finalize archive")?;
    Ok(stats)
}

/// Keep archive entry names unique by numbering later duplicates.
fn unique_entry_name(name: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(name.clone()) {
        return name;
    }
    let (stem, extension) = split_extension(&name);
    let mut index = 2;
    loop {
        let numbered = format!("{stem}.{index}{extension}");
        if seen.insert(numbered.clone()) {
            return numbered;
        }
        index += 1;
    }
}

/// Create a progress bar that is hidden during tests.
fn create_progress_bar(len: u64) -> ProgressBar {
    #[cfg(test)]
    {
        let _ = len;
        ProgressBar::hidden()
    }
    #[cfg(not(test))]
    {
        let progress_bar = ProgressBar::new(len);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_BAR_TEMPLATE)
                .expect("Failed to set progress bar template")
                .progress_chars(PROGRESS_BAR_CHARS),
        );
        progress_bar
    }
}
