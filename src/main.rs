//! CLI for renaming files in bulk from a reference spreadsheet.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use itertools::Itertools;

use sheet_rename::archive::{self, UnmatchedPolicy};
use sheet_rename::batch::{self, RenamePlan};
use sheet_rename::config::RenameConfig;
use sheet_rename::reference::ReferenceIndex;
use sheet_rename::sheet;
use sheet_rename::{format_size, print_warning, show_diff};

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Rename files in bulk by matching them to rows in a reference spreadsheet"
)]
struct Args {
    /// Optional input directory or file
    #[arg(value_hint = clap::ValueHint::AnyPath)]
    path: Option<PathBuf>,

    /// Reference spreadsheet (.xlsx, .xls, .ods or .csv)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    sheet: PathBuf,

    /// Column used to match files to rows (default: first column)
    #[arg(short, long)]
    column: Option<String>,

    /// Rename template with {column} placeholders, e.g. "{nome}.{extensao}"
    #[arg(short, long)]
    template: Option<String>,

    /// Write the renamed files to a ZIP archive
    #[arg(short, long, value_name = "ZIP_PATH")]
    output: Option<PathBuf>,

    /// Leave unmatched files out of the archive
    #[arg(short = 'k', long)]
    skip_unmatched: bool,

    /// Recurse into subdirectories
    #[arg(short, long)]
    recurse: bool,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let user_config = RenameConfig::get_user_config()?;

    let recurse = args.recurse || user_config.recurse;
    let skip_unmatched = args.skip_unmatched || user_config.skip_unmatched;
    let verbose = args.verbose || user_config.verbose;
    let template = args
        .template
        .or(user_config.template)
        .context("No template given: pass --template or set it in the config file")?;

    let input_path = sheet_rename::resolve_input_path(args.path.as_deref())?;
    let sheet_path = sheet_rename::resolve_input_path(Some(&args.sheet))?;
    if !sheet_path.is_file() {
        anyhow::bail!("Reference sheet is not a file: {}", sheet_path.display());
    }

    let rows = sheet::load_reference_rows(&sheet_path)?;
    let columns = sheet::column_names(&rows);
    let match_column = match args.column.or(user_config.column) {
        Some(column) => column,
        None => columns.first().cloned().context("Reference file has no columns")?,
    };
    if !rows.iter().any(|row| row.has_column(&match_column)) {
        anyhow::bail!(
            "Match column '{match_column}' not found in reference data. Available columns: {}",
            columns.iter().join(", ")
        );
    }
    if verbose {
        println!("Matching on column '{match_column}' with {} reference rows", rows.len());
    }

    let index = ReferenceIndex::build(rows, &match_column);
    if index.duplicate_keys() > 0 {
        print_warning!(
            "{} duplicate value(s) in column '{match_column}': later rows override earlier ones",
            index.duplicate_keys()
        );
    }
    if index.is_empty() {
        print_warning!("No reference row has a value in column '{match_column}'");
    }

    let files = batch::gather_files(&input_path, recurse, Some(&sheet_path))?;
    if files.is_empty() {
        print_warning("No files to rename");
        return Ok(());
    }

    let plan = RenamePlan::new(index, match_column, template);
    let previews = plan.preview(&files);

    let max_items = previews.len();
    let max_chars = previews.len().checked_ilog10().map_or(1, |digits| digits as usize + 1);
    let mut matched = 0usize;
    for (index, preview) in previews.iter().enumerate() {
        let number = format!("{:>max_chars$} / {max_items}", index + 1);
        if let Some(error) = &preview.error {
            println!("{}", format!("Skip {number}:").bold().yellow());
            println!("{} {}", preview.original_name, format!("({error})").red());
        } else {
            matched += 1;
            println!("{}", format!("Rename {number}:").bold().magenta());
            show_diff(&preview.original_name, &preview.new_name);
        }
        if verbose {
            println!("{}", format_size(preview.size).dimmed());
        }
    }

    let unmatched = max_items - matched;
    println!(
        "{}",
        format!("{matched} of {max_items} files matched, {unmatched} without reference data").bold()
    );

    if let Some(output) = args.output {
        let policy = if skip_unmatched {
            UnmatchedPolicy::Skip
        } else {
            UnmatchedPolicy::Include
        };
        let stats = archive::write_archive(&plan, &files, &output, policy)?;
        let archive_size = fs::metadata(&output).map(|meta| meta.len()).unwrap_or_default();
        println!(
            "{}",
            format!(
                "Wrote {} ({}): {} renamed, {} unmatched included, {} skipped",
                output.display(),
                format_size(archive_size),
                stats.renamed,
                stats.unmatched_included,
                stats.skipped
            )
            .green()
        );
    }
    Ok(())
}
