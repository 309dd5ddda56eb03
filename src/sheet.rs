//! Reference spreadsheet loading.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};

use crate::reference::ReferenceRow;

/// Load reference rows from a spreadsheet or CSV file.
///
/// The format is chosen by extension: `.csv` goes through the csv crate,
/// anything else is handed to calamine (`.xlsx`, `.xls`, `.ods`). The first
/// row provides the column names, the first worksheet is used, and blank
/// cells become empty strings.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed, or if it
/// contains no data rows.
pub fn load_reference_rows(path: &Path) -> Result<Vec<ReferenceRow>> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_lowercase();

    let rows = if extension == "csv" {
        load_csv(path)?
    } else {
        load_workbook(path)?
    };

    if rows.is_empty() {
        anyhow::bail!("Reference file contains no data rows: {}", path.display());
    }
    Ok(rows)
}

/// Column names from the header row (the first loaded row's columns).
#[must_use]
pub fn column_names(rows: &[ReferenceRow]) -> Vec<String> {
    rows.first()
        .map(|row| row.columns().map(ToString::to_string).collect())
        .unwrap_or_default()
}

fn load_csv(path: &Path) -> Result<Vec<ReferenceRow>> {
    let delimiter = csv_delimiter(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read CSV record from {}", path.display()))?;
        let row = headers
            .iter()
            .enumerate()
            .map(|(column, header)| (header.clone(), record.get(column).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Pick `;` or `,` based on which occurs more in the header line.
///
/// Spreadsheet exports in `pt-BR` locales separate with semicolons.
fn csv_delimiter(path: &Path) -> Result<u8> {
    let file = File::open(path).with_context(|| format!("Failed to open CSV file {}", path.display()))?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .with_context(|| format!("Failed to read CSV header line from {}", path.display()))?;

    if first_line.matches(';').count() > first_line.matches(',').count() {
        Ok(b';')
    } else {
        Ok(b',')
    }
}

fn load_workbook(path: &Path) -> Result<Vec<ReferenceRow>> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Failed to open spreadsheet {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("Spreadsheet contains no worksheets: {}", path.display()))?
        .with_context(|| format!("Failed to read first worksheet of {}", path.display()))?;

    let mut row_iter = range.rows();
    let Some(header_row) = row_iter.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for data_row in row_iter {
        let row = headers
            .iter()
            .enumerate()
            .map(|(column, header)| {
                (
                    header.clone(),
                    data_row.get(column).map(cell_to_string).unwrap_or_default(),
                )
            })
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Render a cell as the string a user would see in the sheet.
///
/// Integral floats print without a trailing `.0` so numeric ID columns
/// line up with the tokens extracted from filenames.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod sheet_tests {
    use super::*;

    use std::io::Write;

    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).expect("Failed to create test file");
        file.write_all(content.as_bytes()).expect("Failed to write test file");
        path
    }

    #[test]
    fn loads_comma_separated_csv() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "ref.csv",
            "matricula,nome,setor\n12345,Ana Silva,RH\n67890,Bruno Costa,TI\n",
        );

        let rows = load_reference_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("matricula"), "12345");
        assert_eq!(rows[0].get("nome"), "Ana Silva");
        assert_eq!(rows[1].get("setor"), "TI");
    }

    #[test]
    fn loads_semicolon_separated_csv() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "ref.csv",
            "matricula;nome\n12345;Ana Silva\n",
        );

        let rows = load_reference_rows(&path).unwrap();
        assert_eq!(rows[0].get("nome"), "Ana Silva");
    }

    #[test]
    fn blank_cells_become_empty_strings() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "ref.csv", "matricula,nome\n12345,\n");

        let rows = load_reference_rows(&path).unwrap();
        assert_eq!(rows[0].get("nome"), "");
    }

    #[test]
    fn short_records_read_as_empty_cells() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "ref.csv", "matricula,nome,setor\n12345,Ana\n");

        let rows = load_reference_rows(&path).unwrap();
        assert_eq!(rows[0].get("setor"), "");
    }

    #[test]
    fn header_names_are_trimmed() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "ref.csv", " matricula , nome \n12345,Ana\n");

        let rows = load_reference_rows(&path).unwrap();
        assert_eq!(rows[0].get("matricula"), "12345");
    }

    #[test]
    fn csv_without_data_rows_is_an_error() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "ref.csv", "matricula,nome\n");

        assert!(load_reference_rows(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_reference_rows(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn column_names_come_from_first_row() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "ref.csv", "matricula,nome\n12345,Ana\n");

        let rows = load_reference_rows(&path).unwrap();
        assert_eq!(column_names(&rows), vec!["matricula", "nome"]);
        assert!(column_names(&[]).is_empty());
    }
}
