// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! CSV and spreadsheet rendering into fixed-width tabular text.

use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use tracing::{debug, warn};

use super::loader::LoadError;

pub fn read_csv(path: &Path) -> Result<String, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::Parse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        rows.push(record.iter().map(|c| c.to_string()).collect::<Vec<_>>());
    }
    debug!(
        "CSV {}: {} rows x {} columns",
        path.display(),
        rows.len(),
        headers.len()
    );

    Ok(format!(
        "CSV File: {}\n\n{}",
        file_name(path),
        render_table(&headers, &rows)
    ))
}

/// Render every sheet of a workbook under a `Sheet: <name>` header.
/// Sheets that fail to read are logged and skipped.
pub fn read_spreadsheet(path: &Path) -> Result<String, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names().to_owned();
    debug!(
        "Spreadsheet {} has {} sheets: {}",
        path.display(),
        sheet_names.len(),
        sheet_names.join(", ")
    );

    let mut sections = Vec::new();
    for name in sheet_names {
        match workbook.worksheet_range(&name) {
            Ok(range) => {
                let mut rows_iter = range.rows();
                let headers: Vec<String> = rows_iter
                    .next()
                    .map(|row| row.iter().map(|c| c.to_string()).collect())
                    .unwrap_or_default();
                let rows: Vec<Vec<String>> = rows_iter
                    .map(|row| row.iter().map(|c| c.to_string()).collect())
                    .collect();
                sections.push(format!("Sheet: {}\n{}\n", name, render_table(&headers, &rows)));
            }
            Err(e) => {
                warn!("Error reading sheet '{}' of {}: {}", name, path.display(), e);
            }
        }
    }

    Ok(format!(
        "Excel File: {}\n\n{}",
        file_name(path),
        sections.join("\n\n")
    ))
}

/// Column-aligned rendering: header row followed by data rows, each cell
/// padded to its column's widest value.
fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let columns = headers
        .len()
        .max(rows.iter().map(|r| r.len()).max().unwrap_or(0));
    if columns == 0 {
        return String::new();
    }

    let mut widths = vec![0usize; columns];
    for (i, header) in headers.iter().enumerate() {
        widths[i] = header.chars().count();
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render_row = |cells: &[String]| -> String {
        (0..columns)
            .map(|i| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!("{:<width$}", cell, width = widths[i])
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 1);
    if !headers.is_empty() {
        lines.push(render_row(headers));
    }
    for row in rows {
        lines.push(render_row(row));
    }
    lines.join("\n")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_render_table_alignment() {
        let headers = vec!["name".to_string(), "amount".to_string()];
        let rows = vec![
            vec!["alpha".to_string(), "10".to_string()],
            vec!["b".to_string(), "2000".to_string()],
        ];
        let table = render_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("name "));
        // "amount" column starts at the same offset in every row
        let col = lines[0].find("amount").unwrap();
        assert_eq!(&lines[1][col..col + 2], "10");
    }

    #[test]
    fn test_render_table_empty() {
        assert_eq!(render_table(&[], &[]), "");
    }

    #[test]
    fn test_read_csv_with_headers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"policy,limit\nhome,250000\nauto,50000\n")
            .unwrap();
        let csv_path = file.path().with_extension("csv");
        std::fs::copy(file.path(), &csv_path).unwrap();

        let content = read_csv(&csv_path).unwrap();
        assert!(content.starts_with("CSV File: "));
        assert!(content.contains("policy"));
        assert!(content.contains("250000"));
        std::fs::remove_file(csv_path).unwrap();
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b,c\n1,2\n3,4,5,6\n").unwrap();
        let content = read_csv(file.path()).unwrap();
        assert!(content.contains('a'));
    }
}
