use tracing::{debug, info};

use crate::error::SchemaError;
use crate::sheet::{Cell, Grid};

/// Only this many leading rows are searched for the header.
pub const HEADER_SCAN_ROWS: usize = 5;

/// Any text cell containing one of these (lower-cased) marks the header row.
const HEADER_KEYWORDS: &[&str] = &["rank", "title", "score", "subline", "comment"];

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderRow {
    pub index: usize,
    /// Lower-cased, trimmed header texts; falsy cells become "".
    pub headers: Vec<String>,
}

pub fn locate_header(grid: &Grid) -> Result<HeaderRow, SchemaError> {
    let scanned = grid.len().min(HEADER_SCAN_ROWS);

    for (index, row) in grid.rows().iter().take(HEADER_SCAN_ROWS).enumerate() {
        if row.iter().any(is_header_cell) {
            let headers = normalize_headers(row);
            info!("Found headers at row {}: {}", index, headers.join(", "));
            return Ok(HeaderRow { index, headers });
        }
        debug!(row = index, "no header keywords");
    }

    Err(SchemaError::SchemaNotFound {
        scanned,
        preview: preview_rows(grid, scanned),
    })
}

fn is_header_cell(cell: &Cell) -> bool {
    cell.as_str()
        .map(|s| {
            let lower = s.to_lowercase();
            HEADER_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .unwrap_or(false)
}

fn normalize_headers(row: &[Cell]) -> Vec<String> {
    row.iter()
        .map(|c| c.text().map(|t| t.to_lowercase()).unwrap_or_default())
        .collect()
}

fn preview_rows(grid: &Grid, n: usize) -> String {
    if n == 0 {
        return "(sheet is empty)".to_string();
    }
    grid.rows()
        .iter()
        .take(n)
        .enumerate()
        .map(|(i, row)| {
            let cells: Vec<String> = row.iter().map(|c| c.text().unwrap_or_default()).collect();
            format!("row {}: [{}]", i, cells.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_first_row_with_keyword() {
        let grid = Grid::from_text_rows(&[
            &["Hacker News export", ""],
            &["", ""],
            &["Rank", "TitleLine", " Score "],
            &["1", "Foo", "10"],
        ]);
        let header = locate_header(&grid).unwrap();
        assert_eq!(header.index, 2);
        assert_eq!(header.headers, vec!["rank", "titleline", "score"]);
    }

    #[test]
    fn loose_keywords_count() {
        let grid = Grid::from_text_rows(&[&["Post Title", "Comment count"]]);
        assert_eq!(locate_header(&grid).unwrap().index, 0);
    }

    #[test]
    fn numeric_cells_never_form_a_header() {
        let grid = Grid(vec![vec![Cell::Number(1.0), Cell::Number(2.0)]]);
        assert!(matches!(
            locate_header(&grid),
            Err(SchemaError::SchemaNotFound { scanned: 1, .. })
        ));
    }

    #[test]
    fn header_beyond_scan_window_is_not_found() {
        let junk: &[&str] = &["junk"];
        let mut rows = vec![junk; HEADER_SCAN_ROWS];
        rows.push(&["rank", "titleline", "score"]);
        let grid = Grid::from_text_rows(&rows);

        let err = locate_header(&grid).unwrap_err();
        match &err {
            SchemaError::SchemaNotFound { scanned, preview } => {
                assert_eq!(*scanned, HEADER_SCAN_ROWS);
                assert!(preview.contains("row 4: [junk]"));
                assert!(!preview.contains("titleline"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("first 5 rows"));
    }

    #[test]
    fn header_on_last_scanned_row_is_found() {
        let junk: &[&str] = &["junk"];
        let mut rows = vec![junk; HEADER_SCAN_ROWS - 1];
        rows.push(&["rank", "titleline"]);
        let grid = Grid::from_text_rows(&rows);
        assert_eq!(locate_header(&grid).unwrap().index, HEADER_SCAN_ROWS - 1);
    }

    #[test]
    fn empty_grid_reports_empty_sheet() {
        let err = locate_header(&Grid::default()).unwrap_err();
        assert!(err.to_string().contains("(sheet is empty)"));
    }
}
