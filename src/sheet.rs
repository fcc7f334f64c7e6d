use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{info, warn};

/// One scalar value as exported from the sheet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Bool(bool),
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Trimmed text of the cell, or `None` when the sheet would treat the value
    /// as absent: empty, blank text, numeric zero, `false`.
    pub fn text(&self) -> Option<String> {
        let s = match self {
            Cell::Empty | Cell::Bool(false) => return None,
            Cell::Bool(true) => "true".to_string(),
            Cell::Number(n) if *n == 0.0 || n.is_nan() => return None,
            Cell::Number(n) => format_number(*n),
            Cell::Text(t) => t.trim().to_string(),
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text().is_none()
    }

    /// Raw string content for text cells only.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// The raw two-dimensional sheet contents. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Grid(pub Vec<Vec<Cell>>);

impl Grid {
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn row(&self, i: usize) -> Option<&[Cell]> {
        self.0.get(i).map(Vec::as_slice)
    }

    /// Build a grid of text cells; empty strings become `Cell::Empty`.
    #[cfg(test)]
    pub fn from_text_rows(rows: &[&[&str]]) -> Self {
        Grid(
            rows.iter()
                .map(|row| row.iter().map(|c| Cell::from(*c)).collect())
                .collect(),
        )
    }
}

/// Load a sheet export. `.json` is an array of arrays of scalars, `.tsv` is
/// tab-delimited, anything else is read as CSV.
pub fn load_grid(path: &Path) -> Result<Grid> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sheet export {}", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let grid = match ext.as_str() {
        "json" => parse_json(&text),
        "tsv" => parse_csv(&text, b'\t'),
        _ => parse_csv(&text, b','),
    }
    .with_context(|| format!("Failed to parse sheet export {}", path.display()))?;

    if grid.is_empty() {
        warn!("{} has no rows", path.display());
    } else {
        info!("Loaded {} rows from {}", grid.len(), path.display());
    }
    Ok(grid)
}

pub fn parse_json(text: &str) -> Result<Grid> {
    Ok(serde_json::from_str(text)?)
}

pub fn parse_csv(text: &str, delimiter: u8) -> Result<Grid> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Bad record at line {}", i + 1))?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    Ok(Grid(rows))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_treats_falsy_values_as_absent() {
        assert_eq!(Cell::Empty.text(), None);
        assert_eq!(Cell::Text("   ".into()).text(), None);
        assert_eq!(Cell::Number(0.0).text(), None);
        assert_eq!(Cell::Bool(false).text(), None);
        assert_eq!(Cell::Text("  Foo ".into()).text().as_deref(), Some("Foo"));
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(Cell::Number(150.0).text().as_deref(), Some("150"));
        assert_eq!(Cell::Number(1.5).text().as_deref(), Some("1.5"));
    }

    #[test]
    fn json_grid_accepts_mixed_scalars() {
        let grid = parse_json(r#"[["rank", "titleline"], [1, "Foo"], [null, ""], [true]]"#).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.0[1][0], Cell::Number(1.0));
        assert_eq!(grid.0[2][0], Cell::Empty);
        assert!(grid.0[2][1].is_blank());
        assert_eq!(grid.0[3][0], Cell::Bool(true));
    }

    #[test]
    fn csv_grid_is_ragged_and_headerless() {
        let grid = parse_csv("rank,titleline\n1,Foo,extra\n\n,", b',').unwrap();
        assert_eq!(grid.row(0).unwrap().len(), 2);
        assert_eq!(grid.row(1).unwrap().len(), 3);
        assert_eq!(grid.row(0).unwrap()[0], Cell::Text("rank".into()));
        assert!(grid.rows().last().unwrap().iter().all(Cell::is_blank));
    }

    #[test]
    fn tsv_fixture_loads_by_extension() {
        let grid = load_grid(Path::new("tests/fixtures/single_row.tsv")).unwrap();
        assert!(grid.len() > 3);
        assert_eq!(grid.0[0][0].as_str(), Some("rank"));
    }
}
