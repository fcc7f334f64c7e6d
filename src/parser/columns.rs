use std::fmt;

use crate::error::SchemaError;
use crate::parser::header::HeaderRow;
use crate::sheet::Cell;

const FIELD_COUNT: usize = 10;

/// Semantic columns of a listing export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Rank,
    TitleText,
    TitleLink,
    Domain,
    Score,
    Comments,
    Age,
    Author,
    Subline,
    SiteBit,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Rank,
        Field::TitleText,
        Field::TitleLink,
        Field::Domain,
        Field::Score,
        Field::Comments,
        Field::Age,
        Field::Author,
        Field::Subline,
        Field::SiteBit,
    ];

    /// Header substrings that identify the field, as the scraper names them.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Rank => &["rank"],
            Field::TitleText => &["titleline"],
            Field::TitleLink => &["titleline href"],
            Field::Domain => &["sitestr"],
            Field::Score => &["score"],
            Field::Comments => &["subline (3)"],
            Field::Age => &["age"],
            Field::Author => &["hnuser"],
            Field::Subline => &["subline"],
            Field::SiteBit => &["sitebit"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Rank => "rank",
            Field::TitleText => "titleline",
            Field::TitleLink => "titleline href",
            Field::Domain => "sitestr",
            Field::Score => "score",
            Field::Comments => "comments",
            Field::Age => "age",
            Field::Author => "hnuser",
            Field::Subline => "subline",
            Field::SiteBit => "sitebit",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Index of the first header containing any candidate (substring match).
pub fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.iter().any(|c| h.contains(c)))
}

/// Field → column index, built once from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    slots: [Option<usize>; FIELD_COUNT],
}

impl ColumnMap {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut slots = [None; FIELD_COUNT];
        for field in Field::ALL {
            slots[field as usize] = find_column(headers, field.candidates());
        }
        ColumnMap { slots }
    }

    /// Map the header row and check the columns reconstruction can't do without.
    pub fn require(header: &HeaderRow) -> Result<Self, SchemaError> {
        let map = Self::from_headers(&header.headers);
        if map.get(Field::TitleText).is_none() {
            return Err(SchemaError::missing("titleline", header.index, &header.headers));
        }
        if map.get(Field::Score).is_none() && map.get(Field::Subline).is_none() {
            return Err(SchemaError::missing("score or subline", header.index, &header.headers));
        }
        Ok(map)
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.slots[field as usize]
    }

    /// Trimmed text of `field` in `row`; `None` when unmapped, out of range or falsy.
    pub fn value(&self, row: &[Cell], field: Field) -> Option<String> {
        self.get(field)
            .and_then(|i| row.get(i))
            .and_then(Cell::text)
    }

    pub fn value_or(&self, row: &[Cell], field: Field, fallback: &str) -> String {
        self.value(row, field).unwrap_or_else(|| fallback.to_string())
    }
}
