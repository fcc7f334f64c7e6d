pub mod columns;
pub mod header;
pub mod numeric;
pub mod rows;

use tracing::info;

use crate::error::SchemaError;
use crate::model::PostRecord;
use crate::rank::{self, FilterCriteria};
use crate::sheet::Grid;
use columns::{ColumnMap, Field};
use header::{locate_header, HeaderRow, HEADER_SCAN_ROWS};
use rows::Meta;

/// Rows of the listing shown by `inspect`.
const SAMPLE_ROWS: usize = 10;

/// Two passes: grid → header + column map → posts.
pub fn extract_posts(grid: &Grid) -> Result<Vec<PostRecord>, SchemaError> {
    let header = locate_header(grid)?;
    let columns = ColumnMap::require(&header)?;
    let posts = rows::reconstruct(grid, &header, &columns);
    info!("Reconstructed {} posts from {} rows", posts.len(), grid.len());
    Ok(posts)
}

/// Whole pipeline: reconstruct every post, then keep the top matches.
pub fn reconstruct_and_filter(
    grid: &Grid,
    criteria: &FilterCriteria,
) -> Result<Vec<PostRecord>, SchemaError> {
    let posts = extract_posts(grid)?;
    Ok(rank::filter_and_rank(posts, criteria))
}

/// What the parser sees in a sheet, for diagnosing a bad export.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub total_rows: usize,
    pub preview: Vec<String>,
    pub header: HeaderRow,
    pub mapping: Vec<(Field, Option<usize>)>,
    pub samples: Vec<SampleRow>,
}

#[derive(Debug, Clone)]
pub struct SampleRow {
    pub row: usize,
    pub rank: String,
    pub title: String,
    pub link: String,
    pub domain: String,
    pub score_text: String,
    pub score: u64,
    pub comments_text: String,
    pub comments: u64,
    pub subline: String,
}

/// Unlike `extract_posts`, a missing required column isn't fatal here: the
/// mapping is reported as found so the export can be fixed.
pub fn inspect(grid: &Grid) -> Result<Inspection, SchemaError> {
    let preview = grid
        .rows()
        .iter()
        .take(HEADER_SCAN_ROWS)
        .map(|row| {
            row.iter()
                .map(|c| c.text().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();

    let header = locate_header(grid)?;
    let columns = ColumnMap::from_headers(&header.headers);
    let mapping = Field::ALL.iter().map(|&f| (f, columns.get(f))).collect();

    let rows = grid.rows();
    let end = rows.len().min(header.index + SAMPLE_ROWS);
    let mut samples = Vec::new();
    for i in header.index + 1..end {
        let Some(rank) = columns.value(&rows[i], Field::Rank) else {
            continue;
        };
        let meta = Meta::for_title_row(rows, i, &columns);
        samples.push(SampleRow {
            row: i,
            rank,
            title: columns.value_or(&rows[i], Field::TitleText, ""),
            link: columns.value_or(&rows[i], Field::TitleLink, ""),
            domain: columns.value_or(&rows[i], Field::Domain, ""),
            score: meta.score(),
            comments: meta.comments(),
            score_text: meta.score.unwrap_or_default(),
            comments_text: meta.comments.unwrap_or_default(),
            subline: meta.subline.unwrap_or_default(),
        });
    }

    Ok(Inspection {
        total_rows: grid.len(),
        preview,
        header,
        mapping,
        samples,
    })
}

// ── Tests ──
