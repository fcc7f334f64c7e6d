use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::columns::{ColumnMap, Field};
use super::header::HeaderRow;
use super::numeric::{resolve_count, Keyword};
use crate::model::PostRecord;
use crate::sheet::{Cell, Grid};

/// Stand-in title for a row whose title cell is empty; never emitted.
pub const MISSING_TITLE: &str = "No title";

static AGO_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+ago\s*$").unwrap());

/// Metadata cells of one post. Either on the title row itself or on the row below.
#[derive(Debug, Default, Clone)]
pub(crate) struct Meta {
    pub score: Option<String>,
    pub comments: Option<String>,
    pub age: Option<String>,
    pub author: Option<String>,
    pub subline: Option<String>,
}

impl Meta {
    pub(crate) fn read(row: &[Cell], columns: &ColumnMap) -> Self {
        Meta {
            score: columns.value(row, Field::Score),
            comments: columns.value(row, Field::Comments),
            age: columns.value(row, Field::Age),
            author: columns.value(row, Field::Author),
            subline: columns.value(row, Field::Subline),
        }
    }

    /// Score missing or a literal "0": the row probably has a metadata row below it.
    fn needs_fallback(&self) -> bool {
        matches!(self.score.as_deref(), None | Some("0"))
    }

    /// Cells present in `next` replace ours; empty ones keep what we had.
    fn overlay(self, next: Meta) -> Self {
        Meta {
            score: next.score.or(self.score),
            comments: next.comments.or(self.comments),
            age: next.age.or(self.age),
            author: next.author.or(self.author),
            subline: next.subline.or(self.subline),
        }
    }

    /// Metadata for the title row at `i`, pulling from `i + 1` when the row carries none.
    pub(crate) fn for_title_row(rows: &[Vec<Cell>], i: usize, columns: &ColumnMap) -> Self {
        let meta = Meta::read(&rows[i], columns);
        if !meta.needs_fallback() {
            return meta;
        }
        match rows.get(i + 1) {
            Some(next) => meta.overlay(Meta::read(next, columns)),
            None => meta,
        }
    }

    pub(crate) fn score(&self) -> u64 {
        resolve_count(self.score.as_deref(), self.subline.as_deref(), Keyword::Points)
    }

    pub(crate) fn comments(&self) -> u64 {
        resolve_count(self.comments.as_deref(), self.subline.as_deref(), Keyword::Comments)
    }
}

/// Walk every row below the header and rebuild one post per ranked row.
///
/// A row with a non-blank rank cell starts a post. Its metadata comes from the
/// same row, or from the row right below it when the score cell is empty or "0".
/// That covers both the paired export (title row + metadata row) and the
/// single-row export without knowing which one we're looking at.
pub fn reconstruct(grid: &Grid, header: &HeaderRow, columns: &ColumnMap) -> Vec<PostRecord> {
    let rows = grid.rows();
    let mut posts = Vec::new();

    for i in header.index + 1..rows.len() {
        let row = &rows[i];
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        let Some(rank) = columns.value(row, Field::Rank) else {
            continue;
        };

        let title = columns.value_or(row, Field::TitleText, MISSING_TITLE);
        let meta = Meta::for_title_row(rows, i, columns);
        let score = meta.score();
        let comments = meta.comments();

        debug!(
            "Processing post #{}: {} - {}pts, {}cmt",
            rank, title, score, comments
        );
        if !is_valid_title(&title) {
            debug!(row = i, %rank, "skipping post without a title");
            continue;
        }

        let domain = columns
            .value(row, Field::Domain)
            .or_else(|| columns.value(row, Field::SiteBit).map(|s| strip_parens(&s)))
            .unwrap_or_default();

        posts.push(PostRecord {
            rank,
            title,
            link: columns.value_or(row, Field::TitleLink, ""),
            domain,
            score,
            comments,
            age: clean_age(meta.age.as_deref().unwrap_or("")),
            author: meta.author.unwrap_or_default(),
        });
    }

    posts
}

pub fn is_valid_title(title: &str) -> bool {
    let title = title.trim();
    !title.is_empty() && title != MISSING_TITLE
}

/// "3 hours ago |" → "3 hours ago".
pub fn clean_age(age: &str) -> String {
    if age.is_empty() {
        return String::new();
    }
    let age = age.replacen(" |", "", 1);
    AGO_RE.replace(&age, " ago").trim().to_string()
}

fn strip_parens(s: &str) -> String {
    s.replace(['(', ')'], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::header::locate_header;

    const HEADERS: &[&str] = &[
        "rank", "titleline", "titleline href", "sitestr", "score", "subline (3)", "age", "hnuser",
    ];

    fn run(grid: &Grid) -> Vec<PostRecord> {
        let header = locate_header(grid).unwrap();
        let columns = ColumnMap::require(&header).unwrap();
        reconstruct(grid, &header, &columns)
    }

    #[test]
    fn paired_rows_take_metadata_from_next_row() {
        let grid = Grid::from_text_rows(&[
            HEADERS,
            &["1", "Foo", "https://foo.test", "foo.test", "", ""],
            &["", "", "", "", "150 points", "42 comments", "2 hours ago", "bob"],
        ]);
        let posts = run(&grid);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].score, 150);
        assert_eq!(posts[0].comments, 42);
        assert_eq!(posts[0].age, "2 hours ago");
        assert_eq!(posts[0].author, "bob");
        assert_eq!(posts[0].rank, "1");
    }

    #[test]
    fn populated_score_does_not_consult_next_row() {
        let grid = Grid::from_text_rows(&[
            HEADERS,
            &["1", "Foo", "", "", "99", "7", "1 hour ago", "amy"],
            &["", "", "", "", "500 points", "300 comments", "9 hours ago", "zed"],
        ]);
        let posts = run(&grid);
        assert_eq!(posts[0].score, 99);
        assert_eq!(posts[0].comments, 7);
        assert_eq!(posts[0].author, "amy");
    }

    #[test]
    fn literal_zero_score_falls_back_to_next_row() {
        let grid = Grid::from_text_rows(&[
            HEADERS,
            &["1", "Foo", "", "", "0", "3", "", "amy"],
            &["", "", "", "", "12 points", "", "", ""],
        ]);
        let posts = run(&grid);
        assert_eq!(posts[0].score, 12);
        // Empty cells on the next row keep the title row's values.
        assert_eq!(posts[0].comments, 3);
        assert_eq!(posts[0].author, "amy");
    }

    #[test]
    fn single_rows_in_sequence_are_not_skipped() {
        let grid = Grid::from_text_rows(&[
            HEADERS,
            &["1", "One", "", "", "10", "1"],
            &["2", "Two", "", "", "20", "2"],
            &["3", "Three", "", "", "30", "3"],
        ]);
        let posts = run(&grid);
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
        assert_eq!(posts[1].score, 20);
    }

    #[test]
    fn empty_score_reads_the_following_row_even_when_ranked() {
        let grid = Grid::from_text_rows(&[
            &["rank", "titleline", "score", "subline (3)", "age", "hnuser"],
            &["1", "First", "", "", "", ""],
            &["2", "Second", "300 points", "90 comments", "1 hour ago", "bob"],
        ]);
        let posts = run(&grid);
        assert_eq!(posts.len(), 2);
        assert_eq!((posts[0].score, posts[0].comments), (300, 90));
        assert_eq!(posts[0].age, "1 hour ago");
        assert_eq!(posts[0].author, "bob");
        // The second post keeps its own values and is still emitted.
        assert_eq!(posts[1].title, "Second");
        assert_eq!((posts[1].score, posts[1].comments), (300, 90));
    }

    #[test]
    fn no_score_column_always_consults_the_next_row() {
        let grid = Grid::from_text_rows(&[
            &["rank", "titleline", "subline"],
            &["1", "First", "10 points | 2 comments"],
            &["2", "Second", "300 points | 90 comments"],
        ]);
        let posts = run(&grid);
        // Next row's subline wins over the title row's own.
        assert_eq!((posts[0].score, posts[0].comments), (300, 90));
        // Last row: nothing below, so its own subline stays.
        assert_eq!((posts[1].score, posts[1].comments), (300, 90));
    }

    #[test]
    fn title_row_without_any_metadata_degrades_to_zero() {
        let grid = Grid::from_text_rows(&[HEADERS, &["1", "Lonely"]]);
        let posts = run(&grid);
        assert_eq!(posts.len(), 1);
        assert_eq!((posts[0].score, posts[0].comments), (0, 0));
        assert_eq!(posts[0].age, "");
        assert_eq!(posts[0].link, "");
    }

    #[test]
    fn subline_text_fills_empty_counts() {
        let grid = Grid::from_text_rows(&[
            &["rank", "titleline", "subline"],
            &["1", "Foo", ""],
            &["", "", "250 points by carol 1 hour ago | hide | 88 comments"],
        ]);
        let posts = run(&grid);
        assert_eq!((posts[0].score, posts[0].comments), (250, 88));
    }

    #[test]
    fn dedicated_subline_column_feeds_both_counts() {
        let grid = Grid::from_text_rows(&[
            &["rank", "titleline", "score", "subline (3)", "subline"],
            &["1", "Foo", "", "", "250 points | 88 comments"],
        ]);
        // "subline (3)" is the first header containing "subline", so the
        // free-text column after it is never read.
        let posts = run(&grid);
        assert_eq!((posts[0].score, posts[0].comments), (0, 0));

        let grid = Grid::from_text_rows(&[
            &["rank", "titleline", "subline", "score", "subline (3)"],
            &["1", "Foo", "250 points | 88 comments", "", ""],
        ]);
        let posts = run(&grid);
        assert_eq!((posts[0].score, posts[0].comments), (250, 88));
    }

    #[test]
    fn placeholder_and_missing_titles_are_dropped() {
        let grid = Grid::from_text_rows(&[
            HEADERS,
            &["1", "", "", "", "900", "900"],
            &["2", "No title", "", "", "900", "900"],
            &["3", "Real", "", "", "1", "1"],
        ]);
        let posts = run(&grid);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Real");
    }

    #[test]
    fn untitled_post_resolves_metadata_before_it_is_dropped() {
        let grid = Grid::from_text_rows(&[
            HEADERS,
            &["1", "", "", "", "", ""],
            &["", "", "", "", "400 points", "300 comments", "1 hour ago", "x"],
            &["2", "Kept", "", "", "", ""],
            &["", "", "", "", "20 points", "10 comments", "2 hours ago", "y"],
        ]);
        let columns = ColumnMap::require(&locate_header(&grid).unwrap()).unwrap();
        let meta = Meta::for_title_row(grid.rows(), 1, &columns);
        assert_eq!((meta.score(), meta.comments()), (400, 300));

        let posts = run(&grid);
        assert_eq!(posts.len(), 1);
        assert_eq!((posts[0].title.as_str(), posts[0].score), ("Kept", 20));
    }

    #[test]
    fn rows_without_rank_are_not_posts() {
        let grid = Grid::from_text_rows(&[
            HEADERS,
            &["", "Orphan", "", "", "100", "100"],
            &["   ", "Also orphan", "", "", "100", "100"],
            &[""; 8],
            &["7", "Kept", "", "", "5", "5"],
        ]);
        let posts = run(&grid);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].rank, "7");
    }

    #[test]
    fn domain_falls_back_to_sitebit() {
        let grid = Grid::from_text_rows(&[
            &["rank", "titleline", "sitestr", "sitebit", "score"],
            &["1", "A", "", " (example.com) ", "5"],
            &["2", "B", "b.test", "(ignored.test)", "5"],
            &["3", "C", "", "", "5"],
        ]);
        let posts = run(&grid);
        assert_eq!(posts[0].domain, "example.com");
        assert_eq!(posts[1].domain, "b.test");
        assert_eq!(posts[2].domain, "");
    }

    #[test]
    fn numeric_cells_are_read_as_text() {
        let mut grid = Grid::from_text_rows(&[&["rank", "titleline", "score", "subline (3)"]]);
        grid.0.push(vec![
            Cell::Number(1.0),
            Cell::Text("Numbers".into()),
            Cell::Number(321.0),
            Cell::Number(45.0),
        ]);
        let posts = run(&grid);
        assert_eq!(posts[0].rank, "1");
        assert_eq!((posts[0].score, posts[0].comments), (321, 45));
    }

    #[test]
    fn age_is_normalized() {
        assert_eq!(clean_age("3 hours ago |"), "3 hours ago");
        assert_eq!(clean_age("3 hours   ago  "), "3 hours ago");
        assert_eq!(clean_age(" | 5 minutes\tago"), "5 minutes ago");
        assert_eq!(clean_age("yesterday"), "yesterday");
        assert_eq!(clean_age(""), "");
    }
}
