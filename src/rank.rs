use serde::Deserialize;
use tracing::{debug, info};

use crate::model::PostRecord;
use crate::parser::rows::is_valid_title;

/// Longest list handed to the presentation layer.
pub const TOP_N: usize = 10;

/// Inclusive lower bounds a post has to meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub min_comments: u64,
    pub min_score: u64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        FilterCriteria {
            min_comments: 100,
            min_score: 0,
        }
    }
}

impl FilterCriteria {
    pub fn accepts(&self, post: &PostRecord) -> bool {
        post.score >= self.min_score
            && post.comments >= self.min_comments
            && is_valid_title(&post.title)
    }
}

pub fn filter(posts: Vec<PostRecord>, criteria: &FilterCriteria) -> Vec<PostRecord> {
    posts
        .into_iter()
        .filter(|p| {
            let keep = criteria.accepts(p);
            if keep {
                debug!("Post added: {}", p.display_text());
            } else {
                debug!(
                    "Post filtered out: {} (score: {}/{}, comments: {}/{})",
                    p.title, p.score, criteria.min_score, p.comments, criteria.min_comments
                );
            }
            keep
        })
        .collect()
}

/// Most-commented first, sheet order on ties, at most `TOP_N`.
pub fn rank(mut posts: Vec<PostRecord>) -> Vec<PostRecord> {
    // sort_by is stable.
    posts.sort_by(|a, b| b.comments.cmp(&a.comments));
    posts.truncate(TOP_N);
    posts
}

pub fn filter_and_rank(posts: Vec<PostRecord>, criteria: &FilterCriteria) -> Vec<PostRecord> {
    let top = rank(filter(posts, criteria));
    info!(
        "Final filtered posts: {} (min comments {}, min score {})",
        top.len(),
        criteria.min_comments,
        criteria.min_score
    );
    for p in &top {
        debug!("- {}: {}pts, {}cmt", p.title, p.score, p.comments);
    }
    top
}
