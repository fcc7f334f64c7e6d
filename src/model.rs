use serde::Serialize;

/// One listing entry rebuilt from the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRecord {
    pub rank: String,
    pub title: String,
    pub link: String,
    pub domain: String,
    pub score: u64,
    pub comments: u64,
    pub age: String,
    pub author: String,
}

impl PostRecord {
    pub fn display_text(&self) -> String {
        format!(
            "{} ({}pts, {}cmt) - {}",
            self.title, self.score, self.comments, self.domain
        )
    }

    /// False for an empty link or the `#` stand-in.
    pub fn has_link(&self) -> bool {
        let link = self.link.trim();
        !link.is_empty() && link != "#"
    }
}

#[cfg(test)]
pub(crate) fn post(title: &str, score: u64, comments: u64) -> PostRecord {
    PostRecord {
        rank: String::new(),
        title: title.to_string(),
        link: format!("https://{}.test", title.to_lowercase().replace(' ', "-")),
        domain: String::new(),
        score,
        comments,
        age: String::new(),
        author: String::new(),
    }
}
