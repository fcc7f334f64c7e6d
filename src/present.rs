use std::io::Write;
use std::process::Command;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::model::PostRecord;

pub const TITLE_WIDTH: usize = 80;
const ELLIPSIS: &str = "...";
const NO_RESULTS: &str = "No posts found matching your criteria. Try lowering the thresholds.";

pub fn truncate_title(title: &str, width: usize) -> String {
    if title.chars().count() <= width {
        title.to_string()
    } else {
        let truncated: String = title.chars().take(width).collect();
        format!("{}{}", truncated, ELLIPSIS)
    }
}

fn meta_line(post: &PostRecord) -> String {
    let mut line = format!(
        "{} comments • {} points • {} • {}",
        post.comments, post.score, post.age, post.domain
    );
    if !post.author.is_empty() {
        line.push_str(" • ");
        line.push_str(&post.author);
    }
    line
}

/// Numbered selection list. Posts with a usable link start checked.
pub fn render_list(posts: &[PostRecord], width: usize) -> String {
    if posts.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = format!("{} matching posts\n", posts.len());
    for (i, post) in posts.iter().enumerate() {
        let mark = if post.has_link() { "[x]" } else { "[ ]" };
        out.push_str(&format!(
            "{:>2}. {} {}\n       {}\n",
            i + 1,
            mark,
            truncate_title(&post.title, width),
            meta_line(post)
        ));
    }
    out
}

/// Links to open. `picks` are 1-based list positions; `None` means every
/// checked post. Posts without a usable link are skipped either way.
pub fn select_links(posts: &[PostRecord], picks: Option<&[usize]>) -> Result<Vec<String>> {
    let chosen: Vec<&PostRecord> = match picks {
        None => posts.iter().collect(),
        Some(picks) => {
            let mut chosen = Vec::with_capacity(picks.len());
            for &n in picks {
                match n.checked_sub(1).and_then(|i| posts.get(i)) {
                    Some(p) => chosen.push(p),
                    None => bail!("No post #{} (list has {})", n, posts.len()),
                }
            }
            chosen
        }
    };

    Ok(chosen
        .into_iter()
        .filter(|p| p.has_link())
        .map(|p| p.link.trim().to_string())
        .collect())
}

pub trait LinkOpener {
    fn open(&mut self, url: &str) -> Result<()>;
}

/// Writes each link on its own line (stdout for `--dry-run`).
pub struct PrintOpener<W: Write> {
    out: W,
}

impl<W: Write> PrintOpener<W> {
    pub fn new(out: W) -> Self {
        PrintOpener { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LinkOpener for PrintOpener<W> {
    fn open(&mut self, url: &str) -> Result<()> {
        writeln!(self.out, "{}", url)?;
        Ok(())
    }
}

/// Runs `program [args..] <url>`, e.g. `xdg-open` or `open`.
pub struct CommandOpener {
    program: String,
    args: Vec<String>,
}

impl CommandOpener {
    /// Split a command line like `"firefox --new-tab"` on whitespace.
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let Some(program) = parts.next() else {
            bail!("Opener command is empty");
        };
        Ok(CommandOpener {
            program,
            args: parts.collect(),
        })
    }
}

impl LinkOpener for CommandOpener {
    fn open(&mut self, url: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .status()
            .with_context(|| format!("Failed to run {}", self.program))?;
        if !status.success() {
            bail!("{} exited with {}", self.program, status);
        }
        Ok(())
    }
}

/// Open links one after another with `delay` between them. A link that fails
/// is logged and skipped. Returns how many opened.
pub fn open_links(links: &[String], opener: &mut dyn LinkOpener, delay: Duration) -> usize {
    let mut opened = 0;
    for (i, link) in links.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        match opener.open(link) {
            Ok(()) => opened += 1,
            Err(e) => warn!("Could not open {}: {:#}", link, e),
        }
    }
    info!("Opened {}/{} links", opened, links.len());
    opened
}
