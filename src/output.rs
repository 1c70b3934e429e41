//! CLI output formatting for the build and check commands.
//!
//! Output is information-centric: every article leads with its positional
//! index and title, with the output artifact and metadata as indented
//! context lines. Each command has a `format_*` function (returns
//! `Vec<String>`, pure, no I/O) and a `print_*` wrapper that writes to
//! stdout.
//!
//! ```text
//! Articles
//! 001 Shipping the rewrite → shipping-the-rewrite.html
//!     Published: 2024-03-20
//!     Tags: rust, tooling
//!
//! Tags
//! 001 rust (2 articles)
//!
//! Generated 2 articles, 3 index pages, 1 tag page, 2 feeds, 3 covers
//! ```

use crate::article::Article;
use crate::emit::EmitSummary;
use crate::index::PageIndex;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn count_noun(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// One header line per article: index, title, output artifact.
fn article_lines(articles: &[Article]) -> Vec<String> {
    let mut lines = vec!["Articles".to_string()];
    for (i, article) in articles.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}.html",
            format_index(i + 1),
            article.title,
            article.slug
        ));
        lines.push(format!(
            "    Published: {}",
            article.published.format("%Y-%m-%d")
        ));
        if !article.tags.is_empty() {
            lines.push(format!("    Tags: {}", article.tags.join(", ")));
        }
    }
    lines
}

/// Tag groups in index order, with article counts.
fn tag_lines(index: &PageIndex) -> Vec<String> {
    let mut lines = Vec::new();
    if index.by_tag.is_empty() {
        return lines;
    }
    lines.push(String::new());
    lines.push("Tags".to_string());
    for (i, group) in index.by_tag.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            group.tag,
            count_noun(group.articles.len(), "article")
        ));
    }
    lines
}

/// Format build output: article and tag inventory plus the final totals.
pub fn format_build_output(
    articles: &[Article],
    index: &PageIndex,
    summary: &EmitSummary,
    covers: Option<usize>,
) -> Vec<String> {
    let mut lines = article_lines(articles);
    lines.extend(tag_lines(index));

    lines.push(String::new());
    let mut totals = format!(
        "Generated {}, {}, {}, {}",
        count_noun(summary.articles, "article"),
        count_noun(summary.index_pages, "index page"),
        count_noun(summary.tag_pages, "tag page"),
        count_noun(summary.feeds, "feed"),
    );
    if let Some(covers) = covers {
        totals.push_str(&format!(", {}", count_noun(covers, "cover")));
    }
    lines.push(totals);
    lines
}

/// Format check output: the same inventory, no totals line since nothing
/// was written.
pub fn format_check_output(articles: &[Article], index: &PageIndex) -> Vec<String> {
    let mut lines = article_lines(articles);
    lines.extend(tag_lines(index));
    lines.push(String::new());
    lines.push(format!(
        "Checked {} across {}",
        count_noun(articles.len(), "article"),
        count_noun(index.pages.len(), "index page"),
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(
    articles: &[Article],
    index: &PageIndex,
    summary: &EmitSummary,
    covers: Option<usize>,
) {
    for line in format_build_output(articles, index, summary, covers) {
        println!("{}", line);
    }
}

/// Print check output to stdout.
pub fn print_check_output(articles: &[Article], index: &PageIndex) {
    for line in format_check_output(articles, index) {
        println!("{}", line);
    }
}
