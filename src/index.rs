//! Index derivation: pagination, tag grouping, keyword ranking, sitemap.
//!
//! Takes the full article sequence (already sorted most-recent-first) and
//! derives every navigation structure the emitter walks. Rebuilt from
//! scratch on every run; deterministic for a given input order.
//!
//! Articles are referenced by position into the input slice rather than by
//! clone — the indexer only arranges, it never owns content.

use crate::article::Article;

/// All articles carrying one tag, in global (most-recent-first) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagGroup {
    pub tag: String,
    /// Positions into the article slice the index was built from.
    pub articles: Vec<usize>,
}

/// Derived navigation structures, rebuilt every run.
#[derive(Debug, Clone)]
pub struct PageIndex {
    /// Fixed-size groups of article positions. The last group may be
    /// smaller; an empty collection has zero groups.
    pub pages: Vec<Vec<usize>>,
    /// Tag groups in first-sight order.
    pub by_tag: Vec<TagGroup>,
    /// Up to 20 tag names ranked by ascending group size.
    ///
    /// Ascending means the *least* populated tags rank first. That matches
    /// the long-standing behavior of this site's navigation, which
    /// downstream templates and feeds depend on, so it is kept as-is even
    /// though "top keywords" would normally rank descending.
    pub keywords: Vec<String>,
    /// Sitemap identifiers: page numbers 2..=pageCount, then every tag,
    /// then every slug.
    pub sitemap_entries: Vec<String>,
}

/// How many tags the keyword set is capped at.
const KEYWORD_LIMIT: usize = 20;

/// Build the page index from the pre-sorted article sequence.
///
/// `per_page` must be positive; [`crate::config::SiteConfig::validate`]
/// enforces that before the pipeline runs.
pub fn build(articles: &[Article], per_page: usize) -> PageIndex {
    let mut by_tag: Vec<TagGroup> = Vec::new();
    for (pos, article) in articles.iter().enumerate() {
        for tag in &article.tags {
            match by_tag.iter_mut().find(|group| &group.tag == tag) {
                Some(group) => group.articles.push(pos),
                None => by_tag.push(TagGroup {
                    tag: tag.clone(),
                    articles: vec![pos],
                }),
            }
        }
    }

    let mut pages: Vec<Vec<usize>> = Vec::new();
    for pos in 0..articles.len() {
        if pos % per_page == 0 {
            pages.push(Vec::new());
        }
        // Unwrap-free: the branch above guarantees a last page exists
        if let Some(page) = pages.last_mut() {
            page.push(pos);
        }
    }

    // Stable sort keeps first-sight order for equally sized groups
    let mut ranked: Vec<&TagGroup> = by_tag.iter().collect();
    ranked.sort_by_key(|group| group.articles.len());
    let keywords: Vec<String> = ranked
        .iter()
        .take(KEYWORD_LIMIT)
        .map(|group| group.tag.clone())
        .collect();

    let mut sitemap_entries: Vec<String> = Vec::new();
    sitemap_entries.extend((2..=pages.len()).map(|n| n.to_string()));
    sitemap_entries.extend(by_tag.iter().map(|group| group.tag.clone()));
    sitemap_entries.extend(articles.iter().map(|a| a.slug.clone()));

    PageIndex {
        pages,
        by_tag,
        keywords,
        sitemap_entries,
    }
}

impl PageIndex {
    /// Keyword list for a tag page: the tag itself first, then the ranked
    /// keywords in their original order with that tag excluded.
    pub fn keywords_for_tag(&self, tag: &str) -> Vec<String> {
        let mut keywords = vec![tag.to_string()];
        keywords.extend(self.keywords.iter().filter(|k| *k != tag).cloned());
        keywords
    }

    /// Articles on the first page, or none for an empty collection.
    pub fn front_page(&self) -> &[usize] {
        self.pages.first().map(Vec::as_slice).unwrap_or(&[])
    }
}
