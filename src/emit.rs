//! Artifact emission.
//!
//! The final pipeline stage: walks the [`PageIndex`] and writes every
//! artifact under the output root. Every HTML target gets a JSON sidecar —
//! the same entries, machine-readable — so client-side search and external
//! consumers never scrape HTML.
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── {slug}.html + {slug}.json    # one per article (sidecar carries body)
//! ├── {n}.html + {n}.json          # one per index page, 1-based
//! ├── index.html + index.json      # duplicate of page 1 under a fixed name
//! ├── {tag}.html + {tag}.json      # one per tag
//! ├── feed.xml                     # combined Atom feed (page-1 entries)
//! ├── {tag}.xml                    # per-tag Atom feed
//! ├── opensearch.xml
//! ├── sitemap.xml
//! ├── manifest.webmanifest
//! ├── robots.txt
//! └── about.html
//! ```
//!
//! Writes are plain `fs::write`: existing artifacts are overwritten in
//! place, and a failed run may leave a partially written file behind. The
//! pipeline treats any write failure as fatal, so a failed run is a failed
//! site either way.

use crate::article::{Article, FeedView};
use crate::config::SiteConfig;
use crate::feeds;
use crate::index::PageIndex;
use crate::render;
use maud::Markup;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Artifact counts for CLI reporting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmitSummary {
    pub articles: usize,
    pub index_pages: usize,
    pub tag_pages: usize,
    pub feeds: usize,
    pub singletons: usize,
}

/// Walks the index and writes every artifact.
pub struct Emitter<'a> {
    articles: &'a [Article],
    index: &'a PageIndex,
    config: &'a SiteConfig,
    out: PathBuf,
}

impl<'a> Emitter<'a> {
    pub fn new(articles: &'a [Article], index: &'a PageIndex, config: &'a SiteConfig) -> Self {
        Emitter {
            articles,
            index,
            config,
            out: PathBuf::from(&config.build.output_dir),
        }
    }

    /// Emit everything. Artifact groups are independent of each other;
    /// within one target, entry order is the index's order.
    pub fn run(&self) -> Result<EmitSummary, EmitError> {
        fs::create_dir_all(&self.out)?;
        let mut summary = EmitSummary::default();

        for article in self.articles {
            let markup = render::article_page(article, self.config);
            self.write_target(&article.slug, &[article], markup, true)?;
            summary.articles += 1;
        }

        let page_count = self.index.pages.len();
        for (i, page) in self.index.pages.iter().enumerate() {
            let number = i + 1;
            let entries = self.select(page);
            let markup = render::index_page(
                &entries,
                number,
                number != page_count,
                &self.index.keywords,
                self.config,
            );
            self.write_target(&number.to_string(), &entries, markup, false)?;
            summary.index_pages += 1;
        }

        // Page 1 again under the fixed site-root name
        let front = self.select(self.index.front_page());
        let markup =
            render::index_page(&front, 1, page_count > 1, &self.index.keywords, self.config);
        self.write_target("index", &front, markup, false)?;
        summary.index_pages += 1;

        for group in &self.index.by_tag {
            let entries = self.select(&group.articles);
            let keywords = self.index.keywords_for_tag(&group.tag);
            let markup = render::tag_page(&entries, &group.tag, &keywords, self.config);
            self.write_target(&group.tag, &entries, markup, false)?;
            summary.tag_pages += 1;
        }

        let front_views: Vec<FeedView<'_>> = front.iter().map(|a| a.feed_view()).collect();
        self.write_raw("feed.xml", &feeds::atom_feed(&front_views, None, self.config))?;
        summary.feeds += 1;
        for group in &self.index.by_tag {
            let views: Vec<FeedView<'_>> = self
                .select(&group.articles)
                .into_iter()
                .map(Article::feed_view)
                .collect();
            let xml = feeds::atom_feed(&views, Some(&group.tag), self.config);
            self.write_raw(&format!("{}.xml", group.tag), &xml)?;
            summary.feeds += 1;
        }

        self.write_raw("opensearch.xml", &feeds::opensearch(self.config))?;
        self.write_raw(
            "sitemap.xml",
            &feeds::sitemap(&self.index.sitemap_entries, self.config),
        )?;
        self.write_raw("manifest.webmanifest", &feeds::webmanifest(self.config))?;
        self.write_raw("robots.txt", feeds::ROBOTS_TXT)?;
        let about = render::about_page(&self.index.keywords, self.config);
        self.write_raw("about.html", &about.into_string())?;
        summary.singletons += 5;

        Ok(summary)
    }

    /// Resolve index positions back to articles, preserving order.
    fn select(&self, positions: &[usize]) -> Vec<&'a Article> {
        positions.iter().map(|&p| &self.articles[p]).collect()
    }

    /// The shared target contract: rendered document plus JSON sidecar.
    fn write_target(
        &self,
        name: &str,
        entries: &[&Article],
        markup: Markup,
        include_body: bool,
    ) -> Result<(), EmitError> {
        fs::write(self.out.join(format!("{name}.html")), markup.into_string())?;
        let sidecar = json!({
            "entries": entries
                .iter()
                .map(|a| a.to_json(include_body))
                .collect::<Vec<_>>(),
        });
        fs::write(
            self.out.join(format!("{name}.json")),
            serde_json::to_string(&sidecar)?,
        )?;
        Ok(())
    }

    /// Single-artifact targets: no sidecar.
    fn write_raw(&self, filename: &str, content: &str) -> Result<(), EmitError> {
        fs::write(self.out.join(filename), content)?;
        Ok(())
    }
}
