//! The article entity shared across all pipeline stages.
//!
//! An [`Article`] is the normalized form of one authored markdown document.
//! It is immutable after construction: the parser builds it once, the
//! indexer and emitter only read it. The one place that needs a different
//! shape — Atom feeds, which want the feed-flavored body — gets a read-only
//! [`FeedView`] projection instead of a mutated copy.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::{Value, json};

/// Descriptor for one embedded image that is eligible for syndication.
///
/// Dimensions and sizes are probed from the file on disk at parse time so
/// feed readers get correct enclosure metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleImage {
    pub filename: String,
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub mimetype: String,
    pub filesize: u64,
}

/// One normalized authored piece with both site and feed renderings.
#[derive(Debug, Clone)]
pub struct Article {
    /// Unique lowercase identifier derived from the source filename.
    /// Join key for URLs, artifact names and sitemap entries.
    pub slug: String,
    /// Title from front matter.
    pub title: String,
    /// Plain caption from front matter, used for the cover image.
    pub short_description: String,
    /// Plain-text summary extracted from the required leading blockquote.
    pub description: String,
    /// Site HTML: image srcs are `/images/`-relative, code blocks carry a
    /// language class for client-side highlighting.
    pub body: String,
    /// Feed HTML: image srcs are fully qualified, code blocks are plain so
    /// whitespace survives syndication.
    pub body_feed: String,
    /// Syndication-eligible embedded images, in document order.
    pub images: Vec<ArticleImage>,
    /// Tags in source order. Duplicates are not deduplicated here.
    pub tags: Vec<String>,
    /// Drives global ordering (most recent first).
    pub published: DateTime<FixedOffset>,
    pub updated: DateTime<FixedOffset>,
    /// Fully-qualified canonical URL.
    pub link: String,
}

impl Article {
    /// JSON projection for the sidecar artifacts.
    ///
    /// Always carries slug, title, description, images, timestamps
    /// (RFC 3339), tags and link. The body — always the feed flavor, since
    /// sidecar consumers are machines — is included only when asked for.
    pub fn to_json(&self, include_body: bool) -> Value {
        let mut value = json!({
            "slug": self.slug,
            "title": self.title,
            "description": self.description,
            "images": self.images,
            "published": self.published.to_rfc3339(),
            "updated": self.updated.to_rfc3339(),
            "tags": self.tags,
            "link": self.link,
        });
        if include_body {
            value["body"] = Value::String(self.body_feed.clone());
        }
        value
    }

    /// Feed projection of this article. Same identity, feed-flavored body.
    pub fn feed_view(&self) -> FeedView<'_> {
        FeedView { article: self }
    }
}

/// Read-only projection of an [`Article`] for feed rendering.
///
/// Substitutes `body_feed` for `body` without cloning or mutating the
/// underlying article. Transient: built for one render call, never stored.
#[derive(Debug, Clone, Copy)]
pub struct FeedView<'a> {
    article: &'a Article,
}

impl<'a> FeedView<'a> {
    pub fn body(&self) -> &'a str {
        &self.article.body_feed
    }
}

impl<'a> std::ops::Deref for FeedView<'a> {
    type Target = Article;

    fn deref(&self) -> &Article {
        self.article
    }
}
