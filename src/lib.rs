//! # Inkpress
//!
//! A batch static blog generator. Markdown articles with YAML front matter
//! go in, a complete publishable site comes out: HTML pages, JSON sidecars,
//! Atom feeds, sitemap, discovery files, and PNG cover images.
//!
//! # Architecture: Batch Pipeline
//!
//! Every build regenerates the whole site in four stages over shared
//! in-memory data:
//!
//! ```text
//! 1. Parse   articles/*.md  →  Vec<Article>     (front matter + two body renderings)
//! 2. Index   articles       →  PageIndex        (pages, tag groups, keywords, sitemap)
//! 3. Emit    index          →  public/          (HTML + JSON + XML artifacts)
//! 4. Cover   articles       →  public/*.png     (optional cover images)
//! ```
//!
//! There is no incremental mode and no cache: article collections are small
//! enough that a full rebuild is fast, and regenerating everything keeps
//! every artifact trivially consistent with every other.
//!
//! The pipeline is fail-fast. One malformed article, missing image, or
//! unfittable cover caption aborts the build with a specific error instead
//! of publishing a partially-correct site.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`parse`] | Stage 1 — walks the articles directory, splits front matter, renders both body flavors, probes images |
//! | [`index`] | Stage 2 — pagination, tag grouping, keyword ranking, sitemap inventory |
//! | [`emit`] | Stage 3 — writes every artifact: pages, sidecars, feeds, discovery files |
//! | [`cover`] | Stage 4 — caption layout search and PNG cover drawing |
//! | [`article`] | The shared article entity and its feed projection |
//! | [`render`] | Maud page templates: article, index, tag, about |
//! | [`feeds`] | String-built XML artifacts: Atom, sitemap, OpenSearch, manifest |
//! | [`config`] | `config.toml` loading, defaults, and validation |
//! | [`output`] | CLI output formatting for build and check |
//!
//! # Design Decisions
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system, rather than Handlebars or Tera:
//!
//! - **Compile-time checking**: malformed HTML is a build error, not a runtime surprise.
//! - **Type-safe**: template variables are Rust expressions — no stringly-typed lookups.
//! - **XSS-safe by default**: all interpolation is auto-escaped.
//! - **Zero runtime files**: no template directory to ship or get out of sync.
//!
//! Maud serializes for HTML, though, so the XML artifacts in [`feeds`] are
//! assembled as strings with explicit escaping instead.
//!
//! ## Two Body Renderings Per Article
//!
//! Each article's markdown is rendered twice at parse time: a site flavor
//! (root-relative image URLs, language-classed code blocks for client-side
//! highlighting) and a feed flavor (fully-qualified URLs, plain code blocks
//! that survive feed readers). Rendering both up front means every later
//! stage just picks a string — no stage re-parses markdown.
//!
//! ## Positional Index, Borrowed Everywhere
//!
//! The [`index::PageIndex`] stores positions into the parsed article slice
//! rather than clones. Pages, tag groups, and feeds all resolve through the
//! same slice, so an article is held in memory exactly once no matter how
//! many artifacts mention it.

pub mod article;
pub mod config;
pub mod cover;
pub mod emit;
pub mod feeds;
pub mod index;
pub mod output;
pub mod parse;
pub mod render;
