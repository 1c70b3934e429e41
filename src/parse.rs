//! Markdown article parsing.
//!
//! Stage 1 of the inkpress pipeline. Turns each `*.md` source into a
//! normalized [`Article`]: front matter metadata, two HTML renderings of the
//! body, the extracted summary, and probed metadata for every syndicated
//! image.
//!
//! ## Source Format
//!
//! ```text
//! ---
//! title: Why I rewrote it
//! description: A short caption for the cover image
//! tags: rust,tooling
//! published: 2024-03-01T12:00:00+00:00
//! updated: 2024-03-02T09:30:00+00:00
//! ---
//! > One-paragraph summary. Required: the body must open with a blockquote.
//!
//! Regular markdown follows...
//! ```
//!
//! ## Dual Body Rendering
//!
//! Every body is rendered twice:
//!
//! - **Site flavor**: image srcs become `/images/{basename}`, fenced code
//!   blocks keep their `language-*` class for client-side highlighting.
//! - **Feed flavor**: image srcs become `https://{domain}/images/{basename}`
//!   so they resolve inside feed readers, and code blocks are demoted to
//!   plain `<pre><code>` — no highlighting markup that a reader might strip,
//!   whitespace survives verbatim.
//!
//! ## Syndication Opt-Out
//!
//! An image whose URL carries a `#nosyndication` fragment is rendered in the
//! page but left out of the article's image list (and so out of feed
//! enclosures). The fragment is stripped from the output either way.
//!
//! ## Failure Policy
//!
//! Everything here is fatal: a missing front matter key, a body that does
//! not open with a blockquote, an unreadable referenced image, or two
//! sources mapping to the same slug all abort the run. One malformed
//! document is a broken site, not a skippable warning.

use crate::article::{Article, ArticleImage};
use crate::config::SiteConfig;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing front matter block in {0}")]
    MissingFrontMatter(PathBuf),
    #[error("invalid front matter in {file}: {source}")]
    FrontMatter {
        file: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid timestamp {value:?} in {file}")]
    BadTimestamp { file: PathBuf, value: String },
    #[error("must start with a blockquote: {0}")]
    MissingLeadingQuote(PathBuf),
    #[error("duplicate slug {0:?} — two sources map to the same artifact")]
    DuplicateSlug(String),
    #[error("cannot read referenced image {0}")]
    ImageMissing(PathBuf),
    #[error("cannot decode referenced image {file}: {source}")]
    ImageProbe {
        file: PathBuf,
        source: image::ImageError,
    },
}

/// Front matter keys. All required; markdown2-style comma-separated tags.
#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: String,
    description: String,
    tags: String,
    published: String,
    updated: String,
}

/// Which rendering of the body is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFlavor {
    Site,
    Feed,
}

/// One embedded image reference found while rendering.
#[derive(Debug, Clone)]
struct ImageRef {
    filename: String,
    /// Title attribute if present, else alt text.
    title: String,
    syndicated: bool,
}

struct RenderedBody {
    html: String,
    images: Vec<ImageRef>,
}

/// Marker fragment excluding an image from syndication.
const NO_SYNDICATION: &str = "#nosyndication";

const MARKDOWN_OPTIONS: Options = Options::ENABLE_TABLES.union(Options::ENABLE_STRIKETHROUGH);

/// Parse every `*.md` under the configured articles directory.
///
/// Returns articles sorted by `published`, most recent first — the order
/// every downstream stage assumes. Duplicate slugs are fatal.
pub fn parse_articles(config: &SiteConfig) -> Result<Vec<Article>, ParseError> {
    let mut paths: Vec<PathBuf> = WalkDir::new(&config.build.articles_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    // Filesystem iteration order is not stable; slug collisions and tag
    // first-sight order must not depend on it
    paths.sort();

    let mut articles = Vec::with_capacity(paths.len());
    let mut seen = HashSet::new();
    for path in &paths {
        let article = parse_article(path, config)?;
        if !seen.insert(article.slug.clone()) {
            return Err(ParseError::DuplicateSlug(article.slug));
        }
        articles.push(article);
    }

    articles.sort_by(|a, b| b.published.cmp(&a.published));
    Ok(articles)
}

/// Parse one markdown source into an [`Article`].
pub fn parse_article(path: &Path, config: &SiteConfig) -> Result<Article, ParseError> {
    let source = fs::read_to_string(path)?;

    let (meta_block, body_src) = split_front_matter(&source)
        .ok_or_else(|| ParseError::MissingFrontMatter(path.to_path_buf()))?;
    let meta: FrontMatter =
        serde_yaml::from_str(meta_block).map_err(|source| ParseError::FrontMatter {
            file: path.to_path_buf(),
            source,
        })?;

    let published = parse_timestamp(&meta.published).ok_or_else(|| ParseError::BadTimestamp {
        file: path.to_path_buf(),
        value: meta.published.clone(),
    })?;
    let updated = parse_timestamp(&meta.updated).ok_or_else(|| ParseError::BadTimestamp {
        file: path.to_path_buf(),
        value: meta.updated.clone(),
    })?;

    let description =
        leading_quote_text(body_src).ok_or_else(|| ParseError::MissingLeadingQuote(path.to_path_buf()))?;

    let site = render_body(body_src, BodyFlavor::Site, &config.domain);
    let feed = render_body(body_src, BodyFlavor::Feed, &config.domain);

    // Probe against the published images directory so feed enclosures carry
    // the exact bytes readers will fetch
    let images_dir = Path::new(&config.build.output_dir).join("images");
    let images = feed
        .images
        .iter()
        .filter(|img| img.syndicated)
        .map(|img| probe_image(&images_dir, img))
        .collect::<Result<Vec<_>, _>>()?;

    let slug = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let link = config.page_url(&slug);

    let tags: Vec<String> = meta
        .tags
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    Ok(Article {
        slug,
        title: meta.title,
        short_description: meta.description,
        description,
        body: site.html,
        body_feed: feed.html,
        images,
        tags,
        published,
        updated,
        link,
    })
}

/// Split a `---`-fenced front matter block from the body.
fn split_front_matter(source: &str) -> Option<(&str, &str)> {
    let rest = source.strip_prefix("---\n")?;
    let end = rest.find("\n---")?;
    let body = rest[end + 4..].strip_prefix('\n').unwrap_or(&rest[end + 4..]);
    Some((&rest[..end], body))
}

/// Accept RFC 3339 plus the common naive forms; naive values are pinned to UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }
    None
}

/// Extract the plain text of the required leading blockquote.
///
/// Returns `None` when the body's first block is anything else.
fn leading_quote_text(markdown: &str) -> Option<String> {
    let mut parser = Parser::new_ext(markdown, MARKDOWN_OPTIONS);
    match parser.next() {
        Some(Event::Start(Tag::BlockQuote(_))) => {}
        _ => return None,
    }
    let mut depth = 1u32;
    let mut text = String::new();
    for event in parser {
        match event {
            Event::Start(Tag::BlockQuote(_)) => depth += 1,
            Event::End(TagEnd::BlockQuote(_)) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Event::Text(t) => text.push_str(&t),
            Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    Some(text.trim().to_string())
}

/// Render the markdown body in one flavor, collecting image references.
fn render_body(markdown: &str, flavor: BodyFlavor, domain: &str) -> RenderedBody {
    struct PendingImage {
        filename: String,
        title: String,
        syndicated: bool,
        alt: String,
    }

    let parser = Parser::new_ext(markdown, MARKDOWN_OPTIONS);
    let mut events: Vec<Event> = Vec::new();
    let mut images: Vec<ImageRef> = Vec::new();
    let mut pending: Option<PendingImage> = None;

    for event in parser {
        match event {
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let syndicated = !dest_url.ends_with(NO_SYNDICATION);
                let clean = dest_url.trim_end_matches(NO_SYNDICATION);
                let filename = basename(clean).to_string();
                let dest = if syndicated {
                    match flavor {
                        BodyFlavor::Site => format!("/images/{filename}"),
                        BodyFlavor::Feed => format!("https://{domain}/images/{filename}"),
                    }
                } else {
                    // Opted-out images keep their authored location
                    clean.to_string()
                };
                pending = Some(PendingImage {
                    filename,
                    title: title.to_string(),
                    syndicated,
                    alt: String::new(),
                });
                events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url: CowStr::from(dest),
                    title,
                    id,
                }));
            }
            Event::End(TagEnd::Image) => {
                if let Some(img) = pending.take() {
                    let title = if img.title.is_empty() { img.alt } else { img.title };
                    images.push(ImageRef {
                        filename: img.filename,
                        title,
                        syndicated: img.syndicated,
                    });
                }
                events.push(Event::End(TagEnd::Image));
            }
            Event::Text(text) => {
                if let Some(img) = &mut pending {
                    img.alt.push_str(&text);
                }
                events.push(Event::Text(text));
            }
            // Feed readers strip unknown classes and mangle highlighted
            // markup; demote fenced blocks to plain indented-style output
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(_)))
                if flavor == BodyFlavor::Feed =>
            {
                events.push(Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)));
            }
            other => events.push(other),
        }
    }

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    RenderedBody { html, images }
}

fn basename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Probe a referenced image on disk for the metadata feeds need.
fn probe_image(images_dir: &Path, img: &ImageRef) -> Result<ArticleImage, ParseError> {
    let path = images_dir.join(&img.filename);
    let filesize = fs::metadata(&path)
        .map_err(|_| ParseError::ImageMissing(path.clone()))?
        .len();
    let reader = image::ImageReader::open(&path)
        .map_err(|_| ParseError::ImageMissing(path.clone()))?
        .with_guessed_format()?;
    let mimetype = reader
        .format()
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let (width, height) = reader
        .into_dimensions()
        .map_err(|source| ParseError::ImageProbe {
            file: path.clone(),
            source,
        })?;
    Ok(ArticleImage {
        filename: img.filename.clone(),
        title: img.title.clone(),
        width,
        height,
        mimetype,
        filesize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_article(dir: &Path, name: &str, front: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("---\n{front}---\n{body}")).unwrap();
        path
    }

    fn stock_front() -> String {
        "title: Test Post\n\
         description: A short caption\n\
         tags: rust,tooling\n\
         published: 2024-03-01T12:00:00+00:00\n\
         updated: 2024-03-02T09:30:00+00:00\n"
            .to_string()
    }

    fn test_config(tmp: &TempDir) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.domain = "blog.test".to_string();
        config.build.articles_dir = tmp.path().join("articles").to_string_lossy().into_owned();
        config.build.output_dir = tmp.path().join("public").to_string_lossy().into_owned();
        fs::create_dir_all(&config.build.articles_dir).unwrap();
        fs::create_dir_all(Path::new(&config.build.output_dir).join("images")).unwrap();
        config
    }

    #[test]
    fn parses_all_fields() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "My-Post.md",
            &stock_front(),
            "> The summary quote.\n\nBody **text** here.\n",
        );

        let article = parse_article(&path, &config).unwrap();
        assert_eq!(article.slug, "my-post");
        assert_eq!(article.title, "Test Post");
        assert_eq!(article.short_description, "A short caption");
        assert_eq!(article.description, "The summary quote.");
        assert_eq!(article.tags, vec!["rust", "tooling"]);
        assert_eq!(article.link, "https://blog.test/my-post.html");
        assert!(article.body.contains("<strong>text</strong>"));
        assert_eq!(article.published.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn missing_front_matter_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let path = Path::new(&config.build.articles_dir).join("bare.md");
        fs::write(&path, "> quote\n\nNo front matter.\n").unwrap();
        assert!(matches!(
            parse_article(&path, &config),
            Err(ParseError::MissingFrontMatter(_))
        ));
    }

    #[test]
    fn missing_required_key_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let front = "title: No tags here\n\
                     description: x\n\
                     published: 2024-03-01\n\
                     updated: 2024-03-01\n";
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "partial.md",
            front,
            "> quote\n",
        );
        assert!(matches!(
            parse_article(&path, &config),
            Err(ParseError::FrontMatter { .. })
        ));
    }

    #[test]
    fn missing_leading_quote_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "noquote.md",
            &stock_front(),
            "Just a paragraph, no quote.\n",
        );
        assert!(matches!(
            parse_article(&path, &config),
            Err(ParseError::MissingLeadingQuote(_))
        ));
    }

    #[test]
    fn bad_timestamp_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let front = "title: t\ndescription: d\ntags: a\npublished: yesterday\nupdated: 2024-03-01\n";
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "badtime.md",
            front,
            "> quote\n",
        );
        assert!(matches!(
            parse_article(&path, &config),
            Err(ParseError::BadTimestamp { .. })
        ));
    }

    #[test]
    fn naive_timestamps_pinned_to_utc() {
        assert_eq!(
            parse_timestamp("2024-03-01T10:30:00").unwrap().to_rfc3339(),
            "2024-03-01T10:30:00+00:00"
        );
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap().to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );
        assert!(parse_timestamp("2024-03-01T10:30:00-05:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn site_and_feed_bodies_diverge_on_images() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let png = image::RgbImage::new(4, 3);
        png.save(Path::new(&config.build.output_dir).join("images/chart.png"))
            .unwrap();
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "imgpost.md",
            &stock_front(),
            "> quote\n\n![A chart](figures/chart.png)\n",
        );

        let article = parse_article(&path, &config).unwrap();
        assert!(article.body.contains("src=\"/images/chart.png\""));
        assert!(
            article
                .body_feed
                .contains("src=\"https://blog.test/images/chart.png\"")
        );
    }

    #[test]
    fn image_metadata_probed_from_disk() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let png = image::RgbImage::new(4, 3);
        png.save(Path::new(&config.build.output_dir).join("images/chart.png"))
            .unwrap();
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "imgpost.md",
            &stock_front(),
            "> quote\n\n![A chart](chart.png \"Quarterly numbers\")\n",
        );

        let article = parse_article(&path, &config).unwrap();
        assert_eq!(article.images.len(), 1);
        let img = &article.images[0];
        assert_eq!(img.filename, "chart.png");
        assert_eq!(img.title, "Quarterly numbers");
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img.mimetype, "image/png");
        assert!(img.filesize > 0);
    }

    #[test]
    fn image_title_falls_back_to_alt() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let png = image::RgbImage::new(2, 2);
        png.save(Path::new(&config.build.output_dir).join("images/x.png"))
            .unwrap();
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "alt.md",
            &stock_front(),
            "> quote\n\n![The alt text](x.png)\n",
        );
        let article = parse_article(&path, &config).unwrap();
        assert_eq!(article.images[0].title, "The alt text");
    }

    #[test]
    fn nosyndication_images_are_excluded_but_rendered() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "optout.md",
            &stock_front(),
            "> quote\n\n![decoration](deco.png#nosyndication)\n",
        );

        let article = parse_article(&path, &config).unwrap();
        // Not in the enclosure list, so never probed on disk
        assert!(article.images.is_empty());
        // Still rendered, marker stripped, authored location kept
        assert!(article.body.contains("src=\"deco.png\""));
        assert!(!article.body.contains("nosyndication"));
    }

    #[test]
    fn missing_referenced_image_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "broken.md",
            &stock_front(),
            "> quote\n\n![gone](nowhere.png)\n",
        );
        assert!(matches!(
            parse_article(&path, &config),
            Err(ParseError::ImageMissing(_))
        ));
    }

    #[test]
    fn code_blocks_keep_language_class_on_site_only() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let path = write_article(
            Path::new(&config.build.articles_dir),
            "code.md",
            &stock_front(),
            "> quote\n\n```rust\nfn main() {}\n```\n",
        );

        let article = parse_article(&path, &config).unwrap();
        assert!(article.body.contains("language-rust"));
        assert!(!article.body_feed.contains("language-rust"));
        // Whitespace inside the block survives both flavors
        assert!(article.body_feed.contains("fn main() {}"));
    }

    #[test]
    fn collection_sorted_most_recent_first() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let dir = Path::new(&config.build.articles_dir).to_path_buf();
        let older = stock_front().replace("2024-03-01T12:00:00+00:00", "2024-01-01T00:00:00+00:00");
        write_article(&dir, "a-old.md", &older, "> old\n");
        write_article(&dir, "b-new.md", &stock_front(), "> new\n");

        let articles = parse_articles(&config).unwrap();
        assert_eq!(articles[0].slug, "b-new");
        assert_eq!(articles[1].slug, "a-old");
    }

    #[test]
    fn duplicate_slug_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp);
        let dir = Path::new(&config.build.articles_dir).to_path_buf();
        // Different source names, same lowercase stem
        write_article(&dir, "Post.md", &stock_front(), "> one\n");
        fs::create_dir_all(dir.join("drafts")).unwrap();
        write_article(&dir.join("drafts"), "post.md", &stock_front(), "> two\n");

        assert!(matches!(
            parse_articles(&config),
            Err(ParseError::DuplicateSlug(_))
        ));
    }

    #[test]
    fn front_matter_split_handles_missing_fence() {
        assert!(split_front_matter("no fences at all").is_none());
        assert!(split_front_matter("---\ntitle: x\nnever closed").is_none());
        let (meta, body) = split_front_matter("---\ntitle: x\n---\nbody\n").unwrap();
        assert_eq!(meta, "title: x");
        assert_eq!(body, "body\n");
    }
}
