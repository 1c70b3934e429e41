//! HTML page rendering.
//!
//! One function per page template: article, index, tag, about. Every page
//! shares the same document chrome ([`base_document`], [`site_header`],
//! [`page_footer`]).
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating
//! rather than a runtime template engine:
//!
//! - **Compile-time checking**: malformed HTML is a build error.
//! - **Type-safe**: template variables are Rust expressions.
//! - **XSS-safe by default**: all interpolation is auto-escaped; article
//!   bodies are the only `PreEscaped` input and they come from our own
//!   markdown rendering.
//!
//! XML artifacts (feeds, sitemap, opensearch) live in [`crate::feeds`] —
//! maud targets HTML serialization and will not self-close XML elements.

use crate::article::Article;
use crate::config::SiteConfig;
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Date format for bylines: "March 1, 2024".
const BYLINE_FORMAT: &str = "%B %-d, %Y";

/// Renders the shared HTML document structure.
fn base_document(title: &str, description: &str, config: &SiteConfig, content: Markup) -> Markup {
    // The locale identifier is e.g. "en_US"; html lang wants "en-US"
    let lang = config.build.locale.replace('_', "-");
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content=(description);
                meta name="author" content=(config.author.name);
                meta name="twitter:creator" content=(config.author_handle());
                link rel="alternate" type="application/atom+xml" title=(config.title) href="/feed.xml";
                link rel="search" type="application/opensearchdescription+xml" title=(config.site_name) href="/opensearch.xml";
                link rel="manifest" href="/manifest.webmanifest";
                link rel="stylesheet" href="/assets/style.css";
                @if !config.build.debug && !config.analytics_id.is_empty() {
                    script async src={ "https://www.googletagmanager.com/gtag/js?id=" (config.analytics_id) } {}
                    script {
                        "window.dataLayer=window.dataLayer||[];"
                        "function gtag(){dataLayer.push(arguments);}"
                        "gtag('js',new Date());gtag('config','" (config.analytics_id) "');"
                    }
                }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header: site name home link plus fixed nav.
fn site_header(config: &SiteConfig) -> Markup {
    html! {
        header.site-header {
            a.site-name href="/" { (config.site_name) }
            nav.site-nav {
                a href="/about.html" { "about" }
                a href="/feed.xml" { "feed" }
            }
        }
    }
}

/// Renders the footer: external links and author identity.
fn page_footer(config: &SiteConfig) -> Markup {
    html! {
        footer.site-footer {
            @if !config.links.is_empty() {
                ul.links {
                    @for link in &config.links {
                        li { a href=(link) rel="noopener" { (link) } }
                    }
                }
            }
            p.author {
                (config.author.name)
                " · "
                a href={ "mailto:" (config.author.email) } { (config.author.email) }
            }
        }
    }
}

/// Renders the keyword navigation cloud, linking each tag to its page.
fn keyword_nav(keywords: &[String]) -> Markup {
    html! {
        nav.keywords {
            @for keyword in keywords {
                a.keyword href={ "/" (keyword) ".html" } { (keyword) }
            }
        }
    }
}

/// Renders one article summary for index and tag listings.
fn article_summary(article: &Article) -> Markup {
    html! {
        article.summary {
            h2 { a href={ "/" (article.slug) ".html" } { (article.title) } }
            time datetime=(article.published.to_rfc3339()) {
                (article.published.format(BYLINE_FORMAT))
            }
            p.description { (article.description) }
            @if !article.tags.is_empty() {
                ul.tags {
                    @for tag in &article.tags {
                        li { a href={ "/" (tag) ".html" } { (tag) } }
                    }
                }
            }
        }
    }
}

/// Renders a full article page.
pub fn article_page(article: &Article, config: &SiteConfig) -> Markup {
    let title = format!("{} · {}", article.title, config.site_name);
    let content = html! {
        (site_header(config))
        main.article-page {
            article {
                header {
                    h1 { (article.title) }
                    time datetime=(article.published.to_rfc3339()) {
                        (article.published.format(BYLINE_FORMAT))
                    }
                }
                div.article-body {
                    (PreEscaped(article.body.as_str()))
                }
                @if !article.tags.is_empty() {
                    ul.tags {
                        @for tag in &article.tags {
                            li { a href={ "/" (tag) ".html" } { (tag) } }
                        }
                    }
                }
            }
            @if config.comments {
                section #comments data-slug=(article.slug) {
                    noscript { p { "Comments require JavaScript." } }
                    script src="/assets/comments.js" {}
                }
            }
        }
        (page_footer(config))
    };
    base_document(&title, &article.description, config, content)
}

/// Renders one index page: summaries, keyword cloud, pagination.
pub fn index_page(
    entries: &[&Article],
    page: usize,
    more: bool,
    keywords: &[String],
    config: &SiteConfig,
) -> Markup {
    let title = if page == 1 {
        config.title.clone()
    } else {
        format!("{} · page {}", config.title, page)
    };
    let content = html! {
        (site_header(config))
        main.index-page {
            @for entry in entries {
                (article_summary(entry))
            }
            (keyword_nav(keywords))
            nav.pagination {
                @if page > 1 {
                    a.newer href={ "/" ((page - 1)) ".html" } { "newer" }
                }
                @if more {
                    a.older href={ "/" ((page + 1)) ".html" } { "older" }
                }
            }
        }
        (page_footer(config))
    };
    base_document(&title, &config.description, config, content)
}

/// Renders a tag page: summaries for one tag, tag-fronted keyword cloud.
pub fn tag_page(
    entries: &[&Article],
    tag: &str,
    keywords: &[String],
    config: &SiteConfig,
) -> Markup {
    let title = format!("{} · {}", tag, config.site_name);
    let description = format!("Articles tagged {tag}");
    let content = html! {
        (site_header(config))
        main.tag-page {
            header.tag-header {
                h1 { (tag) }
                p { (entries.len()) " article" @if entries.len() != 1 { "s" } }
            }
            @for entry in entries {
                (article_summary(entry))
            }
            (keyword_nav(keywords))
        }
        (page_footer(config))
    };
    base_document(&title, &description, config, content)
}

/// Renders the about page: site description, keyword cloud, links.
pub fn about_page(keywords: &[String], config: &SiteConfig) -> Markup {
    let title = format!("about · {}", config.site_name);
    let content = html! {
        (site_header(config))
        main.about-page {
            h1 { "about" }
            p.site-description { (config.description) }
            (keyword_nav(keywords))
        }
        (page_footer(config))
    };
    base_document(&title, &config.description, config, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::test_fixtures::article;

    fn config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site_name = "testblog".to_string();
        config.domain = "blog.test".to_string();
        config
    }

    #[test]
    fn base_document_includes_doctype_and_lang() {
        let a = article("post", &[], 1);
        let doc = article_page(&a, &config()).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("lang=\"en-US\""));
    }

    #[test]
    fn article_page_embeds_raw_body() {
        let a = article("post", &["rust"], 1);
        let doc = article_page(&a, &config()).into_string();
        assert!(doc.contains("<p>site body of post</p>"));
        assert!(doc.contains("Title of post"));
        assert!(doc.contains("/rust.html"));
    }

    #[test]
    fn article_page_comments_gated_by_toggle() {
        let a = article("post", &[], 1);
        let mut cfg = config();
        assert!(!article_page(&a, &cfg).into_string().contains("id=\"comments\""));
        cfg.comments = true;
        assert!(article_page(&a, &cfg).into_string().contains("id=\"comments\""));
    }

    #[test]
    fn analytics_snippet_skipped_in_debug() {
        let a = article("post", &[], 1);
        let mut cfg = config();
        cfg.analytics_id = "G-TEST123".to_string();
        assert!(article_page(&a, &cfg).into_string().contains("G-TEST123"));
        cfg.build.debug = true;
        assert!(!article_page(&a, &cfg).into_string().contains("G-TEST123"));
    }

    #[test]
    fn analytics_snippet_skipped_without_id() {
        let a = article("post", &[], 1);
        let doc = article_page(&a, &config()).into_string();
        assert!(!doc.contains("googletagmanager"));
    }

    #[test]
    fn index_page_lists_entries_in_order() {
        let arts = [article("first", &[], 2), article("second", &[], 1)];
        let entries: Vec<&Article> = arts.iter().collect();
        let doc = index_page(&entries, 1, true, &[], &config()).into_string();
        let first = doc.find("Title of first").unwrap();
        let second = doc.find("Title of second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn index_pagination_links() {
        let arts = [article("a", &[], 1)];
        let entries: Vec<&Article> = arts.iter().collect();
        let cfg = config();

        let page1 = index_page(&entries, 1, true, &[], &cfg).into_string();
        assert!(page1.contains("href=\"/2.html\""));
        assert!(!page1.contains("newer"));

        let page2 = index_page(&entries, 2, true, &[], &cfg).into_string();
        assert!(page2.contains("href=\"/1.html\""));
        assert!(page2.contains("href=\"/3.html\""));

        let last = index_page(&entries, 3, false, &[], &cfg).into_string();
        assert!(!last.contains("older"));
    }

    #[test]
    fn tag_page_fronts_keywords() {
        let arts = [article("a", &["go"], 1)];
        let entries: Vec<&Article> = arts.iter().collect();
        let keywords = vec!["go".to_string(), "rust".to_string()];
        let doc = tag_page(&entries, "go", &keywords, &config()).into_string();
        assert!(doc.contains("<h1>go</h1>"));
        assert!(doc.contains("/rust.html"));
        assert!(doc.contains("1 article<"));
    }

    #[test]
    fn about_page_has_description_and_keywords() {
        let keywords = vec!["rust".to_string()];
        let doc = about_page(&keywords, &config()).into_string();
        assert!(doc.contains("Articles published with inkpress"));
        assert!(doc.contains("/rust.html"));
    }

    #[test]
    fn titles_are_escaped() {
        let mut a = article("post", &[], 1);
        a.title = "<script>alert('xss')</script>".to_string();
        let doc = article_page(&a, &config()).into_string();
        assert!(!doc.contains("<script>alert"));
        assert!(doc.contains("&lt;script&gt;"));
    }

    #[test]
    fn footer_renders_links() {
        let a = article("post", &[], 1);
        let mut cfg = config();
        cfg.links = vec!["https://github.com/someone".to_string()];
        let doc = article_page(&a, &cfg).into_string();
        assert!(doc.contains("https://github.com/someone"));
    }
}
