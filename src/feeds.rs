//! Syndication and discovery artifacts: Atom feeds, sitemap, OpenSearch
//! descriptor, web app manifest, robots directive.
//!
//! These are XML (or JSON) documents, built by direct string assembly with
//! explicit escaping. maud is deliberately not used here: it serializes for
//! HTML and leaves void elements like `<link>` unclosed, which is not
//! well-formed XML.
//!
//! # Feed Format
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <feed xmlns="http://www.w3.org/2005/Atom">
//!   <title>An inkpress blog</title>
//!   <entry>
//!     <content type="html">&lt;p&gt;...&lt;/p&gt;</content>
//!     <link rel="enclosure" type="image/png" length="1234" href="..."/>
//!   </entry>
//! </feed>
//! ```
//!
//! Entries carry the feed-flavored body (via [`FeedView`]) so code blocks
//! and image URLs survive syndication.

use crate::article::FeedView;
use crate::config::SiteConfig;

/// XML namespace for Atom feeds.
const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// XML namespace for sitemaps.
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// XML namespace for OpenSearch descriptors.
const OPENSEARCH_NS: &str = "http://a9.com/-/spec/opensearch/1.1/";

/// Fixed allow-all robots directive.
pub const ROBOTS_TXT: &str = "User-agent: *\nAllow: /\n";

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Generate the Atom feed for the whole site (`tag = None`) or one tag.
///
/// Entry order is preserved — feed readers treat it as meaningful.
pub fn atom_feed(entries: &[FeedView<'_>], tag: Option<&str>, config: &SiteConfig) -> String {
    let (title, self_href, id) = match tag {
        Some(tag) => (
            format!("{} · {}", config.title, tag),
            format!("https://{}/{}.xml", config.domain, tag),
            config.page_url(tag),
        ),
        None => (
            config.title.clone(),
            format!("https://{}/feed.xml", config.domain),
            format!("https://{}/", config.domain),
        ),
    };
    // A feed-level updated element is mandatory; an empty feed pins it to
    // the epoch rather than drifting with the build clock
    let updated = entries
        .iter()
        .map(|e| e.updated.to_rfc3339())
        .max()
        .unwrap_or_else(|| "1970-01-01T00:00:00+00:00".to_string());

    let mut xml = String::with_capacity(8192);
    xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<feed xmlns="{ATOM_NS}">"#));
    xml.push('\n');
    xml.push_str(&format!("  <title>{}</title>\n", escape_xml(&title)));
    xml.push_str(&format!("  <id>{}</id>\n", escape_xml(&id)));
    xml.push_str(&format!(
        "  <link href=\"https://{}/\"/>\n",
        escape_xml(&config.domain)
    ));
    xml.push_str(&format!(
        "  <link rel=\"self\" href=\"{}\"/>\n",
        escape_xml(&self_href)
    ));
    xml.push_str(&format!("  <updated>{updated}</updated>\n"));
    xml.push_str("  <author>\n");
    xml.push_str(&format!(
        "    <name>{}</name>\n",
        escape_xml(&config.author.name)
    ));
    xml.push_str(&format!(
        "    <email>{}</email>\n",
        escape_xml(&config.author.email)
    ));
    xml.push_str("  </author>\n");

    for entry in entries {
        xml.push_str("  <entry>\n");
        xml.push_str(&format!("    <title>{}</title>\n", escape_xml(&entry.title)));
        xml.push_str(&format!("    <id>{}</id>\n", escape_xml(&entry.link)));
        xml.push_str(&format!(
            "    <link rel=\"alternate\" type=\"text/html\" href=\"{}\"/>\n",
            escape_xml(&entry.link)
        ));
        xml.push_str(&format!(
            "    <published>{}</published>\n",
            entry.published.to_rfc3339()
        ));
        xml.push_str(&format!(
            "    <updated>{}</updated>\n",
            entry.updated.to_rfc3339()
        ));
        for tag in &entry.tags {
            xml.push_str(&format!(
                "    <category term=\"{}\"/>\n",
                escape_xml(tag)
            ));
        }
        xml.push_str(&format!(
            "    <summary>{}</summary>\n",
            escape_xml(&entry.description)
        ));
        for image in &entry.images {
            xml.push_str(&format!(
                "    <link rel=\"enclosure\" type=\"{}\" length=\"{}\" title=\"{}\" href=\"https://{}/images/{}\"/>\n",
                escape_xml(&image.mimetype),
                image.filesize,
                escape_xml(&image.title),
                escape_xml(&config.domain),
                escape_xml(&image.filename),
            ));
        }
        xml.push_str(&format!(
            "    <content type=\"html\">{}</content>\n",
            escape_xml(entry.body())
        ));
        xml.push_str("  </entry>\n");
    }

    xml.push_str("</feed>\n");
    xml
}

/// Generate sitemap.xml from the index's entry identifiers.
///
/// The site root is always listed first; every identifier (page number,
/// tag, slug) maps to `https://{domain}/{name}.html`.
pub fn sitemap(entries: &[String], config: &SiteConfig) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
    xml.push('\n');
    xml.push_str(&format!(
        "  <url><loc>https://{}/</loc></url>\n",
        escape_xml(&config.domain)
    ));
    for entry in entries {
        xml.push_str(&format!(
            "  <url><loc>{}</loc></url>\n",
            escape_xml(&config.page_url(entry))
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Generate the OpenSearch descriptor pointing at the site search page.
pub fn opensearch(config: &SiteConfig) -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(r#"<OpenSearchDescription xmlns="{OPENSEARCH_NS}">"#));
    xml.push('\n');
    xml.push_str(&format!(
        "  <ShortName>{}</ShortName>\n",
        escape_xml(&config.site_name)
    ));
    xml.push_str(&format!(
        "  <Description>{}</Description>\n",
        escape_xml(&config.description)
    ));
    xml.push_str(&format!(
        "  <Url type=\"text/html\" template=\"https://{}/index.html?q={{searchTerms}}\"/>\n",
        escape_xml(&config.domain)
    ));
    xml.push_str("</OpenSearchDescription>\n");
    xml
}

/// Generate the web app manifest.
pub fn webmanifest(config: &SiteConfig) -> String {
    let manifest = serde_json::json!({
        "name": config.title,
        "short_name": config.site_name,
        "description": config.description,
        "start_url": "/",
        "display": "browser",
        "icons": [
            { "src": "/index.png", "sizes": "940x529", "type": "image/png" }
        ],
    });
    manifest.to_string()
}
