//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. Configuration is a single
//! file at the project root: stock defaults are overridden by whatever keys
//! the user sets. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! site_name = "inkpress"        # Short site identifier (nav, covers)
//! title = "An inkpress blog"    # Full site title (head, feeds)
//! description = "..."           # Site description (feeds, about, index cover)
//! domain = "blog.example.com"   # Canonical domain; article links derive from it
//! analytics_id = ""             # Analytics property id; empty disables the snippet
//! comments = false              # Render the comment widget on article pages
//! links = []                    # External links for the footer and about page
//!
//! [author]
//! name = "Jane Doe"
//! twitter_id = "janedoe"        # Rendered as @janedoe in feeds and meta tags
//! email = "jane@example.com"
//!
//! [build]
//! articles_dir = "articles"     # Where *.md articles live
//! output_dir = "public"         # Where artifacts are written
//! entries_per_page = 10         # Articles per index page
//! locale = "en_US"              # Locale identifier, exposed to templates
//! debug = false                 # Debug builds skip the analytics snippet
//!
//! [cover]
//! enabled = false               # Generate a PNG cover per article + index.png
//! font = "assets/cover.ttf"     # TrueType font for cover text
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want. Everything
//! has a stock default, though a real site will at least set `domain` and
//! the identity fields.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Short site identifier, used in navigation and on the site cover.
    pub site_name: String,
    /// Full site title, used in `<title>` and feed metadata.
    pub title: String,
    /// Site description, used in feeds, the about page and the site cover.
    pub description: String,
    /// Canonical domain (no scheme). Article links are `https://{domain}/{slug}.html`.
    pub domain: String,
    /// Analytics property id. Empty string disables the snippet entirely.
    pub analytics_id: String,
    /// Whether article pages render the comment widget.
    pub comments: bool,
    /// External links shown in the footer and on the about page.
    pub links: Vec<String>,
    /// Author identity for feeds and meta tags.
    pub author: AuthorConfig,
    /// Pipeline settings: paths, pagination, locale, debug.
    pub build: BuildConfig,
    /// Cover image generation settings.
    pub cover: CoverConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site_name: "inkpress".to_string(),
            title: "An inkpress blog".to_string(),
            description: "Articles published with inkpress".to_string(),
            domain: "example.com".to_string(),
            analytics_id: String::new(),
            comments: false,
            links: Vec::new(),
            author: AuthorConfig::default(),
            build: BuildConfig::default(),
            cover: CoverConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Author handle for feeds and meta tags (`@twitter_id`).
    pub fn author_handle(&self) -> String {
        format!("@{}", self.author.twitter_id)
    }

    /// Canonical URL for a named artifact (`https://{domain}/{name}.html`).
    pub fn page_url(&self, name: &str) -> String {
        format!("https://{}/{}.html", self.domain, name)
    }

    /// Validate semantic constraints that serde can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.is_empty() {
            return Err(ConfigError::Validation("domain must not be empty".into()));
        }
        if self.domain.contains("://") {
            return Err(ConfigError::Validation(format!(
                "domain must not include a scheme: {}",
                self.domain
            )));
        }
        if self.build.entries_per_page == 0 {
            return Err(ConfigError::Validation(
                "build.entries_per_page must be at least 1".into(),
            ));
        }
        if self.cover.enabled && self.cover.font.is_empty() {
            return Err(ConfigError::Validation(
                "cover.font is required when cover.enabled is true".into(),
            ));
        }
        Ok(())
    }
}

/// Author identity, rendered into feeds and meta tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub name: String,
    pub twitter_id: String,
    pub email: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        AuthorConfig {
            name: "Anonymous".to_string(),
            twitter_id: "anonymous".to_string(),
            email: "author@example.com".to_string(),
        }
    }
}

/// Pipeline settings: source/output paths, pagination, locale, debug flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory containing `*.md` article sources.
    pub articles_dir: String,
    /// Directory artifacts are written to. Also where `images/` is probed.
    pub output_dir: String,
    /// Articles per index page. Must be at least 1.
    pub entries_per_page: usize,
    /// Locale identifier exposed to templates (`<html lang>`).
    pub locale: String,
    /// Debug builds skip the analytics snippet.
    pub debug: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            articles_dir: "articles".to_string(),
            output_dir: "public".to_string(),
            entries_per_page: 10,
            locale: "en_US".to_string(),
            debug: false,
        }
    }
}

/// Cover image generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverConfig {
    /// Generate `{slug}.png` per article and `index.png` for the site root.
    pub enabled: bool,
    /// TrueType/OpenType font file used for cover text.
    pub font: String,
}

impl Default for CoverConfig {
    fn default() -> Self {
        CoverConfig {
            enabled: false,
            font: "assets/cover.ttf".to_string(),
        }
    }
}

/// Load `config.toml` from the given path.
///
/// A missing file yields the stock defaults; a present-but-invalid file is
/// an error (a config you wrote should never be silently ignored).
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    Ok(config)
}

/// The stock config.toml with all options documented.
///
/// This is what `inkpress gen-config` prints. Kept as a literal so comments
/// survive; a test keeps it in sync with the real defaults.
pub fn stock_config_toml() -> &'static str {
    r#"# inkpress site configuration
# All options are optional - defaults shown below.

# Short site identifier (navigation, site cover)
site_name = "inkpress"

# Full site title (head, feed metadata)
title = "An inkpress blog"

# Site description (feeds, about page, index cover caption)
description = "Articles published with inkpress"

# Canonical domain, no scheme. Article links become https://{domain}/{slug}.html
domain = "example.com"

# Analytics property id; empty disables the snippet
analytics_id = ""

# Render the comment widget on article pages
comments = false

# External links for the footer and about page
links = []

[author]
name = "Anonymous"
twitter_id = "anonymous"     # rendered as @anonymous
email = "author@example.com"

[build]
articles_dir = "articles"    # where *.md articles live
output_dir = "public"        # where artifacts are written
entries_per_page = 10        # articles per index page
locale = "en_US"             # exposed to templates as the html lang
debug = false                # debug builds skip the analytics snippet

[cover]
enabled = false              # generate PNG covers
font = "assets/cover.ttf"    # TrueType font for cover text
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = SiteConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stock_config_matches_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let stock = SiteConfig::default();
        assert_eq!(
            toml::to_string(&parsed).unwrap(),
            toml::to_string(&stock).unwrap()
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.domain, "example.com");
    }

    #[test]
    fn sparse_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "domain = \"blog.test\"\n[build]\nentries_per_page = 3\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.domain, "blog.test");
        assert_eq!(config.build.entries_per_page, 3);
        // Untouched values keep their defaults
        assert_eq!(config.build.articles_dir, "articles");
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "domian = \"typo.test\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut config = SiteConfig::default();
        config.build.entries_per_page = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn domain_with_scheme_rejected() {
        let mut config = SiteConfig::default();
        config.domain = "https://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn cover_requires_font() {
        let mut config = SiteConfig::default();
        config.cover.enabled = true;
        config.cover.font = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn author_handle_prefixes_at() {
        let config = SiteConfig::default();
        assert_eq!(config.author_handle(), "@anonymous");
    }

    #[test]
    fn page_url_shape() {
        let mut config = SiteConfig::default();
        config.domain = "blog.test".to_string();
        assert_eq!(config.page_url("my-post"), "https://blog.test/my-post.html");
    }
}
