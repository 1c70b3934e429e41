use clap::{Parser, Subcommand};
use inkpress::{config, cover, emit, index, output, parse};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "inkpress")]
#[command(about = "Batch static blog generator")]
#[command(long_about = "\
Batch static blog generator

Markdown articles with YAML front matter go in; a complete publishable
site comes out. Every build regenerates everything: HTML pages with JSON
sidecars, Atom feeds (combined and per-tag), sitemap, OpenSearch
descriptor, web manifest, robots.txt and optional PNG cover images.

Article format:

  articles/my-post.md
  ---
  title: My Post
  description: Short caption for the cover image
  tags: rust, tooling
  published: 2024-03-01T09:00:00+00:00
  ---
  > One-paragraph summary, shown in listings and feeds.

  Body markdown follows...

The filename (minus .md) is the slug: it names the page, the sidecar and
the cover, and must be unique across the collection. The leading
blockquote is mandatory. The build is fail-fast: one malformed article
aborts the whole run.

Run 'inkpress gen-config' to print a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site configuration file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: parse → index → emit → covers
    Build,
    /// Parse and validate the article collection without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.config)?;
            config.validate()?;

            println!("==> Parsing {}", config.build.articles_dir);
            let articles = parse::parse_articles(&config)?;
            let page_index = index::build(&articles, config.build.entries_per_page);

            println!("==> Emitting {}", config.build.output_dir);
            let summary = emit::Emitter::new(&articles, &page_index, &config).run()?;

            let covers = if config.cover.enabled {
                println!("==> Rendering covers");
                Some(cover::render_covers(&articles, &config)?)
            } else {
                None
            };

            output::print_build_output(&articles, &page_index, &summary, covers);
            println!("==> Build complete: {}", config.build.output_dir);
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            config.validate()?;

            println!("==> Checking {}", config.build.articles_dir);
            let articles = parse::parse_articles(&config)?;
            let page_index = index::build(&articles, config.build.entries_per_page);
            output::print_check_output(&articles, &page_index);
            println!("==> Collection is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
