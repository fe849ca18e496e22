//! Folio - A markdown-to-JSON blog publishing pipeline.

mod cli;
mod config;
mod index;
mod init;
mod logger;
mod new;
mod post;
mod publish;
mod query;
mod render;
mod serve;
mod watch;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use index::generate_index;
use init::new_site;
use new::new_post;
use publish::publish_all;
use query::{QueryState, filter_articles, tag_counts};
use render::{Renderer, TerminalRenderer, load_index, load_post, markdown::markdown_renderer};
use serve::serve_site;
use std::{io, path::Path};
use watch::watch_drafts;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Init { name } => {
            new_site(&config, name.is_some())?;
            log!("init"; "created blog at {}", config.get_root().display());
            Ok(())
        }
        Commands::Index => {
            let report = generate_index(&config)?;
            log!(
                "index";
                "indexed {} of {} posts -> {}",
                report.indexed,
                report.total,
                report.json_path.display()
            );
            Ok(())
        }
        Commands::New => new_post(&config).map(|_| ()),
        Commands::Publish { watch: false } => {
            let report = publish_all(&config)?;
            if report.index.is_none() {
                bail!("drafts converted but the articles index could not be updated");
            }
            Ok(())
        }
        Commands::Publish { watch: true } => watch_drafts(&config),
        Commands::List {
            search,
            tags,
            page,
            per_page,
        } => list_articles(&config, search.as_deref(), tags, *page, *per_page),
        Commands::Show { id, basic } => show_article(&config, id, *basic),
        Commands::Serve { .. } => serve_site(&config),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() && !cli.is_init() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);

    // Validate config state based on command
    let config_exists = config.config_path.exists();
    match (cli.is_init(), config_exists) {
        (true, true) => {
            bail!("Config file already exists. Remove it manually or init in a different path.")
        }
        (false, false) => bail!("Config file not found. Run `folio init` first."),
        _ => {}
    }

    if !cli.is_init() {
        config.validate()?;
    }

    Ok(config)
}

/// Print one page of the filtered article listing.
fn list_articles(
    config: &SiteConfig,
    search: Option<&str>,
    tags: &[String],
    page: usize,
    per_page: Option<usize>,
) -> Result<()> {
    let mut renderer = TerminalRenderer::new(io::stdout().lock(), &config.site.title)
        .with_description(&config.site.description);
    let index = match load_index(&config.blog.index_json_path()) {
        Ok(index) => index,
        Err(err) => {
            renderer.render_error(&err)?;
            bail!("cannot list articles");
        }
    };

    let mut state = QueryState::new(per_page.unwrap_or(config.blog.per_page));
    if let Some(search) = search {
        state.set_search(search);
    }
    for tag in tags {
        state.toggle_tag(tag);
    }
    let state = state.with_page(page);

    let view = filter_articles(&index.articles, &state);
    let counts = tag_counts(&index.articles);
    renderer.render_listing(&view, &counts, &state, index.articles.len())?;
    Ok(())
}

/// Render one published post with its body converted to HTML.
fn show_article(config: &SiteConfig, id: &str, basic: bool) -> Result<()> {
    let mut renderer = TerminalRenderer::new(io::stdout().lock(), &config.site.title);
    let post = match load_post(&config.blog.posts, id) {
        Ok(post) => post,
        Err(err) => {
            renderer.render_error(&err)?;
            bail!("cannot show `{id}`");
        }
    };

    let markdown = markdown_renderer(config.blog.markdown, basic, config.site.url.as_deref())?;
    log!("show"; "rendering `{}` with the {} renderer", post.id, markdown.name());
    let html = markdown.render(&post.content);
    renderer.render_post(&post, &html)?;
    Ok(())
}
