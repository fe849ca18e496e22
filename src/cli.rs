//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio blog publishing CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Site root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Drafts directory path (relative to site root)
    #[arg(short, long)]
    pub drafts: Option<PathBuf>,

    /// Posts directory path (relative to site root)
    #[arg(short, long)]
    pub posts: Option<PathBuf>,

    /// Index data directory path (relative to site root)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Config file name (default: folio.toml)
    #[arg(short = 'C', long, default_value = "folio.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Init a blog skeleton with a default config
    Init {
        /// the name(path) of site directory, related to `root`
        name: Option<PathBuf>,
    },

    /// Regenerate the articles index from the posts directory
    Index,

    /// Create a new post interactively
    New,

    /// Convert every draft into a post and regenerate the index
    Publish {
        /// Keep watching the drafts directory and republish on change
        #[arg(short, long)]
        watch: bool,
    },

    /// List published articles, optionally filtered
    List {
        /// Case-insensitive search over title, excerpt and tags
        #[arg(short, long)]
        search: Option<String>,

        /// Only show articles carrying this tag (repeatable, all must match)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Page number to show
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Articles per page (default: `[blog].per_page`)
        #[arg(long)]
        per_page: Option<usize>,
    },

    /// Render a single post as HTML
    Show {
        /// Post id (the `{id}.json` file name without extension)
        id: String,

        /// Force the basic markdown renderer
        #[arg(long)]
        basic: bool,
    },

    /// Serve the local authoring API
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
}
