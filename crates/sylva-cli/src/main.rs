//! Sylva CLI - Command-line interface for Sylva
//!
//! Loads a vault snapshot exported by the host, builds the global link
//! graph and answers exploration queries against it.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use sylva_core::LinkDirection;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "sylva")]
#[command(author = "Sylva Contributors")]
#[command(version)]
#[command(about = "Explore the link graph of a note vault", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Vault snapshot to load
    #[arg(short, long, global = true, default_value = "vault.json")]
    snapshot: PathBuf,

    /// Config file (defaults to .sylva/config.json, then the user config)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config in the given directory
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show graph statistics
    Stats,

    /// Print the local graph around a document
    Local {
        /// Center document path
        path: String,

        /// Maximum hops from the center
        #[arg(short, long)]
        depth: Option<usize>,

        /// Links to follow: both, outlinks or inlinks
        #[arg(short, long)]
        link_type: Option<LinkDirection>,

        /// Keep documents left without links (true/false)
        #[arg(long)]
        orphans: Option<bool>,

        /// Include attachments
        #[arg(long)]
        attachments: bool,

        /// Only keep matching documents (`tag:x`, `#x` or text)
        #[arg(long)]
        search: Option<String>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show a local graph, then expand documents into it one by one
    Expand {
        /// Document to start from
        center: String,

        /// Documents to expand, in order
        #[arg(required = true)]
        paths: Vec<String>,

        /// Output the final graph as JSON
        #[arg(long)]
        json: bool,
    },

    /// Shortest path between two documents, ignoring link direction
    Path {
        /// Start document
        from: String,

        /// End document
        to: String,
    },

    /// List the tags of a document
    Tags {
        /// Document path
        path: String,
    },

    /// List the documents carrying a tag
    Tagged {
        /// Tag, with or without `#`
        tag: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Stats => commands::stats(&cli.snapshot),
        Commands::Local {
            path,
            depth,
            link_type,
            orphans,
            attachments,
            search,
            json,
        } => {
            let overrides = commands::LocalOverrides {
                depth,
                link_type,
                show_orphans: orphans,
                show_attachments: attachments.then_some(true),
                search_query: search,
            };
            commands::local(
                &cli.snapshot,
                cli.config.as_deref(),
                &path,
                overrides,
                json,
            )
        }
        Commands::Expand {
            center,
            paths,
            json,
        } => commands::expand(&cli.snapshot, cli.config.as_deref(), &center, &paths, json),
        Commands::Path { from, to } => commands::path(&cli.snapshot, &from, &to),
        Commands::Tags { path } => commands::tags(&cli.snapshot, &path),
        Commands::Tagged { tag } => commands::tagged(&cli.snapshot, &tag),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
