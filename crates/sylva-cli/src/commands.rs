//! CLI command implementations.

use crate::config;
use colored::Colorize;
use std::path::Path;
use sylva_core::{LinkDirection, NodeKind, VaultSnapshot};
use sylva_graph::{
    shortest_path, ExpandOutcome, Explorer, Graph, LocalGraphOptions, Node, Vault,
};
use tracing::info;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct LocalOverrides {
    pub depth: Option<usize>,
    pub link_type: Option<LinkDirection>,
    pub show_orphans: Option<bool>,
    pub show_attachments: Option<bool>,
    pub search_query: Option<String>,
}

impl LocalOverrides {
    fn apply(self, options: &mut LocalGraphOptions) {
        if let Some(depth) = self.depth {
            options.depth = depth;
        }
        if let Some(link_type) = self.link_type {
            options.link_type = link_type;
        }
        if let Some(show) = self.show_orphans {
            options.show_orphans = show;
        }
        if let Some(show) = self.show_attachments {
            options.show_attachments = show;
        }
        if let Some(query) = self.search_query {
            options.search_query = query;
        }
    }
}

/// Write a default config in a directory.
pub fn init(path: &Path) -> Result<()> {
    match config::write_default(path)? {
        Some(file) => {
            println!("{} Wrote {}", "✓".green(), file.display());
            println!("  Run {} to explore a vault", "sylva local <note>".cyan());
        }
        None => println!("{} Already initialized", "✓".green()),
    }
    Ok(())
}

fn load_vault(snapshot: &Path) -> Result<Vault> {
    let snapshot = VaultSnapshot::load(snapshot)?;
    let vault = Vault::from_snapshot(&snapshot)?;
    info!(
        "Loaded vault: {} documents, {} links",
        vault.graph.node_count(),
        vault.graph.link_count()
    );
    Ok(vault)
}

fn require(vault: &Vault, path: &str) -> Result<()> {
    if vault.graph.contains(path) {
        Ok(())
    } else {
        Err(format!("Document '{}' not found in vault", path).into())
    }
}

/// Show graph statistics.
pub fn stats(snapshot: &Path) -> Result<()> {
    let vault = load_vault(snapshot)?;
    let stats = vault.graph.stats();

    println!("{}", "Vault Status".cyan().bold());
    println!();
    println!("  {} {}", "Documents:".dimmed(), stats.node_count);
    println!("  {} {}", "Links:".dimmed(), stats.link_count);
    println!("  {} {}", "Orphans:".dimmed(), stats.orphan_count);
    println!("  {} {}", "Attachments:".dimmed(), stats.attachment_count);
    println!("  {} {}", "Tags:".dimmed(), vault.tags.tags().len());

    Ok(())
}

/// Print the local graph around a document.
pub fn local(
    snapshot: &Path,
    config_path: Option<&Path>,
    center: &str,
    overrides: LocalOverrides,
    json_output: bool,
) -> Result<()> {
    let mut config = config::load(config_path, &std::env::current_dir()?)?;
    overrides.apply(&mut config.local);

    let vault = load_vault(snapshot)?;
    require(&vault, center)?;

    let mut explorer = Explorer::new(config);
    explorer.show_local(&vault.graph, center, &vault.tags)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&explorer.displayed().export())?);
    } else {
        let options = &explorer.config().local;
        println!(
            "{} {} (depth {}, {})",
            "Local graph:".cyan().bold(),
            center,
            options.depth,
            options.link_type
        );
        print_graph(explorer.displayed(), center);
    }

    Ok(())
}

/// Show a local graph, then expand documents into it in order.
pub fn expand(
    snapshot: &Path,
    config_path: Option<&Path>,
    center: &str,
    paths: &[String],
    json_output: bool,
) -> Result<()> {
    let config = config::load(config_path, &std::env::current_dir()?)?;
    let vault = load_vault(snapshot)?;
    require(&vault, center)?;

    let mut explorer = Explorer::new(config);
    explorer.show_local(&vault.graph, center, &vault.tags)?;
    if !json_output {
        println!(
            "{} {} ({} documents)",
            "Start:".cyan().bold(),
            center,
            explorer.displayed().node_count()
        );
    }

    for path in paths {
        let outcome = explorer.expand(&vault.graph, path, &vault.tags)?;
        if !json_output {
            print_outcome(&outcome);
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&explorer.displayed().export())?);
    } else {
        println!();
        print_graph(explorer.displayed(), center);
    }

    Ok(())
}

fn print_outcome(outcome: &ExpandOutcome) {
    match outcome {
        ExpandOutcome::Merged { focus, stats } => println!(
            "  {} {} +{} documents, +{} links",
            "✓".green(),
            focus,
            stats.nodes_added.to_string().cyan(),
            stats.links_added.to_string().cyan()
        ),
        ExpandOutcome::Fresh { focus, stats } => println!(
            "  {} {} was not shown; now showing its {} documents",
            "↻".yellow(),
            focus,
            stats.nodes_added
        ),
        ExpandOutcome::Reselected { focus } => {
            println!("  {} {} already expanded", "•".dimmed(), focus)
        }
        ExpandOutcome::Unresolved { focus } => {
            println!("  {} {} not found", "✗".red(), focus)
        }
        ExpandOutcome::Stale { focus } => {
            println!("  {} {} is no longer shown, skipped", "•".dimmed(), focus)
        }
    }
}

/// Shortest path between two documents.
pub fn path(snapshot: &Path, from: &str, to: &str) -> Result<()> {
    let vault = load_vault(snapshot)?;
    require(&vault, from)?;
    require(&vault, to)?;

    let Some(path) = shortest_path(&vault.graph, from, to) else {
        println!("No path between {} and {}", from.cyan(), to.cyan());
        return Ok(());
    };

    println!(
        "{} {} hops",
        "Path:".cyan().bold(),
        path.len().saturating_sub(1)
    );
    for (i, node) in path.iter().enumerate() {
        if i == 0 {
            println!("  {}", node.id());
            continue;
        }
        let prev = path[i - 1].id();
        let arrow = if vault.graph.link(prev, node.id()).is_some() {
            "→"
        } else {
            "←"
        };
        println!("  {} {}", arrow.dimmed(), node.id());
    }

    Ok(())
}

/// List the tags of a document.
pub fn tags(snapshot: &Path, path: &str) -> Result<()> {
    let vault = load_vault(snapshot)?;
    require(&vault, path)?;

    let tags = vault.tags.tags_for_node(path);
    if tags.is_empty() {
        println!("{} has no tags", path);
        return Ok(());
    }
    for tag in tags {
        println!("  {}", tag.yellow());
    }
    Ok(())
}

/// List the documents carrying a tag.
pub fn tagged(snapshot: &Path, tag: &str) -> Result<()> {
    let vault = load_vault(snapshot)?;

    let nodes = vault.tags.nodes_for_tag(tag);
    if nodes.is_empty() {
        println!("No documents tagged {}", tag);
        return Ok(());
    }
    println!("{} documents tagged {}:", nodes.len(), tag.yellow());
    for path in nodes {
        println!("  {}", path);
    }
    Ok(())
}

fn print_graph(graph: &Graph, center: &str) {
    println!(
        "{} documents, {} links",
        graph.node_count().to_string().bold(),
        graph.link_count().to_string().bold()
    );
    println!();

    for node in graph.nodes() {
        println!("  {}", describe(node, center));
    }

    if graph.link_count() > 0 {
        println!();
        for link in graph.links() {
            println!("  {} {} {}", link.source(), "→".dimmed(), link.target());
        }
    }
}

fn describe(node: &Node, center: &str) -> String {
    let handle = node
        .handle()
        .map(|h| format!("[{}]", h))
        .unwrap_or_default();
    let name = if node.id() == center {
        node.name.cyan().bold().to_string()
    } else {
        node.name.clone()
    };
    let kind = match node.kind {
        NodeKind::Note => String::new(),
        other => format!(" ({})", other),
    };
    format!(
        "{} {}{} {}",
        handle.dimmed(),
        name,
        kind.yellow(),
        format!("in:{} out:{}", node.in_degree(), node.out_degree()).dimmed()
    )
}
