use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use netscope_layout::{ForceAtlas2, LayoutConfig, LayoutPipeline, Subgraph};
use netscope_store::{CsrGraph, TraversalMode, DEFAULT_MAX_NODE_ID};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

mod output;
mod worker;

use output::{load_config, RenderedSubgraph};
use worker::LayoutWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Bfs,
    Dfs,
}

impl From<Mode> for TraversalMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Bfs => TraversalMode::BreadthFirst,
            Mode::Dfs => TraversalMode::DepthFirst,
        }
    }
}

/// Extract and lay out the neighborhood of a node in a large edge list
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Edge list with one `from to` pair per line
    dataset: PathBuf,

    /// Node to start from, defaults to the node with the most outgoing edges
    #[arg(long)]
    origin: Option<u32>,

    /// Number of hops to explore
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..=10))]
    depth: u8,

    #[arg(long, value_enum, default_value_t = Mode::Bfs)]
    mode: Mode,

    /// Nodes kept for layout
    #[arg(long, default_value_t = 600)]
    max_nodes: usize,

    /// Edges kept for layout
    #[arg(long, default_value_t = 1200)]
    max_edges: usize,

    /// Largest node id accepted in the dataset
    #[arg(long, default_value_t = DEFAULT_MAX_NODE_ID)]
    max_node_id: u32,

    /// Layout configuration in RON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the laid out subgraph, stdout if omitted
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Skip the ForceAtlas2 pass and use the spring embedding only
    #[arg(long)]
    no_accel: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let graph = CsrGraph::load_with_limit(&args.dataset, args.max_node_id)
        .with_context(|| format!("Failed to load {}", args.dataset.display()))?;
    let report = graph.report();
    info!("Dataset: {report:?}");

    let origin = args
        .origin
        .or(report.highest_degree_node)
        .context("Dataset has no nodes")?;
    let traversal = graph.traverse(origin, args.depth.into(), args.mode.into())?;
    if traversal.is_empty() {
        warn!("Nothing reachable from {origin}, no layout to compute");
        return Ok(());
    }

    let subgraph = Subgraph::new(traversal.nodes, traversal.edges, origin)?;
    let (subgraph, truncation) = subgraph.truncate(args.max_nodes, args.max_edges);
    if !truncation.is_empty() {
        warn!(
            "Subgraph truncated to {} nodes and {} edges ({} nodes and {} edges dropped)",
            subgraph.node_count(),
            subgraph.edge_count(),
            truncation.dropped_nodes,
            truncation.dropped_edges
        );
    }

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => LayoutConfig::default(),
    };
    let mut pipeline = LayoutPipeline::new(config);
    if !args.no_accel {
        pipeline = pipeline.with_accelerator(ForceAtlas2::default());
    }
    info!("Using {pipeline:?}");

    let worker = LayoutWorker::spawn(pipeline)?;
    let positions = worker.layout(subgraph.clone())?;

    RenderedSubgraph::new(&subgraph, positions).save(args.output.as_deref())
}
