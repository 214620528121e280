use crate::{NodeId, StoreError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Valid lines between two progress messages while reading a dataset
const PROGRESS_EVERY: usize = 1_000_000;

/// Largest node id accepted by [`CsrGraph::load`]
///
/// Ids are dense, so a single huge id would allocate adjacency arrays for
/// every id below it.
pub const DEFAULT_MAX_NODE_ID: NodeId = 1 << 28;

/// Summary of a loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub memory_mb: f64,
    pub load_time_ms: f64,
    /// Lowest id among the nodes with the most outgoing edges
    pub highest_degree_node: Option<NodeId>,
}

/// Directed graph in compressed sparse row form
///
/// Node ids are dense: the graph holds every id from 0 up to the largest id
/// seen in the input. Out-neighbors keep the order of the input lines.
#[derive(Debug, Clone, Default)]
pub struct CsrGraph {
    row_ptr: Vec<usize>,
    col_indices: Vec<NodeId>,
    degrees: Vec<u32>,
    load_time: Duration,
}

/// Parse one `from to` line, `None` for comments and malformed input
fn parse_line(line: &str) -> Option<(NodeId, NodeId)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut fields = line.split_whitespace();
    let from = fields.next()?.parse::<i64>().ok()?;
    let to = fields.next()?.parse::<i64>().ok()?;
    if from < 0 || to < 0 {
        return None;
    }
    Some((NodeId::try_from(from).ok()?, NodeId::try_from(to).ok()?))
}

impl CsrGraph {
    /// Load an edge list from `path`, ids up to [`DEFAULT_MAX_NODE_ID`]
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the file cannot be read,
    /// [`StoreError::Empty`] if it holds no valid edge and
    /// [`StoreError::NodeIdTooLarge`] for an id above the limit.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::load_with_limit(path, DEFAULT_MAX_NODE_ID)
    }

    /// Load an edge list from `path`, rejecting ids above `max_node_id`
    pub fn load_with_limit(path: impl AsRef<Path>, max_node_id: NodeId) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("Loading dataset {}", path.display());
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(BufReader::new(file), path, max_node_id)
    }

    /// Build a graph from whitespace separated integer pairs
    ///
    /// Blank lines, `#` comments, malformed lines and negative ids are
    /// skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, StoreError> {
        Self::from_reader_with_limit(reader, DEFAULT_MAX_NODE_ID)
    }

    pub fn from_reader_with_limit<R: BufRead>(
        reader: R,
        max_node_id: NodeId,
    ) -> Result<Self, StoreError> {
        Self::parse(reader, Path::new("<reader>"), max_node_id)
    }

    fn parse<R: BufRead>(reader: R, path: &Path, max_node_id: NodeId) -> Result<Self, StoreError> {
        let start = Instant::now();
        let mut edges = Vec::new();
        let mut max_id: Option<NodeId> = None;
        let mut lines_read = 0usize;

        for line in reader.lines() {
            let line = line.map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            lines_read += 1;
            let Some((from, to)) = parse_line(&line) else {
                continue;
            };
            let id = from.max(to);
            if id > max_node_id {
                return Err(StoreError::NodeIdTooLarge {
                    id,
                    line: lines_read,
                    limit: max_node_id,
                });
            }
            edges.push((from, to));
            max_id = max_id.max(Some(from.max(to)));
            if edges.len() % PROGRESS_EVERY == 0 {
                debug!("Read {} valid lines", edges.len());
            }
        }

        let Some(max_id) = max_id else {
            warn!("No valid edge in {lines_read} lines");
            return Err(StoreError::Empty);
        };
        debug!("Read {lines_read} lines, {} valid", edges.len());

        let node_count = max_id as usize + 1;
        debug!(
            "Allocating adjacency for {node_count} nodes, about {:.2} MB",
            estimated_mb(node_count, edges.len())
        );
        let mut degrees = vec![0u32; node_count];
        for &(from, _) in &edges {
            degrees[from as usize] += 1;
        }

        let mut row_ptr = vec![0usize; node_count + 1];
        for i in 0..node_count {
            row_ptr[i + 1] = row_ptr[i] + degrees[i] as usize;
        }

        let mut col_indices = vec![0; edges.len()];
        let mut offsets = vec![0usize; node_count];
        for &(from, to) in &edges {
            let from = from as usize;
            col_indices[row_ptr[from] + offsets[from]] = to;
            offsets[from] += 1;
        }

        let graph = Self {
            row_ptr,
            col_indices,
            degrees,
            load_time: start.elapsed(),
        };
        info!(
            "Loaded {} nodes and {} edges, {:.2} MB in {:.2} ms",
            graph.node_count(),
            graph.edge_count(),
            graph.memory_mb(),
            graph.load_time.as_secs_f64() * 1000.0
        );
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.degrees.len()
    }

    pub fn edge_count(&self) -> usize {
        self.col_indices.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        (node as usize) < self.node_count()
    }

    /// Out-neighbors of `node` in input order, empty for unknown nodes
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        if !self.contains(node) {
            return &[];
        }
        let node = node as usize;
        &self.col_indices[self.row_ptr[node]..self.row_ptr[node + 1]]
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    /// Lowest id among the nodes of maximum out-degree
    pub fn highest_degree_node(&self) -> Option<NodeId> {
        let mut best: Option<(usize, u32)> = None;
        for (node, &degree) in self.degrees.iter().enumerate() {
            if best.map_or(true, |(_, d)| degree > d) {
                best = Some((node, degree));
            }
        }
        best.map(|(node, _)| node as NodeId)
    }

    /// Estimated size of the adjacency arrays in megabytes
    pub fn memory_mb(&self) -> f64 {
        estimated_mb(self.node_count(), self.edge_count())
    }

    pub fn report(&self) -> LoadReport {
        LoadReport {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            memory_mb: self.memory_mb(),
            load_time_ms: self.load_time.as_secs_f64() * 1000.0,
            highest_degree_node: self.highest_degree_node(),
        }
    }
}

fn estimated_mb(node_count: usize, edge_count: usize) -> f64 {
    let bytes = (node_count + 1) * std::mem::size_of::<usize>()
        + edge_count * std::mem::size_of::<NodeId>()
        + node_count * std::mem::size_of::<u32>();
    bytes as f64 / (1024.0 * 1024.0)
}
