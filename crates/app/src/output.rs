use anyhow::{Context, Result};
use netscope_layout::{LayoutConfig, NodeId, PositionMap, Subgraph};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// A laid out subgraph, ready to be drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedSubgraph {
    pub origin: NodeId,
    pub nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub positions: PositionMap,
}

impl RenderedSubgraph {
    pub fn new(subgraph: &Subgraph, positions: PositionMap) -> Self {
        Self {
            origin: subgraph.origin(),
            nodes: subgraph.nodes().to_vec(),
            edges: subgraph.edges().to_vec(),
            positions,
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        ron::ser::to_writer_pretty(writer, self, PrettyConfig::default())
            .context("Failed to serialize the layout")
    }

    /// Write a trailing newline and flush, so buffered write errors surface
    pub fn write_flushed<W: Write>(&self, mut writer: W) -> Result<()> {
        self.write_to(&mut writer)?;
        writeln!(writer)?;
        writer.flush().context("Failed to flush the layout")
    }

    /// Write to `path`, or to stdout when no path is given
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                self.write_flushed(std::io::BufWriter::new(file))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Layout written to {}", path.display());
            }
            None => self.write_flushed(std::io::stdout().lock())?,
        }
        Ok(())
    }
}

/// Read a layout configuration, fields left out keep their defaults
pub fn load_config(path: &Path) -> Result<LayoutConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: LayoutConfig = ron::from_str(&text)
        .with_context(|| format!("Invalid layout config {}", path.display()))?;
    debug!("Layout config: {config:?}");
    Ok(config)
}
