use serde::{Deserialize, Serialize};

/// A placement strategy in the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Tidy tree over the BFS spanning tree rooted at the origin
    Tree,
    /// Force-directed placement of whatever the tree left out
    Force,
    /// Concentric rings keyed by hop distance from the origin
    Radial,
    /// Deterministic grid below the deepest tree level
    Grid,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Tree,
        Strategy::Force,
        Strategy::Radial,
        Strategy::Grid,
    ];
}

/// Spacing of the tidy tree
///
/// The horizontal unit is `base_x + range_x / (1 + log10(max_level_width))`,
/// so it shrinks as the widest level grows but never drops below `base_x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSpacing {
    pub base_x: f64,
    pub range_x: f64,
    /// Vertical distance between two depths
    pub level_y: f64,
}

impl Default for TreeSpacing {
    fn default() -> Self {
        Self {
            base_x: 1.2,
            range_x: 2.4,
            level_y: 2.0,
        }
    }
}

/// Fruchterman-Reingold spring embedding parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub seed: u64,
    pub iterations: usize,
    /// Largest absolute coordinate of the output
    pub scale: f64,
    /// Optimal distance is `max(min_repulsion, repulsion / sqrt(n))`
    pub repulsion: f64,
    pub min_repulsion: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            seed: 24,
            iterations: 40,
            scale: 8.0,
            repulsion: 1.2,
            min_repulsion: 0.15,
        }
    }
}

impl SpringConfig {
    /// Optimal edge length for a graph of `node_count` nodes
    pub fn optimal_distance(&self, node_count: usize) -> f64 {
        let n = (node_count as f64).max(1.0);
        (self.repulsion / n.sqrt()).max(self.min_repulsion)
    }
}

/// Force-directed stage parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub spring: SpringConfig,
    /// Horizontal unit of the layered variant, grown by `1 + ln(1 + n)`
    pub level_x: f64,
    /// Share of a level step used as vertical jitter
    pub jitter_fraction: f64,
    /// Gap sets above this size skip the force stage
    pub max_nodes: usize,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            spring: SpringConfig::default(),
            level_x: 1.5,
            jitter_fraction: 0.35,
            max_nodes: 2000,
        }
    }
}

/// Concentric ring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadialConfig {
    pub base_radius: f64,
    pub radius_step: f64,
    /// Jitter is drawn uniformly from `[-jitter, jitter]`
    pub jitter: f64,
    pub seed: u64,
}

impl Default for RadialConfig {
    fn default() -> Self {
        Self {
            base_radius: 1.5,
            radius_step: 1.4,
            jitter: 0.08,
            seed: 7,
        }
    }
}

/// Grid packing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub spacing_x: f64,
    pub spacing_y: f64,
    pub min_columns: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing_x: 1.5,
            spacing_y: 1.5,
            min_columns: 3,
        }
    }
}

/// Full configuration of the layout pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Enabled strategies, always tried in `Tree`, `Force`, `Radial`,
    /// `Grid` order whatever their order here
    pub strategies: Vec<Strategy>,
    pub tree: TreeSpacing,
    pub force: ForceConfig,
    pub radial: RadialConfig,
    pub grid: GridConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategies: Strategy::ALL.to_vec(),
            tree: TreeSpacing::default(),
            force: ForceConfig::default(),
            radial: RadialConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl LayoutConfig {
    /// The strategy chain actually run
    ///
    /// Enabled strategies in their fixed order. The grid is always
    /// included so that every node ends up with a position.
    pub fn chain(&self) -> Vec<Strategy> {
        let mut chain = self.strategies.clone();
        chain.push(Strategy::Grid);
        chain.sort_unstable();
        chain.dedup();
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn chain_always_ends_with_grid() {
        let config = LayoutConfig {
            strategies: vec![Strategy::Grid, Strategy::Radial, Strategy::Tree, Strategy::Radial],
            ..Default::default()
        };
        assert_eq!(
            config.chain(),
            vec![Strategy::Tree, Strategy::Radial, Strategy::Grid]
        );
        assert_eq!(LayoutConfig::default().chain(), Strategy::ALL.to_vec());

        let empty = LayoutConfig {
            strategies: Vec::new(),
            ..Default::default()
        };
        assert_eq!(empty.chain(), vec![Strategy::Grid]);
    }

    #[test]
    fn chain_order_is_fixed() {
        let config = LayoutConfig {
            strategies: vec![Strategy::Radial, Strategy::Tree],
            ..Default::default()
        };
        assert_eq!(
            config.chain(),
            vec![Strategy::Tree, Strategy::Radial, Strategy::Grid]
        );

        let config = LayoutConfig {
            strategies: vec![Strategy::Grid, Strategy::Force],
            ..Default::default()
        };
        assert_eq!(config.chain(), vec![Strategy::Force, Strategy::Grid]);
    }

    #[test]
    fn repulsion_shrinks_with_size() {
        let spring = SpringConfig::default();
        assert_eq!(spring.optimal_distance(0), 1.2);
        assert_eq!(spring.optimal_distance(4), 0.6);
        assert_eq!(spring.optimal_distance(10_000), 0.15);
    }
}
