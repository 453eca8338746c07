//! Configuration for stategraph.
//!
//! An [`EngineConfig`] names the ID prefixes a graph allocates with and the
//! layout a host should run by default. It is stored as YAML:
//!
//! ```yaml
//! node-prefix: node
//! edge-prefix: edge
//! layout:
//!   algorithm: hierarchical
//!   hierarchical:
//!     width: 1200.0
//!     height: 800.0
//!     node-spacing: 150.0
//!     level-spacing: 120.0
//!   force:
//!     iterations: 100
//!     width: 1200.0
//!     height: 800.0
//!     seed: null
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use crate::error::{Error, Result};
use crate::layout::{ForceDirectedLayout, HierarchicalLayout, Layout};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default node ID prefix
pub const DEFAULT_NODE_PREFIX: &str = "node";

/// Default edge ID prefix
pub const DEFAULT_EDGE_PREFIX: &str = "edge";

/// Default canvas width
pub const DEFAULT_WIDTH: f64 = 1200.0;

/// Default canvas height
pub const DEFAULT_HEIGHT: f64 = 800.0;

/// Default force-directed iteration count
pub const DEFAULT_ITERATIONS: usize = 100;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineConfig {
    /// Prefix for node IDs (e.g., "node" for "node-3k9x")
    pub node_prefix: String,

    /// Prefix for edge IDs
    pub edge_prefix: String,

    /// Layout configuration
    pub layout: LayoutConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_prefix: DEFAULT_NODE_PREFIX.to_string(),
            edge_prefix: DEFAULT_EDGE_PREFIX.to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Build the configured layout algorithm
    pub fn layout(&self) -> Box<dyn Layout> {
        match self.layout.algorithm {
            LayoutAlgorithm::Hierarchical => {
                Box::new(HierarchicalLayout::new(self.layout.hierarchical.clone()))
            }
            LayoutAlgorithm::ForceDirected => {
                Box::new(ForceDirectedLayout::new(self.layout.force.clone()))
            }
        }
    }
}

/// Which layout a host runs by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
    /// Level-based placement ([`HierarchicalLayout`])
    #[default]
    Hierarchical,

    /// Spring embedder ([`ForceDirectedLayout`])
    ForceDirected,
}

/// Layout configuration section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutConfig {
    /// Default algorithm
    pub algorithm: LayoutAlgorithm,

    /// Hierarchical layout options
    pub hierarchical: HierarchicalOptions,

    /// Force-directed layout options
    pub force: ForceOptions,
}

/// Options for hierarchical layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct HierarchicalOptions {
    /// Canvas width; rows are centered within it
    pub width: f64,

    /// Canvas height
    pub height: f64,

    /// Horizontal distance between nodes on the same level
    pub node_spacing: f64,

    /// Vertical distance between levels
    pub level_spacing: f64,
}

impl Default for HierarchicalOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            node_spacing: 150.0,
            level_spacing: 120.0,
        }
    }
}

impl HierarchicalOptions {
    /// Check that the options describe a usable canvas
    pub fn validate(&self) -> Result<()> {
        require_positive("width", self.width)?;
        require_positive("height", self.height)?;
        require_non_negative("node-spacing", self.node_spacing)?;
        require_non_negative("level-spacing", self.level_spacing)
    }
}

/// Options for force-directed layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ForceOptions {
    /// Number of simulation steps
    pub iterations: usize,

    /// Canvas width
    pub width: f64,

    /// Canvas height
    pub height: f64,

    /// Seed for the initial placement; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
        }
    }
}

impl ForceOptions {
    /// Check that the options describe a usable canvas
    pub fn validate(&self) -> Result<()> {
        require_positive("width", self.width)?;
        require_positive("height", self.height)
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidLayoutOptions(format!(
            "{} must be a positive finite number, got {}",
            name, value
        )))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidLayoutOptions(format!(
            "{} must be a non-negative finite number, got {}",
            name, value
        )))
    }
}
