//! Force-directed layout (Fruchterman-Reingold spring embedder).
//!
//! # Algorithm
//!
//! 1. Every node starts at a uniformly random point of the canvas.
//! 2. The ideal inter-node distance is `k = sqrt(width * height / n)`.
//! 3. Each iteration:
//!    - every pair of nodes repels with magnitude `k² / d`
//!    - every edge pulls its endpoints together with magnitude `d² / k`
//!    - each node moves along its summed displacement, by at most the current
//!      temperature, which cools linearly from `width / 10` towards 0
//!    - coordinates are clamped to `[50, width - 50] × [50, height - 50]`
//!
//! Distances are floored at 1 so coincident nodes never divide by zero.
//!
//! # Cost
//!
//! O(iterations · (n² + e)). Meant for interactive graphs of up to a few
//! hundred nodes; there is no cancellation, so callers that need to stay
//! responsive run fewer iterations per call.

use super::{Layout, inner_range};
use crate::config::ForceOptions;
use crate::domain::NodeId;
use crate::error::Result;
use crate::graph::DependencyGraph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::debug;

/// Floor applied to every distance before it is used as a divisor.
const MIN_DISTANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Vector {
    x: f64,
    y: f64,
}

impl Vector {
    fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Per-run constants of the simulation.
struct Simulation {
    /// Ideal distance between nodes.
    k: f64,
    initial_temperature: f64,
    iterations: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Simulation {
    #[allow(clippy::cast_precision_loss)]
    fn new(options: &ForceOptions, node_count: usize) -> Self {
        Self {
            k: (options.width * options.height / node_count as f64).sqrt(),
            initial_temperature: options.width / 10.0,
            iterations: options.iterations,
            x_range: inner_range(options.width),
            y_range: inner_range(options.height),
        }
    }

    /// Linear cooling: full temperature on the first step, approaching 0 on
    /// the last.
    #[allow(clippy::cast_precision_loss)]
    fn temperature(&self, iteration: usize) -> f64 {
        self.initial_temperature * (1.0 - iteration as f64 / self.iterations as f64)
    }

    fn step(&self, positions: &mut [Vector], springs: &[(usize, usize)], iteration: usize) {
        let mut displacement = vec![Vector::default(); positions.len()];

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let delta = Vector {
                    x: positions[i].x - positions[j].x,
                    y: positions[i].y - positions[j].y,
                };
                let distance = delta.length().max(MIN_DISTANCE);
                let force = self.k * self.k / distance;

                let push = Vector {
                    x: delta.x / distance * force,
                    y: delta.y / distance * force,
                };
                displacement[i].x += push.x;
                displacement[i].y += push.y;
                displacement[j].x -= push.x;
                displacement[j].y -= push.y;
            }
        }

        for &(source, target) in springs {
            let delta = Vector {
                x: positions[source].x - positions[target].x,
                y: positions[source].y - positions[target].y,
            };
            let distance = delta.length().max(MIN_DISTANCE);
            let force = distance * distance / self.k;

            let pull = Vector {
                x: delta.x / distance * force,
                y: delta.y / distance * force,
            };
            displacement[source].x -= pull.x;
            displacement[source].y -= pull.y;
            displacement[target].x += pull.x;
            displacement[target].y += pull.y;
        }

        let temperature = self.temperature(iteration);
        for (position, shift) in positions.iter_mut().zip(&displacement) {
            let magnitude = shift.length();
            if magnitude > 0.0 {
                let limited = magnitude.min(temperature);
                position.x += shift.x / magnitude * limited;
                position.y += shift.y / magnitude * limited;
            }
            self.clamp(position);
        }
    }

    fn clamp(&self, position: &mut Vector) {
        position.x = position.x.clamp(self.x_range.0, self.x_range.1);
        position.y = position.y.clamp(self.y_range.0, self.y_range.1);
    }
}

impl DependencyGraph {
    /// Run the force-directed layout
    ///
    /// With `options.seed` the result is reproducible; otherwise the initial
    /// placement is seeded from entropy.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidLayoutOptions`] for a non-positive or non-finite canvas.
    pub fn layout_force_directed(&mut self, options: &ForceOptions) -> Result<()> {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.layout_force_directed_with_rng(options, &mut rng)
    }

    /// Run the force-directed layout drawing initial positions from `rng`
    ///
    /// `options.seed` is ignored.
    pub fn layout_force_directed_with_rng<R: Rng + ?Sized>(
        &mut self,
        options: &ForceOptions,
        rng: &mut R,
    ) -> Result<()> {
        options.validate()?;

        let ids = self.ordered_node_ids();
        if ids.is_empty() {
            return Ok(());
        }

        let slot: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

        // Self-loops exert no force
        let springs: Vec<(usize, usize)> = self
            .ordered_edges()
            .into_iter()
            .filter_map(|edge| Some((*slot.get(&edge.source)?, *slot.get(&edge.target)?)))
            .filter(|(source, target)| source != target)
            .collect();

        debug!(
            nodes = ids.len(),
            springs = springs.len(),
            iterations = options.iterations,
            "Running force-directed layout"
        );

        let mut positions: Vec<Vector> = ids
            .iter()
            .map(|_| Vector {
                x: rng.gen_range(0.0..=options.width),
                y: rng.gen_range(0.0..=options.height),
            })
            .collect();

        let simulation = Simulation::new(options, ids.len());
        for iteration in 0..options.iterations {
            simulation.step(&mut positions, &springs, iteration);
        }

        for (id, mut position) in ids.iter().zip(positions) {
            simulation.clamp(&mut position);
            self.set_position(id, position.x, position.y);
        }

        Ok(())
    }
}

/// [`Layout`] adapter for [`DependencyGraph::layout_force_directed`].
#[derive(Debug, Clone, Default)]
pub struct ForceDirectedLayout {
    options: ForceOptions,
}

impl ForceDirectedLayout {
    /// Create a layout with the given options
    pub fn new(options: ForceOptions) -> Self {
        Self { options }
    }

    /// Fix the seed of the initial placement
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.options.seed = Some(seed);
        self
    }

    /// The options this layout runs with
    pub fn options(&self) -> &ForceOptions {
        &self.options
    }
}

impl Layout for ForceDirectedLayout {
    fn name(&self) -> &'static str {
        "force-directed"
    }

    fn apply(&self, graph: &mut DependencyGraph) -> Result<()> {
        graph.layout_force_directed(&self.options)
    }
}
