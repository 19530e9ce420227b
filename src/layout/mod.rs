mod forces;
mod geometry;
mod graph;
mod render;

use eframe::egui::{Vec2, vec2};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::dataset::Dataset;

pub use geometry::{Curve, FinalSnapshot, RecipeGeometry, TagLink};
pub use graph::{GraphError, Node, NodeKey, NodeKind, Spring, SpringKind};
pub use render::{Canvas, Highlight, final_color, paint_final, paint_live};

use forces::accumulate;
use geometry::finalize;
use graph::Graph;

pub const CENTER: Vec2 = vec2(0.5, 0.5);

pub const DEFAULT_MAX_STEPS: usize = 100_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub spring_constant: f32,
    pub repulsion: f32,
    pub gravity: f32,
    pub repulsion_samples: usize,
    pub min_distance_cubed: f32,
    pub base_friction: f64,
    pub friction_ramp: f64,
    pub convergence_threshold: f32,
    pub initial_speed: f32,
    pub max_steps: usize,
    pub node_radius: f32,
    pub curve_segments: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            spring_constant: 0.0002,
            repulsion: 0.000_000_01,
            gravity: 0.000_01,
            repulsion_samples: 200,
            min_distance_cubed: 1e-8,
            base_friction: 0.00083,
            friction_ramp: 0.000_059,
            convergence_threshold: 1e-7,
            initial_speed: 0.00075,
            max_steps: DEFAULT_MAX_STEPS,
            node_radius: 0.0125,
            curve_segments: 16,
        }
    }
}

impl LayoutConfig {
    // Exponential ramp, capped at 1.
    pub fn friction_at(&self, elapsed_ms: f64) -> f32 {
        (self.base_friction * (self.friction_ramp * elapsed_ms.max(0.0)).exp()).min(1.0) as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    Converged,
    StepLimit,
}

impl StepOutcome {
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Running)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Converged => "converged",
            Self::StepLimit => "step limit",
        }
    }
}

pub struct LayoutSession<R = StdRng> {
    graph: Graph,
    config: LayoutConfig,
    rng: R,
    elapsed_ms: f64,
    steps: usize,
    max_speed_sq: f32,
    outcome: StepOutcome,
    snapshot: Option<FinalSnapshot>,
}

impl<R: Rng> LayoutSession<R> {
    pub fn new(dataset: &Dataset, config: LayoutConfig, mut rng: R) -> Result<Self, GraphError> {
        let graph = Graph::build(dataset, &config, &mut rng)?;
        info!(
            nodes = graph.nodes.len(),
            springs = graph.springs.len(),
            recipes = graph.recipes.len(),
            "layout session created"
        );

        Ok(Self {
            graph,
            config,
            rng,
            elapsed_ms: 0.0,
            steps: 0,
            max_speed_sq: f32::INFINITY,
            outcome: StepOutcome::Running,
            snapshot: None,
        })
    }

    /// Advances the simulation by one unit step. `delta_ms` only feeds the
    /// friction schedule. Once a finished outcome has been returned, further
    /// calls do nothing and repeat it.
    pub fn step(&mut self, delta_ms: f32) -> StepOutcome {
        if self.outcome.is_finished() {
            return self.outcome;
        }

        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.elapsed_ms += f64::from(delta_ms);
        }

        let friction = self.friction();
        accumulate(
            &mut self.graph.nodes,
            &self.graph.springs,
            &self.config,
            friction,
            &mut self.rng,
        );
        self.max_speed_sq = integrate(&mut self.graph.nodes);
        self.steps += 1;

        self.outcome = if self.max_speed_sq < self.config.convergence_threshold {
            info!(
                steps = self.steps,
                elapsed_ms = self.elapsed_ms,
                "layout converged"
            );
            StepOutcome::Converged
        } else if self.steps >= self.config.max_steps {
            warn!(
                steps = self.steps,
                max_speed_sq = self.max_speed_sq,
                "layout hit the step limit before converging"
            );
            StepOutcome::StepLimit
        } else {
            StepOutcome::Running
        };

        if self.outcome.is_finished() {
            self.snapshot = Some(finalize(&self.graph, &self.config));
        }

        self.outcome
    }
}

impl<R> LayoutSession<R> {
    pub fn friction(&self) -> f32 {
        self.config.friction_at(self.elapsed_ms)
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    pub fn springs(&self) -> &[Spring] {
        &self.graph.springs
    }

    pub fn index_of(&self, key: &NodeKey) -> Option<usize> {
        self.graph.index_of(key)
    }

    pub fn outcome(&self) -> StepOutcome {
        self.outcome
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn max_speed_sq(&self) -> f32 {
        self.max_speed_sq
    }

    pub fn snapshot(&self) -> Option<&FinalSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn place_node(&mut self, index: usize, position: Vec2, velocity: Vec2) {
        if let Some(node) = self.graph.nodes.get_mut(index) {
            node.position = position;
            node.velocity = velocity;
        }
    }

    pub fn nearest_node(&self, point: Vec2, max_distance_sq: f32) -> Option<usize> {
        self.graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (index, (node.position - point).length_sq()))
            .filter(|(_, distance_sq)| *distance_sq <= max_distance_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

fn integrate(nodes: &mut [Node]) -> f32 {
    let mut max_speed_sq = 0.0_f32;
    for node in nodes.iter_mut() {
        let velocity = node.velocity + node.acceleration;
        let position = node.position + velocity;
        if velocity.is_finite() && position.is_finite() {
            node.velocity = velocity;
            node.position = position;
        } else {
            debug!(node = %node.key, "non-finite state, holding node in place");
            node.velocity = Vec2::ZERO;
        }
        max_speed_sq = max_speed_sq.max(node.velocity.length_sq());
    }
    max_speed_sq
}
