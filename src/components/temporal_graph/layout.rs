use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::warn;

use super::model::GraphModel;

/// Iteration budget for the full relaxation after a fetch.
pub const FULL_ITERATIONS: usize = 300;
/// Iteration budget for the settle pass after a drag release.
pub const SETTLE_ITERATIONS: usize = 40;

/// Above this node count the full budget is halved; the engine is
/// exact-pairwise, so per-iteration cost grows quadratically.
const LARGE_GRAPH_NODES: usize = 400;

const TIME_STEP: f32 = 0.016;
const NODE_MASS: f32 = 10.0;

/// Parameters handed to the simulation engine for one relaxation run.
#[derive(Clone, Copy, Debug)]
pub struct LayoutOptions {
	pub iterations: usize,
	pub repulsion: f32,
	pub spring: f32,
	pub max_force: f32,
	pub speed: f32,
	pub damping: f32,
}

/// Damping strengthens (the velocity retention factor drops) as the graph
/// grows, trading convergence speed for stability.
fn damping_factor(node_count: usize) -> f32 {
	if node_count <= 100 {
		0.9
	} else if node_count <= LARGE_GRAPH_NODES {
		0.8
	} else {
		0.7
	}
}

impl LayoutOptions {
	/// Full-budget run after a successful fetch.
	pub fn full(node_count: usize) -> Self {
		let iterations = if node_count > LARGE_GRAPH_NODES {
			FULL_ITERATIONS / 2
		} else {
			FULL_ITERATIONS
		};
		Self {
			iterations,
			repulsion: 150.0,
			spring: 0.05,
			max_force: 100.0,
			speed: 3000.0,
			damping: damping_factor(node_count),
		}
	}

	/// Short pass after a drag release. Gentler speed and stronger damping so
	/// neighbors relax around the released node without flinging the graph.
	pub fn settle(node_count: usize) -> Self {
		Self {
			iterations: SETTLE_ITERATIONS,
			repulsion: 150.0,
			spring: 0.05,
			max_force: 60.0,
			speed: 1000.0,
			damping: damping_factor(node_count).min(0.7),
		}
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutReport {
	pub iterations: usize,
	/// True when the engine produced a non-finite coordinate. The affected
	/// nodes keep their previous positions and camera framing must be
	/// skipped for this pass.
	pub degenerate: bool,
}

/// Relax node positions in place by stepping the force simulation.
///
/// Pinned nodes and the optional extra `anchor` (the node just dragged) are
/// fixed in the simulation. Results are validated per node; a non-finite
/// coordinate marks the pass degenerate instead of corrupting the model.
pub fn relax(model: &mut GraphModel, opts: &LayoutOptions, anchor: Option<usize>) -> LayoutReport {
	if model.node_count() == 0 {
		return LayoutReport::default();
	}

	let mut sim: ForceGraph<usize, ()> = ForceGraph::new(SimulationParameters {
		force_charge: opts.repulsion,
		force_spring: opts.spring,
		force_max: opts.max_force,
		node_speed: opts.speed,
		damping_factor: opts.damping,
	});

	let mut handles: Vec<DefaultNodeIdx> = Vec::with_capacity(model.node_count());
	for (idx, node) in model.nodes().iter().enumerate() {
		handles.push(sim.add_node(NodeData {
			x: node.x as f32,
			y: node.y as f32,
			mass: NODE_MASS,
			is_anchor: node.pinned || anchor == Some(idx),
			user_data: idx,
		}));
	}
	for edge in model.edges() {
		sim.add_edge(handles[edge.source_idx], handles[edge.target_idx], EdgeData::default());
	}

	for _ in 0..opts.iterations {
		sim.update(TIME_STEP);
	}

	let mut updates: Vec<(usize, f64, f64)> = Vec::with_capacity(model.node_count());
	sim.visit_nodes(|sim_node| {
		updates.push((
			sim_node.data.user_data,
			sim_node.x() as f64,
			sim_node.y() as f64,
		));
	});

	LayoutReport {
		iterations: opts.iterations,
		degenerate: !apply_positions(model, &updates),
	}
}

/// Copy simulation output back into the model. Returns false when any
/// coordinate was non-finite; those nodes keep their previous positions.
fn apply_positions(model: &mut GraphModel, updates: &[(usize, f64, f64)]) -> bool {
	let mut all_finite = true;
	for &(idx, x, y) in updates {
		if !model.set_position(idx, x, y) {
			warn!("layout produced non-finite coordinates for node {idx}");
			all_finite = false;
		}
	}
	all_finite
}
