use std::collections::{HashMap, HashSet};

use log::warn;

use super::types::{
	ChannelNode, EdgeInput, INITIAL_RANGE, NodeInput, RepostEdge, color_for_id, node_size,
};

/// Axis-aligned bounds of the occupied region, in model space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl BoundingBox {
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn center(&self) -> (f64, f64) {
		(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}
}

/// Authoritative store of the nodes and edges currently displayed.
///
/// The model is cleared and repopulated on every successful fetch; positions
/// (and pinned flags) of ids seen before the merge are carried over so the
/// view does not jump, while ids new to the window are seeded inside
/// `INITIAL_RANGE` by a deterministic generator.
pub struct GraphModel {
	nodes: Vec<ChannelNode>,
	edges: Vec<RepostEdge>,
	index: HashMap<String, usize>,
	seed: u64,
}

impl Default for GraphModel {
	fn default() -> Self {
		Self::new()
	}
}

impl GraphModel {
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			index: HashMap::new(),
			seed: 7,
		}
	}

	/// Deterministic unit-interval generator for initial placement.
	fn next_unit(&mut self) -> f64 {
		self.seed = ((self.seed + 1) * 9301 + 49297) % 233280;
		self.seed as f64 / 233280.0
	}

	fn seeded_position(&mut self) -> (f64, f64) {
		(
			(self.next_unit() * 2.0 - 1.0) * INITIAL_RANGE,
			(self.next_unit() * 2.0 - 1.0) * INITIAL_RANGE,
		)
	}

	/// Replace the model contents with a freshly fetched subgraph.
	///
	/// Duplicate node ids keep their first record; edges referencing absent
	/// endpoints are dropped with a warning; duplicate
	/// (source, target, timestamp) triples collapse to one edge.
	pub fn merge(&mut self, nodes: &[NodeInput], edges: &[EdgeInput]) {
		let prior: HashMap<String, (f64, f64, bool)> = self
			.nodes
			.drain(..)
			.map(|n| (n.id, (n.x, n.y, n.pinned)))
			.collect();
		self.edges.clear();
		self.index.clear();

		for input in nodes {
			if self.index.contains_key(&input.id) {
				warn!("duplicate node id {} in response, keeping first", input.id);
				continue;
			}
			let (x, y, pinned) = match prior.get(&input.id) {
				Some(&(x, y, pinned)) => (x, y, pinned),
				None => {
					let (x, y) = self.seeded_position();
					(x, y, false)
				}
			};
			let node = ChannelNode {
				id: input.id.clone(),
				label: input.label.clone(),
				degree: input.degree,
				size: node_size(input.degree),
				x,
				y,
				color: color_for_id(&input.id),
				pinned,
			};
			self.index.insert(node.id.clone(), self.nodes.len());
			self.nodes.push(node);
		}

		let mut seen: HashSet<(usize, usize, i64)> = HashSet::new();
		for input in edges {
			let (Some(&source_idx), Some(&target_idx)) =
				(self.index.get(&input.source), self.index.get(&input.target))
			else {
				warn!(
					"dropping edge {} -> {}: endpoint missing from response",
					input.source, input.target
				);
				continue;
			};
			if !seen.insert((source_idx, target_idx, input.timestamp)) {
				continue;
			}
			self.edges.push(RepostEdge {
				source: input.source.clone(),
				target: input.target.clone(),
				source_idx,
				target_idx,
				timestamp: input.timestamp,
			});
		}
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
		self.index.clear();
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn nodes(&self) -> &[ChannelNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[RepostEdge] {
		&self.edges
	}

	pub fn node(&self, idx: usize) -> Option<&ChannelNode> {
		self.nodes.get(idx)
	}

	pub fn node_by_id(&self, id: &str) -> Option<&ChannelNode> {
		self.index.get(id).map(|&idx| &self.nodes[idx])
	}

	/// Writes a position only when both coordinates are finite; reports
	/// whether the write happened.
	pub fn set_position(&mut self, idx: usize, x: f64, y: f64) -> bool {
		if !(x.is_finite() && y.is_finite()) {
			return false;
		}
		if let Some(node) = self.nodes.get_mut(idx) {
			node.x = x;
			node.y = y;
			true
		} else {
			false
		}
	}

	pub fn pin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pinned = true;
		}
	}

	/// Direct neighbors of a node, in either edge direction.
	pub fn neighbor_set(&self, idx: usize) -> HashSet<usize> {
		let mut neighbors = HashSet::new();
		for edge in &self.edges {
			if edge.source_idx == idx {
				neighbors.insert(edge.target_idx);
			} else if edge.target_idx == idx {
				neighbors.insert(edge.source_idx);
			}
		}
		neighbors
	}

	/// Bounding box over nodes with finite coordinates only.
	pub fn bounding_box(&self) -> Option<BoundingBox> {
		let mut bbox: Option<BoundingBox> = None;
		for node in &self.nodes {
			if !(node.x.is_finite() && node.y.is_finite()) {
				continue;
			}
			bbox = Some(match bbox {
				None => BoundingBox {
					min_x: node.x,
					min_y: node.y,
					max_x: node.x,
					max_y: node.y,
				},
				Some(b) => BoundingBox {
					min_x: b.min_x.min(node.x),
					min_y: b.min_y.min(node.y),
					max_x: b.max_x.max(node.x),
					max_y: b.max_y.max(node.y),
				},
			});
		}
		bbox
	}
}
