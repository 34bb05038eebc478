use std::hash::{DefaultHasher, Hash, Hasher};

/// Palette used for node fills. A node's color is a pure function of its id,
/// so colors survive window changes the same way positions do.
pub const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const MIN_NODE_SIZE: f64 = 4.0;
pub const MAX_NODE_SIZE: f64 = 14.0;
pub const SIZE_SCALE: f64 = 2.0;

/// Half-extent of the square in which newly seen nodes are placed.
pub const INITIAL_RANGE: f64 = 250.0;

pub fn color_for_id(id: &str) -> &'static str {
	let mut hasher = DefaultHasher::new();
	id.hash(&mut hasher);
	COLORS[(hasher.finish() % COLORS.len() as u64) as usize]
}

/// Node size from its repost degree: square-root growth, clamped.
pub fn node_size(degree: u32) -> f64 {
	(MIN_NODE_SIZE + (degree as f64).sqrt() * SIZE_SCALE).clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

/// A channel in the currently displayed window.
#[derive(Clone, Debug)]
pub struct ChannelNode {
	pub id: String,
	pub label: String,
	pub degree: u32,
	pub size: f64,
	pub x: f64,
	pub y: f64,
	pub color: &'static str,
	/// Set once the user hand-places the node; layout passes anchor it.
	pub pinned: bool,
}

/// A directed repost relation. Endpoints are resolved to node indices when
/// the edge is inserted; the original ids are kept for diagnostics.
#[derive(Clone, Debug)]
pub struct RepostEdge {
	pub source: String,
	pub target: String,
	pub source_idx: usize,
	pub target_idx: usize,
	pub timestamp: i64,
}

/// Normalized node record handed to the model by the client.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeInput {
	pub id: String,
	pub label: String,
	pub degree: u32,
}

/// Normalized edge record handed to the model by the client.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeInput {
	pub source: String,
	pub target: String,
	pub timestamp: i64,
}

/// The [start, end] interval currently selected for display, epoch ms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
	pub start: i64,
	pub end: i64,
}

impl TimeWindow {
	/// Where `timestamp` falls within the window, in [0, 1]. Timestamps at or
	/// before the start map to 0, at or after the end to 1.
	pub fn position(&self, timestamp: i64) -> f64 {
		let span = (self.end - self.start).max(1);
		(((timestamp - self.start) as f64) / span as f64).clamp(0.0, 1.0)
	}
}

/// Overall dataset bounds, fixed once at the first successful load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBounds {
	pub min: i64,
	pub max: i64,
}

/// Transient pointer-driven state. At most one hovered and one selected node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
	pub hovered: Option<usize>,
	pub selected: Option<usize>,
}

impl InteractionState {
	/// Click semantics: clicking the selected node clears it, any other node
	/// becomes the selection.
	pub fn toggle_selected(&mut self, idx: usize) {
		self.selected = if self.selected == Some(idx) {
			None
		} else {
			Some(idx)
		};
	}

	pub fn clear_selected(&mut self) {
		self.selected = None;
	}
}

/// What the view is currently doing, surfaced in the overlay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewStatus {
	Loading,
	Ready,
	Failed(String),
}
