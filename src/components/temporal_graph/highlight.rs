use std::collections::HashSet;

use super::model::GraphModel;
use super::types::{InteractionState, RepostEdge, TimeWindow};

/// Edge color gradient endpoints: old-in-window reposts render cool, recent
/// ones warm.
const EDGE_COLD: (u8, u8, u8) = (100, 180, 255);
const EDGE_WARM: (u8, u8, u8) = (255, 140, 80);

/// Exactly one emphasis applies per node per frame, in this precedence
/// order. A node that is both selected and hovered renders as selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeEmphasis {
	Selected,
	Hovered,
	Neighbor,
	Dimmed,
	Normal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EdgeEmphasis {
	/// Incident to the selected or hovered node.
	Active,
	/// A highlight is active and neither endpoint belongs to it.
	Hidden,
	/// No special treatment: colored by the timestamp's place in the window.
	Gradient(f64),
}

/// The selected/hovered anchors plus their direct neighbors. Empty means no
/// highlight is active and everything renders at full opacity.
pub fn highlight_set(model: &GraphModel, interaction: &InteractionState) -> HashSet<usize> {
	let mut set = HashSet::new();
	for anchor in [interaction.selected, interaction.hovered].into_iter().flatten() {
		set.insert(anchor);
		set.extend(model.neighbor_set(anchor));
	}
	set
}

pub fn node_emphasis(
	idx: usize,
	interaction: &InteractionState,
	set: &HashSet<usize>,
) -> NodeEmphasis {
	if interaction.selected == Some(idx) {
		NodeEmphasis::Selected
	} else if interaction.hovered == Some(idx) {
		NodeEmphasis::Hovered
	} else if set.contains(&idx) {
		NodeEmphasis::Neighbor
	} else if !set.is_empty() {
		NodeEmphasis::Dimmed
	} else {
		NodeEmphasis::Normal
	}
}

pub fn edge_emphasis(
	edge: &RepostEdge,
	interaction: &InteractionState,
	set: &HashSet<usize>,
	window: &TimeWindow,
) -> EdgeEmphasis {
	let incident_to_anchor = [interaction.selected, interaction.hovered]
		.into_iter()
		.flatten()
		.any(|anchor| edge.source_idx == anchor || edge.target_idx == anchor);
	if incident_to_anchor {
		EdgeEmphasis::Active
	} else if !set.is_empty()
		&& !set.contains(&edge.source_idx)
		&& !set.contains(&edge.target_idx)
	{
		EdgeEmphasis::Hidden
	} else {
		EdgeEmphasis::Gradient(window.position(edge.timestamp))
	}
}

/// Linear interpolation between the gradient endpoints, as a canvas color.
pub fn gradient_color(t: f64) -> String {
	let t = t.clamp(0.0, 1.0);
	let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
	format!(
		"rgb({}, {}, {})",
		lerp(EDGE_COLD.0, EDGE_WARM.0),
		lerp(EDGE_COLD.1, EDGE_WARM.1),
		lerp(EDGE_COLD.2, EDGE_WARM.2)
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::temporal_graph::types::{EdgeInput, NodeInput};

	fn model() -> GraphModel {
		// a -> b -> c, d isolated
		let mut model = GraphModel::new();
		let nodes: Vec<NodeInput> = ["a", "b", "c", "d"]
			.iter()
			.map(|id| NodeInput {
				id: id.to_string(),
				label: id.to_string(),
				degree: 1,
			})
			.collect();
		let edges = vec![
			EdgeInput {
				source: "a".into(),
				target: "b".into(),
				timestamp: 1_000,
			},
			EdgeInput {
				source: "b".into(),
				target: "c".into(),
				timestamp: 2_000,
			},
		];
		model.merge(&nodes, &edges);
		model
	}

	const WINDOW: TimeWindow = TimeWindow { start: 1_000, end: 2_000 };

	#[test]
	fn no_interaction_means_empty_set_and_normal_nodes() {
		let model = model();
		let interaction = InteractionState::default();
		let set = highlight_set(&model, &interaction);

		assert!(set.is_empty());
		for idx in 0..model.node_count() {
			assert_eq!(node_emphasis(idx, &interaction, &set), NodeEmphasis::Normal);
		}
	}

	#[test]
	fn hover_highlights_node_and_neighbors_and_dims_the_rest() {
		let model = model();
		let interaction = InteractionState {
			hovered: Some(1),
			selected: None,
		};
		let set = highlight_set(&model, &interaction);

		assert_eq!(node_emphasis(1, &interaction, &set), NodeEmphasis::Hovered);
		assert_eq!(node_emphasis(0, &interaction, &set), NodeEmphasis::Neighbor);
		assert_eq!(node_emphasis(2, &interaction, &set), NodeEmphasis::Neighbor);
		assert_eq!(node_emphasis(3, &interaction, &set), NodeEmphasis::Dimmed);
	}

	#[test]
	fn selection_wins_over_hover() {
		let model = model();
		let interaction = InteractionState {
			hovered: Some(0),
			selected: Some(0),
		};
		let set = highlight_set(&model, &interaction);
		assert_eq!(node_emphasis(0, &interaction, &set), NodeEmphasis::Selected);

		let interaction = InteractionState {
			hovered: Some(2),
			selected: Some(0),
		};
		let set = highlight_set(&model, &interaction);
		assert_eq!(node_emphasis(0, &interaction, &set), NodeEmphasis::Selected);
		assert_eq!(node_emphasis(2, &interaction, &set), NodeEmphasis::Hovered);
	}

	#[test]
	fn reducer_is_pure_and_deselect_returns_to_empty() {
		let model = model();
		let mut interaction = InteractionState::default();
		interaction.toggle_selected(1);

		let first = highlight_set(&model, &interaction);
		let second = highlight_set(&model, &interaction);
		assert_eq!(first, second);

		interaction.toggle_selected(1);
		assert!(highlight_set(&model, &interaction).is_empty());
	}

	#[test]
	fn edges_incident_to_the_anchor_are_active() {
		let model = model();
		let interaction = InteractionState {
			hovered: None,
			selected: Some(1),
		};
		let set = highlight_set(&model, &interaction);

		for edge in model.edges() {
			assert_eq!(
				edge_emphasis(edge, &interaction, &set, &WINDOW),
				EdgeEmphasis::Active
			);
		}
	}

	#[test]
	fn unrelated_edges_hide_while_a_highlight_is_active() {
		let model = model();
		let interaction = InteractionState {
			hovered: Some(3),
			selected: None,
		};
		let set = highlight_set(&model, &interaction);

		// d has no neighbors, so both edges are outside the highlight set.
		for edge in model.edges() {
			assert_eq!(
				edge_emphasis(edge, &interaction, &set, &WINDOW),
				EdgeEmphasis::Hidden
			);
		}
	}

	#[test]
	fn idle_edges_carry_the_window_gradient() {
		let model = model();
		let interaction = InteractionState::default();
		let set = highlight_set(&model, &interaction);

		let positions: Vec<EdgeEmphasis> = model
			.edges()
			.iter()
			.map(|e| edge_emphasis(e, &interaction, &set, &WINDOW))
			.collect();
		assert_eq!(positions[0], EdgeEmphasis::Gradient(0.0));
		assert_eq!(positions[1], EdgeEmphasis::Gradient(1.0));
	}

	#[test]
	fn gradient_endpoints_match_the_palette() {
		assert_eq!(gradient_color(0.0), "rgb(100, 180, 255)");
		assert_eq!(gradient_color(1.0), "rgb(255, 140, 80)");
		assert_eq!(gradient_color(-3.0), gradient_color(0.0));
		assert_eq!(gradient_color(7.0), gradient_color(1.0));
	}
}
