use super::camera::Camera;
use super::drag::DragController;
use super::model::GraphModel;
use super::types::InteractionState;
use super::window::TimeWindowController;

/// World-space slop added to a node's radius for hit testing; scales with
/// zoom like the nodes themselves.
const HIT_PADDING: f64 = 6.0;

/// Screen-space travel below which a down/up pair counts as a click.
const CLICK_SLOP: f64 = 4.0;

#[derive(Clone, Copy, Debug)]
struct Press {
	x: f64,
	y: f64,
	moved: bool,
}

/// Everything the view controller owns: the graph model, camera, drag state
/// machine, interaction state, and the time window controller. All pointer
/// handling happens here in screen coordinates; the Leptos component is only
/// DOM glue around these transitions.
pub struct ViewState {
	pub model: GraphModel,
	pub camera: Camera,
	pub drag: DragController,
	pub interaction: InteractionState,
	pub windows: TimeWindowController,
	/// Last layout pass produced non-finite coordinates.
	pub layout_degenerate: bool,
	/// The camera has auto-framed once (first successful load).
	pub framed: bool,
	press: Option<Press>,
}

impl ViewState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			model: GraphModel::new(),
			camera: Camera::new(width, height),
			drag: DragController::default(),
			interaction: InteractionState::default(),
			windows: TimeWindowController::new(),
			layout_degenerate: false,
			framed: false,
			press: None,
		}
	}

	/// Topmost node under a screen point, by smallest distance within the
	/// padded radius.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (wx, wy) = self.camera.screen_to_world(sx, sy);
		let mut found: Option<(usize, f64)> = None;
		for (idx, node) in self.model.nodes().iter().enumerate() {
			let (dx, dy) = (node.x - wx, node.y - wy);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist < node.size + HIT_PADDING && found.is_none_or(|(_, best)| dist < best) {
				found = Some((idx, dist));
			}
		}
		found.map(|(idx, _)| idx)
	}

	/// Pointer down: a hit node starts a drag (camera interaction pauses for
	/// its duration), anything else starts a background pan. A held modifier
	/// suppresses drag initiation (reserved for alternative gestures).
	pub fn pointer_down(&mut self, sx: f64, sy: f64, modifier: bool) {
		self.press = Some(Press { x: sx, y: sy, moved: false });
		match self.node_at_position(sx, sy) {
			Some(idx) if !modifier => {
				let node = &self.model.nodes()[idx];
				let node_screen = self.camera.world_to_screen(node.x, node.y);
				self.drag.begin(idx, (sx, sy), node_screen);
				self.camera.interaction_enabled = false;
			}
			_ => self.camera.begin_pan(sx, sy),
		}
	}

	/// Pointer move: drives exactly one of drag, pan, or hover.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(press) = &mut self.press {
			let (dx, dy) = (sx - press.x, sy - press.y);
			if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
				press.moved = true;
			}
		}

		if let Some((idx, nsx, nsy)) = self.drag.target_screen((sx, sy)) {
			let (wx, wy) = self.camera.screen_to_world(nsx, nsy);
			self.model.set_position(idx, wx, wy);
		} else if self.camera.pan_to(sx, sy) {
			// Panning; hover stays as it was.
		} else {
			self.interaction.hovered = self.node_at_position(sx, sy);
		}
	}

	/// Pointer up: a stationary press is a click (selection toggle on a
	/// node, clear on empty canvas); a real drag release pins the node and
	/// requests a settle pass, returned to the caller.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Option<usize> {
		let was_click = self.press.is_some_and(|press| !press.moved);
		self.press = None;
		self.camera.end_pan();
		let released = self.drag.release();
		self.camera.interaction_enabled = true;

		if was_click {
			match self.node_at_position(sx, sy) {
				Some(idx) => self.interaction.toggle_selected(idx),
				None => self.interaction.clear_selected(),
			}
			return None;
		}

		released.inspect(|&idx| self.model.pin(idx))
	}

	/// Replace the model with a freshly fetched subgraph.
	///
	/// Node indices change across a merge, so an active drag ends (without a
	/// settle) and hover/selection reset before the model is rebuilt.
	pub fn apply_subgraph(
		&mut self,
		nodes: &[super::types::NodeInput],
		edges: &[super::types::EdgeInput],
	) {
		if self.drag.is_dragging() {
			self.drag.release();
			self.camera.interaction_enabled = true;
		}
		self.press = None;
		self.interaction = InteractionState::default();
		self.model.merge(nodes, edges);
	}

	/// The pointer left the canvas: hover clears and an active drag releases
	/// exactly as on pointer up.
	pub fn pointer_leave(&mut self) -> Option<usize> {
		self.press = None;
		self.camera.end_pan();
		self.interaction.hovered = None;
		let released = self.drag.release();
		self.camera.interaction_enabled = true;
		released.inspect(|&idx| self.model.pin(idx))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::temporal_graph::types::NodeInput;

	fn state_with_node_at_origin() -> ViewState {
		let mut state = ViewState::new(800.0, 600.0);
		state.model.merge(
			&[
				NodeInput { id: "a".into(), label: "a".into(), degree: 0 },
				NodeInput { id: "b".into(), label: "b".into(), degree: 0 },
			],
			&[],
		);
		state.model.set_position(0, 0.0, 0.0);
		state.model.set_position(1, 200.0, 0.0);
		state
	}

	#[test]
	fn hit_testing_respects_the_camera_transform() {
		let state = state_with_node_at_origin();
		// Default transform centers world origin at (400, 300).
		assert_eq!(state.node_at_position(400.0, 300.0), Some(0));
		assert_eq!(state.node_at_position(600.0, 300.0), Some(1));
		assert_eq!(state.node_at_position(500.0, 300.0), None);
	}

	#[test]
	fn drag_moves_the_node_and_requests_a_settle() {
		let mut state = state_with_node_at_origin();

		state.pointer_down(402.0, 301.0, false);
		assert!(state.drag.is_dragging());
		assert!(!state.camera.interaction_enabled);

		state.pointer_move(442.0, 351.0);
		let node = state.model.node(0).unwrap();
		assert_eq!((node.x, node.y), (40.0, 50.0));

		let settle = state.pointer_up(442.0, 351.0);
		assert_eq!(settle, Some(0));
		assert!(state.camera.interaction_enabled);
		assert!(state.model.node(0).unwrap().pinned);
		// The drop position survives the release.
		let node = state.model.node(0).unwrap();
		assert_eq!((node.x, node.y), (40.0, 50.0));
	}

	#[test]
	fn modifier_suppresses_drag_initiation() {
		let mut state = state_with_node_at_origin();
		state.pointer_down(400.0, 300.0, true);
		assert!(!state.drag.is_dragging());
		assert!(state.camera.is_panning());
		state.pointer_up(400.0, 300.0);
	}

	#[test]
	fn stationary_press_toggles_selection_without_a_settle() {
		let mut state = state_with_node_at_origin();

		state.pointer_down(400.0, 300.0, false);
		let settle = state.pointer_up(401.0, 300.0);
		assert_eq!(settle, None);
		assert_eq!(state.interaction.selected, Some(0));
		assert!(!state.model.node(0).unwrap().pinned);

		// Clicking the selected node again clears the selection.
		state.pointer_down(400.0, 300.0, false);
		state.pointer_up(400.0, 300.0);
		assert_eq!(state.interaction.selected, None);
	}

	#[test]
	fn clicking_empty_canvas_clears_selection() {
		let mut state = state_with_node_at_origin();
		state.pointer_down(400.0, 300.0, false);
		state.pointer_up(400.0, 300.0);
		assert_eq!(state.interaction.selected, Some(0));

		state.pointer_down(500.0, 100.0, false);
		state.pointer_up(500.0, 100.0);
		assert_eq!(state.interaction.selected, None);
	}

	#[test]
	fn background_press_pans_the_camera() {
		let mut state = state_with_node_at_origin();
		state.pointer_down(500.0, 100.0, false);
		assert!(state.camera.is_panning());
		state.pointer_move(520.0, 130.0);
		assert_eq!(state.camera.transform.x, 420.0);
		assert_eq!(state.camera.transform.y, 330.0);
		assert_eq!(state.pointer_up(520.0, 130.0), None);
	}

	#[test]
	fn hover_follows_the_pointer_and_clears_on_leave() {
		let mut state = state_with_node_at_origin();
		state.pointer_move(400.0, 300.0);
		assert_eq!(state.interaction.hovered, Some(0));
		state.pointer_move(500.0, 300.0);
		assert_eq!(state.interaction.hovered, None);
		state.pointer_move(600.0, 300.0);
		assert_eq!(state.interaction.hovered, Some(1));

		state.pointer_leave();
		assert_eq!(state.interaction.hovered, None);
	}

	#[test]
	fn merging_mid_drag_ends_the_gesture_and_resets_interaction() {
		let mut state = state_with_node_at_origin();
		state.pointer_down(400.0, 300.0, false);
		state.pointer_move(450.0, 350.0);
		state.interaction.hovered = Some(1);

		state.apply_subgraph(
			&[NodeInput { id: "z".into(), label: "z".into(), degree: 0 }],
			&[],
		);

		assert!(!state.drag.is_dragging());
		assert!(state.camera.interaction_enabled);
		assert_eq!(state.interaction, InteractionState::default());
		assert_eq!(state.model.node_count(), 1);
	}

	#[test]
	fn leaving_the_canvas_releases_an_active_drag() {
		let mut state = state_with_node_at_origin();
		state.pointer_down(400.0, 300.0, false);
		state.pointer_move(450.0, 350.0);

		let settle = state.pointer_leave();
		assert_eq!(settle, Some(0));
		assert!(state.camera.interaction_enabled);
		assert!(!state.drag.is_dragging());
	}
}
