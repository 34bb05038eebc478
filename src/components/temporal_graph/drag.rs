/// Node drag state machine: `Idle` or `Dragging`.
///
/// On drag start the offset between the pointer and the node's screen
/// position is recorded so the node does not snap to the pointer. Pointer
/// moves yield the node's new screen position; the orchestrator converts it
/// through the camera transform and writes the model directly. No layout
/// runs while a drag is active.
#[derive(Debug, Default)]
pub struct DragController {
	state: DragState,
}

#[derive(Debug, Default)]
enum DragState {
	#[default]
	Idle,
	Dragging {
		node: usize,
		offset_x: f64,
		offset_y: f64,
	},
}

impl DragController {
	pub fn begin(&mut self, node: usize, pointer: (f64, f64), node_screen: (f64, f64)) {
		self.state = DragState::Dragging {
			node,
			offset_x: pointer.0 - node_screen.0,
			offset_y: pointer.1 - node_screen.1,
		};
	}

	/// The dragged node's new screen position for the current pointer
	/// position, or None when idle.
	pub fn target_screen(&self, pointer: (f64, f64)) -> Option<(usize, f64, f64)> {
		match self.state {
			DragState::Idle => None,
			DragState::Dragging {
				node,
				offset_x,
				offset_y,
			} => Some((node, pointer.0 - offset_x, pointer.1 - offset_y)),
		}
	}

	/// Ends the gesture (pointer up or pointer leaving the canvas) and
	/// returns the node that needs a settle pass.
	pub fn release(&mut self) -> Option<usize> {
		match std::mem::take(&mut self.state) {
			DragState::Idle => None,
			DragState::Dragging { node, .. } => Some(node),
		}
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self.state, DragState::Dragging { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn drag_preserves_the_grab_offset() {
		let mut drag = DragController::default();
		// Grabbed 4px right and 2px below the node center.
		drag.begin(7, (104.0, 52.0), (100.0, 50.0));

		let (node, sx, sy) = drag.target_screen((150.0, 80.0)).unwrap();
		assert_eq!(node, 7);
		assert_eq!((sx, sy), (146.0, 78.0));
	}

	#[test]
	fn release_reports_the_node_once() {
		let mut drag = DragController::default();
		drag.begin(3, (0.0, 0.0), (0.0, 0.0));
		assert!(drag.is_dragging());

		assert_eq!(drag.release(), Some(3));
		assert!(!drag.is_dragging());
		assert_eq!(drag.release(), None);
		assert_eq!(drag.target_screen((10.0, 10.0)), None);
	}
}
