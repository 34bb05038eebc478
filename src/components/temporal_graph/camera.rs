use super::model::BoundingBox;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
const DEFAULT_ZOOM: f64 = 1.0;

/// The framed bounding box is expanded by this factor so nodes do not sit on
/// the viewport edge.
const FRAME_PADDING: f64 = 1.2;

/// Per-frame approach rate of the camera animation.
const APPROACH: f64 = 0.18;
const SNAP_DISTANCE: f64 = 0.5;
const SNAP_ZOOM: f64 = 0.001;

/// screen = world * k + (x, y)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Copy, Debug)]
struct PanOrigin {
	start_x: f64,
	start_y: f64,
	transform_x: f64,
	transform_y: f64,
}

/// Owns the pan/zoom transform between model space and the canvas.
///
/// Manual interaction (wheel zoom, background pan) is gated by
/// `interaction_enabled`, which the drag controller clears for the duration
/// of a node drag.
pub struct Camera {
	pub transform: ViewTransform,
	pub interaction_enabled: bool,
	target: Option<ViewTransform>,
	pan: Option<PanOrigin>,
	width: f64,
	height: f64,
}

impl Camera {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: Self::default_transform(width, height),
			interaction_enabled: true,
			target: None,
			pan: None,
			width,
			height,
		}
	}

	fn default_transform(width: f64, height: f64) -> ViewTransform {
		ViewTransform {
			x: width / 2.0,
			y: height / 2.0,
			k: DEFAULT_ZOOM,
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn viewport(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(
			wx * self.transform.k + self.transform.x,
			wy * self.transform.k + self.transform.y,
		)
	}

	/// Aim the camera at the occupied region.
	///
	/// No finite nodes: reset to the default centered view. A degenerate
	/// (point) box: center on it at the default zoom. Otherwise fit the
	/// padded box inside the viewport, clamped to the zoom limits.
	pub fn auto_frame(&mut self, bbox: Option<BoundingBox>) {
		let target = match bbox {
			None => Self::default_transform(self.width, self.height),
			Some(bbox) => {
				let (cx, cy) = bbox.center();
				let k = if bbox.width() <= f64::EPSILON && bbox.height() <= f64::EPSILON {
					DEFAULT_ZOOM
				} else {
					let fit_x = self.width / (bbox.width() * FRAME_PADDING).max(f64::EPSILON);
					let fit_y = self.height / (bbox.height() * FRAME_PADDING).max(f64::EPSILON);
					fit_x.min(fit_y).clamp(MIN_ZOOM, MAX_ZOOM)
				};
				ViewTransform {
					x: self.width / 2.0 - cx * k,
					y: self.height / 2.0 - cy * k,
					k,
				}
			}
		};
		self.target = Some(target);
	}

	/// Advance the framing animation by one frame.
	pub fn tick(&mut self) {
		let Some(target) = self.target else {
			return;
		};
		self.transform.x += (target.x - self.transform.x) * APPROACH;
		self.transform.y += (target.y - self.transform.y) * APPROACH;
		self.transform.k += (target.k - self.transform.k) * APPROACH;

		let close = (target.x - self.transform.x).abs() < SNAP_DISTANCE
			&& (target.y - self.transform.y).abs() < SNAP_DISTANCE
			&& (target.k - self.transform.k).abs() < SNAP_ZOOM;
		if close {
			self.transform = target;
			self.target = None;
		}
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		if !self.interaction_enabled {
			return;
		}
		self.target = None;
		self.pan = Some(PanOrigin {
			start_x: sx,
			start_y: sy,
			transform_x: self.transform.x,
			transform_y: self.transform.y,
		});
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) -> bool {
		let Some(origin) = self.pan else {
			return false;
		};
		self.transform.x = origin.transform_x + (sx - origin.start_x);
		self.transform.y = origin.transform_y + (sy - origin.start_y);
		true
	}

	pub fn end_pan(&mut self) {
		self.pan = None;
	}

	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}

	/// Wheel zoom anchored on the pointer position.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		if !self.interaction_enabled {
			return;
		}
		self.target = None;
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn settled(camera: &mut Camera) {
		for _ in 0..500 {
			camera.tick();
		}
	}

	#[test]
	fn empty_bbox_resets_to_default_view() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.transform = ViewTransform { x: -900.0, y: 42.0, k: 4.0 };

		camera.auto_frame(None);
		settled(&mut camera);

		assert_eq!(camera.transform, ViewTransform { x: 400.0, y: 300.0, k: 1.0 });
	}

	#[test]
	fn point_bbox_frames_at_default_zoom() {
		let mut camera = Camera::new(800.0, 600.0);
		let bbox = BoundingBox {
			min_x: 50.0,
			min_y: -20.0,
			max_x: 50.0,
			max_y: -20.0,
		};

		camera.auto_frame(Some(bbox));
		settled(&mut camera);

		assert_eq!(camera.transform.k, 1.0);
		let (sx, sy) = camera.world_to_screen(50.0, -20.0);
		assert!((sx - 400.0).abs() < 1.0 && (sy - 300.0).abs() < 1.0);
	}

	#[test]
	fn framing_fits_and_centers_the_box() {
		let mut camera = Camera::new(800.0, 600.0);
		let bbox = BoundingBox {
			min_x: -100.0,
			min_y: -100.0,
			max_x: 100.0,
			max_y: 100.0,
		};

		camera.auto_frame(Some(bbox));
		settled(&mut camera);

		// Box center lands on the viewport center.
		let (sx, sy) = camera.world_to_screen(0.0, 0.0);
		assert!((sx - 400.0).abs() < 1.0 && (sy - 300.0).abs() < 1.0);
		// Padded box fits: 600 / (200 * 1.2) = 2.5.
		assert!((camera.transform.k - 2.5).abs() < 0.01);
	}

	#[test]
	fn framing_respects_zoom_limits() {
		let mut camera = Camera::new(800.0, 600.0);
		let tiny = BoundingBox {
			min_x: 0.0,
			min_y: 0.0,
			max_x: 0.001,
			max_y: 0.001,
		};

		camera.auto_frame(Some(tiny));
		settled(&mut camera);

		assert!(camera.transform.k <= MAX_ZOOM);
	}

	#[test]
	fn screen_world_round_trip() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.transform = ViewTransform { x: 120.0, y: -40.0, k: 2.5 };

		let (wx, wy) = camera.screen_to_world(300.0, 200.0);
		let (sx, sy) = camera.world_to_screen(wx, wy);
		assert!((sx - 300.0).abs() < 1e-9 && (sy - 200.0).abs() < 1e-9);
	}

	#[test]
	fn pan_is_gated_by_interaction_enabled() {
		let mut camera = Camera::new(800.0, 600.0);
		camera.interaction_enabled = false;
		camera.begin_pan(10.0, 10.0);
		assert!(!camera.is_panning());

		camera.interaction_enabled = true;
		camera.begin_pan(10.0, 10.0);
		assert!(camera.pan_to(30.0, 25.0));
		assert_eq!(camera.transform.x, 420.0);
		assert_eq!(camera.transform.y, 315.0);
		camera.end_pan();
		assert!(!camera.is_panning());
	}

	#[test]
	fn wheel_zoom_clamps_and_anchors() {
		let mut camera = Camera::new(800.0, 600.0);
		for _ in 0..200 {
			camera.zoom_at(400.0, 300.0, -1.0);
		}
		assert!(camera.transform.k <= MAX_ZOOM);

		for _ in 0..400 {
			camera.zoom_at(400.0, 300.0, 1.0);
		}
		assert!(camera.transform.k >= MIN_ZOOM);
	}
}
