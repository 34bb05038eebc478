use log::warn;

use super::types::{TimeBounds, TimeWindow};

/// Quiet period after the last raw slider input before a commit fires.
pub const COMMIT_DEBOUNCE_MS: u32 = 400;

/// Substitute window span when the service reports unusable bounds.
const DEFAULT_WINDOW_SPAN_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
	Start,
	End,
}

/// Identifies one burst of raw input. A token only commits if no newer input
/// arrived while its quiet period ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceToken(u64);

/// One subgraph request. Absent bounds mean "entire dataset".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchRequest {
	pub start: Option<i64>,
	pub end: Option<i64>,
}

/// Owns the two window bounds and turns raw slider input into at most one
/// in-flight fetch at a time.
///
/// A commit arriving while a fetch is in flight is not queued: it sets a
/// pending flag, and when the controller becomes idle again it fetches for
/// whatever the window values are at that moment.
#[derive(Debug, Default)]
pub struct TimeWindowController {
	window: Option<TimeWindow>,
	bounds: Option<TimeBounds>,
	epoch: u64,
	fetching: bool,
	pending: bool,
}

impl TimeWindowController {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn window(&self) -> Option<TimeWindow> {
		self.window
	}

	pub fn bounds(&self) -> Option<TimeBounds> {
		self.bounds
	}

	pub fn is_fetching(&self) -> bool {
		self.fetching
	}

	/// Raw input from either range control. Enforces `start <= end` by
	/// snapping the other bound when the moved one crosses it, and returns
	/// the debounce token for this burst. No fetch happens here.
	pub fn set_bound(&mut self, bound: Bound, mut value: i64) -> DebounceToken {
		if let Some(bounds) = self.bounds {
			value = value.clamp(bounds.min, bounds.max);
		}
		let window = self.window.get_or_insert(TimeWindow { start: value, end: value });
		match bound {
			Bound::Start => {
				window.start = value;
				if window.end < value {
					window.end = value;
				}
			}
			Bound::End => {
				window.end = value;
				if window.start > value {
					window.start = value;
				}
			}
		}
		self.epoch += 1;
		DebounceToken(self.epoch)
	}

	/// Called when a quiet period ends. Commits only if the token is still
	/// the newest input.
	pub fn debounce_elapsed(&mut self, token: DebounceToken) -> Option<FetchRequest> {
		if token.0 == self.epoch { self.commit() } else { None }
	}

	/// Commit the current window: start a fetch if idle, otherwise remember
	/// that one is wanted. Outstanding debounce tokens are invalidated so a
	/// quiet-period timer cannot re-commit what an explicit release already
	/// did.
	pub fn commit(&mut self) -> Option<FetchRequest> {
		self.epoch += 1;
		if self.fetching {
			self.pending = true;
			return None;
		}
		self.fetching = true;
		Some(self.request())
	}

	fn request(&self) -> FetchRequest {
		match self.window {
			Some(window) => FetchRequest {
				start: Some(window.start),
				end: Some(window.end),
			},
			None => FetchRequest { start: None, end: None },
		}
	}

	/// First load: fetch the entire dataset to learn the overall bounds.
	pub fn begin_bootstrap(&mut self) -> FetchRequest {
		self.fetching = true;
		FetchRequest { start: None, end: None }
	}

	/// A fetch pipeline finished (success or failure). Returns the follow-up
	/// request when a commit arrived mid-flight, built from the current
	/// window values.
	pub fn fetch_finished(&mut self) -> Option<FetchRequest> {
		self.fetching = false;
		if self.pending {
			self.pending = false;
			self.commit()
		} else {
			None
		}
	}

	/// Record the service-reported overall bounds, fixed once. An invalid or
	/// inverted range is replaced by the last seven days ending at `now`;
	/// returns true when that substitution happened.
	pub fn apply_bounds(&mut self, min: i64, max: i64, now: i64) -> bool {
		if self.bounds.is_some() {
			return false;
		}
		let substituted = min > max || max <= 0;
		let bounds = if substituted {
			warn!("service reported unusable time bounds [{min}, {max}], substituting defaults");
			TimeBounds {
				min: now - DEFAULT_WINDOW_SPAN_MS,
				max: now,
			}
		} else {
			TimeBounds { min, max }
		};
		self.bounds = Some(bounds);
		self.window = Some(TimeWindow {
			start: bounds.min,
			end: bounds.max,
		});
		substituted
	}
}
