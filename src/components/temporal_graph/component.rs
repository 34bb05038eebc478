use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::client::{DEFAULT_ENDPOINT, SubgraphClient};
use super::layout::{self, LayoutOptions};
use super::render;
use super::state::ViewState;
use super::types::ViewStatus;
use super::window::{Bound, COMMIT_DEBOUNCE_MS, FetchRequest};

type SharedState = Rc<RefCell<Option<ViewState>>>;

/// Everything a fetch pipeline or control handler needs, cloned into each
/// closure once during setup.
#[derive(Clone)]
struct Pipeline {
	state: SharedState,
	client: Rc<SubgraphClient>,
	status: RwSignal<ViewStatus>,
	warning: RwSignal<Option<String>>,
	bounds: RwSignal<Option<(i64, i64)>>,
	window_values: RwSignal<Option<(i64, i64)>>,
}

fn sync_window_signals(state: &ViewState, pipeline: &Pipeline) {
	pipeline
		.bounds
		.set(state.windows.bounds().map(|b| (b.min, b.max)));
	pipeline
		.window_values
		.set(state.windows.window().map(|w| (w.start, w.end)));
}

/// One fetch pipeline: loading indicator, fetch, merge, a one-tick yield so
/// the indicator paints, full layout, finiteness check, auto-frame on the
/// first load. Loops while coalesced commits arrived mid-flight.
fn run_pipeline(pipeline: Pipeline, request: FetchRequest) {
	spawn_local(async move {
		let mut request = request;
		loop {
			pipeline.status.set(ViewStatus::Loading);
			pipeline.warning.set(None);

			match pipeline.client.fetch(request.start, request.end).await {
				Err(err) => {
					warn!("subgraph fetch failed: {err}");
					if let Some(state) = pipeline.state.borrow_mut().as_mut() {
						// The window labels no longer match the data; stale
						// content is worse than an empty canvas. The next
						// successful load frames like a first load.
						state.apply_subgraph(&[], &[]);
						state.framed = false;
					}
					pipeline.status.set(ViewStatus::Failed(err.to_string()));
				}
				Ok(subgraph) => {
					{
						let mut guard = pipeline.state.borrow_mut();
						let Some(state) = guard.as_mut() else { return };
						let substituted = state.windows.apply_bounds(
							subgraph.min_timestamp,
							subgraph.max_timestamp,
							js_sys::Date::now() as i64,
						);
						if substituted {
							pipeline.warning.set(Some(
								"service reported unusable time bounds; showing the last seven days"
									.to_string(),
							));
						}
						state.apply_subgraph(&subgraph.nodes, &subgraph.edges);
						sync_window_signals(state, &pipeline);
						info!(
							"merged subgraph: {} nodes, {} edges",
							state.model.node_count(),
							state.model.edge_count()
						);
					}

					// Yield once so the loading indicator can paint before
					// the layout loop blocks this tick.
					TimeoutFuture::new(0).await;

					{
						let mut guard = pipeline.state.borrow_mut();
						let Some(state) = guard.as_mut() else { return };
						let options = LayoutOptions::full(state.model.node_count());
						let report = layout::relax(&mut state.model, &options, None);
						state.layout_degenerate = report.degenerate;
						if report.degenerate {
							pipeline.warning.set(Some(
								"layout produced unstable coordinates; view framing skipped"
									.to_string(),
							));
						} else if !state.framed {
							let bbox = state.model.bounding_box();
							state.camera.auto_frame(bbox);
							state.framed = true;
						}
						pipeline.status.set(ViewStatus::Ready);
					}
				}
			}

			let follow_up = pipeline
				.state
				.borrow_mut()
				.as_mut()
				.and_then(|state| state.windows.fetch_finished());
			match follow_up {
				Some(next) => request = next,
				None => break,
			}
		}
	});
}

/// Raw input from one range control: clamp, update labels, arm the debounce
/// timer. The fetch fires only if no newer input lands in the quiet period.
fn handle_bound_input(pipeline: Pipeline, bound: Bound, value: String) {
	let Ok(value) = value.parse::<i64>() else {
		return;
	};
	let token = {
		let mut guard = pipeline.state.borrow_mut();
		let Some(state) = guard.as_mut() else { return };
		let token = state.windows.set_bound(bound, value);
		sync_window_signals(state, &pipeline);
		token
	};
	spawn_local(async move {
		TimeoutFuture::new(COMMIT_DEBOUNCE_MS).await;
		let request = pipeline
			.state
			.borrow_mut()
			.as_mut()
			.and_then(|state| state.windows.debounce_elapsed(token));
		if let Some(request) = request {
			run_pipeline(pipeline, request);
		}
	});
}

/// A discrete "change committed" event (pointer release on the control):
/// commit immediately instead of waiting out the quiet period.
fn handle_bound_commit(pipeline: Pipeline) {
	let request = pipeline
		.state
		.borrow_mut()
		.as_mut()
		.and_then(|state| state.windows.commit());
	if let Some(request) = request {
		run_pipeline(pipeline, request);
	}
}

fn settle_after_drag(state: &mut ViewState, idx: usize, warning: RwSignal<Option<String>>) {
	let options = LayoutOptions::settle(state.model.node_count());
	let report = layout::relax(&mut state.model, &options, Some(idx));
	state.layout_degenerate = report.degenerate;
	if report.degenerate {
		warning.set(Some(
			"layout produced unstable coordinates after drag".to_string(),
		));
	}
}

fn format_timestamp(ms: i64) -> String {
	chrono::DateTime::from_timestamp_millis(ms)
		.map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
		.unwrap_or_else(|| ms.to_string())
}

#[component]
pub fn TemporalGraphCanvas(
	#[prop(optional)] endpoint: Option<String>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let status = RwSignal::new(ViewStatus::Loading);
	let warning = RwSignal::new(None::<String>);
	let bounds = RwSignal::new(None::<(i64, i64)>);
	let window_values = RwSignal::new(None::<(i64, i64)>);
	let fatal = RwSignal::new(false);

	// reqwest needs an absolute URL, so the default endpoint is joined with
	// the page origin.
	let endpoint = endpoint.unwrap_or_else(|| {
		web_sys::window()
			.and_then(|w| w.location().origin().ok())
			.map(|origin| format!("{origin}{DEFAULT_ENDPOINT}"))
			.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
	});
	let client = Rc::new(SubgraphClient::new(endpoint));
	let pipeline = Pipeline {
		state: state.clone(),
		client,
		status,
		warning,
		bounds,
		window_values,
	};

	let (state_init, animate_init, resize_cb_init, pipeline_init) = (
		state.clone(),
		animate.clone(),
		resize_cb.clone(),
		pipeline.clone(),
	);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		// Without a 2D context nothing can be drawn; the view is dead and
		// the controls stay disabled.
		let context: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
		{
			Some(context) => context,
			None => {
				fatal.set(true);
				status.set(ViewStatus::Failed(
					"canvas 2D context unavailable".to_string(),
				));
				return;
			}
		};

		*state_init.borrow_mut() = Some(ViewState::new(w, h));

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.camera.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.camera.tick();
				render::render(s, &context);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}

		// Bootstrap: fetch the entire dataset once to learn the overall
		// bounds and seed the window.
		let request = state_init
			.borrow_mut()
			.as_mut()
			.map(|s| s.windows.begin_bootstrap());
		if let Some(request) = request {
			run_pipeline(pipeline_init.clone(), request);
		}
	});

	let pointer_position = move |ev: &MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y, ev.shift_key());
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_mu.borrow_mut()
			&& let Some(idx) = s.pointer_up(x, y)
		{
			settle_after_drag(s, idx, warning);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut()
			&& let Some(idx) = s.pointer_leave()
		{
			settle_after_drag(s, idx, warning);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.camera.zoom_at(x, y, ev.delta_y());
		}
	};

	let state_rc = state.clone();
	let on_recenter = move |_| {
		if let Some(ref mut s) = *state_rc.borrow_mut() {
			let bbox = s.model.bounding_box();
			s.camera.auto_frame(bbox);
		}
	};

	let (pipeline_si, pipeline_sc, pipeline_ei, pipeline_ec) = (
		pipeline.clone(),
		pipeline.clone(),
		pipeline.clone(),
		pipeline.clone(),
	);
	let controls_disabled = move || fatal.get() || bounds.get().is_none();

	view! {
		<div class="temporal-graph">
			<canvas
				node_ref=canvas_ref
				class="temporal-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="temporal-graph-hud">
				{move || {
					(status.get() == ViewStatus::Loading)
						.then(|| view! { <p class="status-loading">"Loading graph…"</p> })
				}}
				{move || match status.get() {
					ViewStatus::Failed(message) => {
						Some(view! { <p class="status-error">{message}</p> })
					}
					_ => None,
				}}
				{move || warning.get().map(|message| view! { <p class="status-warning">{message}</p> })}
			</div>
			<div class="window-controls">
				<span class="window-label">
					{move || {
						window_values
							.get()
							.map(|w| format_timestamp(w.0))
							.unwrap_or_default()
					}}
				</span>
				<input
					type="range"
					class="window-slider"
					min=move || bounds.get().map(|b| b.0.to_string()).unwrap_or_else(|| "0".into())
					max=move || bounds.get().map(|b| b.1.to_string()).unwrap_or_else(|| "0".into())
					prop:value=move || {
						window_values.get().map(|w| w.0.to_string()).unwrap_or_else(|| "0".into())
					}
					disabled=controls_disabled
					on:input=move |ev| {
						handle_bound_input(pipeline_si.clone(), Bound::Start, event_target_value(&ev))
					}
					on:change=move |_| handle_bound_commit(pipeline_sc.clone())
				/>
				<input
					type="range"
					class="window-slider"
					min=move || bounds.get().map(|b| b.0.to_string()).unwrap_or_else(|| "0".into())
					max=move || bounds.get().map(|b| b.1.to_string()).unwrap_or_else(|| "0".into())
					prop:value=move || {
						window_values.get().map(|w| w.1.to_string()).unwrap_or_else(|| "0".into())
					}
					disabled=controls_disabled
					on:input=move |ev| {
						handle_bound_input(pipeline_ei.clone(), Bound::End, event_target_value(&ev))
					}
					on:change=move |_| handle_bound_commit(pipeline_ec.clone())
				/>
				<span class="window-label">
					{move || {
						window_values
							.get()
							.map(|w| format_timestamp(w.1))
							.unwrap_or_default()
					}}
				</span>
				<button class="recenter" on:click=on_recenter disabled=controls_disabled>
					"Re-center"
				</button>
			</div>
		</div>
	}
}
