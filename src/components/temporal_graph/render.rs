use std::collections::HashSet;
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::highlight::{self, EdgeEmphasis, NodeEmphasis};
use super::state::ViewState;
use super::types::TimeWindow;

const BACKGROUND: &str = "#1a1a2e";
const ACTIVE_EDGE: &str = "#ffd166";
const SELECTION_RING: &str = "#ffd166";

/// Zoom ratio above which idle nodes get labels; emphasized nodes are always
/// labeled.
const LABEL_MIN_ZOOM: f64 = 1.5;

/// Paint one frame from the current view state. All style decisions come
/// from the highlight reducer; this module only draws.
pub fn render(state: &ViewState, ctx: &CanvasRenderingContext2d) {
	let (width, height) = state.camera.viewport();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);

	ctx.save();
	let transform = state.camera.transform;
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	let set = highlight::highlight_set(&state.model, &state.interaction);
	let window = state
		.windows
		.window()
		.unwrap_or(TimeWindow { start: 0, end: 1 });
	draw_edges(state, ctx, &set, &window);
	draw_nodes(state, ctx, &set);
	ctx.restore();
}

fn draw_edges(
	state: &ViewState,
	ctx: &CanvasRenderingContext2d,
	set: &HashSet<usize>,
	window: &TimeWindow,
) {
	let k = state.camera.transform.k;
	let arrow_size = 8.0 / k;

	for edge in state.model.edges() {
		let emphasis = highlight::edge_emphasis(edge, &state.interaction, set, window);
		let (color, alpha, line_width) = match emphasis {
			EdgeEmphasis::Hidden => continue,
			EdgeEmphasis::Active => (ACTIVE_EDGE.to_string(), 0.95, 2.2 / k),
			EdgeEmphasis::Gradient(t) => (highlight::gradient_color(t), 0.6, 1.5 / k),
		};

		let source = &state.model.nodes()[edge.source_idx];
		let target = &state.model.nodes()[edge.target_idx];
		let (dx, dy) = (target.x - source.x, target.y - source.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&color);
		ctx.set_line_width(line_width);
		ctx.begin_path();
		ctx.move_to(source.x + ux * source.size, source.y + uy * source.size);
		ctx.line_to(
			target.x - ux * (target.size + arrow_size),
			target.y - uy * (target.size + arrow_size),
		);
		ctx.stroke();

		// Arrowhead at the target, outside its radius.
		ctx.set_fill_style_str(&color);
		let (tip_x, tip_y) = (target.x - ux * target.size, target.y - uy * target.size);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ViewState, ctx: &CanvasRenderingContext2d, set: &HashSet<usize>) {
	let k = state.camera.transform.k;

	for (idx, node) in state.model.nodes().iter().enumerate() {
		let emphasis = highlight::node_emphasis(idx, &state.interaction, set);
		let (alpha, radius, ring) = match emphasis {
			NodeEmphasis::Selected => (1.0, node.size * 1.25, Some((SELECTION_RING, 2.0 / k))),
			NodeEmphasis::Hovered => (1.0, node.size * 1.2, Some(("rgba(255, 255, 255, 0.8)", 1.5 / k))),
			NodeEmphasis::Neighbor => (1.0, node.size * 1.1, Some(("rgba(255, 255, 255, 0.35)", 1.0 / k))),
			NodeEmphasis::Normal => (1.0, node.size, None),
			NodeEmphasis::Dimmed => (0.25, node.size * 0.85, None),
		};

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.color);
		ctx.fill();

		if let Some((color, width)) = ring {
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius + width, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(color);
			ctx.set_line_width(width);
			ctx.stroke();
		}

		let labeled = !matches!(emphasis, NodeEmphasis::Dimmed)
			&& (!matches!(emphasis, NodeEmphasis::Normal) || k >= LABEL_MIN_ZOOM);
		if labeled {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
			ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
			let _ = ctx.fill_text(&node.label, node.x + radius + 3.0, node.y + 3.0);
		}
		ctx.set_global_alpha(1.0);
	}
}
