use leptos::prelude::*;

use crate::components::temporal_graph::TemporalGraphCanvas;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<TemporalGraphCanvas fullscreen=true />
				<div class="graph-overlay">
					<h1>"Channel Repost Graph"</h1>
					<p class="subtitle">
						"Narrow the time window with the sliders. Drag nodes to reposition, click to pin a highlight, scroll to zoom, drag the background to pan."
					</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}
