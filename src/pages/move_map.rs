use leptos::prelude::*;
use log::{error, info};
use serde::Deserialize;

use crate::components::move_map::{MoveMapCanvas, MoveMapConfig, MoveMapData};

/// Id of the `<script type="application/json">` element the server renders
/// the map into.
const DATA_ELEMENT_ID: &str = "move-map-data";

#[derive(Clone, Debug, Default, Deserialize)]
struct Payload {
	#[serde(flatten)]
	data: MoveMapData,
	#[serde(default)]
	config: MoveMapConfig,
}

fn parse_payload(json: &str) -> Result<Payload, serde_json::Error> {
	serde_json::from_str(json)
}

/// Reads the embedded payload. A page without one renders an empty map.
fn load_payload() -> Payload {
	let text = web_sys::window()
		.and_then(|w| w.document())
		.and_then(|doc| doc.get_element_by_id(DATA_ELEMENT_ID))
		.and_then(|el| el.text_content());
	let Some(text) = text else {
		info!("No #{} element, starting with an empty map", DATA_ELEMENT_ID);
		return Payload::default();
	};
	parse_payload(&text).unwrap_or_else(|err| {
		error!("Could not parse move map data: {}", err);
		Payload::default()
	})
}

/// Move map page: the canvas plus the Delete Mode switch it reads.
#[component]
pub fn MoveMapPage() -> impl IntoView {
	let Payload { data, config } = load_payload();
	info!(
		"Loaded {} moves and {} transitions",
		data.moves.len(),
		data.transitions.len()
	);
	let graph_data = Signal::derive(move || data.clone());
	let delete_mode = RwSignal::new(false);

	view! {
		<div class="move-map-page">
			<header class="move-map-header">
				<h1>"Move Map"</h1>
				<button
					id="delete-mode-btn"
					class:active=move || delete_mode.get()
					on:click=move |_| delete_mode.update(|on| *on = !*on)
				>
					{move || if delete_mode.get() { "Delete Mode: ON" } else { "Delete Mode: OFF" }}
				</button>
			</header>
			<p class="subtitle">
				"Drag moves to reposition. Hold a move to open its profile, or to delete it in Delete Mode. Press C to connect moves."
			</p>
			<MoveMapCanvas data=graph_data delete_mode=delete_mode config=config />
		</div>
	}
}
