//! Feedback shown while a long-press is pending: a label above the move and a
//! progress ring around its center.

use wasm_bindgen::JsValue;
use web_sys::Document;

use super::types::{MoveId, MoveNode, Point};

pub const STYLE_ELEMENT_ID: &str = "move-map-long-press-style";
pub const RING_RADIUS: f64 = 28.0;
const LABEL_GAP: f64 = 36.0;

const STYLE_CSS: &str = "
@keyframes move-map-hold {
	from { stroke-dashoffset: var(--ring-length); }
	to { stroke-dashoffset: 0; }
}
.long-press-label {
	position: absolute;
	transform: translateX(-50%);
	padding: 2px 8px;
	border-radius: 4px;
	background: rgba(26, 26, 46, 0.85);
	font-size: 12px;
	white-space: nowrap;
	pointer-events: none;
}
.long-press-ring {
	position: absolute;
	overflow: visible;
	pointer-events: none;
}
.long-press-ring circle {
	fill: none;
	stroke-width: 4;
	stroke-linecap: round;
	stroke-dasharray: var(--ring-length);
	animation-name: move-map-hold;
	animation-timing-function: linear;
	animation-fill-mode: forwards;
}
";

/// What a completed long-press does. Captured when the press starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LongPressIntent {
	Delete,
	Open,
}

impl LongPressIntent {
	pub fn from_delete_mode(delete_mode: bool) -> Self {
		if delete_mode {
			LongPressIntent::Delete
		} else {
			LongPressIntent::Open
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			LongPressIntent::Delete => "Hold to delete…",
			LongPressIntent::Open => "Hold to open…",
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			LongPressIntent::Delete => "#d62728",
			LongPressIntent::Open => "#1f77b4",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct LongPressOverlay {
	pub node: MoveId,
	pub intent: LongPressIntent,
	/// Horizontal center and top of the label.
	pub label_at: Point,
	pub ring_center: Point,
	/// How long the ring takes to fill.
	pub duration_ms: u32,
}

impl LongPressOverlay {
	pub fn over(node: &MoveNode, intent: LongPressIntent, duration_ms: u32) -> Self {
		let center = node.center();
		Self {
			node: node.id,
			intent,
			label_at: Point::new(center.x, node.position.y - LABEL_GAP),
			ring_center: center,
			duration_ms,
		}
	}
}

pub fn ring_length() -> f64 {
	2.0 * std::f64::consts::PI * RING_RADIUS
}

/// Inserts the shared overlay stylesheet into `<head>` unless it is already
/// there. Returns whether it was inserted.
pub fn ensure_style(document: &Document) -> Result<bool, JsValue> {
	if document.get_element_by_id(STYLE_ELEMENT_ID).is_some() {
		return Ok(false);
	}
	let head = document
		.head()
		.ok_or_else(|| JsValue::from_str("document has no <head>"))?;
	let style = document.create_element("style")?;
	style.set_id(STYLE_ELEMENT_ID);
	style.set_text_content(Some(STYLE_CSS));
	head.append_child(&style)?;
	Ok(true)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::move_map::types::Size;

	fn node() -> MoveNode {
		MoveNode {
			id: MoveId(2),
			name: "Omoplata".into(),
			position: Point::new(200.0, 100.0),
			size: Size::new(100.0, 40.0),
		}
	}

	#[test]
	fn overlay_sits_above_and_around_the_move() {
		let overlay = LongPressOverlay::over(&node(), LongPressIntent::Open, 1650);
		assert_eq!(overlay.ring_center, Point::new(250.0, 120.0));
		assert_eq!(overlay.label_at, Point::new(250.0, 64.0));
		assert_eq!(overlay.duration_ms, 1650);
	}

	#[test]
	fn label_and_color_follow_intent() {
		let delete = LongPressIntent::from_delete_mode(true);
		assert_eq!(delete, LongPressIntent::Delete);
		assert!(delete.label().contains("delete"));
		assert_ne!(delete.color(), LongPressIntent::Open.color());
		assert!(LongPressIntent::from_delete_mode(false).label().contains("open"));
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod web_tests {
	use wasm_bindgen_test::*;

	use super::*;

	wasm_bindgen_test_configure!(run_in_browser);

	#[wasm_bindgen_test]
	fn style_is_registered_once() {
		let document = web_sys::window().unwrap().document().unwrap();
		let first = ensure_style(&document).unwrap();
		let second = ensure_style(&document).unwrap();
		assert!(first || document.get_element_by_id(STYLE_ELEMENT_ID).is_some());
		assert!(!second);
		let count = document
			.query_selector_all(&format!("#{}", STYLE_ELEMENT_ID))
			.unwrap()
			.length();
		assert_eq!(count, 1);
	}
}
