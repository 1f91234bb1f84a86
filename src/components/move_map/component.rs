use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use log::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	AddEventListenerOptions, Element, Event, KeyboardEvent, MouseEvent, ResizeObserver, Touch,
	TouchEvent, TouchList, Window,
};

use super::api::{ApiClient, StoreRequest};
use super::config::MoveMapConfig;
use super::gesture::{
	TimerToken, TouchTracker, form_control_selector, is_primary_button, toggles_mode,
};
use super::lines::LineId;
use super::mode::ModeEvent;
use super::overlay::{self, LongPressOverlay, RING_RADIUS};
use super::state::{Command, MoveMapState, PointerDown};
use super::types::{MoveId, MoveMapData, Point, Size};

/// Browser half of the move map: real timers, requests and the canvas element.
#[derive(Clone)]
struct Shell {
	state: RwSignal<MoveMapState>,
	delete_mode: Signal<bool>,
	canvas: NodeRef<leptos::html::Div>,
	timers: Rc<RefCell<HashMap<TimerToken, Timeout>>>,
	touch: Rc<Cell<TouchTracker>>,
	api: Rc<ApiClient>,
}

impl Shell {
	fn run(&self, commands: Vec<Command>) {
		for command in commands {
			match command {
				Command::ScheduleTimer { token, delay_ms } => {
					let shell = self.clone();
					let timeout = Timeout::new(delay_ms, move || {
						shell.timers.borrow_mut().remove(&token);
						let commands = shell
							.state
							.try_update(|s| s.timer_fired(token))
							.unwrap_or_default();
						shell.run(commands);
					});
					self.timers.borrow_mut().insert(token, timeout);
				}
				Command::CancelTimer(token) => {
					// Dropping a Timeout clears it.
					self.timers.borrow_mut().remove(&token);
				}
				Command::Send(request) => self.send(request),
				Command::Navigate(url) => navigate(&url),
			}
		}
	}

	fn send(&self, request: StoreRequest) {
		let shell = self.clone();
		wasm_bindgen_futures::spawn_local(async move {
			let result = shell.api.send(&request).await;
			shell
				.state
				.try_update(|s| s.request_finished(&request, result));
		});
	}

	fn canvas_point(&self, client_x: f64, client_y: f64) -> Option<Point> {
		let canvas = self.canvas.try_get_untracked().flatten()?;
		let rect = canvas.get_bounding_client_rect();
		Some(Point::new(client_x - rect.left(), client_y - rect.top()))
	}

	fn is_dragging(&self) -> bool {
		self.state
			.try_with_untracked(|s| s.is_dragging())
			.unwrap_or(false)
	}

	fn press(&self, id: MoveId, ev: &Event, client_x: f64, client_y: f64) {
		let Some(at) = self.canvas_point(client_x, client_y) else {
			return;
		};
		let press = PointerDown {
			at,
			on_form_control: targets_form_control(ev),
			delete_mode: self.delete_mode.try_get_untracked().unwrap_or(false),
		};
		let reaction = self
			.state
			.try_update(|s| s.pointer_down(id, press))
			.unwrap_or_default();
		if reaction.consumed {
			ev.prevent_default();
		}
		self.run(reaction.commands);
	}

	fn drag(&self, ev: &Event, client_x: f64, client_y: f64) {
		if !self.is_dragging() {
			return;
		}
		let Some(at) = self.canvas_point(client_x, client_y) else {
			return;
		};
		ev.prevent_default();
		let commands = self
			.state
			.try_update(|s| s.pointer_move(at))
			.unwrap_or_default();
		self.run(commands);
	}

	fn release(&self) {
		if !self.is_dragging() {
			return;
		}
		let commands = self.state.try_update(|s| s.pointer_up()).unwrap_or_default();
		self.run(commands);
	}

	fn toggle_mode(&self) {
		match self.state.try_update(|s| s.toggle_connect_mode()) {
			Some(ModeEvent::EnteredConnect) => info!("Connect mode on"),
			Some(ModeEvent::EnteredDrag) => info!("Connect mode off"),
			None => {}
		}
	}

	/// Starts following a touch press. False if another finger is already down.
	fn track_touch(&self, touching: u32, identifier: i32) -> bool {
		let mut touch = self.touch.get();
		let accepted = touch.start(touching, identifier);
		self.touch.set(touch);
		accepted
	}

	/// The tracked finger, if it is among `list`.
	fn tracked_touch(&self, list: &TouchList) -> Option<Touch> {
		let tracked = self.touch.get().tracked()?;
		touches(list).find(|touch| touch.identifier() == tracked)
	}

	fn lift_touches(&self, lifted: &TouchList) {
		let mut touch = self.touch.get();
		let ended = touch.lift(touches(lifted).map(|t| t.identifier()));
		self.touch.set(touch);
		if ended {
			self.release();
		}
	}

	fn line_clicked(&self, id: LineId) {
		let confirmed = web_sys::window()
			.and_then(|w| w.confirm_with_message("Delete this connection?").ok())
			.unwrap_or(false);
		let commands = self
			.state
			.try_update(|s| s.line_clicked(id, confirmed))
			.unwrap_or_default();
		self.run(commands);
	}
}

fn targets_form_control(ev: &Event) -> bool {
	ev.target()
		.and_then(|target| target.dyn_into::<Element>().ok())
		.and_then(|el| el.closest(&form_control_selector()).ok().flatten())
		.is_some()
}

fn touches(list: &TouchList) -> impl Iterator<Item = Touch> + '_ {
	(0..list.length()).filter_map(|i| list.get(i))
}

fn navigate(url: &str) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Err(err) = window.location().set_href(url) {
		error!("Navigation to {} failed: {:?}", url, err);
	}
}

/// Pointer and keyboard listeners on `window`, shared by every move.
/// Removed again when dropped.
struct WindowListeners {
	window: Window,
	installed: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl WindowListeners {
	fn install(shell: &Shell) -> Result<Self, JsValue> {
		let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
		let mut listeners = Self {
			window,
			installed: Vec::new(),
		};

		let sh = shell.clone();
		listeners.add("mousemove", move |ev: Event| {
			if let Some(mouse) = ev.dyn_ref::<MouseEvent>() {
				sh.drag(&ev, mouse.client_x() as f64, mouse.client_y() as f64);
			}
		})?;

		let sh = shell.clone();
		listeners.add("touchmove", move |ev: Event| {
			let Some(touch) = ev
				.dyn_ref::<TouchEvent>()
				.and_then(|touch_ev| sh.tracked_touch(&touch_ev.touches()))
			else {
				return;
			};
			sh.drag(&ev, touch.client_x() as f64, touch.client_y() as f64);
		})?;

		let sh = shell.clone();
		listeners.add("mouseup", move |_: Event| sh.release())?;

		for name in ["touchend", "touchcancel"] {
			let sh = shell.clone();
			listeners.add(name, move |ev: Event| {
				if let Some(touch_ev) = ev.dyn_ref::<TouchEvent>() {
					sh.lift_touches(&touch_ev.changed_touches());
				}
			})?;
		}

		let sh = shell.clone();
		listeners.add("keydown", move |ev: Event| {
			let Some(key) = ev.dyn_ref::<KeyboardEvent>() else {
				return;
			};
			let modified = key.ctrl_key() || key.meta_key() || key.alt_key();
			if toggles_mode(&key.key(), modified, targets_form_control(&ev)) {
				sh.toggle_mode();
			}
		})?;

		Ok(listeners)
	}

	fn add(&mut self, name: &'static str, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
		let cb = Closure::<dyn FnMut(Event)>::new(handler);
		let opts = AddEventListenerOptions::new();
		opts.set_passive(false);
		self.window
			.add_event_listener_with_callback_and_add_event_listener_options(
				name,
				cb.as_ref().unchecked_ref(),
				&opts,
			)?;
		self.installed.push((name, cb));
		Ok(())
	}
}

impl Drop for WindowListeners {
	fn drop(&mut self) {
		for (name, cb) in &self.installed {
			let _ = self
				.window
				.remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
		}
	}
}

#[component]
pub fn MoveMapCanvas(
	#[prop(into)] data: Signal<MoveMapData>,
	/// External flag turning a completed long-press into a delete.
	#[prop(into)]
	delete_mode: Signal<bool>,
	#[prop(optional)] config: MoveMapConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Div>::new();
	let state = RwSignal::new(MoveMapState::new(
		&data.get_untracked(),
		config.interaction.clone(),
	));
	let shell = Shell {
		state,
		delete_mode,
		canvas: canvas_ref,
		timers: Rc::new(RefCell::new(HashMap::new())),
		touch: Rc::new(Cell::new(TouchTracker::default())),
		api: Rc::new(ApiClient::new(config.api.base_url.clone())),
	};

	let listeners = match WindowListeners::install(&shell) {
		Ok(listeners) => Some(listeners),
		Err(err) => {
			error!("Could not attach pointer listeners: {:?}", err);
			None
		}
	};
	// Lives as long as the component; dropping it detaches the listeners.
	let _listeners = StoredValue::new_local(listeners);
	let shell = StoredValue::new_local(shell);

	let connect_mode = move || state.with(|s| s.mode.connect_mode());

	view! {
		<div class="move-map">
			<div class="move-map-toolbar">
				<span id="mode-indicator" class:active=connect_mode>
					{move || state.with(|s| s.mode.indicator_label())}
				</span>
				<button
					class="mode-toggle"
					on:click=move |_| shell.get_value().toggle_mode()
				>
					"Toggle Connect (C)"
				</button>
			</div>

			{move || {
				state
					.with(|s| s.notice().map(str::to_owned))
					.map(|text| {
						view! {
							<div
								class="move-map-notice"
								title="Dismiss"
								on:click=move |_| state.update(|s| s.dismiss_notice())
							>
								{text}
							</div>
						}
					})
			}}

			<div node_ref=canvas_ref id="canvas" class="move-canvas" class:connecting=connect_mode>
				<svg id="lines-layer" class="lines-layer">
					<For
						each=move || state.with(|s| s.line_ids())
						key=|id| *id
						children=move |id| line_view(id, state, shell)
					/>
				</svg>
				<For
					each=move || state.with(|s| s.node_ids())
					key=|id| *id
					children=move |id| move_view(id, state, shell)
				/>
				{move || state.with(|s| s.overlay().cloned()).map(overlay_view)}
			</div>
		</div>
	}
}

fn line_view(
	id: LineId,
	state: RwSignal<MoveMapState>,
	shell: StoredValue<Shell, LocalStorage>,
) -> impl IntoView {
	let geometry = move || {
		state
			.with(|s| s.line(id).map(|line| line.geometry))
			.unwrap_or_default()
	};
	view! {
		<line
			class="connection-line"
			x1=move || geometry().x1.to_string()
			y1=move || geometry().y1.to_string()
			x2=move || geometry().x2.to_string()
			y2=move || geometry().y2.to_string()
			on:click=move |ev: MouseEvent| {
				ev.stop_propagation();
				shell.get_value().line_clicked(id);
			}
		/>
	}
}

fn move_view(
	id: MoveId,
	state: RwSignal<MoveMapState>,
	shell: StoredValue<Shell, LocalStorage>,
) -> impl IntoView {
	let node_ref = NodeRef::<leptos::html::Div>::new();
	let name = state
		.with_untracked(|s| s.node(id).map(|node| node.name.clone()))
		.unwrap_or_default();

	let size_watch = StoredValue::new_local(None::<SizeWatch>);
	Effect::new(move |_| {
		let Some(el) = node_ref.get() else {
			return;
		};
		match SizeWatch::observe(el.into(), id, state) {
			Ok(watch) => size_watch.set_value(Some(watch)),
			Err(err) => warn!("Could not watch the size of move {}: {:?}", id, err),
		}
	});

	let position = move || state.with(|s| s.node(id).map(|node| node.position)).unwrap_or_default();

	let on_mousedown = move |ev: MouseEvent| {
		if !is_primary_button(ev.button()) {
			return;
		}
		shell
			.get_value()
			.press(id, &ev, ev.client_x() as f64, ev.client_y() as f64);
	};
	let on_touchstart = move |ev: TouchEvent| {
		let Some(touch) = ev.changed_touches().get(0) else {
			return;
		};
		let shell = shell.get_value();
		if shell.track_touch(ev.touches().length(), touch.identifier()) {
			shell.press(id, &ev, touch.client_x() as f64, touch.client_y() as f64);
		}
	};

	view! {
		<div
			node_ref=node_ref
			class="move"
			data-id=id.to_string()
			class:connecting=move || state.with(|s| s.mode.is_connecting(id))
			class:dragging=move || state.with(|s| s.is_dragged(id))
			class:holding=move || state.with(|s| s.is_holding(id))
			style:left=move || format!("{}px", position().x)
			style:top=move || format!("{}px", position().y)
			on:mousedown=on_mousedown
			on:touchstart=on_touchstart
		>
			<span class="move-name">{name}</span>
		</div>
	}
}

/// Keeps a move's recorded size in step with its rendered box, which changes
/// when fonts load or the name wraps. Disconnects when dropped.
struct SizeWatch {
	observer: ResizeObserver,
	_callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl SizeWatch {
	fn observe(el: Element, id: MoveId, state: RwSignal<MoveMapState>) -> Result<Self, JsValue> {
		let target = el.clone();
		let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |_entries: js_sys::Array| {
			let rect = target.get_bounding_client_rect();
			let size = Size::new(rect.width(), rect.height());
			let changed = state
				.try_with_untracked(|s| s.node(id).is_some_and(|node| node.size != size))
				.unwrap_or(false);
			if changed {
				debug!("Move {} measured at {}x{}", id, size.width, size.height);
				state.try_update(|s| s.set_node_size(id, size));
			}
		});
		let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
		observer.observe(&el);
		Ok(Self {
			observer,
			_callback: callback,
		})
	}
}

impl Drop for SizeWatch {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

fn overlay_view(overlay: LongPressOverlay) -> impl IntoView {
	if let Some(document) = web_sys::window().and_then(|w| w.document()) {
		if let Err(err) = overlay::ensure_style(&document) {
			warn!("Could not register long-press style: {:?}", err);
		}
	}

	let color = overlay.intent.color();
	let box_size = RING_RADIUS * 2.0;
	let label_style = format!(
		"left: {}px; top: {}px; color: {};",
		overlay.label_at.x, overlay.label_at.y, color
	);
	let ring_style = format!(
		"left: {}px; top: {}px; --ring-length: {}; animation-duration: {}ms;",
		overlay.ring_center.x - RING_RADIUS,
		overlay.ring_center.y - RING_RADIUS,
		overlay::ring_length(),
		overlay.duration_ms
	);
	let circle_style = format!("animation-duration: {}ms;", overlay.duration_ms);

	view! {
		<div class="long-press-label" style=label_style>
			{overlay.intent.label()}
		</div>
		<svg
			class="long-press-ring"
			style=ring_style
			width=box_size.to_string()
			height=box_size.to_string()
		>
			<circle
				cx=RING_RADIUS.to_string()
				cy=RING_RADIUS.to_string()
				r=RING_RADIUS.to_string()
				stroke=color
				style=circle_style
			/>
		</svg>
	}
}
