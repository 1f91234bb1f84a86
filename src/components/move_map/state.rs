use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::api::StoreRequest;
use super::config::InteractionConfig;
use super::error::{ApiError, ConnectError};
use super::gesture::{GestureDispatcher, TimerOutcome, TimerRequest, TimerToken};
use super::lines::{Line, LineId, LineRenderer};
use super::mode::{ModeContext, ModeEvent, Selection};
use super::overlay::{LongPressIntent, LongPressOverlay};
use super::types::{DEFAULT_NODE_SIZE, MoveId, MoveMapData, MoveNode, Point, Size, Transition};

/// Work the browser side has to carry out after a state change.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	ScheduleTimer { token: TimerToken, delay_ms: u32 },
	CancelTimer(TimerToken),
	Send(StoreRequest),
	Navigate(String),
}

impl From<TimerRequest> for Command {
	fn from(request: TimerRequest) -> Self {
		match request {
			TimerRequest::Schedule { token, delay_ms } => Command::ScheduleTimer { token, delay_ms },
			TimerRequest::Cancel(token) => Command::CancelTimer(token),
		}
	}
}

fn timer_commands(timers: Vec<TimerRequest>) -> Vec<Command> {
	timers.into_iter().map(Command::from).collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerDown {
	/// Canvas-relative pointer position.
	pub at: Point,
	pub on_form_control: bool,
	/// Delete Mode as it reads when the press starts.
	pub delete_mode: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reaction {
	/// The press was handled here; the browser default should be suppressed.
	pub consumed: bool,
	pub commands: Vec<Command>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveMapState {
	nodes: BTreeMap<MoveId, MoveNode>,
	pub mode: ModeContext,
	lines: LineRenderer,
	gestures: GestureDispatcher,
	overlay: Option<LongPressOverlay>,
	notice: Option<String>,
	config: InteractionConfig,
}

impl MoveMapState {
	pub fn new(data: &MoveMapData, config: InteractionConfig) -> Self {
		let nodes = data
			.moves
			.iter()
			.map(|record| {
				let node = MoveNode {
					id: record.id,
					name: record.name.clone(),
					position: Point::new(record.x as f64, record.y as f64),
					size: DEFAULT_NODE_SIZE,
				};
				(node.id, node)
			})
			.collect();

		let mut lines = LineRenderer::default();
		for record in &data.transitions {
			let transition = Transition::new(record.from_move_id, record.to_move_id);
			if let Err(err) = lines.add_line(transition) {
				warn!("Skipping transition from page data: {}", err);
			}
		}

		let mut state = Self {
			nodes,
			mode: ModeContext::default(),
			lines,
			gestures: GestureDispatcher::default(),
			overlay: None,
			notice: None,
			config,
		};
		state.resync_lines();
		state
	}

	pub fn nodes(&self) -> impl Iterator<Item = &MoveNode> {
		self.nodes.values()
	}

	pub fn node(&self, id: MoveId) -> Option<&MoveNode> {
		self.nodes.get(&id)
	}

	pub fn node_ids(&self) -> Vec<MoveId> {
		self.nodes.keys().copied().collect()
	}

	pub fn lines(&self) -> &[Line] {
		self.lines.lines()
	}

	pub fn line(&self, id: LineId) -> Option<&Line> {
		self.lines.line(id)
	}

	pub fn line_ids(&self) -> Vec<LineId> {
		self.lines.lines().iter().map(|line| line.id).collect()
	}

	pub fn overlay(&self) -> Option<&LongPressOverlay> {
		self.overlay.as_ref()
	}

	pub fn notice(&self) -> Option<&str> {
		self.notice.as_deref()
	}

	pub fn dismiss_notice(&mut self) {
		self.notice = None;
	}

	pub fn is_dragging(&self) -> bool {
		self.gestures.is_active()
	}

	pub fn is_dragged(&self, id: MoveId) -> bool {
		self.gestures
			.active()
			.is_some_and(|gesture| gesture.owner() == id && gesture.moved())
	}

	/// The move is being held still with its long-press overlay showing.
	pub fn is_holding(&self, id: MoveId) -> bool {
		self.gestures
			.active()
			.is_some_and(|gesture| gesture.owner() == id && gesture.is_holding())
	}

	fn resync_lines(&mut self) {
		let nodes = &self.nodes;
		self.lines
			.resync_all(|id| nodes.get(&id).map(MoveNode::center));
	}

	fn name_of(&self, id: MoveId) -> String {
		self.nodes
			.get(&id)
			.map(|node| node.name.clone())
			.unwrap_or_else(|| format!("move {}", id))
	}

	/// Records the rendered size of a move.
	pub fn set_node_size(&mut self, id: MoveId, size: Size) {
		let Some(node) = self.nodes.get_mut(&id) else {
			return;
		};
		if node.size != size {
			node.size = size;
			self.resync_lines();
		}
	}

	pub fn toggle_connect_mode(&mut self) -> ModeEvent {
		self.mode.toggle()
	}

	pub fn pointer_down(&mut self, id: MoveId, press: PointerDown) -> Reaction {
		if press.on_form_control {
			return Reaction::default();
		}
		let Some(node) = self.nodes.get(&id) else {
			return Reaction::default();
		};

		if self.mode.connect_mode() {
			return Reaction {
				consumed: true,
				commands: self.select_for_connection(id),
			};
		}

		let intent = LongPressIntent::from_delete_mode(press.delete_mode);
		let timers = self.gestures.begin(
			id,
			node.position,
			press.at,
			intent,
			self.config.overlay_delay_ms,
		);
		self.overlay = None;
		debug!("Press started on move {}", id);
		Reaction {
			consumed: true,
			commands: timer_commands(timers),
		}
	}

	fn select_for_connection(&mut self, id: MoveId) -> Vec<Command> {
		match self.mode.select(id) {
			Selection::First(first) => {
				debug!("Move {} selected for connection", first);
				Vec::new()
			}
			Selection::SameMove => Vec::new(),
			Selection::Pair(transition) => {
				if self.lines.contains(transition) {
					let err = ConnectError::Duplicate(transition);
					info!("{}", err);
					self.notice = Some(format!(
						"{} already leads to {}",
						self.name_of(transition.from),
						self.name_of(transition.to)
					));
					return Vec::new();
				}
				info!("Creating transition {}", transition);
				vec![Command::Send(StoreRequest::CreateTransition {
					from_move_id: transition.from,
					to_move_id: transition.to,
				})]
			}
		}
	}

	pub fn pointer_move(&mut self, at: Point) -> Vec<Command> {
		let Some(update) = self.gestures.drag(at, self.config.move_threshold_px) else {
			return Vec::new();
		};
		if let Some(node) = self.nodes.get_mut(&update.owner) {
			node.position = update.position;
		}
		self.resync_lines();
		if update.crossed_threshold {
			debug!("Press on move {} became a drag", update.owner);
			self.overlay = None;
		}
		timer_commands(update.timers)
	}

	pub fn pointer_up(&mut self) -> Vec<Command> {
		let Some(release) = self.gestures.release() else {
			return Vec::new();
		};
		self.overlay = None;
		let mut commands = timer_commands(release.timers);

		let Some(node) = self.nodes.get_mut(&release.owner) else {
			return commands;
		};
		if release.moved {
			info!("Saving position of move {}", release.owner);
			commands.push(Command::Send(StoreRequest::SavePosition {
				id: release.owner,
				x: node.position.x.trunc() as i32,
				y: node.position.y.trunc() as i32,
			}));
		} else if node.position != release.origin {
			node.position = release.origin;
			self.resync_lines();
		}
		commands
	}

	pub fn timer_fired(&mut self, token: TimerToken) -> Vec<Command> {
		match self.gestures.timer_fired(token, self.config.long_press_ms) {
			TimerOutcome::Stale => Vec::new(),
			TimerOutcome::Armed {
				owner,
				intent,
				timers,
			} => {
				match self.nodes.get(&owner) {
					Some(node) => {
						self.overlay = Some(LongPressOverlay::over(
							node,
							intent,
							self.config.long_press_ms,
						))
					}
					None => return timer_commands(self.gestures.abandon()),
				}
				timer_commands(timers)
			}
			TimerOutcome::LongPress { owner, intent } => {
				self.overlay = None;
				let Some(node) = self.nodes.get(&owner) else {
					return Vec::new();
				};
				match intent {
					LongPressIntent::Delete => {
						info!("Deleting move {}", owner);
						vec![Command::Send(StoreRequest::DeleteMove { move_id: owner })]
					}
					LongPressIntent::Open => {
						info!("Opening profile of {}", node.name);
						vec![Command::Navigate(self.config.profile_url(&node.name))]
					}
				}
			}
		}
	}

	pub fn line_clicked(&mut self, id: LineId, confirmed: bool) -> Vec<Command> {
		self.lines
			.handle_line_click(id, confirmed)
			.map(Command::Send)
			.into_iter()
			.collect()
	}

	/// Applies the local change for a finished request. The change is made
	/// whether or not the request succeeded; failures only raise a notice.
	pub fn request_finished(&mut self, request: &StoreRequest, result: Result<(), ApiError>) {
		if let Err(err) = &result {
			warn!("{} failed: {}", request.path(), err);
		}

		match *request {
			StoreRequest::CreateTransition {
				from_move_id,
				to_move_id,
			} => {
				let transition = Transition::new(from_move_id, to_move_id);
				if !self.nodes.contains_key(&from_move_id) || !self.nodes.contains_key(&to_move_id) {
					debug!("Line {} not added: a move was deleted meanwhile", transition);
				} else {
					match self.lines.add_line(transition) {
						Ok(_) => self.resync_lines(),
						Err(err) => debug!("Line not added: {}", err),
					}
				}
				if let Err(err) = result {
					self.notice = Some(format!(
						"Could not save transition {} → {}: {}",
						self.name_of(from_move_id),
						self.name_of(to_move_id),
						err
					));
				}
			}
			StoreRequest::DeleteTransition {
				from_move_id,
				to_move_id,
			} => {
				self.lines
					.remove_transition(Transition::new(from_move_id, to_move_id));
				if let Err(err) = result {
					self.notice = Some(format!("Could not delete transition: {}", err));
				}
			}
			StoreRequest::SavePosition { id, .. } => {
				if let Err(err) = result {
					self.notice = Some(format!(
						"Could not save position of {}: {}",
						self.name_of(id),
						err
					));
				}
			}
			StoreRequest::DeleteMove { move_id } => {
				let name = self.name_of(move_id);
				self.nodes.remove(&move_id);
				self.mode.forget(move_id);
				let dropped = self.lines.remove_touching(move_id);
				debug!("Removed move {} and {} lines", move_id, dropped);
				if let Err(err) = result {
					self.notice = Some(format!("Could not delete {}: {}", name, err));
				}
			}
		}
	}
}
