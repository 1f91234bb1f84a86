//! Press classification for moves in drag mode.
//!
//! A press starts a [`Gesture`] owned by the pressed move. Only one gesture is
//! live at a time, so a single [`GestureDispatcher`] receives every pointer
//! move/release and forwards it to that owner. Timers are represented by
//! [`TimerToken`]s: the dispatcher asks for them to be scheduled or cancelled
//! and only honours a firing token that still belongs to the live gesture.

use super::overlay::LongPressIntent;
use super::types::{MoveId, Point};

const FORM_CONTROL_TAGS: &[&str] = &["input", "textarea", "button", "select"];

/// CSS selector matching an embedded form control. Used with `closest`, so a
/// press on an element nested inside a control counts as a press on it.
pub fn form_control_selector() -> String {
	FORM_CONTROL_TAGS.join(", ")
}

/// Only the main button (usually left) starts a press.
pub fn is_primary_button(button: i16) -> bool {
	button == 0
}

/// Whether a keydown should flip between drag and connect mode.
pub fn toggles_mode(key: &str, modified: bool, on_form_control: bool) -> bool {
	!modified && !on_form_control && key.eq_ignore_ascii_case("c")
}

/// Follows the one finger that started a touch press.
///
/// Further fingers neither start a press nor end the tracked one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchTracker {
	tracked: Option<i32>,
}

impl TouchTracker {
	pub fn tracked(&self) -> Option<i32> {
		self.tracked
	}

	/// Records the first finger of a touchstart. Returns false, leaving the
	/// tracker alone, if other fingers are already down.
	pub fn start(&mut self, touching: u32, identifier: i32) -> bool {
		if touching != 1 {
			return false;
		}
		self.tracked = Some(identifier);
		true
	}

	/// Handles a touchend/touchcancel whose lifted fingers are `lifted`.
	/// Returns true when the tracked finger was among them.
	pub fn lift(&mut self, lifted: impl IntoIterator<Item = i32>) -> bool {
		let Some(tracked) = self.tracked else {
			return false;
		};
		if lifted.into_iter().any(|id| id == tracked) {
			self.tracked = None;
			return true;
		}
		false
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerRequest {
	Schedule { token: TimerToken, delay_ms: u32 },
	Cancel(TimerToken),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
	/// Following the pointer; the overlay timer may still be pending.
	Dragging,
	/// Overlay shown, long-press timer running.
	ArmedForLongPress,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gesture {
	owner: MoveId,
	phase: GesturePhase,
	intent: LongPressIntent,
	start: Point,
	origin: Point,
	grab_offset: Point,
	moved: bool,
	show_timer: Option<TimerToken>,
	long_press_timer: Option<TimerToken>,
}

impl Gesture {
	pub fn owner(&self) -> MoveId {
		self.owner
	}

	/// The overlay is up and the long-press timer is counting down.
	pub fn is_holding(&self) -> bool {
		self.phase == GesturePhase::ArmedForLongPress
	}

	pub fn moved(&self) -> bool {
		self.moved
	}

	fn clear_timers(&mut self) -> Vec<TimerRequest> {
		self.show_timer
			.take()
			.into_iter()
			.chain(self.long_press_timer.take())
			.map(TimerRequest::Cancel)
			.collect()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragUpdate {
	pub owner: MoveId,
	pub position: Point,
	/// Set on the one update where the press turned into a drag.
	pub crossed_threshold: bool,
	pub timers: Vec<TimerRequest>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Release {
	pub owner: MoveId,
	pub moved: bool,
	/// Where the move was when the press began.
	pub origin: Point,
	pub timers: Vec<TimerRequest>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimerOutcome {
	/// The token does not belong to a live gesture.
	Stale,
	/// The overlay should appear; the long-press timer was requested.
	Armed {
		owner: MoveId,
		intent: LongPressIntent,
		timers: Vec<TimerRequest>,
	},
	/// The press completed. The gesture is over.
	LongPress {
		owner: MoveId,
		intent: LongPressIntent,
	},
}

#[derive(Clone, Debug, Default, PartialEq)]
struct TimerTokens {
	next: u64,
}

impl TimerTokens {
	fn mint(&mut self) -> TimerToken {
		self.next += 1;
		TimerToken(self.next)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureDispatcher {
	active: Option<Gesture>,
	tokens: TimerTokens,
}

impl GestureDispatcher {
	pub fn active(&self) -> Option<&Gesture> {
		self.active.as_ref()
	}

	pub fn is_active(&self) -> bool {
		self.active.is_some()
	}

	/// Starts a gesture for `owner`, whose top-left corner is at `node_at`.
	/// A gesture that was still live is abandoned first.
	pub fn begin(
		&mut self,
		owner: MoveId,
		node_at: Point,
		pointer: Point,
		intent: LongPressIntent,
		overlay_delay_ms: u32,
	) -> Vec<TimerRequest> {
		let mut timers = self.abandon();
		let token = self.tokens.mint();
		timers.push(TimerRequest::Schedule {
			token,
			delay_ms: overlay_delay_ms,
		});
		self.active = Some(Gesture {
			owner,
			phase: GesturePhase::Dragging,
			intent,
			start: pointer,
			origin: node_at,
			grab_offset: pointer - node_at,
			moved: false,
			show_timer: Some(token),
			long_press_timer: None,
		});
		timers
	}

	pub fn drag(&mut self, pointer: Point, threshold_px: f64) -> Option<DragUpdate> {
		let gesture = self.active.as_mut()?;
		let mut update = DragUpdate {
			owner: gesture.owner,
			position: pointer - gesture.grab_offset,
			crossed_threshold: false,
			timers: Vec::new(),
		};
		if !gesture.moved && gesture.start.distance(pointer) > threshold_px {
			gesture.moved = true;
			gesture.phase = GesturePhase::Dragging;
			update.crossed_threshold = true;
			update.timers = gesture.clear_timers();
		}
		Some(update)
	}

	pub fn release(&mut self) -> Option<Release> {
		let mut gesture = self.active.take()?;
		Some(Release {
			owner: gesture.owner,
			moved: gesture.moved,
			origin: gesture.origin,
			timers: gesture.clear_timers(),
		})
	}

	/// Ends the live gesture without a result, cancelling its timers.
	pub fn abandon(&mut self) -> Vec<TimerRequest> {
		self.active
			.take()
			.map(|mut gesture| gesture.clear_timers())
			.unwrap_or_default()
	}

	pub fn timer_fired(&mut self, token: TimerToken, long_press_ms: u32) -> TimerOutcome {
		let Some(gesture) = self.active.as_mut() else {
			return TimerOutcome::Stale;
		};

		if gesture.show_timer == Some(token) {
			gesture.show_timer = None;
			if gesture.moved {
				return TimerOutcome::Stale;
			}
			let long_press = self.tokens.mint();
			gesture.phase = GesturePhase::ArmedForLongPress;
			gesture.long_press_timer = Some(long_press);
			return TimerOutcome::Armed {
				owner: gesture.owner,
				intent: gesture.intent,
				timers: vec![TimerRequest::Schedule {
					token: long_press,
					delay_ms: long_press_ms,
				}],
			};
		}

		if gesture.long_press_timer == Some(token) && !gesture.moved {
			let (owner, intent) = (gesture.owner, gesture.intent);
			self.active = None;
			return TimerOutcome::LongPress { owner, intent };
		}

		TimerOutcome::Stale
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const THRESHOLD: f64 = 20.0;

	fn scheduled(timers: &[TimerRequest]) -> Vec<TimerToken> {
		timers
			.iter()
			.filter_map(|t| match t {
				TimerRequest::Schedule { token, .. } => Some(*token),
				TimerRequest::Cancel(_) => None,
			})
			.collect()
	}

	fn cancelled(timers: &[TimerRequest]) -> Vec<TimerToken> {
		timers
			.iter()
			.filter_map(|t| match t {
				TimerRequest::Cancel(token) => Some(*token),
				TimerRequest::Schedule { .. } => None,
			})
			.collect()
	}

	fn pressed(dispatcher: &mut GestureDispatcher) -> TimerToken {
		let timers = dispatcher.begin(
			MoveId(1),
			Point::new(100.0, 100.0),
			Point::new(110.0, 105.0),
			LongPressIntent::Open,
			350,
		);
		scheduled(&timers)[0]
	}

	#[test]
	fn form_control_selector_lists_every_control() {
		assert_eq!(form_control_selector(), "input, textarea, button, select");
	}

	#[test]
	fn only_primary_button_presses() {
		assert!(is_primary_button(0));
		assert!(!is_primary_button(1));
		assert!(!is_primary_button(2));
	}

	#[test]
	fn plain_c_toggles_mode() {
		assert!(toggles_mode("c", false, false));
		assert!(toggles_mode("C", false, false));
		assert!(!toggles_mode("x", false, false));
		assert!(!toggles_mode("Control", false, false));
	}

	#[test]
	fn modified_c_or_typing_in_a_control_does_not_toggle() {
		assert!(!toggles_mode("c", true, false));
		assert!(!toggles_mode("c", false, true));
	}

	#[test]
	fn touch_press_needs_exactly_one_finger() {
		let mut touch = TouchTracker::default();
		assert!(!touch.start(2, 7));
		assert_eq!(touch.tracked(), None);
		assert!(touch.start(1, 7));
		assert_eq!(touch.tracked(), Some(7));
	}

	#[test]
	fn second_finger_does_not_end_the_press() {
		let mut touch = TouchTracker::default();
		touch.start(1, 4);
		assert!(!touch.start(2, 9));
		assert!(!touch.lift([9]));
		assert_eq!(touch.tracked(), Some(4));
		assert!(touch.lift([9, 4]));
		assert_eq!(touch.tracked(), None);
		assert!(!touch.lift([4]));
	}

	#[test]
	fn lift_without_a_tracked_finger_is_ignored() {
		let mut touch = TouchTracker::default();
		assert!(!touch.lift([0]));
	}

	#[test]
	fn drag_keeps_grab_offset() {
		let mut dispatcher = GestureDispatcher::default();
		pressed(&mut dispatcher);
		let update = dispatcher.drag(Point::new(150.0, 125.0), THRESHOLD).unwrap();
		assert_eq!(update.position, Point::new(140.0, 120.0));
		assert_eq!(update.owner, MoveId(1));
	}

	#[test]
	fn small_wiggle_is_not_a_drag() {
		let mut dispatcher = GestureDispatcher::default();
		pressed(&mut dispatcher);
		let update = dispatcher.drag(Point::new(122.0, 114.0), THRESHOLD).unwrap();
		assert!(!update.crossed_threshold);
		assert!(update.timers.is_empty());
		assert!(!dispatcher.release().unwrap().moved);
	}

	#[test]
	fn crossing_threshold_cancels_timers_once() {
		let mut dispatcher = GestureDispatcher::default();
		let show = pressed(&mut dispatcher);

		let first = dispatcher.drag(Point::new(140.0, 105.0), THRESHOLD).unwrap();
		assert!(first.crossed_threshold);
		assert!(!dispatcher.active().unwrap().is_holding());
		assert_eq!(cancelled(&first.timers), vec![show]);

		let second = dispatcher.drag(Point::new(160.0, 105.0), THRESHOLD).unwrap();
		assert!(!second.crossed_threshold);
		assert!(second.timers.is_empty());
		assert!(dispatcher.release().unwrap().moved);
	}

	#[test]
	fn overlay_then_long_press() {
		let mut dispatcher = GestureDispatcher::default();
		let show = pressed(&mut dispatcher);

		let TimerOutcome::Armed { timers, owner, .. } = dispatcher.timer_fired(show, 1650) else {
			panic!("overlay timer should arm the long-press");
		};
		assert_eq!(owner, MoveId(1));
		assert!(dispatcher.active().unwrap().is_holding());
		let long_press = scheduled(&timers)[0];

		assert_eq!(
			dispatcher.timer_fired(long_press, 1650),
			TimerOutcome::LongPress {
				owner: MoveId(1),
				intent: LongPressIntent::Open
			}
		);
		assert!(!dispatcher.is_active());
		assert!(dispatcher.release().is_none());
	}

	#[test]
	fn release_cancels_both_timers_and_old_tokens_go_stale() {
		let mut dispatcher = GestureDispatcher::default();
		let show = pressed(&mut dispatcher);
		let TimerOutcome::Armed { timers, .. } = dispatcher.timer_fired(show, 1650) else {
			panic!("expected armed");
		};
		let long_press = scheduled(&timers)[0];

		let release = dispatcher.release().unwrap();
		assert_eq!(cancelled(&release.timers), vec![long_press]);
		assert_eq!(release.origin, Point::new(100.0, 100.0));

		assert_eq!(dispatcher.timer_fired(show, 1650), TimerOutcome::Stale);
		assert_eq!(dispatcher.timer_fired(long_press, 1650), TimerOutcome::Stale);
	}

	#[test]
	fn new_press_abandons_previous_gesture() {
		let mut dispatcher = GestureDispatcher::default();
		let old = pressed(&mut dispatcher);
		let timers = dispatcher.begin(
			MoveId(2),
			Point::new(0.0, 0.0),
			Point::new(5.0, 5.0),
			LongPressIntent::Delete,
			350,
		);
		assert_eq!(cancelled(&timers), vec![old]);
		assert_eq!(dispatcher.active().unwrap().owner(), MoveId(2));
		assert_eq!(dispatcher.timer_fired(old, 1650), TimerOutcome::Stale);
	}
}
