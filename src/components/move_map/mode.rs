//! Drag vs. connect mode, shared by every move on the canvas.

use super::types::{MoveId, Transition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeEvent {
	EnteredConnect,
	EnteredDrag,
}

/// Result of pressing a move while in connect mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
	/// The move is now waiting for a partner.
	First(MoveId),
	/// Two distinct moves were picked, in selection order. The selection is reset.
	Pair(Transition),
	/// The already-selected move was pressed again.
	SameMove,
}

/// Invariant: `first_selected` is `None` whenever `connect_mode` is false.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModeContext {
	connect_mode: bool,
	first_selected: Option<MoveId>,
}

impl ModeContext {
	pub fn connect_mode(&self) -> bool {
		self.connect_mode
	}

	#[cfg(test)]
	pub fn first_selected(&self) -> Option<MoveId> {
		self.first_selected
	}

	/// Flips the mode and drops any half-made selection, which also clears
	/// every connecting highlight.
	pub fn toggle(&mut self) -> ModeEvent {
		self.connect_mode = !self.connect_mode;
		self.first_selected = None;
		if self.connect_mode {
			ModeEvent::EnteredConnect
		} else {
			ModeEvent::EnteredDrag
		}
	}

	pub fn select(&mut self, id: MoveId) -> Selection {
		debug_assert!(self.connect_mode, "selection outside connect mode");
		match self.first_selected {
			None => {
				self.first_selected = Some(id);
				Selection::First(id)
			}
			Some(first) if first == id => Selection::SameMove,
			Some(first) => {
				self.first_selected = None;
				Selection::Pair(Transition::new(first, id))
			}
		}
	}

	pub fn is_connecting(&self, id: MoveId) -> bool {
		self.first_selected == Some(id)
	}

	/// Drops `id` from the selection, e.g. after the move was deleted.
	pub fn forget(&mut self, id: MoveId) {
		if self.first_selected == Some(id) {
			self.first_selected = None;
		}
	}

	pub fn indicator_label(&self) -> &'static str {
		if self.connect_mode {
			"Connect Mode (Click 2 moves)"
		} else {
			"Drag Mode (Click to Connect)"
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn toggle_clears_selection_from_any_state() {
		let mut mode = ModeContext::default();
		assert_eq!(mode.toggle(), ModeEvent::EnteredConnect);
		mode.select(MoveId(1));
		assert!(mode.is_connecting(MoveId(1)));

		assert_eq!(mode.toggle(), ModeEvent::EnteredDrag);
		assert_eq!(mode.first_selected(), None);
		assert!(!mode.is_connecting(MoveId(1)));

		assert_eq!(mode.toggle(), ModeEvent::EnteredConnect);
		assert_eq!(mode.first_selected(), None);
	}

	#[test]
	fn second_distinct_move_forms_ordered_pair() {
		let mut mode = ModeContext::default();
		mode.toggle();
		assert_eq!(mode.select(MoveId(4)), Selection::First(MoveId(4)));
		assert_eq!(
			mode.select(MoveId(2)),
			Selection::Pair(Transition::new(MoveId(4), MoveId(2)))
		);
		assert_eq!(mode.first_selected(), None);
		assert!(mode.connect_mode());
	}

	#[test]
	fn pressing_selected_move_again_keeps_selection() {
		let mut mode = ModeContext::default();
		mode.toggle();
		mode.select(MoveId(3));
		assert_eq!(mode.select(MoveId(3)), Selection::SameMove);
		assert_eq!(mode.first_selected(), Some(MoveId(3)));
	}

	#[test]
	fn forget_only_drops_matching_move() {
		let mut mode = ModeContext::default();
		mode.toggle();
		mode.select(MoveId(3));
		mode.forget(MoveId(5));
		assert_eq!(mode.first_selected(), Some(MoveId(3)));
		mode.forget(MoveId(3));
		assert_eq!(mode.first_selected(), None);
	}

	#[test]
	fn indicator_follows_mode() {
		let mut mode = ModeContext::default();
		assert_eq!(mode.indicator_label(), "Drag Mode (Click to Connect)");
		mode.toggle();
		assert_eq!(mode.indicator_label(), "Connect Mode (Click 2 moves)");
	}
}
