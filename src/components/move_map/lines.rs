//! Connection lines drawn between move centers.
//!
//! Line endpoints are derived from the moves they join. [`LineRenderer::resync_all`]
//! recomputes them and has to run after any move changes position or size.

use super::api::StoreRequest;
use super::error::ConnectError;
use super::types::{MoveId, Point, Transition};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId(u32);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineGeometry {
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
}

impl LineGeometry {
	fn between(from: Point, to: Point) -> Self {
		Self {
			x1: from.x,
			y1: from.y,
			x2: to.x,
			y2: to.y,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
	pub id: LineId,
	pub transition: Transition,
	pub geometry: LineGeometry,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineRenderer {
	lines: Vec<Line>,
	next_id: u32,
}

impl LineRenderer {
	pub fn lines(&self) -> &[Line] {
		&self.lines
	}

	pub fn line(&self, id: LineId) -> Option<&Line> {
		self.lines.iter().find(|line| line.id == id)
	}

	pub fn contains(&self, transition: Transition) -> bool {
		self.lines.iter().any(|line| line.transition == transition)
	}

	/// Appends a line for `transition`. Geometry stays zeroed until the next
	/// [`resync_all`](Self::resync_all).
	pub fn add_line(&mut self, transition: Transition) -> Result<LineId, ConnectError> {
		if transition.from == transition.to {
			return Err(ConnectError::SelfLoop(transition.from));
		}
		if self.contains(transition) {
			return Err(ConnectError::Duplicate(transition));
		}
		self.next_id += 1;
		let id = LineId(self.next_id);
		self.lines.push(Line {
			id,
			transition,
			geometry: LineGeometry::default(),
		});
		Ok(id)
	}

	/// Points every line at the current centers of its moves. A line whose
	/// move cannot be found keeps its previous geometry.
	pub fn resync_all(&mut self, center_of: impl Fn(MoveId) -> Option<Point>) {
		for line in &mut self.lines {
			if let (Some(from), Some(to)) = (
				center_of(line.transition.from),
				center_of(line.transition.to),
			) {
				line.geometry = LineGeometry::between(from, to);
			}
		}
	}

	/// Request to send when `id` is clicked. Nothing happens unless the user
	/// confirmed.
	pub fn handle_line_click(&self, id: LineId, confirmed: bool) -> Option<StoreRequest> {
		if !confirmed {
			return None;
		}
		let line = self.line(id)?;
		Some(StoreRequest::DeleteTransition {
			from_move_id: line.transition.from,
			to_move_id: line.transition.to,
		})
	}

	pub fn remove_transition(&mut self, transition: Transition) -> bool {
		let before = self.lines.len();
		self.lines.retain(|line| line.transition != transition);
		self.lines.len() != before
	}

	/// Drops every line that starts or ends at `id`.
	pub fn remove_touching(&mut self, id: MoveId) -> usize {
		let before = self.lines.len();
		self.lines.retain(|line| !line.transition.touches(id));
		before - self.lines.len()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn t(from: i64, to: i64) -> Transition {
		Transition::new(MoveId(from), MoveId(to))
	}

	fn centers() -> HashMap<MoveId, Point> {
		HashMap::from([
			(MoveId(1), Point::new(60.0, 20.0)),
			(MoveId(2), Point::new(300.0, 220.0)),
		])
	}

	#[test]
	fn resync_uses_endpoint_centers() {
		let mut lines = LineRenderer::default();
		lines.add_line(t(1, 2)).unwrap();
		let centers = centers();
		lines.resync_all(|id| centers.get(&id).copied());
		assert_eq!(
			lines.lines()[0].geometry,
			LineGeometry {
				x1: 60.0,
				y1: 20.0,
				x2: 300.0,
				y2: 220.0
			}
		);
	}

	#[test]
	fn resync_is_idempotent() {
		let mut lines = LineRenderer::default();
		lines.add_line(t(1, 2)).unwrap();
		lines.add_line(t(2, 1)).unwrap();
		let centers = centers();
		lines.resync_all(|id| centers.get(&id).copied());
		let first = lines.clone();
		lines.resync_all(|id| centers.get(&id).copied());
		assert_eq!(lines, first);
	}

	#[test]
	fn missing_endpoint_leaves_line_stale() {
		let mut lines = LineRenderer::default();
		lines.add_line(t(1, 2)).unwrap();
		let mut centers = centers();
		lines.resync_all(|id| centers.get(&id).copied());
		let before = lines.lines()[0].geometry;

		centers.remove(&MoveId(2));
		centers.insert(MoveId(1), Point::new(0.0, 0.0));
		lines.resync_all(|id| centers.get(&id).copied());
		assert_eq!(lines.lines()[0].geometry, before);
	}

	#[test]
	fn self_loops_and_duplicates_are_rejected() {
		let mut lines = LineRenderer::default();
		assert_eq!(
			lines.add_line(t(3, 3)),
			Err(ConnectError::SelfLoop(MoveId(3)))
		);
		lines.add_line(t(1, 2)).unwrap();
		assert_eq!(
			lines.add_line(t(1, 2)),
			Err(ConnectError::Duplicate(t(1, 2)))
		);
		assert!(lines.add_line(t(2, 1)).is_ok());
		assert_eq!(lines.lines().len(), 2);
	}

	#[test]
	fn click_needs_confirmation() {
		let mut lines = LineRenderer::default();
		let id = lines.add_line(t(4, 5)).unwrap();
		assert_eq!(lines.handle_line_click(id, false), None);
		assert_eq!(
			lines.handle_line_click(id, true),
			Some(StoreRequest::DeleteTransition {
				from_move_id: MoveId(4),
				to_move_id: MoveId(5)
			})
		);
	}

	#[test]
	fn removal_by_pair_and_by_move() {
		let mut lines = LineRenderer::default();
		lines.add_line(t(1, 2)).unwrap();
		lines.add_line(t(2, 3)).unwrap();
		lines.add_line(t(3, 1)).unwrap();

		assert!(lines.remove_transition(t(2, 3)));
		assert!(!lines.remove_transition(t(2, 3)));
		assert_eq!(lines.remove_touching(MoveId(1)), 2);
		assert!(lines.lines().is_empty());
	}
}
