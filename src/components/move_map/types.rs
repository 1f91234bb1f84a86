use std::fmt;
use std::ops::Sub;

use serde::{Deserialize, Serialize};

/// Size a move is laid out with until its element has been measured.
pub const DEFAULT_NODE_SIZE: Size = Size {
	width: 120.0,
	height: 40.0,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub i64);

impl fmt::Display for MoveId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Canvas-relative coordinates in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveNode {
	pub id: MoveId,
	pub name: String,
	/// Top-left corner.
	pub position: Point,
	pub size: Size,
}

impl MoveNode {
	pub fn center(&self) -> Point {
		Point::new(
			self.position.x + self.size.width / 2.0,
			self.position.y + self.size.height / 2.0,
		)
	}
}

/// Directed edge between two moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
	pub from: MoveId,
	pub to: MoveId,
}

impl Transition {
	pub fn new(from: MoveId, to: MoveId) -> Self {
		Self { from, to }
	}

	pub fn touches(&self, id: MoveId) -> bool {
		self.from == id || self.to == id
	}
}

impl fmt::Display for Transition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} -> {}", self.from, self.to)
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MoveRecord {
	pub id: MoveId,
	pub name: String,
	pub x: i32,
	pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TransitionRecord {
	pub from_move_id: MoveId,
	pub to_move_id: MoveId,
}

/// Initial contents of a move map as the server renders them into the page.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MoveMapData {
	#[serde(default)]
	pub moves: Vec<MoveRecord>,
	#[serde(default)]
	pub transitions: Vec<TransitionRecord>,
}
