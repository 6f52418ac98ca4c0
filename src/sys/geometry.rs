//! Integer screen geometry.
//!
//! Screen coordinates are y-down with the origin at the top-left of the
//! primary display, matching what the host reports for work areas and
//! pointer positions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Point { Point { x, y } }

    pub fn offset(self, dx: i32, dy: i32) -> Point { Point::new(self.x + dx, self.y + dy) }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Size { Size { width, height } }

    pub fn is_empty(&self) -> bool { self.width <= 0 || self.height <= 0 }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Rect { Rect { origin, size } }

    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Rect {
        Rect::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn left(&self) -> i32 { self.origin.x }

    pub fn top(&self) -> i32 { self.origin.y }

    pub fn right(&self) -> i32 { self.origin.x + self.size.width }

    pub fn bottom(&self) -> i32 { self.origin.y + self.size.height }

    /// Vertical center, rounded toward the top like integer pixel math.
    pub fn center_y(&self) -> i32 { (self.top() + self.bottom()) / 2 }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Returns the overlap of two rectangles, or `None` if they are disjoint.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::from_xywh(left, top, right - left, bottom - top))
    }
}
