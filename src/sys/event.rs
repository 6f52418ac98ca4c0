use serde::{Deserialize, Serialize};

use crate::sys::geometry::Point;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseState {
    Down,
    Up,
}

/// Primary-button pointer input, in screen coordinates.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Moved(Point),
    Up(Point),
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down(p) | PointerEvent::Moved(p) | PointerEvent::Up(p) => p,
        }
    }
}
