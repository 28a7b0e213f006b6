//! Touch input events delivered to the pill

use serde::{Deserialize, Serialize};

use crate::shell::primitives::Point;

/// Raw touch event on the overlay, in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TouchEvent {
    Down { x: f64, y: f64 },
    Motion { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Cancel,
}

impl TouchEvent {
    pub fn position(&self) -> Option<Point> {
        match *self {
            TouchEvent::Down { x, y } | TouchEvent::Motion { x, y } | TouchEvent::Up { x, y } => {
                Some(Point::new(x, y))
            }
            TouchEvent::Cancel => None,
        }
    }
}
