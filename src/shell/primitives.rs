//! Basic geometry primitives for the pill overlay

use serde::{Deserialize, Serialize};

/// A point in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn delta_from(&self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    pub fn distance(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Screen or window size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

impl Size {
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

/// A simple rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Check if a point is inside this rectangle
    #[cfg(test)]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && x < (self.x + self.width) as f64
            && y >= self.y as f64
            && y < (self.y + self.height) as f64
    }
}

/// Display rotation, clockwise from the natural orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    #[serde(rename = "0")]
    R0,
    #[serde(rename = "90")]
    R90,
    #[serde(rename = "180")]
    R180,
    #[serde(rename = "270")]
    R270,
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// Quarter turns clockwise
    pub fn quarter_turns(self) -> u8 {
        (self.degrees() / 90) as u8
    }

    pub fn is_landscape(self) -> bool {
        matches!(self, Rotation::R90 | Rotation::R270)
    }
}

/// A side of the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    fn index(self) -> u8 {
        match self {
            Side::Bottom => 0,
            Side::Left => 1,
            Side::Top => 2,
            Side::Right => 3,
        }
    }

    fn from_index(i: u8) -> Self {
        match i % 4 {
            0 => Side::Bottom,
            1 => Side::Left,
            2 => Side::Top,
            _ => Side::Right,
        }
    }

    /// The natural-orientation side that appears as `self` on screen at `rotation`
    pub fn screen_to_natural(self, rotation: Rotation) -> Side {
        Side::from_index(self.index() + rotation.quarter_turns())
    }

    /// Where a natural-orientation side appears on screen at `rotation`
    pub fn natural_to_screen(self, rotation: Rotation) -> Side {
        Side::from_index(self.index() + 4 - rotation.quarter_turns())
    }
}

/// Color in ARGB packed form
pub type Color = u32;

pub mod colors {
    use super::Color;

    pub const BLACKOUT: Color = 0xFF00_0000; // Opaque strip over the hidden nav bar
}

/// Pill alpha while hidden, shown, and detached
pub const ALPHA_HIDDEN: f64 = 0.2;
pub const ALPHA_ACTIVE: f64 = 1.0;
