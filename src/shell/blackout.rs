//! Opaque strip covering the area the hidden nav bar left behind

use tracing::{debug, info};

use super::primitives::{colors, Color, Rotation, Side};
use crate::error::SurfaceError;

/// Window operations for the blackout strip
pub trait BlackoutSurface {
    fn add(&mut self, side: Side, thickness: i32, color: Color) -> Result<(), SurfaceError>;
    fn remove(&mut self) -> Result<(), SurfaceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlackoutPlacement {
    pub side: Side,
    pub thickness: i32,
}

pub struct Blackout {
    surface: Box<dyn BlackoutSurface>,
    shown: Option<BlackoutPlacement>,
    rotation: Rotation,
}

impl Blackout {
    pub fn new(surface: Box<dyn BlackoutSurface>) -> Self {
        Self {
            surface,
            shown: None,
            rotation: Rotation::R0,
        }
    }

    pub fn placement(&self) -> Option<BlackoutPlacement> {
        self.shown
    }

    /// Show the strip at `target` or remove it. A rotation always tears
    /// the strip down and adds it again.
    pub fn sync(&mut self, target: Option<BlackoutPlacement>, rotation: Rotation) {
        let rotated = rotation != self.rotation;
        self.rotation = rotation;
        if !rotated && target == self.shown {
            return;
        }

        if self.shown.take().is_some() {
            if let Err(e) = self.surface.remove() {
                debug!("Blackout remove failed: {}", e);
            }
        }

        let Some(placement) = target else { return };
        match self
            .surface
            .add(placement.side, placement.thickness, colors::BLACKOUT)
        {
            Ok(()) => {
                info!(side = ?placement.side, "Blackout added");
                self.shown = Some(placement);
            }
            Err(e) => debug!("Blackout add failed: {}", e),
        }
    }

    pub fn remove(&mut self) {
        self.sync(None, self.rotation);
    }
}
