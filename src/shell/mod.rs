//! Pill overlay - placement, visibility and the nav blackout strip

pub mod blackout;
pub mod geometry;
pub mod overlay;
pub mod primitives;

pub use blackout::{Blackout, BlackoutPlacement, BlackoutSurface};
pub use geometry::{compute_geometry, LayoutInputs, OverlayGeometry, Orientation};
pub use overlay::{
    OverlayCoordinator, OverlayNotice, OverlaySurface, OverlayTimer, SurfaceFrame, Visibility,
};
pub use primitives::{Point, Rect, Rotation, Side, Size};
