//! Overlay geometry
//!
//! The pill's placement is a pure function of the screen, the rotation,
//! the user's size/position preferences and the nav-hidden/immersive
//! state. Nothing here accumulates: computing twice with the same inputs
//! gives the same geometry, and drag offsets live in the coordinator.
//!
//! Offsets follow window-gravity conventions:
//! - Horizontal: anchored to the bottom edge, `x` from the horizontal
//!   centre, `y` up from the bottom
//! - Vertical / VerticalInverted: anchored to the right / left edge, `x`
//!   in from that edge, `y` down from the vertical centre

use serde::{Deserialize, Serialize};

use super::primitives::{Rect, Rotation, Side, Size};
use crate::config::{PillSettings, MAX_PIXELS};

/// Extra touch height added by the larger hitbox option
pub const HITBOX_INCREASE: i32 = 16;

/// Which way the pill lies on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Along the bottom edge
    #[default]
    Horizontal,
    /// Along the right edge (rotation 90)
    Vertical,
    /// Along the left edge (rotation 270)
    VerticalInverted,
}

impl Orientation {
    pub fn anchor(self) -> Side {
        match self {
            Orientation::Horizontal => Side::Bottom,
            Orientation::Vertical => Side::Right,
            Orientation::VerticalInverted => Side::Left,
        }
    }

    /// Map a screen-space delta to the pill frame, where "up" is away from
    /// the anchored edge and "right" follows the pill's long axis
    pub fn to_pill_frame(self, dx: f64, dy: f64) -> (f64, f64) {
        match self {
            Orientation::Horizontal => (dx, dy),
            Orientation::Vertical => (-dy, dx),
            Orientation::VerticalInverted => (dy, -dx),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftInputMode {
    #[default]
    AdjustResize,
    AdjustNothing,
}

/// Window flags for the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowFlags {
    pub not_focusable: bool,
    pub alt_focusable_im: bool,
    pub layout_in_screen: bool,
    pub soft_input: SoftInputMode,
}

impl WindowFlags {
    pub fn for_settings(settings: &PillSettings) -> Self {
        // A static pill must not be pushed around by the keyboard
        if settings.pins_static() {
            Self {
                not_focusable: true,
                alt_focusable_im: false,
                layout_in_screen: true,
                soft_input: SoftInputMode::AdjustNothing,
            }
        } else {
            Self {
                not_focusable: true,
                alt_focusable_im: true,
                layout_in_screen: false,
                soft_input: SoftInputMode::AdjustResize,
            }
        }
    }
}

/// Everything outside the settings that placement depends on
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutInputs {
    /// Current (rotated) screen size
    pub screen: Size,
    pub rotation: Rotation,
    /// Foreground app is fullscreen
    pub immersive: bool,
    /// We asked the system for nav immersive
    pub immersive_nav: bool,
    /// Car mode with the pill kept enabled
    pub car_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub orientation: Orientation,
    pub flags: WindowFlags,
    /// Distance from the anchored edge while shown
    pub home_offset: i32,
    /// Distance from the anchored edge while hidden
    pub hidden_offset: i32,
}

impl OverlayGeometry {
    /// Offset away from the anchored edge
    pub fn across(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.y,
            _ => self.x,
        }
    }

    pub fn set_across(&mut self, value: i32) {
        match self.orientation {
            Orientation::Horizontal => self.y = value,
            _ => self.x = value,
        }
    }

    /// Offset along the anchored edge, in pill-frame "right" units
    pub fn along(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.x,
            Orientation::Vertical => -self.y,
            Orientation::VerticalInverted => self.y,
        }
    }

    pub fn set_along(&mut self, value: i32) {
        match self.orientation {
            Orientation::Horizontal => self.x = value,
            Orientation::Vertical => self.y = -value,
            Orientation::VerticalInverted => self.y = value,
        }
    }

    /// Length of the pill along its long axis
    pub fn length(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.width,
            _ => self.height,
        }
    }

    /// Thickness of the pill across its long axis
    pub fn thickness(&self) -> i32 {
        match self.orientation {
            Orientation::Horizontal => self.height,
            _ => self.width,
        }
    }

    /// Absolute on-screen rectangle
    pub fn bounds(&self, screen: Size) -> Rect {
        match self.orientation {
            Orientation::Horizontal => Rect::new(
                screen.w / 2 - self.width / 2 + self.x,
                screen.h - self.height - self.y,
                self.width,
                self.height,
            ),
            Orientation::Vertical => Rect::new(
                screen.w - self.width - self.x,
                screen.h / 2 - self.height / 2 + self.y,
                self.width,
                self.height,
            ),
            Orientation::VerticalInverted => Rect::new(
                self.x,
                screen.h / 2 - self.height / 2 + self.y,
                self.width,
                self.height,
            ),
        }
    }

    /// Position of a screen point along the pill's long axis, from its start
    pub fn along_axis_position(&self, screen: Size, sx: f64, sy: f64) -> f64 {
        let b = self.bounds(screen);
        match self.orientation {
            Orientation::Horizontal => sx - b.x as f64,
            Orientation::Vertical => (b.y + b.height) as f64 - sy,
            Orientation::VerticalInverted => sy - b.y as f64,
        }
    }
}

/// Pixel preference as a window coordinate, kept within `MAX_PIXELS`
fn px(value: i64) -> i32 {
    value.clamp(-MAX_PIXELS, MAX_PIXELS) as i32
}

fn percent_of(tenths: i64, total: i32) -> i32 {
    px((tenths as f64 / 10.0 / 100.0 * total as f64) as i64)
}

/// Pick the orientation for the current rotation
pub fn orientation_for(rotation: Rotation, settings: &PillSettings) -> Orientation {
    if !settings.anchor_pill || settings.tablet_mode {
        return Orientation::Horizontal;
    }
    match rotation {
        Rotation::R90 => Orientation::Vertical,
        Rotation::R270 if settings.rot270_fix => Orientation::Vertical,
        Rotation::R270 => Orientation::VerticalInverted,
        _ => Orientation::Horizontal,
    }
}

/// Compute the deterministic placement of the pill
pub fn compute_geometry(inputs: &LayoutInputs, settings: &PillSettings) -> OverlayGeometry {
    let prefs = &settings.geometry;
    let orientation = orientation_for(inputs.rotation, settings);

    // Long axis is the edge the pill lies along, cross axis is perpendicular
    let (long_axis, cross_axis) = match orientation {
        Orientation::Horizontal => (inputs.screen.w, inputs.screen.h),
        _ => (inputs.screen.h, inputs.screen.w),
    };
    let nav = px(prefs.nav_bar_height);

    let length = if prefs.use_pixels_width {
        px(prefs.width_px)
    } else {
        percent_of(prefs.width_percent, long_axis)
    };

    let mut thickness = if prefs.use_pixels_height {
        px(prefs.height_px)
    } else {
        percent_of(prefs.height_percent, cross_axis)
    };
    if settings.larger_hitbox {
        thickness = thickness.saturating_add(HITBOX_INCREASE);
    }
    if inputs.car_mode && settings.enable_in_car_mode {
        thickness = thickness.saturating_mul(2);
    }

    let home_x = if prefs.use_pixels_x {
        px(prefs.x_px)
    } else {
        let half_free = long_axis as f64 / 2.0 - length as f64 / 2.0;
        px((prefs.x_percent as f64 / 10.0 / 100.0 * half_free) as i64)
    };

    // Centred on the nav bar strip unless the user moved it
    let default_y = (nav as f64 / 2.0 - thickness as f64 / 2.0) as i32;
    let home_y = if prefs.use_pixels_y {
        prefs.y_px.map(px).unwrap_or(default_y)
    } else {
        let percent = prefs.y_percent.map(|p| p as f64).unwrap_or_else(|| {
            if cross_axis > 0 {
                (default_y as f64 / cross_axis as f64 * 2000.0).trunc()
            } else {
                0.0
            }
        });
        px((percent * 0.05 / 100.0 * cross_axis as f64) as i64)
    };

    let adjusted = settings.uses_overscan() && (inputs.immersive || inputs.immersive_nav);
    let side_nav = inputs.rotation.is_landscape() && !settings.tablet_mode;

    let home_offset = if !adjusted {
        home_y
    } else if side_nav {
        if settings.hide_in_fullscreen && inputs.immersive {
            0
        } else {
            home_y
        }
    } else if settings.orig_nav_in_immersive {
        0
    } else {
        nav.saturating_add(if settings.hide_in_fullscreen { 0 } else { home_y })
    };

    let hidden_offset = if !adjusted || side_nav || settings.orig_nav_in_immersive {
        0
    } else {
        nav
    };

    let (width, height) = match orientation {
        Orientation::Horizontal => (length, thickness),
        _ => (thickness, length),
    };

    let mut geometry = OverlayGeometry {
        x: 0,
        y: 0,
        width,
        height,
        orientation,
        flags: WindowFlags::for_settings(settings),
        home_offset,
        hidden_offset,
    };
    geometry.set_along(home_x);
    geometry.set_across(home_offset);
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portrait() -> LayoutInputs {
        LayoutInputs {
            screen: Size::new(1080, 2160),
            rotation: Rotation::R0,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_horizontal_geometry() {
        let settings = PillSettings::default();
        let g = compute_geometry(&portrait(), &settings);
        assert_eq!(g.orientation, Orientation::Horizontal);
        assert_eq!(g.width, 216); // 20% of 1080
        assert_eq!(g.height, 25); // 1.2% of 2160
        assert_eq!(g.x, 0);
        // Centred on the 96px nav strip, rounded through the percent path
        assert!((g.y - 35).abs() <= 1);
        assert_eq!(g.home_offset, g.y);
        assert_eq!(g.hidden_offset, 0);
    }

    #[test]
    fn test_geometry_is_pure() {
        let mut settings = PillSettings::default();
        settings.geometry.x_percent = 500;
        settings.larger_hitbox = true;
        let inputs = portrait();
        assert_eq!(
            compute_geometry(&inputs, &settings),
            compute_geometry(&inputs, &settings)
        );
    }

    #[test]
    fn test_pixel_overrides() {
        let mut settings = PillSettings::default();
        settings.geometry.use_pixels_width = true;
        settings.geometry.width_px = 300;
        settings.geometry.use_pixels_height = true;
        settings.geometry.height_px = 30;
        settings.geometry.use_pixels_x = true;
        settings.geometry.x_px = -40;
        settings.geometry.use_pixels_y = true;
        settings.geometry.y_px = Some(10);
        let g = compute_geometry(&portrait(), &settings);
        assert_eq!((g.x, g.y, g.width, g.height), (-40, 10, 300, 30));
        assert_eq!(g.bounds(Size::new(1080, 2160)), Rect::new(350, 2120, 300, 30));
    }

    #[test]
    fn test_immersive_with_overscan_lifts_above_nav() {
        let mut settings = PillSettings::default();
        settings.hide_nav = true;
        settings.geometry.use_pixels_y = true;
        settings.geometry.y_px = Some(20);
        let mut inputs = portrait();
        inputs.immersive_nav = true;
        let g = compute_geometry(&inputs, &settings);
        assert_eq!(g.y, 96 + 20);
        assert_eq!(g.hidden_offset, 96);

        settings.orig_nav_in_immersive = true;
        let g = compute_geometry(&inputs, &settings);
        assert_eq!((g.y, g.hidden_offset), (0, 0));
    }

    #[test]
    fn test_extreme_pixel_prefs_stay_bounded() {
        let mut settings = PillSettings::default();
        settings.larger_hitbox = true;
        settings.enable_in_car_mode = true;
        settings.geometry.use_pixels_width = true;
        settings.geometry.width_px = (1 << 32) + 400;
        settings.geometry.use_pixels_height = true;
        settings.geometry.height_px = i32::MAX as i64;
        settings.geometry.use_pixels_x = true;
        settings.geometry.x_px = i64::MIN;
        let mut inputs = portrait();
        inputs.car_mode = true;
        let g = compute_geometry(&inputs, &settings);
        assert_eq!(g.width, MAX_PIXELS as i32);
        assert_eq!(g.height, (MAX_PIXELS as i32 + HITBOX_INCREASE) * 2);
        assert_eq!(g.x, -(MAX_PIXELS as i32));
        assert_eq!(g.bounds(inputs.screen).width, g.width);

        settings.geometry.use_pixels_width = false;
        settings.geometry.width_percent = i64::MAX;
        let g = compute_geometry(&inputs, &settings);
        assert_eq!(g.width, MAX_PIXELS as i32);
    }

    #[test]
    fn test_overlay_nav_ignores_static_pill() {
        let mut settings = PillSettings::default();
        settings.static_pill = true;
        let g = compute_geometry(&portrait(), &settings);
        assert_eq!(g.flags.soft_input, SoftInputMode::AdjustNothing);

        settings.overlay_nav = true;
        let g = compute_geometry(&portrait(), &settings);
        assert_eq!(g.flags.soft_input, SoftInputMode::AdjustResize);
        assert!(g.flags.alt_focusable_im);
    }

    #[test]
    fn test_car_mode_doubles_height() {
        let mut settings = PillSettings::default();
        settings.enable_in_car_mode = true;
        settings.geometry.use_pixels_height = true;
        settings.geometry.height_px = 20;
        let mut inputs = portrait();
        inputs.car_mode = true;
        assert_eq!(compute_geometry(&inputs, &settings).height, 40);
    }

    #[test]
    fn test_anchored_vertical_variants() {
        let mut settings = PillSettings::default();
        settings.anchor_pill = true;
        settings.geometry.use_pixels_width = true;
        settings.geometry.width_px = 300;
        settings.geometry.use_pixels_height = true;
        settings.geometry.height_px = 30;
        let mut inputs = portrait();
        inputs.screen = Size::new(2160, 1080);

        inputs.rotation = Rotation::R90;
        let g = compute_geometry(&inputs, &settings);
        assert_eq!(g.orientation, Orientation::Vertical);
        assert_eq!((g.width, g.height), (30, 300));
        assert_eq!(g.bounds(inputs.screen).x, 2160 - 30 - g.x);

        inputs.rotation = Rotation::R270;
        assert_eq!(
            compute_geometry(&inputs, &settings).orientation,
            Orientation::VerticalInverted
        );

        settings.tablet_mode = true;
        assert_eq!(
            compute_geometry(&inputs, &settings).orientation,
            Orientation::Horizontal
        );
    }

    #[test]
    fn test_pill_frame_mapping() {
        // Moving toward screen left on a right-edge pill is "up"
        assert_eq!(Orientation::Vertical.to_pill_frame(-50.0, 0.0), (0.0, -50.0));
        // Moving toward screen right on a left-edge pill is "up"
        assert_eq!(Orientation::VerticalInverted.to_pill_frame(50.0, 0.0), (0.0, -50.0));
        assert_eq!(Orientation::Vertical.to_pill_frame(0.0, -20.0), (20.0, 0.0));
    }
}
